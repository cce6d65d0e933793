//! Builds small but complete .pptx packages for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub enum Shape {
    Text {
        name: String,
        text: String,
        x: i64,
        y: i64,
    },
    /// A text box: no placeholder, own position.
    TextBox {
        name: String,
        text: String,
        x: i64,
        y: i64,
    },
    /// A placeholder without `a:xfrm`, positioned by its layout or master.
    Placeholder {
        name: String,
        text: String,
    },
    Picture {
        x: i64,
        y: i64,
    },
}

pub fn text(name: &str, text: &str, x: i64, y: i64) -> Shape {
    Shape::Text {
        name: name.to_string(),
        text: text.to_string(),
        x,
        y,
    }
}

pub fn text_box(name: &str, text: &str, x: i64, y: i64) -> Shape {
    Shape::TextBox {
        name: name.to_string(),
        text: text.to_string(),
        x,
        y,
    }
}

/// A placeholder positioned by inheritance: the title, or the body (idx 1).
pub fn placeholder(name: &str, text: &str) -> Shape {
    Shape::Placeholder {
        name: name.to_string(),
        text: text.to_string(),
    }
}

pub fn picture(x: i64, y: i64) -> Shape {
    Shape::Picture { x, y }
}

/// A template slide: title and body placeholders still showing their prompts.
pub fn template_slide() -> Vec<Shape> {
    vec![
        text("Title 1", "Click to add title", 457200, 274638),
        text("Content Placeholder 2", "Click to add text", 457200, 1600200),
    ]
}

/// Like [`template_slide`], but the placeholders take their position from
/// layout 1 (body) and the master (title).
pub fn inherited_template_slide() -> Vec<Shape> {
    vec![
        placeholder("Title 1", "Click to add title"),
        placeholder("Content Placeholder 2", "Click to add text"),
    ]
}

/// Where the master puts the title: x, y, cx, cy.
pub const MASTER_TITLE: (i64, i64, i64, i64) = (457200, 274638, 8229600, 1143000);
/// Where layout 1 puts the body placeholder (idx 1): x, y, cx, cy.
pub const LAYOUT_BODY: (i64, i64, i64, i64) = (457200, 1600200, 8229600, 4525963);

fn xfrm((x, y, cx, cy): (i64, i64, i64, i64)) -> String {
    format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#)
}

/// Write a deck with one layout-1 slide per entry. Slide 1 carries a notes page.
pub fn write_deck(path: &Path, slides: &[Vec<Shape>]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    let mut put = |name: &str, content: String| {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };

    let mut overrides = String::new();
    for i in 1..=slides.len() {
        overrides.push_str(&format!(r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#, i));
    }
    if !slides.is_empty() {
        overrides.push_str(r#"<Override PartName="/ppt/notesSlides/notesSlide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#);
    }
    put("[Content_Types].xml", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>{}</Types>"#,
        overrides
    ));

    put("_rels/.rels", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="{REL}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    ));
    put("docProps/app.xml", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>Microsoft Office PowerPoint</Application><Slides>{}</Slides></Properties>"#,
        slides.len()
    ));

    let mut slide_ids = String::new();
    let mut slide_rels = String::new();
    for i in 1..=slides.len() {
        slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 1));
        slide_rels.push_str(&format!(r#"<Relationship Id="rId{}" Type="{REL}/slide" Target="slides/slide{}.xml"/>"#, i + 1, i));
    }
    let slide_list = if slides.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
    };
    put("ppt/presentation.xml", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
        slide_list
    ));
    put("ppt/_rels/presentation.xml.rels", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/slideMaster" Target="slideMasters/slideMaster1.xml"/>{}</Relationships>"#,
        slide_rels
    ));

    let master_title = xfrm(MASTER_TITLE);
    let master_body = xfrm(LAYOUT_BODY);
    put("ppt/slideMasters/slideMaster1.xml", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr>{master_title}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr>{master_body}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp></p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#
    ));
    put("ppt/slideMasters/_rels/slideMaster1.xml.rels", format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout2.xml"/></Relationships>"#
    ));
    for (i, name) in [(1, "Title and Content"), (2, "Title Only")] {
        let body = if i == 1 {
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>Click to edit Master text styles</a:t></a:r></a:p></p:txBody></p:sp>"#,
                xfrm(LAYOUT_BODY)
            )
        } else {
            String::new()
        };
        put(&format!("ppt/slideLayouts/slideLayout{}.xml", i), format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS}><p:cSld name="{name}"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>Click to edit Master title style</a:t></a:r></a:p></p:txBody></p:sp>{body}<p:sp><p:nvSpPr><p:cNvPr id="4" name="Date Placeholder 3"/><p:cNvSpPr/><p:nvPr><p:ph type="dt" sz="half" idx="10"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp></p:spTree></p:cSld></p:sldLayout>"#
        ));
        put(&format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i), format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#
        ));
    }

    for (index, shapes) in slides.iter().enumerate() {
        let number = index + 1;
        let tree: String = shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| shape_xml(shape, i + 2))
            .collect();
        put(&format!("ppt/slides/slide{}.xml", number), format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{tree}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
        ));

        let notes = if number == 1 {
            format!(r#"<Relationship Id="rId2" Type="{REL}/notesSlide" Target="../notesSlides/notesSlide1.xml"/>"#)
        } else {
            String::new()
        };
        put(&format!("ppt/slides/_rels/slide{}.xml.rels", number), format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>{notes}</Relationships>"#
        ));
    }

    if !slides.is_empty() {
        put("ppt/notesSlides/notesSlide1.xml", format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:notes>"#
        ));
        put("ppt/notesSlides/_rels/notesSlide1.xml.rels", format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL}/slide" Target="../slides/slide1.xml"/></Relationships>"#
        ));
    }

    zip.finish().unwrap();
}

fn shape_xml(shape: &Shape, id: usize) -> String {
    match shape {
        Shape::Text { name, text, x, y } => {
            let ph = placeholder_ref(name, id);
            let position = xfrm((*x, *y, 8229600, 1143000));
            text_shape(id, name, "<p:cNvSpPr/>", &ph, &position, text)
        }
        Shape::TextBox { name, text, x, y } => {
            let position = xfrm((*x, *y, 8229600, 1143000));
            text_shape(id, name, r#"<p:cNvSpPr txBox="1"/>"#, "", &position, text)
        }
        Shape::Placeholder { name, text } => {
            // Non-title placeholders are the layout's body, idx 1.
            let ph = placeholder_ref(name, 2);
            text_shape(id, name, "<p:cNvSpPr/>", &ph, "", text)
        }
        Shape::Picture { x, y } => format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr>{}</p:spPr></p:pic>"#,
            xfrm((*x, *y, 2000000, 1500000))
        ),
    }
}

fn placeholder_ref(name: &str, id: usize) -> String {
    if name.starts_with("Title") {
        r#"<p:ph type="title"/>"#.to_string()
    } else {
        format!(r#"<p:ph idx="{}"/>"#, id - 1)
    }
}

fn text_shape(id: usize, name: &str, c_nv_sp_pr: &str, ph: &str, position: &str, text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US" sz="2400" b="1"/><a:t>{}</a:t></a:r></a:p>"#,
                escape(line)
            )
        })
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/>{c_nv_sp_pr}<p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr>{position}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
