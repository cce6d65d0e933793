//! Shapes on a slide and their DrawingML text bodies.

use crate::xml::{Element, Node};
use restyle_core::{Alignment, Error, Geometry, ParagraphRecord, Result, RunRecord, TextRegion};

/// What kind of shape an element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    /// `p:sp` with a text body.
    Text,
    /// `p:pic`.
    Picture,
    /// `p:graphicFrame` holding a table.
    Table,
    /// Groups, connectors, charts, shapes without text body.
    Other,
}

/// One shape of a slide's shape tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PptxShape {
    element: Element,
    class: ShapeClass,
    name: String,

    /// Position taken from the layout or master when the shape has no `a:xfrm`.
    inherited: Option<Geometry>,
}

impl PptxShape {
    /// Wrap a child element of `p:spTree`.
    pub fn from_element(element: Element) -> Self {
        let class = match element.local_name() {
            "sp" if element.child("txBody").is_some() => ShapeClass::Text,
            "pic" => ShapeClass::Picture,
            "graphicFrame" if element.has_descendant("tbl") => ShapeClass::Table,
            _ => ShapeClass::Other,
        };
        let name = element
            .elements()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child("cNvPr"))
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
            .to_string();

        Self {
            element,
            class,
            name,
            inherited: None,
        }
    }

    pub fn class(&self) -> ShapeClass {
        self.class
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The `p:ph` of a placeholder shape.
    pub fn placeholder(&self) -> Option<PlaceholderKey> {
        PlaceholderKey::of(&self.element)
    }

    /// Whether the shape positions itself with its own `a:xfrm`.
    pub fn has_transform(&self) -> bool {
        transform(&self.element).is_some()
    }

    pub(crate) fn set_inherited(&mut self, geometry: Option<Geometry>) {
        self.inherited = geometry;
    }

    /// Read the shape's offset and extent, falling back to the inherited position.
    pub fn read_geometry(&self) -> Result<Option<Geometry>> {
        match transform(&self.element) {
            Some(xfrm) => read_transform(xfrm, &self.name).map(Some),
            None => Ok(self.inherited),
        }
    }

    fn text_body(&self) -> Option<&Element> {
        self.element.child("txBody")
    }

    fn text_body_mut(&mut self) -> Option<&mut Element> {
        self.element.child_mut("txBody")
    }
}

/// Identity of a placeholder: its type and index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderKey {
    pub kind: String,
    pub idx: Option<u32>,
}

impl PlaceholderKey {
    /// Key of a shape element, `None` when it is not a placeholder.
    pub fn of(shape: &Element) -> Option<Self> {
        let ph = shape
            .elements()
            .find(|e| e.local_name().starts_with("nv"))?
            .find(&["nvPr", "ph"])?;
        Some(Self {
            kind: ph.attr("type").unwrap_or("obj").to_string(),
            idx: ph.attr("idx").and_then(|v| v.parse().ok()),
        })
    }

    /// Type as masters know it; masters only carry the base kinds.
    fn base_kind(&self) -> &str {
        match self.kind.as_str() {
            "ctrTitle" => "title",
            "subTitle" | "obj" => "body",
            kind => kind,
        }
    }
}

/// The placeholder in `root`'s shape tree matching `key`.
///
/// With `by_idx`, an index match wins over a type match.
pub(crate) fn find_placeholder<'a>(
    root: &'a Element,
    key: &PlaceholderKey,
    by_idx: bool,
) -> Option<&'a Element> {
    let candidates: Vec<(&Element, PlaceholderKey)> = root
        .find(&["cSld", "spTree"])?
        .elements()
        .filter_map(|e| PlaceholderKey::of(e).map(|k| (e, k)))
        .collect();

    let by_index = key
        .idx
        .filter(|_| by_idx)
        .and_then(|idx| candidates.iter().find(|(_, k)| k.idx.unwrap_or(0) == idx));
    by_index
        .or_else(|| {
            candidates
                .iter()
                .find(|(_, k)| k.base_kind() == key.base_kind())
        })
        .map(|(e, _)| *e)
}

/// Explicit position of a shape element, ignoring malformed transforms.
pub(crate) fn explicit_geometry(shape: &Element) -> Option<Geometry> {
    transform(shape).and_then(|xfrm| read_transform(xfrm, "").ok())
}

fn transform(shape: &Element) -> Option<&Element> {
    match shape.local_name() {
        "graphicFrame" => shape.child("xfrm"),
        "grpSp" => shape.find(&["grpSpPr", "xfrm"]),
        _ => shape.find(&["spPr", "xfrm"]),
    }
}

fn read_transform(xfrm: &Element, name: &str) -> Result<Geometry> {
    let off = xfrm.child("off");
    let ext = xfrm.child("ext");
    Ok(Geometry {
        left: coordinate(name, off, "x")?,
        top: coordinate(name, off, "y")?,
        width: coordinate(name, ext, "cx")?,
        height: coordinate(name, ext, "cy")?,
    })
}

fn coordinate(name: &str, el: Option<&Element>, key: &str) -> Result<i64> {
    match el.and_then(|e| e.attr(key)) {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            Error::UnreadableShape(format!(
                "shape '{}': invalid {} coordinate '{}'",
                name, key, raw
            ))
        }),
    }
}

impl TextRegion for PptxShape {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> Result<Option<Geometry>> {
        self.read_geometry()
    }

    fn paragraphs(&self) -> Vec<ParagraphRecord> {
        self.text_body()
            .map(|body| {
                body.elements()
                    .filter(|e| e.local_name() == "p")
                    .map(read_paragraph)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn clear(&mut self) {
        if let Some(body) = self.text_body_mut() {
            let kept = first_paragraph_properties(body);
            let prefix = drawing_prefix(body);
            let mut paragraph = Element::new(qualified(&prefix, "p"));
            if let Some(ppr) = kept {
                paragraph = paragraph.with_child(ppr);
            }
            replace_paragraphs(body, vec![paragraph]);
        }
    }

    fn write(&mut self, paragraphs: &[ParagraphRecord]) {
        let Some(body) = self.text_body_mut() else {
            return;
        };
        let base = first_paragraph_properties(body);
        let prefix = drawing_prefix(body);

        let mut written: Vec<Element> = paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let base = if i == 0 { base.clone() } else { None };
                build_paragraph(&prefix, p, base)
            })
            .collect();
        if written.is_empty() {
            written.push(Element::new(qualified(&prefix, "p")));
        }
        replace_paragraphs(body, written);
    }
}

fn read_paragraph(p: &Element) -> ParagraphRecord {
    let mut record = ParagraphRecord::default();

    if let Some(ppr) = p.child("pPr") {
        record.level = ppr.attr("lvl").and_then(|v| v.parse().ok()).unwrap_or(0);
        record.alignment = ppr.attr("algn").and_then(alignment_from_code);
    }

    for child in p.elements() {
        match child.local_name() {
            "r" | "fld" => {
                let mut run = RunRecord::new(child.child("t").map(Element::text).unwrap_or_default());
                if let Some(rpr) = child.child("rPr") {
                    run.bold = rpr.attr("b").map(parse_bool);
                    run.italic = rpr.attr("i").map(parse_bool);
                    run.size_pt = rpr
                        .attr("sz")
                        .and_then(|v| v.parse::<f64>().ok())
                        .map(|hundredths| hundredths / 100.0);
                }
                record.runs.push(run);
            }
            "br" => match record.runs.last_mut() {
                Some(run) => run.text.push('\n'),
                None => record.runs.push(RunRecord::new("\n")),
            },
            _ => {}
        }
    }

    record
}

fn build_paragraph(prefix: &str, record: &ParagraphRecord, base: Option<Element>) -> Element {
    let mut paragraph = Element::new(qualified(prefix, "p"));

    let mut ppr = base;
    if record.level > 0 || record.alignment.is_some() {
        let ppr = ppr.get_or_insert_with(|| Element::new(qualified(prefix, "pPr")));
        if record.level > 0 {
            ppr.set_attr("lvl", record.level.to_string());
        }
        if let Some(alignment) = record.alignment {
            ppr.set_attr("algn", alignment_code(alignment));
        }
    }
    if let Some(ppr) = ppr {
        paragraph = paragraph.with_child(ppr);
    }

    for run in &record.runs {
        let rpr = run_properties(prefix, run);
        for (i, segment) in run.text.split('\n').enumerate() {
            if i > 0 {
                let mut br = Element::new(qualified(prefix, "br"));
                if let Some(rpr) = &rpr {
                    br = br.with_child(rpr.clone());
                }
                paragraph = paragraph.with_child(br);
            }
            if segment.is_empty() {
                continue;
            }

            let mut r = Element::new(qualified(prefix, "r"));
            if let Some(rpr) = &rpr {
                r = r.with_child(rpr.clone());
            }
            r = r.with_child(Element::new(qualified(prefix, "t")).with_text(segment));
            paragraph = paragraph.with_child(r);
        }
    }

    paragraph
}

fn run_properties(prefix: &str, run: &RunRecord) -> Option<Element> {
    let mut rpr = Element::new(qualified(prefix, "rPr"));
    if let Some(size) = run.size_pt {
        rpr.set_attr("sz", ((size * 100.0).round() as i64).to_string());
    }
    if let Some(bold) = run.bold {
        rpr.set_attr("b", if bold { "1" } else { "0" });
    }
    if let Some(italic) = run.italic {
        rpr.set_attr("i", if italic { "1" } else { "0" });
    }
    (!rpr.attributes.is_empty()).then_some(rpr)
}

/// Replace all `a:p` children of a text body, keeping `bodyPr` and `lstStyle`.
fn replace_paragraphs(body: &mut Element, paragraphs: Vec<Element>) {
    let mut kept: Vec<Node> = Vec::with_capacity(body.children.len());
    let mut insert_at = None;
    for node in std::mem::take(&mut body.children) {
        if matches!(&node, Node::Element(e) if e.local_name() == "p") {
            insert_at.get_or_insert(kept.len());
            continue;
        }
        kept.push(node);
    }

    let tail = kept.split_off(insert_at.unwrap_or(kept.len()));
    kept.extend(paragraphs.into_iter().map(Node::Element));
    kept.extend(tail);
    body.children = kept;
}

/// `pPr` of the first paragraph, which carries the template's alignment and level.
fn first_paragraph_properties(body: &Element) -> Option<Element> {
    body.elements()
        .find(|e| e.local_name() == "p")
        .and_then(|p| p.child("pPr"))
        .cloned()
}

/// DrawingML prefix used inside a text body, "a" in practice.
fn drawing_prefix(body: &Element) -> String {
    body.elements()
        .map(Element::prefix)
        .find(|p| !p.is_empty())
        .unwrap_or("a")
        .to_string()
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

fn alignment_from_code(code: &str) -> Option<Alignment> {
    match code {
        "l" => Some(Alignment::Left),
        "ctr" => Some(Alignment::Center),
        "r" => Some(Alignment::Right),
        "just" | "justLow" => Some(Alignment::Justify),
        "dist" | "thaiDist" => Some(Alignment::Distributed),
        _ => None,
    }
}

fn alignment_code(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "l",
        Alignment::Center => "ctr",
        Alignment::Right => "r",
        Alignment::Justify => "just",
        Alignment::Distributed => "dist",
    }
}
