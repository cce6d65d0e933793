//! A whole PPTX deck: the package, the presentation part and its slides.

use crate::package::{Package, CONTENT_TYPES_PART};
use crate::rels::{self, Relationship, Relationships, REL_SLIDE};
use crate::slide::{PptxSlide, CONTENT_TYPE_SLIDE, NS_RELATIONSHIPS};
use crate::xml::{self, Element, Node};
use restyle_core::{Deck, DeckBuilder, DeckFile, Error, Result};
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";
const APP_PROPERTIES_PART: &str = "docProps/app.xml";

/// Slide ids below this value are reserved.
const FIRST_SLIDE_ID: u32 = 256;

/// A PPTX deck held in memory.
///
/// Slide parts live in `slides`; every other part stays in the package
/// untouched until [`PptxDeck::to_bytes`] rebuilds the slide list.
#[derive(Debug, Clone)]
pub struct PptxDeck {
    package: Package,
    main_part: String,
    presentation: Element,
    presentation_rels: Relationships,
    content_types: Element,
    slides: Vec<PptxSlide>,
}

impl PptxDeck {
    /// Read a deck from a ZIP stream.
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut package = Package::read(reader)?;

        let main_part = main_part(&package)?;
        let presentation = package.read_xml(&main_part)?;
        let presentation_rels = read_rels(&package, &rels::rels_path(&main_part))?;
        let content_types = package.read_xml(CONTENT_TYPES_PART)?;

        let mut slides = Vec::new();
        for (slide_id, rel_id) in slide_id_list(&presentation) {
            let Some(rel) = presentation_rels.get(&rel_id) else {
                log::warn!("Slide id {} points at unknown relationship {}", slide_id, rel_id);
                continue;
            };
            let part = rels::resolve(&main_part, &rel.target);
            let rels_part = rels::rels_path(&part);

            let content = package.read_string(&part)?;
            let slide_rels = read_rels(&package, &rels_part)?;
            let mut slide = PptxSlide::parse(part.as_str(), &content, slide_rels)
                .map_err(|e| Error::Xml(format!("{}: {}", part, e)))?;
            slide.slide_id = Some(slide_id);
            slide.rel_id = Some(rel_id);
            resolve_inherited_geometry(&package, &mut slide)?;

            package.remove(&part);
            package.remove(&rels_part);
            slides.push(slide);
        }

        log::debug!("Read {} slides from {}", slides.len(), main_part);

        Ok(Self {
            package,
            main_part,
            presentation,
            presentation_rels,
            content_types,
            slides,
        })
    }

    /// Serialize the deck into a ZIP archive in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = self.package.clone();

        for slide in &self.slides {
            package.insert(slide.part_name(), slide.to_xml()?);
            if !slide.relationships().is_empty() {
                package.insert(
                    rels::rels_path(slide.part_name()),
                    slide.relationships().to_xml()?,
                );
            }
        }

        let rel_ids = self.slide_relationships();
        let mut presentation_rels = self.presentation_rels.clone();
        presentation_rels.remove_type("slide");
        for (slide, id) in self.slides.iter().zip(&rel_ids) {
            presentation_rels.insert(Relationship {
                id: id.clone(),
                rel_type: REL_SLIDE.to_string(),
                target: rels::relative(&self.main_part, slide.part_name()),
                external: false,
            });
        }

        let mut presentation = self.presentation.clone();
        write_slide_id_list(&mut presentation, &self.slide_ids(), &rel_ids);

        package.insert(self.main_part.as_str(), xml::to_xml(&presentation)?);
        package.insert(
            rels::rels_path(&self.main_part),
            presentation_rels.to_xml()?,
        );

        let content_types = self.content_types_for(&package);
        package.insert(CONTENT_TYPES_PART, xml::to_xml(&content_types)?);

        update_app_properties(&mut package, self.slides.len());

        package.write()
    }

    /// Part names of all slide layouts, in numeric order.
    pub fn layouts(&self) -> Vec<String> {
        let mut layouts: Vec<String> = self
            .package
            .names()
            .filter(|n| {
                n.contains("/slideLayouts/") && !n.contains("/_rels/") && n.ends_with(".xml")
            })
            .map(String::from)
            .collect();
        layouts.sort_by_key(|n| rels::part_number(n).unwrap_or(usize::MAX));
        layouts
    }

    /// The next free `slideN.xml` part name.
    fn next_slide_part(&self) -> String {
        let dir = match self.main_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/slides/", dir),
            None => "slides/".to_string(),
        };

        let max = self
            .package
            .names()
            .chain(self.slides.iter().map(|s| s.part_name()))
            .filter(|n| n.starts_with(&dir) && !n.contains("/_rels/"))
            .filter_map(rels::part_number)
            .max()
            .unwrap_or(0);
        format!("{}slide{}.xml", dir, max + 1)
    }

    /// Presentation relationship ids for each slide, keeping the original ones.
    fn slide_relationships(&self) -> Vec<String> {
        let mut taken = self.presentation_rels.clone();
        taken.remove_type("slide");

        let mut ids: Vec<Option<String>> = self
            .slides
            .iter()
            .map(|s| s.rel_id.clone().filter(|id| taken.get(id).is_none()))
            .collect();
        for id in ids.iter().flatten() {
            taken.insert(Relationship {
                id: id.clone(),
                rel_type: REL_SLIDE.to_string(),
                target: String::new(),
                external: false,
            });
        }
        for id in ids.iter_mut().filter(|id| id.is_none()) {
            *id = Some(taken.add(REL_SLIDE, String::new()));
        }
        ids.into_iter().flatten().collect()
    }

    /// `p:sldId/@id` values for each slide, keeping the original ones.
    fn slide_ids(&self) -> Vec<u32> {
        let mut next = self
            .slides
            .iter()
            .filter_map(|s| s.slide_id)
            .max()
            .map_or(FIRST_SLIDE_ID, |max| max.max(FIRST_SLIDE_ID - 1) + 1);

        self.slides
            .iter()
            .map(|s| match s.slide_id {
                Some(id) => id,
                None => {
                    next += 1;
                    next - 1
                }
            })
            .collect()
    }

    /// Content types with stale overrides dropped and every slide registered.
    fn content_types_for(&self, package: &Package) -> Element {
        let mut types = self.content_types.clone();
        types.children.retain(|node| match node {
            Node::Element(e) if e.local_name() == "Override" => e
                .attr("PartName")
                .map(|p| package.contains(p.trim_start_matches('/')))
                .unwrap_or(false),
            _ => true,
        });

        let prefix = types.prefix().to_string();
        for slide in &self.slides {
            let part_name = format!("/{}", slide.part_name());
            let registered = types
                .elements()
                .any(|e| e.local_name() == "Override" && e.attr("PartName") == Some(part_name.as_str()));
            if !registered {
                types.children.push(Node::Element(
                    Element::new(qualified(&prefix, "Override"))
                        .with_attr("PartName", part_name)
                        .with_attr("ContentType", CONTENT_TYPE_SLIDE),
                ));
            }
        }
        types
    }
}

impl DeckBuilder for PptxDeck {
    /// Part name of a slide layout, e.g. `ppt/slideLayouts/slideLayout2.xml`.
    type Layout = String;

    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn layout_of(&self, index: usize) -> Option<String> {
        self.slides.get(index)?.layout_part()
    }

    fn fallback_layout(&self) -> Option<String> {
        self.layouts().into_iter().next()
    }

    fn create_empty(style_source: &Self) -> Self {
        let mut deck = style_source.clone();
        deck.slides.clear();

        // Notes pages belong to the dropped slides.
        let removed = deck.package.remove_where(|n| n.contains("/notesSlides/"));
        log::debug!("Dropped {} notes parts", removed);

        // Custom shows and sections list slides by id.
        deck.presentation.remove_children("custShowLst");
        if let Some(ext_list) = deck.presentation.child_mut("extLst") {
            ext_list
                .children
                .retain(|n| !matches!(n, Node::Element(e) if e.has_descendant("sectionLst")));
        }
        deck
    }

    fn append_slide(&mut self, layout: &String) -> Result<()> {
        let layout_root = self.package.read_xml(layout)?;
        let part = self.next_slide_part();
        log::debug!("Creating {} from {}", part, layout);
        let mut slide = PptxSlide::from_layout(part, layout, &layout_root);
        resolve_inherited_geometry(&self.package, &mut slide)?;
        self.slides.push(slide);
        Ok(())
    }

    fn append_copy(&mut self, from: &Self, index: usize) -> Result<()> {
        let slide = from.slides.get(index).ok_or(Error::SlideOutOfRange {
            index,
            count: from.slides.len(),
        })?;
        let part = self.next_slide_part();
        log::debug!("Copying {} to {}", slide.part_name(), part);
        self.slides.push(slide.duplicate(part));
        Ok(())
    }
}

impl Deck for PptxDeck {
    type Slide = PptxSlide;

    fn slides(&self) -> &[PptxSlide] {
        &self.slides
    }

    fn slides_mut(&mut self) -> &mut [PptxSlide] {
        &mut self.slides
    }
}

impl DeckFile for PptxDeck {
    fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let data = fs::read(path).map_err(|e| Error::unreadable(path, e))?;
        Self::read(Cursor::new(data)).map_err(|e| Error::unreadable(path, e))
    }

    fn save(&self, path: &Path) -> Result<u64> {
        let save_error = |reason: String| Error::Save {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = self.to_bytes().map_err(|e| save_error(e.to_string()))?;
        fs::write(path, &bytes).map_err(|e| save_error(e.to_string()))?;
        Ok(bytes.len() as u64)
    }
}

fn main_part(package: &Package) -> Result<String> {
    if package.contains("_rels/.rels") {
        let root_rels = Relationships::parse(&package.read_string("_rels/.rels")?)?;
        if let Some(rel) = root_rels.first_of_type("officeDocument") {
            return Ok(rels::resolve("", &rel.target));
        }
    }
    if package.contains(DEFAULT_MAIN_PART) {
        Ok(DEFAULT_MAIN_PART.to_string())
    } else {
        Err(Error::Zip("Package has no presentation part".to_string()))
    }
}

fn read_rels(package: &Package, part: &str) -> Result<Relationships> {
    if package.contains(part) {
        Relationships::parse(&package.read_string(part)?)
    } else {
        Ok(Relationships::new())
    }
}

/// Position the slide's bare placeholders from its layout and that layout's master.
fn resolve_inherited_geometry(package: &Package, slide: &mut PptxSlide) -> Result<()> {
    let Some(layout_part) = slide.layout_part().filter(|p| package.contains(p)) else {
        slide.inherit_geometry(None, None);
        return Ok(());
    };
    let layout = package.read_xml(&layout_part)?;

    let master_part = read_rels(package, &rels::rels_path(&layout_part))?
        .first_of_type("slideMaster")
        .map(|r| rels::resolve(&layout_part, &r.target))
        .filter(|p| package.contains(p));
    let master = master_part.map(|p| package.read_xml(&p)).transpose()?;

    slide.inherit_geometry(Some(&layout), master.as_ref());
    Ok(())
}

/// `(id, r:id)` pairs of `p:sldIdLst`, in presentation order.
fn slide_id_list(presentation: &Element) -> Vec<(u32, String)> {
    presentation
        .child("sldIdLst")
        .into_iter()
        .flat_map(|list| list.elements())
        .filter(|e| e.local_name() == "sldId")
        .filter_map(|e| {
            let id = e.attr("id")?.parse().ok()?;
            let rel_id = e
                .attributes
                .iter()
                .find(|(k, _)| k.ends_with(":id"))
                .map(|(_, v)| v.clone())?;
            Some((id, rel_id))
        })
        .collect()
}

/// Replace `p:sldIdLst` with the given slides, or drop it when there are none.
fn write_slide_id_list(presentation: &mut Element, ids: &[u32], rel_ids: &[String]) {
    let prefix = presentation.prefix().to_string();
    let r_prefix = relationships_prefix(presentation);

    let mut list = Element::new(qualified(&prefix, "sldIdLst"));
    for (id, rel_id) in ids.iter().zip(rel_ids) {
        list = list.with_child(
            Element::new(qualified(&prefix, "sldId"))
                .with_attr("id", id.to_string())
                .with_attr(&qualified(&r_prefix, "id"), rel_id.as_str()),
        );
    }

    let existing = presentation
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.local_name() == "sldIdLst"));
    match existing {
        Some(index) if ids.is_empty() => {
            presentation.children.remove(index);
        }
        Some(index) => presentation.children[index] = Node::Element(list),
        None if ids.is_empty() => {}
        None => {
            // Goes right after the master id lists.
            let index = presentation
                .children
                .iter()
                .rposition(|n| {
                    matches!(n, Node::Element(e) if matches!(
                        e.local_name(),
                        "sldMasterIdLst" | "notesMasterIdLst" | "handoutMasterIdLst"
                    ))
                })
                .map_or(0, |i| i + 1);
            presentation.children.insert(index, Node::Element(list));
        }
    }
}

/// Prefix bound to the relationships namespace, declaring `r` when missing.
fn relationships_prefix(presentation: &mut Element) -> String {
    let declared = presentation
        .attributes
        .iter()
        .find(|(k, v)| k.starts_with("xmlns:") && v == NS_RELATIONSHIPS)
        .map(|(k, _)| k.trim_start_matches("xmlns:").to_string());
    match declared {
        Some(prefix) => prefix,
        None => {
            presentation.set_attr("xmlns:r", NS_RELATIONSHIPS);
            "r".to_string()
        }
    }
}

fn update_app_properties(package: &mut Package, slide_count: usize) {
    if !package.contains(APP_PROPERTIES_PART) {
        return;
    }
    let updated = package.read_xml(APP_PROPERTIES_PART).and_then(|mut props| {
        if let Some(slides) = props.child_mut("Slides") {
            slides.children = vec![Node::Text(slide_count.to_string())];
        }
        xml::to_xml(&props)
    });
    match updated {
        Ok(data) => package.insert(APP_PROPERTIES_PART, data),
        Err(e) => log::warn!("Leaving {} as is: {}", APP_PROPERTIES_PART, e),
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}
