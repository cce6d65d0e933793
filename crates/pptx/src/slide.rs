//! Slide parts: the shape tree and the slide's relationships.

use crate::rels::{self, Relationships, REL_SLIDE_LAYOUT};
use crate::shape::{explicit_geometry, find_placeholder, PlaceholderKey, PptxShape, ShapeClass};
use crate::xml::{self, Element, Node};
use restyle_core::{Result, ShapeView, Slide};

pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const CONTENT_TYPE_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Layout placeholders that never receive body text on a new slide.
const NON_TEXT_PLACEHOLDERS: &[&str] = &[
    "dt", "ftr", "sldNum", "pic", "chart", "tbl", "clipArt", "dgm", "media",
];

/// A child of `p:spTree`: either a shape or markup we keep verbatim.
#[derive(Debug, Clone, PartialEq)]
enum TreeItem {
    Node(Node),
    Shape(PptxShape),
}

/// One slide of a deck.
#[derive(Debug, Clone, PartialEq)]
pub struct PptxSlide {
    part_name: String,

    /// The slide document with an empty `p:spTree`.
    root: Element,
    tree: Vec<TreeItem>,
    rels: Relationships,

    /// `p:sldId/@id` in the presentation, `None` for slides we created.
    pub(crate) slide_id: Option<u32>,
    /// Relationship id from the presentation part, `None` for slides we created.
    pub(crate) rel_id: Option<String>,
}

impl PptxSlide {
    /// Parse a slide part.
    pub fn parse(part_name: impl Into<String>, content: &str, rels: Relationships) -> Result<Self> {
        let mut root = xml::parse(content)?;
        let tree = match root.find_mut(&["cSld", "spTree"]) {
            Some(sp_tree) => std::mem::take(&mut sp_tree.children)
                .into_iter()
                .map(|node| match node {
                    Node::Element(e) if is_shape(&e) => TreeItem::Shape(PptxShape::from_element(e)),
                    other => TreeItem::Node(other),
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            part_name: part_name.into(),
            root,
            tree,
            rels,
            slide_id: None,
            rel_id: None,
        })
    }

    /// A new slide carrying empty copies of a layout's text placeholders.
    pub fn from_layout(part_name: impl Into<String>, layout_part: &str, layout: &Element) -> Self {
        let part_name = part_name.into();

        let mut tree = vec![
            TreeItem::Node(Node::Element(
                Element::new("p:nvGrpSpPr")
                    .with_child(Element::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
                    .with_child(Element::new("p:cNvGrpSpPr"))
                    .with_child(Element::new("p:nvPr")),
            )),
            TreeItem::Node(Node::Element(Element::new("p:grpSpPr"))),
        ];

        let placeholders = layout
            .find(&["cSld", "spTree"])
            .into_iter()
            .flat_map(|t| t.elements())
            .filter(|e| e.local_name() == "sp")
            .filter_map(|sp| {
                let nv = sp.child("nvSpPr")?;
                let ph = nv.find(&["nvPr", "ph"])?;
                let kind = ph.attr("type").unwrap_or("body");
                if NON_TEXT_PLACEHOLDERS.contains(&kind) {
                    return None;
                }
                let name = nv.child("cNvPr").and_then(|c| c.attr("name")).unwrap_or("");
                Some((name.to_string(), ph))
            });

        for (offset, (name, ph)) in placeholders.enumerate() {
            let mut ph_copy = Element::new("p:ph");
            ph_copy.attributes = ph.attributes.clone();

            let sp = Element::new("p:sp")
                .with_child(
                    Element::new("p:nvSpPr")
                        .with_child(
                            Element::new("p:cNvPr")
                                .with_attr("id", (offset + 2).to_string())
                                .with_attr("name", name),
                        )
                        .with_child(
                            Element::new("p:cNvSpPr")
                                .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
                        )
                        .with_child(Element::new("p:nvPr").with_child(ph_copy)),
                )
                .with_child(Element::new("p:spPr"))
                .with_child(
                    Element::new("p:txBody")
                        .with_child(Element::new("a:bodyPr"))
                        .with_child(Element::new("a:lstStyle"))
                        .with_child(Element::new("a:p")),
                );
            tree.push(TreeItem::Shape(PptxShape::from_element(sp)));
        }

        let root = Element::new("p:sld")
            .with_attr("xmlns:a", NS_DRAWING)
            .with_attr("xmlns:r", NS_RELATIONSHIPS)
            .with_attr("xmlns:p", NS_PRESENTATION)
            .with_child(Element::new("p:cSld").with_child(Element::new("p:spTree")))
            .with_child(
                Element::new("p:clrMapOvr").with_child(Element::new("a:masterClrMapping")),
            );

        let mut rels = Relationships::new();
        rels.add(REL_SLIDE_LAYOUT, rels::relative(&part_name, layout_part));

        Self {
            part_name,
            root,
            tree,
            rels,
            slide_id: None,
            rel_id: None,
        }
    }

    /// A copy of this slide under a new part name, detached from the
    /// presentation and from its notes page.
    pub fn duplicate(&self, part_name: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.part_name = part_name.into();
        copy.rels.remove_type("notesSlide");
        copy.slide_id = None;
        copy.rel_id = None;
        copy
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    /// Part name of the layout this slide was stamped from.
    pub fn layout_part(&self) -> Option<String> {
        self.rels
            .first_of_type("slideLayout")
            .map(|r| rels::resolve(&self.part_name, &r.target))
    }

    /// Position placeholders that carry no transform of their own.
    ///
    /// The layout placeholder is matched by index, then by type; when it has
    /// no transform either, the master placeholder of the same type is used.
    pub fn inherit_geometry(&mut self, layout: Option<&Element>, master: Option<&Element>) {
        for item in &mut self.tree {
            let TreeItem::Shape(shape) = item else {
                continue;
            };
            if shape.has_transform() {
                continue;
            }
            let Some(key) = shape.placeholder() else {
                continue;
            };

            let from_layout = layout.and_then(|l| find_placeholder(l, &key, true));
            let geometry = from_layout.and_then(explicit_geometry).or_else(|| {
                let master_key = from_layout
                    .and_then(PlaceholderKey::of)
                    .unwrap_or_else(|| key.clone());
                master
                    .and_then(|m| find_placeholder(m, &master_key, false))
                    .and_then(explicit_geometry)
            });
            shape.set_inherited(geometry);
        }
    }

    /// All shapes, in tree order.
    pub fn shape_list(&self) -> impl Iterator<Item = &PptxShape> {
        self.tree.iter().filter_map(|item| match item {
            TreeItem::Shape(shape) => Some(shape),
            TreeItem::Node(_) => None,
        })
    }

    /// Serialize the slide part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = self.root.clone();
        if let Some(sp_tree) = root.find_mut(&["cSld", "spTree"]) {
            sp_tree.children = self
                .tree
                .iter()
                .map(|item| match item {
                    TreeItem::Node(node) => node.clone(),
                    TreeItem::Shape(shape) => Node::Element(shape.element().clone()),
                })
                .collect();
        }
        xml::to_xml(&root)
    }
}

impl Slide for PptxSlide {
    type Region = PptxShape;

    fn shapes(&self) -> Vec<Result<ShapeView<'_, PptxShape>>> {
        self.shape_list()
            .map(|shape| match shape.class() {
                ShapeClass::Text => Ok(ShapeView::Textual(shape)),
                ShapeClass::Picture => shape
                    .read_geometry()
                    .map(|g| ShapeView::Pictorial(g.unwrap_or_default())),
                ShapeClass::Table => shape
                    .read_geometry()
                    .map(|g| ShapeView::Tabular(g.unwrap_or_default())),
                ShapeClass::Other => Ok(ShapeView::Other),
            })
            .collect()
    }

    fn regions_mut(&mut self) -> Vec<&mut PptxShape> {
        self.tree
            .iter_mut()
            .filter_map(|item| match item {
                TreeItem::Shape(shape) if shape.class() == ShapeClass::Text => Some(shape),
                _ => None,
            })
            .collect()
    }
}

fn is_shape(e: &Element) -> bool {
    matches!(
        e.local_name(),
        "sp" | "pic" | "graphicFrame" | "grpSp" | "cxnSp" | "contentPart" | "AlternateContent"
    )
}
