//! Package relationships (`_rels/*.rels`) and part name arithmetic.

use crate::xml::{self, Element};
use quick_xml::events::Event;
use quick_xml::Reader;
use restyle_core::{Error, Result};

pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// A single relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI ends in the given short type, e.g. "slide".
    ///
    /// Strict and transitional OOXML use different URI roots, so only the
    /// last segment is compared.
    pub fn is_type(&self, short: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(short)
    }
}

/// The relationships of one part, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` document.
    pub fn parse(content: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if xml::local_name(&String::from_utf8_lossy(e.name().as_ref()))
                        == "Relationship" =>
                {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                        external: false,
                    };

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => rel.external = value == "External",
                            _ => {}
                        }
                    }

                    if !rel.id.is_empty() {
                        items.push(rel);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        Ok(Self { items })
    }

    /// Serialize as a `.rels` document.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = Element::new("Relationships").with_attr("xmlns", NS_RELATIONSHIPS);
        for rel in &self.items {
            let mut el = Element::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el.set_attr("TargetMode", "External");
            }
            root = root.with_child(el);
        }
        xml::to_xml(&root)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First relationship of a short type.
    pub fn first_of_type(&self, short: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.is_type(short))
    }

    /// Add a relationship with a fresh id and return the id.
    pub fn add(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        });
        id
    }

    /// Add a relationship under a given id.
    pub fn insert(&mut self, rel: Relationship) {
        self.items.retain(|r| r.id != rel.id);
        self.items.push(rel);
    }

    /// Drop all relationships of a short type.
    pub fn remove_type(&mut self, short: &str) {
        self.items.retain(|r| !r.is_type(short));
    }

    /// Smallest `rIdN` not in use.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }
}

/// Path of the relationships part belonging to `part`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve(base_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    }
    let dir = base_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(dir.split('/').chain(target.split('/')))
}

/// Relative target from `from_part` to `to_part`, as written in `.rels`.
pub fn relative(from_part: &str, to_part: &str) -> String {
    let from_dir: Vec<&str> = match from_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to: Vec<&str> = to_part.split('/').collect();

    let common = from_dir
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();
    // Never strip the file name itself.
    let common = common.min(to.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

/// Trailing number of a part's file name: `ppt/slides/slide12.xml` gives 12.
///
/// Used to order parts the way PowerPoint numbers them, so `slide10.xml`
/// sorts after `slide9.xml`.
pub fn part_number(part: &str) -> Option<usize> {
    let file = part.rsplit('/').next()?;
    let stem = file.split('.').next()?;
    let start = stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[start..].parse().ok()
}
