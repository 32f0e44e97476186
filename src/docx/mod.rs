mod styles;
pub mod wml;
pub mod xml;

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use crate::error::Error;

pub use styles::StyleTable;
pub(crate) use styles::find_style_mut;
pub use wml::{
    Paragraph, Run, Section, TableCell, for_each_section, for_each_table_cell, paragraph_style_id,
    paragraph_text,
};
pub use xml::{Element, Node};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(crate) const REL_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const WPD_NS: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub(crate) const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_TYPE_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_TYPE_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

fn is_footer_part(name: &str) -> bool {
    name.strip_prefix("word/footer")
        .is_some_and(|rest| rest.ends_with(".xml") && !rest.contains('/'))
}

fn is_xml_part_we_edit(name: &str) -> bool {
    matches!(
        name,
        DOCUMENT_PART
            | STYLES_PART
            | SETTINGS_PART
            | FOOTNOTES_PART
            | DOCUMENT_RELS_PART
            | CONTENT_TYPES_PART
    ) || is_footer_part(name)
}

/// Resolve a relationship target relative to `word/`.
fn part_name_for_target(target: &str) -> String {
    target
        .strip_prefix('/')
        .map(String::from)
        .unwrap_or_else(|| format!("word/{}", target))
}

/// An opened `.docx` package. Every ZIP entry is kept in archive order; the XML
/// parts the formatter rewrites are held parsed and re-serialized on save.
pub struct Docx {
    entries: Vec<(String, Vec<u8>)>,
    parts: BTreeMap<String, Element>,
}

impl Docx {
    pub fn open(path: &Path) -> Result<Docx, Error> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        Self::read(file)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Docx, Error> {
        Self::read(Cursor::new(data))
    }

    fn read<R: Read + Seek>(reader: R) -> Result<Docx, Error> {
        let mut zip = zip::ZipArchive::new(reader)
            .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;

        let mut entries = Vec::with_capacity(zip.len());
        let mut parts = BTreeMap::new();
        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            if is_xml_part_we_edit(&name) {
                let text = std::str::from_utf8(&data)
                    .map_err(|_| Error::InvalidDocx(format!("{name} is not UTF-8")))?;
                parts.insert(name.clone(), Element::parse(text.trim_start_matches('\u{feff}'))?);
            }
            entries.push((name, data));
        }

        let document = parts.get(DOCUMENT_PART).ok_or_else(|| {
            Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into())
        })?;
        if document.child("w:body").is_none() {
            return Err(Error::InvalidDocx("Missing w:body".into()));
        }
        if !parts.contains_key(CONTENT_TYPES_PART) {
            return Err(Error::InvalidDocx("missing [Content_Types].xml".into()));
        }

        log::debug!(
            "Opened package: {} entries, {} editable parts",
            entries.len(),
            parts.len()
        );
        Ok(Docx { entries, parts })
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        Ok(())
    }

    /// Media entries are STORED, everything else DEFLATED.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let opts = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), opts)?;
            match self.parts.get(name) {
                Some(root) => zip.write_all(root.to_xml().as_bytes())?,
                None => zip.write_all(data)?,
            }
        }
        Ok(zip.finish()?.into_inner())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn part(&self, name: &str) -> Option<&Element> {
        self.parts.get(name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.parts.get_mut(name)
    }

    pub fn document(&self) -> Option<&Element> {
        self.part(DOCUMENT_PART)
    }

    pub fn body(&self) -> Option<&Element> {
        self.document().and_then(|d| d.child("w:body"))
    }

    pub fn body_mut(&mut self) -> Option<&mut Element> {
        self.part_mut(DOCUMENT_PART)
            .and_then(|d| d.child_mut("w:body"))
    }

    pub fn styles_mut(&mut self) -> Option<&mut Element> {
        self.part_mut(STYLES_PART)
    }

    pub fn style_table(&self) -> StyleTable {
        self.part(STYLES_PART)
            .map(StyleTable::from_styles)
            .unwrap_or_default()
    }

    pub fn footnotes_mut(&mut self) -> Option<&mut Element> {
        self.part_mut(FOOTNOTES_PART)
    }

    pub fn relationship_target(&self, rel_id: &str) -> Option<&str> {
        self.part(DOCUMENT_RELS_PART)?
            .children_named("Relationship")
            .find(|r| r.attr("Id") == Some(rel_id))
            .and_then(|r| r.attr("Target"))
    }

    /// Part name (`word/footer1.xml`) behind a document relationship id.
    pub fn part_name_for_rel(&self, rel_id: &str) -> Option<String> {
        self.relationship_target(rel_id).map(part_name_for_target)
    }

    fn add_relationship(&mut self, rel_type: &str, target: &str) -> String {
        let rels = self
            .parts
            .entry(DOCUMENT_RELS_PART.to_string())
            .or_insert_with(|| Element::new("Relationships").with_attr("xmlns", PKG_REL_NS));
        let mut n = rels.children_named("Relationship").count() + 1;
        let mut id = format!("rId{n}");
        while rels
            .children_named("Relationship")
            .any(|r| r.attr("Id") == Some(id.as_str()))
        {
            n += 1;
            id = format!("rId{n}");
        }
        rels.push(
            Element::new("Relationship")
                .with_attr("Id", id.as_str())
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        if !self.has_part(DOCUMENT_RELS_PART) {
            self.entries.push((DOCUMENT_RELS_PART.to_string(), Vec::new()));
        }
        id
    }

    fn content_types_mut(&mut self) -> &mut Element {
        self.parts
            .entry(CONTENT_TYPES_PART.to_string())
            .or_insert_with(|| Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS))
    }

    fn add_override(&mut self, part_name: &str, content_type: &str) {
        let part = format!("/{part_name}");
        let types = self.content_types_mut();
        types.children.retain(|n| {
            !matches!(n, Node::Element(e) if e.is("Override") && e.attr("PartName") == Some(part.as_str()))
        });
        types.push(
            Element::new("Override")
                .with_attr("PartName", part)
                .with_attr("ContentType", content_type),
        );
    }

    fn ensure_default(&mut self, extension: &str, content_type: &str) {
        let types = self.content_types_mut();
        let known = types
            .children_named("Default")
            .any(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(extension)));
        if !known {
            let default = Element::new("Default")
                .with_attr("Extension", extension)
                .with_attr("ContentType", content_type);
            types.insert_ordered(default, &["Default", "Override"]);
        }
    }

    fn add_xml_part(&mut self, name: &str, root: Element, content_type: &str) {
        self.entries.push((name.to_string(), Vec::new()));
        self.parts.insert(name.to_string(), root);
        self.add_override(name, content_type);
    }

    fn free_part_name(&self, prefix: &str, ext: &str) -> (u32, String) {
        let mut n = 1;
        loop {
            let name = format!("{prefix}{n}.{ext}");
            if !self.has_part(&name) {
                return (n, name);
            }
            n += 1;
        }
    }

    /// Creates an empty `word/footerN.xml` and returns its relationship id.
    pub fn create_footer_part(&mut self) -> String {
        let (_, name) = self.free_part_name("word/footer", "xml");
        let root = Element::new("w:ftr")
            .with_attr("xmlns:w", WML_NS)
            .with_attr("xmlns:r", REL_NS);
        self.add_xml_part(&name, root, FOOTER_CONTENT_TYPE);
        let target = name.trim_start_matches("word/").to_string();
        log::debug!("Created footer part {name}");
        self.add_relationship(REL_TYPE_FOOTER, &target)
    }

    /// The settings part, created (and wired up) when the package has none.
    pub fn settings_mut(&mut self) -> &mut Element {
        if !self.parts.contains_key(SETTINGS_PART) {
            let root = Element::new("w:settings").with_attr("xmlns:w", WML_NS);
            self.add_xml_part(SETTINGS_PART, root, SETTINGS_CONTENT_TYPE);
            self.add_relationship(REL_TYPE_SETTINGS, "settings.xml");
        }
        self.parts
            .entry(SETTINGS_PART.to_string())
            .or_insert_with(|| Element::new("w:settings").with_attr("xmlns:w", WML_NS))
    }

    /// Stores image bytes under `word/media/` and returns the new relationship id.
    pub fn add_media(&mut self, data: Vec<u8>, extension: &str, content_type: &str) -> String {
        let (_, name) = self.free_part_name("word/media/image", extension);
        self.entries.push((name.clone(), data));
        self.ensure_default(extension, content_type);
        let target = name.trim_start_matches("word/").to_string();
        self.add_relationship(REL_TYPE_IMAGE, &target)
    }

    /// One past the largest `wp:docPr` id in the main document, or the lowest
    /// free id once the largest is `u32::MAX`.
    pub fn next_drawing_id(&self) -> u32 {
        let mut doc_prs = Vec::new();
        if let Some(doc) = self.document() {
            doc.descendants_named("wp:docPr", &mut doc_prs);
        }
        let mut ids: Vec<u32> = doc_prs
            .iter()
            .filter_map(|d| d.attr("id").and_then(|v| v.parse::<u32>().ok()))
            .collect();
        let Some(max) = ids.iter().copied().max() else {
            return 1;
        };
        if let Some(next) = max.checked_add(1) {
            return next;
        }
        ids.sort_unstable();
        ids.dedup();
        let mut candidate = 1;
        for id in ids {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        candidate
    }
}
