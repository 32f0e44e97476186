#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use docxide_md::Docx;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const WP_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";

pub const SECT_PR: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#;

/// Style table shaped like pandoc's reference.docx: built-in names in lower case,
/// headings based on Normal and carrying outline numbering.
pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="BodyText"><w:name w:val="Body Text"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="BodyText"/><w:qFormat/><w:pPr><w:keepNext/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:ilvl w:val="1"/><w:numId w:val="1"/></w:numPr></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="FootnoteText"><w:name w:val="footnote text"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="character" w:styleId="FootnoteReference"><w:name w:val="footnote reference"/><w:rPr><w:lang w:val="fr-FR"/></w:rPr></w:style>
</w:styles>"#;

pub fn p(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

pub fn p_styled(style_id: &str, text: &str) -> String {
    format!(r#"<w:p><w:pPr><w:pStyle w:val="{style_id}"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#)
}

/// Assembles a minimal `.docx` in memory.
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    settings: Option<String>,
    footnotes: Option<String>,
    /// (relationship id, part name, xml)
    footers: Vec<(String, String, String)>,
    extra: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            styles: Some(STYLES_XML.to_string()),
            settings: None,
            footnotes: None,
            footers: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn styles(mut self, xml: Option<&str>) -> Self {
        self.styles = xml.map(String::from);
        self
    }

    pub fn settings(mut self, xml: &str) -> Self {
        self.settings = Some(xml.to_string());
        self
    }

    pub fn footnotes(mut self, xml: &str) -> Self {
        self.footnotes = Some(xml.to_string());
        self
    }

    pub fn footer(mut self, rel_id: &str, part_name: &str, xml: &str) -> Self {
        self.footers
            .push((rel_id.into(), part_name.into(), xml.into()));
        self
    }

    pub fn entry(mut self, name: &str, data: &[u8]) -> Self {
        self.extra.push((name.into(), data.to_vec()));
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{}</w:body></w:document>"#,
            self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut overrides = vec![(
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        )];
        let mut rels = Vec::new();
        if self.styles.is_some() {
            overrides.push((
                "/word/styles.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
            ));
            rels.push(("rId1".to_string(), "styles", "styles.xml".to_string()));
        }
        if self.settings.is_some() {
            overrides.push((
                "/word/settings.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml",
            ));
            rels.push(("rId2".to_string(), "settings", "settings.xml".to_string()));
        }
        if self.footnotes.is_some() {
            overrides.push((
                "/word/footnotes.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml",
            ));
            rels.push(("rId3".to_string(), "footnotes", "footnotes.xml".to_string()));
        }
        let footer_overrides: Vec<String> = self
            .footers
            .iter()
            .map(|(_, name, _)| format!("/{name}"))
            .collect();
        for name in &footer_overrides {
            overrides.push((
                name.as_str(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml",
            ));
        }
        for (id, name, _) in &self.footers {
            rels.push((
                id.clone(),
                "footer",
                name.trim_start_matches("word/").to_string(),
            ));
        }

        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        for (part, ct) in &overrides {
            content_types.push_str(&format!(r#"<Override PartName="{part}" ContentType="{ct}"/>"#));
        }
        content_types.push_str("</Types>");

        let mut doc_rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, kind, target) in &rels {
            doc_rels.push_str(&format!(
                r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{kind}" Target="{target}"/>"#
            ));
        }
        doc_rels.push_str("</Relationships>");

        let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let opts = zip::write::SimpleFileOptions::default();
        let mut add = |name: &str, data: &[u8]| {
            zip.start_file(name, opts).unwrap();
            zip.write_all(data).unwrap();
        };
        add("[Content_Types].xml", content_types.as_bytes());
        add("_rels/.rels", root_rels.as_bytes());
        add("word/document.xml", self.document_xml().as_bytes());
        add("word/_rels/document.xml.rels", doc_rels.as_bytes());
        if let Some(styles) = &self.styles {
            add("word/styles.xml", styles.as_bytes());
        }
        if let Some(settings) = &self.settings {
            add("word/settings.xml", settings.as_bytes());
        }
        if let Some(footnotes) = &self.footnotes {
            add("word/footnotes.xml", footnotes.as_bytes());
        }
        for (_, name, xml) in &self.footers {
            add(name, xml.as_bytes());
        }
        for (name, data) in &self.extra {
            add(name, data);
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn open(&self) -> Docx {
        Docx::from_bytes(&self.build()).expect("builder output is a valid package")
    }
}

pub fn entry_names(package: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    zip.file_names().map(String::from).collect::<Vec<_>>()
}

pub fn read_entry(package: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(package)).unwrap();
    let mut entry = zip.by_name(name).ok()?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Serialized XML of `name` after saving the package.
pub fn part_xml(docx: &Docx, name: &str) -> String {
    let bytes = docx.to_bytes().expect("package serializes");
    let data = read_entry(&bytes, name).unwrap_or_else(|| panic!("{name} missing"));
    String::from_utf8(data).unwrap()
}

pub fn is_w(node: roxmltree::Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local && node.tag_name().namespace() == Some(W_NS)
}

/// Every `w:<local>` element below (and including) `node`, in document order.
pub fn w_all<'a, 'i>(node: roxmltree::Node<'a, 'i>, local: &str) -> Vec<roxmltree::Node<'a, 'i>> {
    node.descendants().filter(|n| is_w(*n, local)).collect()
}

/// Direct `w:<local>` children of `node`.
pub fn w_children<'a, 'i>(
    node: roxmltree::Node<'a, 'i>,
    local: &str,
) -> Vec<roxmltree::Node<'a, 'i>> {
    node.children().filter(|n| is_w(*n, local)).collect()
}

pub fn w_child<'a, 'i>(node: roxmltree::Node<'a, 'i>, local: &str) -> Option<roxmltree::Node<'a, 'i>> {
    node.children().find(|n| is_w(*n, local))
}

pub fn w_attr<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((W_NS, name))
}

/// `w:val` of the direct child `w:<local>`.
pub fn child_val<'a>(node: roxmltree::Node<'a, '_>, local: &str) -> Option<&'a str> {
    w_child(node, local).and_then(|c| w_attr(c, "val"))
}

pub fn text_of(node: roxmltree::Node) -> String {
    w_all(node, "t")
        .into_iter()
        .filter_map(|t| t.text())
        .collect()
}

pub fn body_paragraphs<'a, 'i>(doc: &'a roxmltree::Document<'i>) -> Vec<roxmltree::Node<'a, 'i>> {
    let body = w_all(doc.root_element(), "body")[0];
    w_children(body, "p")
}

pub fn child_names(node: roxmltree::Node) -> Vec<String> {
    node.children()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name().to_string())
        .collect()
}
