mod common;

use common::{DocxBuilder, SECT_PR, entry_names, p, read_entry};
use docxide_md::format::normalize;
use docxide_md::{DocumentConfig, Docx, Error};

#[test]
fn non_zip_input_is_rejected() {
    let err = Docx::from_bytes(b"this is not a zip archive").err().unwrap();
    assert!(matches!(err, Error::InvalidDocx(_)), "{err}");
}

#[test]
fn document_without_body_is_rejected() {
    let builder = DocxBuilder::new("");
    let bytes = builder.build();
    // Replace the main part with one that has no body.
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let opts = zip::write::SimpleFileOptions::default();
    for name in entry_names(&bytes) {
        let data = if name == "word/document.xml" {
            format!(r#"<w:document xmlns:w="{}"/>"#, common::W_NS).into_bytes()
        } else {
            read_entry(&bytes, &name).unwrap()
        };
        zip.start_file(name.as_str(), opts).unwrap();
        std::io::Write::write_all(&mut zip, &data).unwrap();
    }
    let bytes = zip.finish().unwrap().into_inner();

    let err = Docx::from_bytes(&bytes).err().unwrap();
    assert!(matches!(err, Error::InvalidDocx(_)), "{err}");
}

#[test]
fn unknown_entries_survive_byte_for_byte_in_order() {
    let custom = b"<custom>\n  keep   this\twhitespace </custom>".to_vec();
    let blob: Vec<u8> = (0..=255u8).collect();
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR))
        .entry("customXml/item1.xml", &custom)
        .entry("word/embeddings/blob.bin", &blob)
        .open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");

    let bytes = docx.to_bytes().unwrap();
    assert_eq!(read_entry(&bytes, "customXml/item1.xml").unwrap(), custom);
    assert_eq!(read_entry(&bytes, "word/embeddings/blob.bin").unwrap(), blob);

    let names = entry_names(&bytes);
    let pos = |n: &str| names.iter().position(|e| e == n).unwrap();
    assert!(pos("word/document.xml") < pos("customXml/item1.xml"));
    assert!(pos("customXml/item1.xml") < pos("word/embeddings/blob.bin"));
    assert_eq!(names[0], "[Content_Types].xml");
}

#[test]
fn namespace_declarations_and_unknown_markup_are_kept() {
    let body = format!(
        r#"<w:p><w:r><w:t>Body</w:t></w:r><w14:custom xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" w14:val="x"/></w:p>{SECT_PR}"#
    );
    let mut docx = DocxBuilder::new(body).open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");

    let xml = common::part_xml(&docx, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let custom = doc
        .descendants()
        .find(|n| n.tag_name().name() == "custom")
        .unwrap();
    assert_eq!(
        custom.tag_name().namespace(),
        Some("http://schemas.microsoft.com/office/word/2010/wordml")
    );
    assert_eq!(
        custom.attribute(("http://schemas.microsoft.com/office/word/2010/wordml", "val")),
        Some("x")
    );
    assert_eq!(doc.root_element().tag_name().namespace(), Some(common::W_NS));
}

#[test]
fn whitespace_in_preserved_text_survives() {
    let body = format!(
        r#"<w:p><w:r><w:t xml:space="preserve">  two  spaces </w:t></w:r></w:p>{SECT_PR}"#
    );
    let mut docx = DocxBuilder::new(body).open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");

    let xml = common::part_xml(&docx, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let t = common::w_all(doc.root_element(), "t")[0];
    assert_eq!(t.text(), Some("  two  spaces "));
}

#[test]
fn save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR)).open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");
    docx.save(&path).unwrap();

    let reopened = Docx::open(&path).unwrap();
    assert!(reopened.has_part("word/settings.xml"));
    assert!(reopened.body().is_some());
}

#[test]
fn opening_a_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Docx::open(&dir.path().join("absent.docx")).err().unwrap();
    assert!(matches!(err, Error::Io(_)), "{err}");
}
