mod common;

use common::{DocxBuilder, SECT_PR, W_NS, p, part_xml, w_all, w_attr, w_child};
use docxide_md::DocumentConfig;
use docxide_md::format::normalize;

fn footnotes_xml() -> String {
    format!(
        concat!(
            r#"<w:footnotes xmlns:w="{ns}">"#,
            r#"<w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>"#,
            r#"<w:footnote w:id="1"><w:p><w:pPr><w:pStyle w:val="FootnoteText"/><w:spacing w:before="480" w:after="480" w:line="480" w:lineRule="exact"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteRef/></w:r>"#,
            r#"<w:r><w:t xml:space="preserve"> First note.</w:t></w:r></w:p></w:footnote>"#,
            r#"<w:footnote w:id="2"><w:p><w:r><w:rPr><w:lang w:val="de-DE"/></w:rPr><w:t>Second</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>continued</w:t></w:r></w:p></w:footnote>"#,
            r#"</w:footnotes>"#
        ),
        ns = W_NS
    )
}

#[test]
fn footnote_paragraphs_get_single_spacing() {
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR))
        .footnotes(&footnotes_xml())
        .open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");

    let xml = part_xml(&docx, "word/footnotes.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let paras = w_all(doc.root_element(), "p");
    assert_eq!(paras.len(), 4);
    for para in paras {
        let ppr = w_child(para, "pPr").unwrap();
        let spacings = w_all(ppr, "spacing");
        assert_eq!(spacings.len(), 1);
        assert_eq!(w_attr(spacings[0], "before"), Some("0"));
        assert_eq!(w_attr(spacings[0], "after"), Some("0"));
        assert_eq!(w_attr(spacings[0], "line"), Some("240"));
        assert_eq!(w_attr(spacings[0], "lineRule"), Some("auto"));
    }
}

#[test]
fn every_footnote_run_carries_the_document_language() {
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR))
        .footnotes(&footnotes_xml())
        .open();
    let config = DocumentConfig {
        language: "da-DK".into(),
        ..DocumentConfig::default()
    };
    let report = normalize(&mut docx, &config, "Title");
    assert_eq!(report.footnote_runs_tagged, 5);

    let xml = part_xml(&docx, "word/footnotes.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    for run in w_all(doc.root_element(), "r") {
        let langs = w_all(run, "lang");
        assert_eq!(langs.len(), 1);
        assert_eq!(w_attr(langs[0], "val"), Some("da-DK"));
    }

    // The reference mark keeps its character style ahead of the language tag.
    let reference = w_all(doc.root_element(), "r")[1];
    let rpr = w_child(reference, "rPr").unwrap();
    assert_eq!(common::child_names(rpr), ["rStyle", "lang"]);
    assert!(w_child(reference, "footnoteRef").is_some());
}

#[test]
fn footnote_text_is_untouched() {
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR))
        .footnotes(&footnotes_xml())
        .open();
    normalize(&mut docx, &DocumentConfig::default(), "Title");

    let xml = part_xml(&docx, "word/footnotes.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let texts: Vec<&str> = w_all(doc.root_element(), "t")
        .into_iter()
        .filter_map(|t| t.text())
        .collect();
    assert_eq!(texts, [" First note.", "Second", "continued"]);
}

#[test]
fn document_without_footnotes_is_fine() {
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR)).open();
    let report = normalize(&mut docx, &DocumentConfig::default(), "Title");
    assert_eq!(report.footnote_runs_tagged, 0);
    assert!(!docx.has_part("word/footnotes.xml"));
}

#[test]
fn wrapped_footnote_runs_are_tagged_too() {
    let footnotes = format!(
        concat!(
            r#"<w:footnotes xmlns:w="{ns}"><w:footnote w:id="1"><w:p>"#,
            r#"<w:ins w:id="7" w:author="A"><w:r><w:t>inserted</w:t></w:r></w:ins>"#,
            r#"<w:smartTag w:element="place"><w:r><w:t>Oslo</w:t></w:r></w:smartTag>"#,
            r#"<w:fldSimple w:instr="PAGE"><w:r><w:t>1</w:t></w:r></w:fldSimple>"#,
            r#"<w:r><w:t>plain</w:t></w:r>"#,
            r#"</w:p></w:footnote></w:footnotes>"#
        ),
        ns = W_NS
    );
    let mut docx = DocxBuilder::new(format!("{}{}", p("Body"), SECT_PR))
        .footnotes(&footnotes)
        .open();
    let config = DocumentConfig {
        language: "nb-NO".into(),
        ..DocumentConfig::default()
    };
    let report = normalize(&mut docx, &config, "Title");
    assert_eq!(report.footnote_runs_tagged, 4);

    let xml = part_xml(&docx, "word/footnotes.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let runs = w_all(doc.root_element(), "r");
    assert_eq!(runs.len(), 4);
    for run in runs {
        let langs = w_all(run, "lang");
        assert_eq!(langs.len(), 1);
        assert_eq!(w_attr(langs[0], "val"), Some("nb-NO"));
    }
}
