//! Typed views over WordprocessingML elements: the subset of the document model the
//! formatting stages work with. Element names assume the conventional `w:` prefix.

use crate::model::{Alignment, FooterKind, Spacing};

use super::xml::{Element, Node};

pub(crate) const RPR_ORDER: &[&str] = &[
    "w:rStyle", "w:rFonts", "w:b", "w:bCs", "w:i", "w:iCs", "w:caps", "w:smallCaps",
    "w:strike", "w:dstrike", "w:outline", "w:shadow", "w:emboss", "w:imprint", "w:noProof",
    "w:snapToGrid", "w:vanish", "w:webHidden", "w:color", "w:spacing", "w:w", "w:kern",
    "w:position", "w:sz", "w:szCs", "w:highlight", "w:u", "w:effect", "w:bdr", "w:shd",
    "w:fitText", "w:vertAlign", "w:rtl", "w:cs", "w:em", "w:lang", "w:eastAsianLayout",
    "w:specVanish", "w:oMath", "w:rPrChange",
];

pub(crate) const PPR_ORDER: &[&str] = &[
    "w:pStyle", "w:keepNext", "w:keepLines", "w:pageBreakBefore", "w:framePr",
    "w:widowControl", "w:numPr", "w:suppressLineNumbers", "w:pBdr", "w:shd", "w:tabs",
    "w:suppressAutoHyphens", "w:kinsoku", "w:wordWrap", "w:overflowPunct", "w:topLinePunct",
    "w:autoSpaceDE", "w:autoSpaceDN", "w:bidi", "w:adjustRightInd", "w:snapToGrid",
    "w:spacing", "w:ind", "w:contextualSpacing", "w:mirrorIndents", "w:suppressOverlap",
    "w:jc", "w:textDirection", "w:textAlignment", "w:textboxTightWrap", "w:outlineLvl",
    "w:divId", "w:cnfStyle", "w:rPr", "w:sectPr", "w:pPrChange",
];

pub(crate) const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle", "w:tcW", "w:gridSpan", "w:hMerge", "w:vMerge", "w:tcBorders", "w:shd",
    "w:noWrap", "w:tcMar", "w:textDirection", "w:tcFitText", "w:vAlign", "w:hideMark",
    "w:headers", "w:cellIns", "w:cellDel", "w:cellMerge", "w:tcPrChange",
];

pub(crate) const SECTPR_ORDER: &[&str] = &[
    "w:headerReference", "w:footerReference", "w:footnotePr", "w:endnotePr", "w:type",
    "w:pgSz", "w:pgMar", "w:paperSrc", "w:pgBorders", "w:lnNumType", "w:pgNumType", "w:cols",
    "w:formProt", "w:vAlign", "w:noEndnote", "w:titlePg", "w:textDirection", "w:bidi",
    "w:rtlGutter", "w:docGrid", "w:printerSettings", "w:sectPrChange",
];

/// Tail of the `w:settings` sequence, from the odd/even header toggle onwards.
pub(crate) const SETTINGS_ORDER: &[&str] = &[
    "w:evenAndOddHeaders", "w:bookFoldRevPrinting", "w:bookFoldPrinting",
    "w:bookFoldPrintingSheets", "w:drawingGridHorizontalSpacing",
    "w:drawingGridVerticalSpacing", "w:displayHorizontalDrawingGridEvery",
    "w:displayVerticalDrawingGridEvery", "w:doNotUseMarginsForDrawingGridOrigin",
    "w:drawingGridHorizontalOrigin", "w:drawingGridVerticalOrigin", "w:doNotShadeFormData",
    "w:noPunctuationKerning", "w:characterSpacingControl", "w:printTwoOnOne",
    "w:strictFirstAndLastChars", "w:noLineBreaksAfter", "w:noLineBreaksBefore",
    "w:savePreviewPicture", "w:doNotValidateAgainstSchema", "w:saveInvalidXml",
    "w:ignoreMixedContent", "w:alwaysShowPlaceholderText", "w:doNotDemarcateInvalidXml",
    "w:saveXmlDataOnly", "w:useXSLTWhenSaving", "w:saveThroughXslt", "w:showXMLTags",
    "w:alwaysMergeEmptyNamespace", "w:updateFields", "w:hdrShapeDefaults", "w:footnotePr",
    "w:endnotePr", "w:compat", "w:docVars", "w:rsids", "m:mathPr", "w:attachedSchema",
    "w:themeFontLang", "w:clrSchemeMapping", "w:doNotIncludeSubdocsInStats",
    "w:doNotAutoCompressPictures", "w:forceUpgrade", "w:captions", "w:readModeInkLockDown",
    "w:smartTagType", "sl:schemaLibrary", "w:shapeDefaults", "w:doNotEmbedSmartTags",
    "w:decimalSymbol", "w:listSeparator",
];

pub(crate) const STYLE_ORDER: &[&str] = &[
    "w:name", "w:aliases", "w:basedOn", "w:next", "w:link", "w:autoRedefine", "w:hidden",
    "w:uiPriority", "w:semiHidden", "w:unhideWhenUsed", "w:qFormat", "w:locked",
    "w:personal", "w:personalCompose", "w:personalReply", "w:rsid", "w:pPr", "w:rPr",
    "w:tblPr", "w:trPr", "w:tcPr", "w:tblStylePr",
];

/// `w:pPr`, `w:rPr`, `w:tcPr` and friends always come first in their parent.
pub(crate) fn leading_props<'a>(parent: &'a mut Element, name: &str) -> &'a mut Element {
    let idx = match parent
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.is(name)))
    {
        Some(idx) => idx,
        None => {
            parent.children.insert(0, Node::Element(Element::new(name)));
            0
        }
    };
    match &mut parent.children[idx] {
        Node::Element(e) => e,
        Node::Text(_) => unreachable!("position points at an element"),
    }
}

fn val(name: &str, value: impl Into<String>) -> Element {
    Element::new(name).with_attr("w:val", value)
}

pub fn set_font(rpr: &mut Element, font: &str) {
    let fonts = rpr.get_or_insert_ordered("w:rFonts", RPR_ORDER);
    fonts.set_attr("w:ascii", font);
    fonts.set_attr("w:hAnsi", font);
}

pub fn set_size(rpr: &mut Element, pt: f32) {
    let half_points = (pt * 2.0).round() as u32;
    rpr.replace_ordered(val("w:sz", half_points.to_string()), RPR_ORDER);
}

pub fn set_bold(rpr: &mut Element, on: bool) {
    rpr.replace_ordered(val("w:b", if on { "1" } else { "0" }), RPR_ORDER);
}

pub fn set_italic(rpr: &mut Element, on: bool) {
    rpr.replace_ordered(val("w:i", if on { "1" } else { "0" }), RPR_ORDER);
}

pub fn set_color(rpr: &mut Element, rgb: [u8; 3]) {
    let hex = format!("{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]);
    rpr.replace_ordered(val("w:color", hex), RPR_ORDER);
}

pub fn set_superscript(rpr: &mut Element) {
    rpr.replace_ordered(val("w:vertAlign", "superscript"), RPR_ORDER);
}

/// Updates `w:spacing` in place, keeping attributes this call does not own.
pub fn set_spacing(ppr: &mut Element, spacing: Spacing) {
    let el = ppr.get_or_insert_ordered("w:spacing", PPR_ORDER);
    el.set_attr("w:before", twips(spacing.before).to_string());
    el.set_attr("w:after", twips(spacing.after).to_string());
    el.set_attr("w:line", ((spacing.line * 240.0).round() as i32).to_string());
    el.set_attr("w:lineRule", "auto");
}

/// Only `w:before`; after and line spacing are left as they are.
pub fn set_space_before(ppr: &mut Element, pt: f32) {
    ppr.get_or_insert_ordered("w:spacing", PPR_ORDER)
        .set_attr("w:before", twips(pt).to_string());
}

pub fn set_alignment(ppr: &mut Element, alignment: Alignment) {
    ppr.replace_ordered(val("w:jc", alignment.as_wml()), PPR_ORDER);
}

fn twips(pt: f32) -> i32 {
    (pt * 20.0).round() as i32
}

fn run_text(r: &Element) -> String {
    let mut text = String::new();
    for child in r.elements() {
        match child.name.as_str() {
            "w:t" => text.push_str(&child.text()),
            "w:tab" => text.push('\t'),
            "w:br" | "w:cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Concatenated run text, including runs wrapped in hyperlinks.
pub fn paragraph_text(p: &Element) -> String {
    let mut text = String::new();
    for child in p.elements() {
        match child.name.as_str() {
            "w:r" => text.push_str(&run_text(child)),
            "w:hyperlink" => {
                for r in child.children_named("w:r") {
                    text.push_str(&run_text(r));
                }
            }
            _ => {}
        }
    }
    text
}

pub fn paragraph_style_id(p: &Element) -> Option<&str> {
    p.child("w:pPr").and_then(|ppr| ppr.child_val("w:pStyle"))
}

pub struct Paragraph<'a>(&'a mut Element);

impl<'a> Paragraph<'a> {
    pub fn new(p: &'a mut Element) -> Self {
        Self(p)
    }

    pub fn properties(&mut self) -> &mut Element {
        leading_props(self.0, "w:pPr")
    }

    pub fn set_style(&mut self, style_id: &str) {
        self.properties()
            .replace_ordered(val("w:pStyle", style_id), PPR_ORDER);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        set_alignment(self.properties(), alignment);
    }

    pub fn set_spacing(&mut self, spacing: Spacing) {
        set_spacing(self.properties(), spacing);
    }

    pub fn set_space_before(&mut self, pt: f32) {
        set_space_before(self.properties(), pt);
    }

    /// Drops all content but keeps paragraph properties.
    pub fn clear(&mut self) {
        self.0
            .children
            .retain(|n| matches!(n, Node::Element(e) if e.is("w:pPr")));
    }

    pub fn add_run(&mut self) -> Run<'_> {
        Run(self.0.push(Element::new("w:r")))
    }

    pub fn add_text_run(&mut self, text: &str) -> Run<'_> {
        let mut run = self.add_run();
        run.set_text(text);
        run
    }

    /// Replaces the whole content with a single plain run.
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.add_text_run(text);
    }

    pub fn run_count(&self) -> usize {
        self.0
            .elements()
            .map(|c| match c.name.as_str() {
                "w:r" => 1,
                "w:hyperlink" => c.children_named("w:r").count(),
                _ => 0,
            })
            .sum()
    }

    pub fn for_each_run(&mut self, mut f: impl FnMut(Run<'_>)) {
        for child in self.0.elements_mut() {
            match child.name.as_str() {
                "w:r" => f(Run(child)),
                "w:hyperlink" => {
                    for r in child.elements_mut().filter(|e| e.is("w:r")) {
                        f(Run(r));
                    }
                }
                _ => {}
            }
        }
    }

    /// Every run under the paragraph, including runs nested in wrappers like `w:ins`.
    pub fn for_each_nested_run(&mut self, mut f: impl FnMut(Run<'_>)) {
        self.0.visit_mut("w:r", &mut |r| f(Run(r)));
    }
}

pub struct Run<'a>(&'a mut Element);

impl<'a> Run<'a> {
    pub fn properties(&mut self) -> &mut Element {
        leading_props(self.0, "w:rPr")
    }

    pub fn has_font(&self) -> bool {
        self.0
            .child("w:rPr")
            .is_some_and(|rpr| rpr.child("w:rFonts").is_some())
    }

    pub fn has_size(&self) -> bool {
        self.0
            .child("w:rPr")
            .is_some_and(|rpr| rpr.child("w:sz").is_some())
    }

    pub fn set_font(&mut self, font: &str) {
        set_font(self.properties(), font);
    }

    pub fn set_size(&mut self, pt: f32) {
        set_size(self.properties(), pt);
    }

    pub fn set_bold(&mut self, on: bool) {
        set_bold(self.properties(), on);
    }

    pub fn set_text(&mut self, text: &str) {
        self.0
            .children
            .retain(|n| matches!(n, Node::Element(e) if e.is("w:rPr")));
        let mut t = Element::new("w:t").with_text(text);
        if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
            t.set_attr("xml:space", "preserve");
        }
        self.0.push(t);
    }

    /// Appends a raw content node (field character, drawing, ...) after existing content.
    pub(crate) fn append(&mut self, node: Element) {
        self.0.push(node);
    }
}

/// A `w:tc`. Cell paragraphs are its direct `w:p` children.
pub struct TableCell<'a>(&'a mut Element);

impl<'a> TableCell<'a> {
    pub fn new(tc: &'a mut Element) -> Self {
        Self(tc)
    }

    pub fn properties(&mut self) -> &mut Element {
        leading_props(self.0, "w:tcPr")
    }

    pub fn for_each_paragraph(&mut self, mut f: impl FnMut(Paragraph<'_>)) {
        for p in self.0.elements_mut().filter(|e| e.is("w:p")) {
            f(Paragraph(p));
        }
    }
}

/// Visits every cell of a `w:tbl` together with its row index.
pub fn for_each_table_cell(tbl: &mut Element, mut f: impl FnMut(usize, TableCell<'_>)) {
    for (row_idx, tr) in tbl.elements_mut().filter(|e| e.is("w:tr")).enumerate() {
        for tc in tr.elements_mut().filter(|e| e.is("w:tc")) {
            f(row_idx, TableCell(tc));
        }
    }
}

/// A `w:sectPr`, either the body's trailing one or one carried by a paragraph.
pub struct Section<'a>(&'a mut Element);

impl<'a> Section<'a> {
    pub fn new(sect_pr: &'a mut Element) -> Self {
        Self(sect_pr)
    }

    pub fn footer_reference(&self, kind: FooterKind) -> Option<&str> {
        self.0
            .children_named("w:footerReference")
            .find(|f| f.attr("w:type").unwrap_or("default") == kind.as_wml())
            .and_then(|f| f.attr("r:id"))
    }

    pub fn set_footer_reference(&mut self, kind: FooterKind, rel_id: &str) {
        self.0.children.retain(|n| {
            !matches!(n, Node::Element(e) if e.is("w:footerReference")
                && e.attr("w:type").unwrap_or("default") == kind.as_wml())
        });
        let reference = Element::new("w:footerReference")
            .with_attr("w:type", kind.as_wml())
            .with_attr("r:id", rel_id);
        self.0.insert_ordered(reference, SECTPR_ORDER);
    }

    /// Inserts `w:titlePg` unless one is already present.
    pub fn ensure_title_page(&mut self) -> bool {
        if self.0.child("w:titlePg").is_some() {
            return false;
        }
        self.0.insert_ordered(Element::new("w:titlePg"), SECTPR_ORDER);
        true
    }

    /// Page size in twips.
    pub fn set_page_size(&mut self, width: u32, height: u32) {
        let pg_sz = self.0.get_or_insert_ordered("w:pgSz", SECTPR_ORDER);
        pg_sz.set_attr("w:w", width.to_string());
        pg_sz.set_attr("w:h", height.to_string());
    }

    /// Margins in twips, in top/right/bottom/left order.
    pub fn set_margins(&mut self, margins: [u32; 4]) {
        let pg_mar = self.0.get_or_insert_ordered("w:pgMar", SECTPR_ORDER);
        let [top, right, bottom, left] = margins;
        pg_mar.set_attr("w:top", top.to_string());
        pg_mar.set_attr("w:right", right.to_string());
        pg_mar.set_attr("w:bottom", bottom.to_string());
        pg_mar.set_attr("w:left", left.to_string());
    }
}

/// Visits every section of the body in document order: paragraph-level section
/// breaks first, the trailing body `w:sectPr` last.
pub fn for_each_section(body: &mut Element, mut f: impl FnMut(Section<'_>)) {
    for child in body.elements_mut() {
        match child.name.as_str() {
            "w:p" => {
                if let Some(sect_pr) = child
                    .child_mut("w:pPr")
                    .and_then(|ppr| ppr.child_mut("w:sectPr"))
                {
                    f(Section(sect_pr));
                }
            }
            "w:sectPr" => f(Section(child)),
            _ => {}
        }
    }
}
