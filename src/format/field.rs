//! Complex field characters for renderer-resolved values such as the page number.

use crate::docx::{Element, Paragraph};

/// One piece of a complex field. A field is a begin marker, its instruction, and an
/// end marker, appended in that order to the content of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldPart {
    Begin,
    Instruction(String),
    End,
}

impl FieldPart {
    fn to_element(&self) -> Element {
        match self {
            FieldPart::Begin => Element::new("w:fldChar").with_attr("w:fldCharType", "begin"),
            FieldPart::Instruction(text) => Element::new("w:instrText")
                .with_attr("xml:space", "preserve")
                .with_text(text.as_str()),
            FieldPart::End => Element::new("w:fldChar").with_attr("w:fldCharType", "end"),
        }
    }
}

pub fn field(instruction: &str) -> [FieldPart; 3] {
    [
        FieldPart::Begin,
        FieldPart::Instruction(instruction.to_string()),
        FieldPart::End,
    ]
}

/// Appends a fresh run carrying a `PAGE` field to the paragraph.
pub fn insert_page_field(paragraph: &mut Paragraph<'_>) {
    insert_field(paragraph, "PAGE");
}

pub fn insert_field(paragraph: &mut Paragraph<'_>, instruction: &str) {
    let mut run = paragraph.add_run();
    for part in field(instruction) {
        run.append(part.to_element());
    }
}
