//! Odd/even running footers with a page number on the outer margin.

use std::collections::HashSet;

use crate::config::{DocumentConfig, FOOTER_FONT_SIZE};
use crate::docx::wml::SETTINGS_ORDER;
use crate::docx::{Docx, Element, Node, Paragraph, for_each_section};
use crate::model::{Alignment, FooterKind};

use super::field::insert_page_field;

const FOOTER_SPACE_BEFORE: f32 = 12.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FooterSpec {
    pub odd_text: String,
    pub even_text: String,
    pub font: String,
    pub size: f32,
}

impl FooterSpec {
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self {
            odd_text: config.footer_text.odd.clone(),
            even_text: config.footer_text.even.clone(),
            font: config.font_name.clone(),
            size: FOOTER_FONT_SIZE,
        }
    }
}

/// First paragraph of a footer part, created when the footer is empty.
fn first_paragraph(ftr: &mut Element) -> &mut Element {
    let existing = ftr
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.is("w:p")));
    match existing {
        Some(idx) => match &mut ftr.children[idx] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("position points at an element"),
        },
        None => ftr.push(Element::new("w:p")),
    }
}

fn write_literal(p: &mut Paragraph<'_>, text: &str, spec: &FooterSpec) {
    let mut run = p.add_text_run(text);
    run.set_font(&spec.font);
    run.set_size(spec.size);
}

/// Odd pages: `"{odd} | "` then the page number, right aligned.
pub fn compose_odd_footer(ftr: &mut Element, spec: &FooterSpec) {
    let mut p = Paragraph::new(first_paragraph(ftr));
    p.clear();
    p.set_alignment(Alignment::Right);
    p.set_space_before(FOOTER_SPACE_BEFORE);
    write_literal(&mut p, &format!("{} | ", spec.odd_text), spec);
    insert_page_field(&mut p);
}

/// Even pages: the page number then `" | {even}"`, left aligned.
pub fn compose_even_footer(ftr: &mut Element, spec: &FooterSpec) {
    let mut p = Paragraph::new(first_paragraph(ftr));
    p.clear();
    p.set_alignment(Alignment::Left);
    p.set_space_before(FOOTER_SPACE_BEFORE);
    insert_page_field(&mut p);
    write_literal(&mut p, &format!(" | {}", spec.even_text), spec);
}

/// Turns on odd/even header and footer variance for the whole document.
fn ensure_even_and_odd_headers(docx: &mut Docx) -> bool {
    let settings = docx.settings_mut();
    if settings.child("w:evenAndOddHeaders").is_some() {
        return false;
    }
    settings.insert_ordered(Element::new("w:evenAndOddHeaders"), SETTINGS_ORDER);
    true
}

struct SectionFooters {
    odd: Option<String>,
    even: Option<String>,
}

/// Gives every section a distinct first page and populated odd and even footers.
/// Returns the number of sections composed.
pub fn compose_footers(docx: &mut Docx, spec: &FooterSpec) -> usize {
    let Some(body) = docx.body_mut() else {
        return 0;
    };
    let mut sections = Vec::new();
    for_each_section(body, |mut section| {
        if section.ensure_title_page() {
            log::debug!("Added w:titlePg to section {}", sections.len());
        }
        sections.push(SectionFooters {
            odd: section.footer_reference(FooterKind::Default).map(String::from),
            even: section.footer_reference(FooterKind::Even).map(String::from),
        });
    });
    if ensure_even_and_odd_headers(docx) {
        log::debug!("Enabled w:evenAndOddHeaders in settings");
    }

    // Every slot ends up with a part nobody else points at: missing or dangling
    // references and repeat uses of an already claimed part get a new one.
    let mut claimed = HashSet::new();
    for footers in &mut sections {
        for slot in [&mut footers.odd, &mut footers.even] {
            let existing = slot
                .as_deref()
                .and_then(|id| docx.part_name_for_rel(id))
                .filter(|name| docx.part(name).is_some());
            match existing {
                Some(name) if claimed.insert(name.clone()) => {}
                Some(name) => {
                    let id = docx.create_footer_part();
                    log::debug!("{name} is shared between footers, split off as {id}");
                    *slot = Some(id);
                }
                None => *slot = Some(docx.create_footer_part()),
            }
        }
    }

    if let Some(body) = docx.body_mut() {
        let mut idx = 0;
        for_each_section(body, |mut section| {
            if let Some(footers) = sections.get(idx) {
                if let Some(id) = &footers.odd {
                    section.set_footer_reference(FooterKind::Default, id);
                }
                if let Some(id) = &footers.even {
                    section.set_footer_reference(FooterKind::Even, id);
                }
            }
            idx += 1;
        });
    }

    for footers in &sections {
        if let Some(ftr) = footer_part(docx, footers.odd.as_deref()) {
            compose_odd_footer(ftr, spec);
        }
        if let Some(ftr) = footer_part(docx, footers.even.as_deref()) {
            compose_even_footer(ftr, spec);
        }
    }
    sections.len()
}

fn footer_part<'a>(docx: &'a mut Docx, rel_id: Option<&str>) -> Option<&'a mut Element> {
    let name = docx.part_name_for_rel(rel_id?)?;
    docx.part_mut(&name)
}
