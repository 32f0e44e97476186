//! The formatting engine: rewrites a converter-produced document in place.
//!
//! `normalize` runs the stages of [`Stage::PIPELINE`] in order over one package.
//! Styles come first because the paragraph passes resolve style names through the
//! rewritten style table; footers come last. `resolve_images` is a separate second
//! pass over the normalized document.

pub mod borders;
pub mod field;
pub mod footer;
pub mod images;
pub mod lang;
pub mod styles;

use crate::config::{
    DocumentConfig, PARAGRAPH_SPACING, TABLE_CELL_SPACING, TABLE_FONT_SIZE, TITLE_SIZE,
};
use crate::docx::{
    Docx, FOOTNOTES_PART, Node, Paragraph, Run, Section, for_each_section,
    for_each_table_cell, paragraph_style_id, paragraph_text,
};
use crate::model::Spacing;

pub use borders::apply_cell_borders;
pub use field::insert_page_field;
pub use footer::{FooterSpec, compose_footers};
pub use images::{ImageReport, MAX_IMAGE_WIDTH, PLACEHOLDER, resolve_images};
pub use lang::set_language;
pub use styles::{StyleSpec, apply_styles, set_document_language, style_specs};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Paper size and margins on every section.
    PageSetup,
    /// Named styles and the document default language.
    Styles,
    /// First title paragraph restyled, later copies removed.
    TitleDedup,
    /// Normal paragraphs: spacing, fallback font and size, language.
    BodyParagraphs,
    /// Cell formatting, header emphasis, borders.
    Tables,
    /// Footnote paragraph spacing and language.
    Footnotes,
    /// Odd/even footers with page numbers.
    Footers,
}

impl Stage {
    pub const PIPELINE: [Stage; 7] = [
        Stage::PageSetup,
        Stage::Styles,
        Stage::TitleDedup,
        Stage::BodyParagraphs,
        Stage::Tables,
        Stage::Footnotes,
        Stage::Footers,
    ];
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NormalizeReport {
    pub sections_set_up: usize,
    pub missing_styles: Vec<String>,
    pub title_found: bool,
    pub duplicate_titles_removed: usize,
    pub paragraphs_formatted: usize,
    pub cells_formatted: usize,
    pub footnote_runs_tagged: usize,
    pub footers_composed: usize,
}

/// Runs every stage over the document. Missing styles, a missing footnotes part
/// and similar gaps are logged and recorded in the report; nothing here fails.
pub fn normalize(docx: &mut Docx, config: &DocumentConfig, title: &str) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for stage in Stage::PIPELINE {
        log::debug!("Stage {stage:?}");
        run_stage(stage, docx, config, title, &mut report);
    }
    log::info!(
        "Normalized: {} paragraphs, {} table cells, {} footnote runs, {} sections",
        report.paragraphs_formatted,
        report.cells_formatted,
        report.footnote_runs_tagged,
        report.footers_composed
    );
    report
}

pub fn run_stage(
    stage: Stage,
    docx: &mut Docx,
    config: &DocumentConfig,
    title: &str,
    report: &mut NormalizeReport,
) {
    match stage {
        Stage::PageSetup => report.sections_set_up = page_setup(docx, config),
        Stage::Styles => report.missing_styles = global_styles(docx, config),
        Stage::TitleDedup => {
            let (found, removed) = dedup_title(docx, config, title);
            report.title_found = found;
            report.duplicate_titles_removed = removed;
        }
        Stage::BodyParagraphs => report.paragraphs_formatted = body_paragraphs(docx, config),
        Stage::Tables => report.cells_formatted = tables(docx, config),
        Stage::Footnotes => report.footnote_runs_tagged = footnotes(docx, config),
        Stage::Footers => {
            report.footers_composed = compose_footers(docx, &FooterSpec::from_config(config))
        }
    }
}

fn page_setup(docx: &mut Docx, config: &DocumentConfig) -> usize {
    let Some(body) = docx.body_mut() else {
        return 0;
    };
    let (width, height) = config.paper_size.twips();
    let margins = config.margins_twips();
    let mut count = 0;
    for_each_section(body, |mut section: Section<'_>| {
        section.set_page_size(width, height);
        section.set_margins(margins);
        count += 1;
    });
    count
}

fn global_styles(docx: &mut Docx, config: &DocumentConfig) -> Vec<String> {
    let specs = style_specs(config);
    let Some(styles) = docx.styles_mut() else {
        log::warn!("Document has no style table");
        return specs.iter().map(|s| s.name.to_string()).collect();
    };
    set_document_language(styles, &config.language);
    apply_styles(styles, &specs, &config.language)
}

/// Restyles the first paragraph whose text equals `title` and removes later copies.
/// Returns whether a match was found and how many copies went.
fn dedup_title(docx: &mut Docx, config: &DocumentConfig, title: &str) -> (bool, usize) {
    let title_style = docx
        .style_table()
        .id_for("Title")
        .unwrap_or("Title")
        .to_string();
    let Some(body) = docx.body_mut() else {
        return (false, 0);
    };

    let matches: Vec<usize> = body
        .children
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| match node {
            Node::Element(p) if p.is("w:p") && paragraph_text(p) == title => Some(idx),
            _ => None,
        })
        .collect();
    let Some((&first, duplicates)) = matches.split_first() else {
        log::debug!("No paragraph matches the title {title:?}");
        return (false, 0);
    };

    if let Some(Node::Element(p)) = body.children.get_mut(first) {
        let mut p = Paragraph::new(p);
        p.set_style(&title_style);
        p.clear();
        let mut run = p.add_text_run(title);
        run.set_font(&config.font_name);
        run.set_size(TITLE_SIZE);
        run.set_bold(true);
    }
    for &idx in duplicates.iter().rev() {
        body.children.remove(idx);
    }
    if !duplicates.is_empty() {
        log::info!("Removed {} duplicate title paragraphs", duplicates.len());
    }
    (true, duplicates.len())
}

fn tag_run(run: &mut Run<'_>, lang: &str) {
    set_language(run.properties(), lang);
}

fn body_paragraphs(docx: &mut Docx, config: &DocumentConfig) -> usize {
    let table = docx.style_table();
    let normal_style = table.id_for("Normal").unwrap_or("Normal").to_string();
    let Some(body) = docx.body_mut() else {
        return 0;
    };
    let spacing = Spacing::new(PARAGRAPH_SPACING, PARAGRAPH_SPACING, config.line_spacing);

    let mut count = 0;
    for p in body.elements_mut().filter(|e| e.is("w:p")) {
        if !table.is_normal(paragraph_style_id(p)) {
            continue;
        }
        let mut p = Paragraph::new(p);
        p.set_style(&normal_style);
        p.set_spacing(spacing);
        p.for_each_run(|mut run| {
            if !run.has_font() {
                run.set_font(&config.font_name);
            }
            if !run.has_size() {
                run.set_size(config.base_font_size);
            }
            tag_run(&mut run, &config.language);
        });
        count += 1;
    }
    count
}

fn format_cell_paragraph(p: &mut Paragraph<'_>, config: &DocumentConfig, header: bool) {
    if p.run_count() == 0 {
        p.add_run();
    }
    p.for_each_run(|mut run| {
        run.set_font(&config.font_name);
        run.set_size(TABLE_FONT_SIZE);
        if header {
            run.set_bold(true);
        }
        tag_run(&mut run, &config.language);
    });
    p.set_spacing(Spacing::new(TABLE_CELL_SPACING, TABLE_CELL_SPACING, 1.0));
}

/// Top-level tables only; row 0 is the header row.
fn tables(docx: &mut Docx, config: &DocumentConfig) -> usize {
    let Some(body) = docx.body_mut() else {
        return 0;
    };
    let mut count = 0;
    for tbl in body.elements_mut().filter(|e| e.is("w:tbl")) {
        for_each_table_cell(tbl, |row, mut cell| {
            cell.for_each_paragraph(|mut p| format_cell_paragraph(&mut p, config, row == 0));
            apply_cell_borders(&mut cell);
            count += 1;
        });
    }
    count
}

fn footnotes(docx: &mut Docx, config: &DocumentConfig) -> usize {
    let Some(footnotes) = docx.footnotes_mut() else {
        log::debug!("No {FOOTNOTES_PART} in package");
        return 0;
    };
    let spacing = Spacing::new(0.0, 0.0, 1.0);
    let mut tagged = 0;
    footnotes.visit_mut("w:footnote", &mut |footnote| {
        footnote.visit_mut("w:p", &mut |p| {
            let mut p = Paragraph::new(p);
            p.properties().remove_children("w:spacing");
            p.set_spacing(spacing);
            p.for_each_nested_run(|mut run| {
                tag_run(&mut run, &config.language);
                tagged += 1;
            });
        });
    });
    tagged
}
