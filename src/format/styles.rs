use crate::config::{
    DocumentConfig, FOOTNOTE_FONT_SIZE, HEADING_1_SIZE, HEADING_2_SIZE, HEADING_3_SIZE,
    TITLE_SIZE,
};
use crate::docx::wml::{self, STYLE_ORDER, leading_props};
use crate::docx::{Element, find_style_mut};
use crate::model::Spacing;

use super::lang::set_language;

/// Formatting contract for one named style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSpec {
    pub name: &'static str,
    pub font: String,
    pub size: f32,
    pub bold: Option<bool>,
    pub italic: bool,
    pub color: Option<[u8; 3]>,
    pub spacing: Option<Spacing>,
    pub superscript: bool,
    /// Drop `w:basedOn` and any `w:numPr`.
    pub detach: bool,
    /// Tag the style's run properties with the document language.
    pub language: bool,
}

impl StyleSpec {
    fn new(name: &'static str, font: &str, size: f32) -> Self {
        Self {
            name,
            font: font.to_string(),
            size,
            bold: None,
            italic: false,
            color: None,
            spacing: None,
            superscript: false,
            detach: false,
            language: false,
        }
    }

    fn heading(config: &DocumentConfig, level: usize, size: f32, before: f32, after: f32) -> Self {
        let name = match level {
            1 => "Heading 1",
            2 => "Heading 2",
            _ => "Heading 3",
        };
        Self {
            bold: Some(true),
            italic: level == 3,
            color: Some(config.heading_color(level)),
            spacing: Some(Spacing::new(before, after, 1.0)),
            detach: true,
            ..Self::new(name, &config.font_name, size)
        }
    }
}

/// The seven styles the normalizer owns, in the order they are applied.
pub fn style_specs(config: &DocumentConfig) -> Vec<StyleSpec> {
    let font = config.font_name.as_str();
    vec![
        StyleSpec {
            bold: Some(false),
            spacing: Some(Spacing::new(0.0, 0.0, config.line_spacing)),
            ..StyleSpec::new("Normal", font, config.base_font_size)
        },
        StyleSpec {
            bold: Some(true),
            spacing: Some(Spacing::new(12.0, 12.0, 1.0)),
            ..StyleSpec::new("Title", font, TITLE_SIZE)
        },
        StyleSpec::heading(config, 1, HEADING_1_SIZE, 18.0, 12.0),
        StyleSpec::heading(config, 2, HEADING_2_SIZE, 16.0, 10.0),
        StyleSpec::heading(config, 3, HEADING_3_SIZE, 14.0, 8.0),
        StyleSpec {
            spacing: Some(Spacing::new(0.0, 0.0, 1.0)),
            language: true,
            ..StyleSpec::new("Footnote Text", font, FOOTNOTE_FONT_SIZE)
        },
        StyleSpec {
            superscript: true,
            language: true,
            ..StyleSpec::new("Footnote Reference", font, FOOTNOTE_FONT_SIZE)
        },
    ]
}

fn apply_spec(style: &mut Element, spec: &StyleSpec, lang: &str) {
    if spec.detach {
        style.remove_children("w:basedOn");
        if let Some(ppr) = style.child_mut("w:pPr") {
            ppr.remove_children("w:numPr");
        }
    }
    if let Some(spacing) = spec.spacing {
        wml::set_spacing(style.get_or_insert_ordered("w:pPr", STYLE_ORDER), spacing);
    }

    let rpr = style.get_or_insert_ordered("w:rPr", STYLE_ORDER);
    wml::set_font(rpr, &spec.font);
    wml::set_size(rpr, spec.size);
    if let Some(bold) = spec.bold {
        wml::set_bold(rpr, bold);
    }
    if spec.italic {
        wml::set_italic(rpr, true);
    }
    if let Some(color) = spec.color {
        wml::set_color(rpr, color);
    }
    if spec.superscript {
        wml::set_superscript(rpr);
    }
    if spec.language {
        set_language(rpr, lang);
    }
}

/// Rewrites every style in `specs` that the style table declares. Returns the names
/// that were not found; those are skipped.
pub fn apply_styles(styles: &mut Element, specs: &[StyleSpec], lang: &str) -> Vec<String> {
    let mut missing = Vec::new();
    for spec in specs {
        match find_style_mut(styles, spec.name) {
            Some(style) => {
                apply_spec(style, spec, lang);
                log::debug!("Style '{}' updated", spec.name);
            }
            None => {
                log::warn!("Style '{}' not found", spec.name);
                missing.push(spec.name.to_string());
            }
        }
    }
    missing
}

/// Sets the language of `w:docDefaults/w:rPrDefault/w:rPr`, creating the containers
/// at the head of their parents when absent.
pub fn set_document_language(styles: &mut Element, lang: &str) {
    let defaults = leading_props(styles, "w:docDefaults");
    let rpr_default = leading_props(defaults, "w:rPrDefault");
    let rpr = leading_props(rpr_default, "w:rPr");
    set_language(rpr, lang);
}
