use crate::model::{TWIPS_PER_CM, TWIPS_PER_INCH};

pub const TITLE_SIZE: f32 = 24.0;
pub const HEADING_1_SIZE: f32 = 18.0;
pub const HEADING_2_SIZE: f32 = 16.0;
pub const HEADING_3_SIZE: f32 = 14.0;
pub const TABLE_FONT_SIZE: f32 = 10.0;
pub const FOOTER_FONT_SIZE: f32 = 10.0;
pub const FOOTNOTE_FONT_SIZE: f32 = 10.0;
pub const PARAGRAPH_SPACING: f32 = 6.0;
pub const TABLE_CELL_SPACING: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PaperSize {
    /// 8.5 x 11 in
    Letter,
    /// 8.5 x 14 in
    Legal,
    /// 8.27 x 11.69 in
    A4,
}

impl PaperSize {
    /// Width and height in twips.
    pub fn twips(self) -> (u32, u32) {
        let (w, h) = match self {
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::A4 => (8.27, 11.69),
        };
        (
            (w * TWIPS_PER_INCH).round() as u32,
            (h * TWIPS_PER_INCH).round() as u32,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DocumentStyle {
    Report,
    Note,
    Letter,
    Memo,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FooterText {
    pub odd: String,
    pub even: String,
}

impl Default for FooterText {
    fn default() -> Self {
        Self {
            odd: "Page".into(),
            even: "Page".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentConfig {
    pub style: DocumentStyle,
    pub paper_size: PaperSize,
    pub author: String,
    pub date: String,
    /// RGB per heading level 1..=3.
    pub heading_colors: [[u8; 3]; 3],
    pub footer_text: FooterText,
    pub font_name: String,
    pub base_font_size: f32,
    /// Centimetres, top/right/bottom/left.
    pub margins: [f32; 4],
    pub line_spacing: f32,
    pub generate_toc: bool,
    pub language: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            style: DocumentStyle::Report,
            paper_size: PaperSize::Letter,
            author: String::new(),
            date: String::new(),
            heading_colors: [[37, 150, 190]; 3],
            footer_text: FooterText::default(),
            font_name: "Arial".into(),
            base_font_size: 12.0,
            margins: [2.0; 4],
            line_spacing: 1.0,
            generate_toc: true,
            language: "en-US".into(),
        }
    }
}

impl DocumentConfig {
    pub fn report() -> Self {
        Self {
            style: DocumentStyle::Report,
            paper_size: PaperSize::Letter,
            heading_colors: [[37, 150, 190]; 3],
            footer_text: FooterText {
                odd: "Right text | Page".into(),
                even: "Page | Left text".into(),
            },
            ..Self::default()
        }
    }

    /// Internal notes: legal paper, grey headings, tighter margins.
    pub fn note() -> Self {
        Self {
            style: DocumentStyle::Note,
            paper_size: PaperSize::Legal,
            heading_colors: [[70, 70, 70], [100, 100, 100], [130, 130, 130]],
            footer_text: FooterText {
                odd: "Internal Note | Page".into(),
                even: "Page | Internal Note".into(),
            },
            margins: [1.5; 4],
            ..Self::default()
        }
    }

    pub fn preset(style: DocumentStyle) -> Self {
        match style {
            DocumentStyle::Note => Self::note(),
            DocumentStyle::Report => Self::report(),
            DocumentStyle::Letter | DocumentStyle::Memo => Self {
                style,
                ..Self::default()
            },
        }
    }

    pub fn heading_color(&self, level: usize) -> [u8; 3] {
        level
            .checked_sub(1)
            .and_then(|i| self.heading_colors.get(i))
            .copied()
            .unwrap_or([0, 0, 0])
    }

    /// Margins in twips, top/right/bottom/left.
    pub fn margins_twips(&self) -> [u32; 4] {
        self.margins
            .map(|cm| (cm.max(0.0) * TWIPS_PER_CM).round() as u32)
    }
}
