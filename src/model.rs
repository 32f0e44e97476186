pub const EMU_PER_INCH: i64 = 914_400;
/// Assumed resolution for images that carry no density of their own.
pub const DEFAULT_DPI: u32 = 72;
pub const TWIPS_PER_INCH: f32 = 1440.0;
pub const TWIPS_PER_CM: f32 = 1440.0 / 2.54;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_wml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Paragraph spacing: before/after in points, line as a multiplier of single spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    pub before: f32,
    pub after: f32,
    pub line: f32,
}

impl Spacing {
    pub const fn new(before: f32, after: f32, line: f32) -> Self {
        Self {
            before,
            after,
            line,
        }
    }
}

/// An image link found in the Markdown source, in order of appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageReference {
    pub alt_text: String,
    /// Relative to the `img/` directory (a leading `img/` is already stripped).
    pub path: String,
    pub original_markdown: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FooterKind {
    /// Odd pages (and every page when odd/even variance is off).
    Default,
    Even,
}

impl FooterKind {
    pub fn as_wml(self) -> &'static str {
        match self {
            FooterKind::Default => "default",
            FooterKind::Even => "even",
        }
    }
}

/// Rendered size of an embedded picture, in EMUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    pub cx: i64,
    pub cy: i64,
}

impl Extent {
    /// Native size of a `width`×`height` pixel image at `(horizontal, vertical)` DPI.
    pub fn from_pixels(width: u32, height: u32, (dpi_x, dpi_y): (u32, u32)) -> Self {
        Self {
            cx: pixels_to_emu(width, dpi_x),
            cy: pixels_to_emu(height, dpi_y),
        }
    }

    /// Scales down to `max_cx` keeping the aspect ratio; narrower extents are untouched.
    pub fn fit_width(self, max_cx: i64) -> Self {
        if self.cx <= max_cx || self.cx == 0 {
            return self;
        }
        let cy = (max_cx as f64 * self.cy as f64 / self.cx as f64).round() as i64;
        Self { cx: max_cx, cy }
    }
}

fn pixels_to_emu(pixels: u32, dpi: u32) -> i64 {
    let dpi = i64::from(dpi.max(1));
    (i64::from(pixels) * EMU_PER_INCH + dpi / 2) / dpi
}
