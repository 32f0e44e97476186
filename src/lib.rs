pub mod config;
pub mod convert;
pub mod docx;
mod error;
pub mod format;
pub mod markdown;
pub mod model;

pub use config::{DocumentConfig, DocumentStyle, FooterText, PaperSize};
pub use convert::Converter;
pub use docx::Docx;
pub use error::Error;
pub use format::{ImageReport, NormalizeReport, Stage};

use std::path::Path;
use std::time::Instant;

use model::ImageReference;

/// Formats an already converted `.docx` in place: `normalize` followed by
/// `resolve_images` against `image_root`.
pub fn format_docx(
    path: &Path,
    config: &DocumentConfig,
    title: &str,
    image_refs: &[ImageReference],
    image_root: &Path,
) -> Result<(NormalizeReport, ImageReport), Error> {
    let t0 = Instant::now();

    let mut doc = Docx::open(path)?;
    let t_open = t0.elapsed();

    let normalized = format::normalize(&mut doc, config, title);
    let images = format::resolve_images(&mut doc, image_refs, image_root);
    let t_format = t0.elapsed();

    doc.save(path)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: open={:.1}ms, format={:.1}ms, save={:.1}ms, total={:.1}ms",
        t_open.as_secs_f64() * 1000.0,
        (t_format - t_open).as_secs_f64() * 1000.0,
        (t_total - t_format).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
    );

    Ok((normalized, images))
}
