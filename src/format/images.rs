//! Second pass: replaces `[IMAGE_PLACEHOLDER]` paragraphs with the images the
//! Markdown referenced, in the order they were referenced.

use std::io::Cursor;
use std::path::Path;

use crate::docx::{
    DML_NS, Docx, Element, Node, PIC_NS, Paragraph, REL_NS, WPD_NS, paragraph_text,
};
use crate::error::Error;
use crate::model::{Alignment, DEFAULT_DPI, EMU_PER_INCH, Extent, ImageReference};

pub const PLACEHOLDER: &str = "[IMAGE_PLACEHOLDER]";

/// Rendered width cap: 6 inches.
pub const MAX_IMAGE_WIDTH: i64 = 6 * EMU_PER_INCH;

const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub embedded: usize,
    /// Files that exist but could not be embedded.
    pub failed: usize,
    pub not_found: usize,
    /// Placeholders left in place because the reference queue ran dry.
    pub unfilled_placeholders: usize,
    pub unused_references: usize,
}

struct ProbedImage {
    extension: &'static str,
    content_type: &'static str,
    extent: Extent,
}

fn probe(data: &[u8]) -> Result<ProbedImage, Error> {
    let reader = image::ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let Some(format) = reader.format() else {
        return Err(Error::UnsupportedImage("unrecognized data".into()));
    };
    let (extension, content_type) = match format {
        image::ImageFormat::Png => ("png", "image/png"),
        image::ImageFormat::Jpeg => ("jpeg", "image/jpeg"),
        image::ImageFormat::Gif => ("gif", "image/gif"),
        image::ImageFormat::Bmp => ("bmp", "image/bmp"),
        other => return Err(Error::UnsupportedImage(format!("{other:?}"))),
    };
    let (width, height) = reader.into_dimensions()?;
    let dpi = density(format, data);
    log::trace!("{width}x{height} px {extension} at {}x{} dpi", dpi.0, dpi.1);
    Ok(ProbedImage {
        extension,
        content_type,
        extent: Extent::from_pixels(width, height, dpi).fit_width(MAX_IMAGE_WIDTH),
    })
}

/// Horizontal and vertical pixels per inch.
type Dpi = (u32, u32);

/// Bitmaps with a zeroed resolution field are taken as screen resolution.
const BMP_DEFAULT_DPI: u32 = 96;

/// Resolution recorded in the file header, or [`DEFAULT_DPI`] when there is none.
fn density(format: image::ImageFormat, data: &[u8]) -> Dpi {
    let (found, fallback) = match format {
        image::ImageFormat::Png => (png_density(data), DEFAULT_DPI),
        image::ImageFormat::Jpeg => (jfif_density(data), DEFAULT_DPI),
        image::ImageFormat::Bmp => (bmp_density(data), BMP_DEFAULT_DPI),
        _ => (None, DEFAULT_DPI),
    };
    let (x, y) = found.unwrap_or((0, 0));
    let or_fallback = |dpi: u32| if dpi == 0 { fallback } else { dpi };
    (or_fallback(x), or_fallback(y))
}

fn per_metre_to_dpi(per_metre: u32) -> u32 {
    (f64::from(per_metre) * 0.0254).round() as u32
}

fn be_u32(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(..4)?.try_into().ok()?))
}

/// `pHYs` chunk; only metre-based densities carry an absolute resolution.
fn png_density(data: &[u8]) -> Option<Dpi> {
    let mut rest = data.get(8..)?;
    while rest.len() >= 12 {
        let len = usize::try_from(be_u32(rest)?).ok()?;
        let body = rest.get(8..len.checked_add(8)?)?;
        match &rest[4..8] {
            b"pHYs" => {
                if body.len() < 9 || body[8] != 1 {
                    return None;
                }
                return Some((
                    per_metre_to_dpi(be_u32(body)?),
                    per_metre_to_dpi(be_u32(&body[4..])?),
                ));
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        rest = rest.get(len + 12..)?;
    }
    None
}

/// Density from the JFIF `APP0` segment.
fn jfif_density(data: &[u8]) -> Option<Dpi> {
    let mut rest = data.strip_prefix(&[0xFF, 0xD8])?;
    while let [0xFF, marker, hi, lo, tail @ ..] = rest {
        // Start of scan: no more header segments.
        if *marker == 0xDA {
            return None;
        }
        let len = usize::from(u16::from_be_bytes([*hi, *lo]));
        let body = tail.get(..len.checked_sub(2)?)?;
        if *marker == 0xE0 {
            if let [b'J', b'F', b'I', b'F', 0, _, _, units, xh, xl, yh, yl, ..] = body {
                let x = u32::from(u16::from_be_bytes([*xh, *xl]));
                let y = u32::from(u16::from_be_bytes([*yh, *yl]));
                return match *units {
                    1 => Some((x, y)),
                    2 => Some((per_cm_to_dpi(x), per_cm_to_dpi(y))),
                    _ => None,
                };
            }
        }
        rest = &tail[body.len()..];
    }
    None
}

fn per_cm_to_dpi(per_cm: u32) -> u32 {
    (f64::from(per_cm) * 2.54).round() as u32
}

/// `biXPelsPerMeter`/`biYPelsPerMeter` of a `BITMAPINFOHEADER` or later.
fn bmp_density(data: &[u8]) -> Option<Dpi> {
    let header_len = u32::from_le_bytes(data.get(14..18)?.try_into().ok()?);
    if header_len < 40 {
        return None;
    }
    let read = |at: usize| -> Option<u32> {
        let v = i32::from_le_bytes(data.get(at..at + 4)?.try_into().ok()?);
        Some(per_metre_to_dpi(v.max(0) as u32))
    };
    Some((read(38)?, read(42)?))
}

/// `w:drawing` holding an inline picture bound to relationship `rel_id`.
pub fn inline_picture(rel_id: &str, id: u32, name: &str, descr: &str, extent: Extent) -> Element {
    let cx = extent.cx.to_string();
    let cy = extent.cy.to_string();

    let nv_pic_pr = Element::new("pic:nvPicPr")
        .with_child(
            Element::new("pic:cNvPr")
                .with_attr("id", "0")
                .with_attr("name", name)
                .with_attr("descr", descr),
        )
        .with_child(Element::new("pic:cNvPicPr"));
    let blip_fill = Element::new("pic:blipFill")
        .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
        .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect")));
    let sp_pr = Element::new("pic:spPr")
        .with_child(
            Element::new("a:xfrm")
                .with_child(Element::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                .with_child(
                    Element::new("a:ext")
                        .with_attr("cx", cx.as_str())
                        .with_attr("cy", cy.as_str()),
                ),
        )
        .with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        );
    let pic = Element::new("pic:pic")
        .with_attr("xmlns:pic", PIC_NS)
        .with_child(nv_pic_pr)
        .with_child(blip_fill)
        .with_child(sp_pr);
    let graphic = Element::new("a:graphic").with_attr("xmlns:a", DML_NS).with_child(
        Element::new("a:graphicData")
            .with_attr("uri", PIC_NS)
            .with_child(pic),
    );

    let inline = Element::new("wp:inline")
        .with_attr("xmlns:wp", WPD_NS)
        .with_attr("xmlns:r", REL_NS)
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(
            Element::new("wp:extent")
                .with_attr("cx", cx.as_str())
                .with_attr("cy", cy.as_str()),
        )
        .with_child(
            Element::new("wp:effectExtent")
                .with_attr("l", "0")
                .with_attr("t", "0")
                .with_attr("r", "0")
                .with_attr("b", "0"),
        )
        .with_child(
            Element::new("wp:docPr")
                .with_attr("id", id.to_string())
                .with_attr("name", name)
                .with_attr("descr", descr),
        )
        .with_child(
            Element::new("wp:cNvGraphicFramePr").with_child(
                Element::new("a:graphicFrameLocks")
                    .with_attr("xmlns:a", DML_NS)
                    .with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(graphic);
    Element::new("w:drawing").with_child(inline)
}

/// Direct body paragraphs whose text carries the placeholder, by child index.
fn placeholder_paragraphs(docx: &Docx) -> Vec<usize> {
    let Some(body) = docx.body() else {
        return Vec::new();
    };
    body.children
        .iter()
        .enumerate()
        .filter_map(|(idx, node)| match node {
            Node::Element(p) if p.is("w:p") && paragraph_text(p).contains(PLACEHOLDER) => {
                Some(idx)
            }
            _ => None,
        })
        .collect()
}

fn body_paragraph(docx: &mut Docx, idx: usize) -> Option<Paragraph<'_>> {
    match docx.body_mut()?.children.get_mut(idx)? {
        Node::Element(p) => Some(Paragraph::new(p)),
        Node::Text(_) => None,
    }
}

enum Outcome {
    Embedded,
    Failed,
    NotFound,
}

fn embed(
    docx: &mut Docx,
    idx: usize,
    reference: &ImageReference,
    path: &Path,
) -> Result<(), Error> {
    let data = std::fs::read(path)?;
    let probed = probe(&data)?;
    let rel_id = docx.add_media(data, probed.extension, probed.content_type);
    let id = docx.next_drawing_id();
    let name = format!("Picture {id}");
    let drawing = inline_picture(&rel_id, id, &name, &reference.alt_text, probed.extent);

    if let Some(mut p) = body_paragraph(docx, idx) {
        p.clear();
        p.add_run().append(drawing);
        p.set_alignment(Alignment::Center);
    }
    Ok(())
}

fn resolve_one(
    docx: &mut Docx,
    idx: usize,
    reference: &ImageReference,
    image_root: &Path,
) -> Outcome {
    let path = image_root.join(&reference.path);
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        log::warn!("Unsupported image format: .{extension}");
    }
    log::info!("Processing image: {}", path.display());

    if !path.exists() {
        log::warn!("Image not found: {}", path.display());
        if let Some(mut p) = body_paragraph(docx, idx) {
            p.set_text(&format!("[Image not found: {}]", reference.alt_text));
        }
        return Outcome::NotFound;
    }

    match embed(docx, idx, reference, &path) {
        Ok(()) => {
            log::info!("Added image: {}", reference.path);
            Outcome::Embedded
        }
        Err(e) => {
            log::error!("Error adding image {}: {}", reference.path, e);
            if let Some(mut p) = body_paragraph(docx, idx) {
                p.set_text(&format!("[Image: {}]", reference.alt_text));
            }
            Outcome::Failed
        }
    }
}

/// Fills placeholder paragraphs from `references`, first placeholder with the first
/// reference. Image files are looked up under `image_root`.
pub fn resolve_images(
    docx: &mut Docx,
    references: &[ImageReference],
    image_root: &Path,
) -> ImageReport {
    let mut report = ImageReport::default();
    let mut queue = references.iter();

    for idx in placeholder_paragraphs(docx) {
        let Some(reference) = queue.next() else {
            report.unfilled_placeholders += 1;
            continue;
        };
        match resolve_one(docx, idx, reference, image_root) {
            Outcome::Embedded => report.embedded += 1,
            Outcome::Failed => report.failed += 1,
            Outcome::NotFound => report.not_found += 1,
        }
    }

    report.unused_references = queue.count();
    if report.unfilled_placeholders > 0 {
        log::debug!(
            "{} image placeholders left without a reference",
            report.unfilled_placeholders
        );
    }
    if report.unused_references > 0 {
        log::debug!("{} image references were not used", report.unused_references);
    }
    report
}
