//! Pre-scan of the Markdown source before it is handed to the converter.

use std::sync::LazyLock;

use regex::Regex;

use crate::format::PLACEHOLDER;
use crate::model::ImageReference;

pub const UNTITLED: &str = "Untitled Document";

static IMAGE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("valid image link regex"));

/// Text of the first `# ` heading line, or [`UNTITLED`].
pub fn extract_title(content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Every `![alt](path)` in order of appearance. A leading `img/` is removed from
/// the path.
pub fn extract_image_references(content: &str) -> Vec<ImageReference> {
    IMAGE_LINK
        .captures_iter(content)
        .map(|caps| {
            let alt_text = caps[1].to_string();
            let raw = caps[2].trim();
            let path = raw.strip_prefix("img/").unwrap_or(raw).to_string();
            let original_markdown = format!("![{alt_text}]({path})");
            log::debug!("Found image reference: {path}");
            ImageReference {
                alt_text,
                path,
                original_markdown,
            }
        })
        .collect()
}

/// Replaces every image link with the placeholder token.
pub fn replace_image_references(content: &str) -> String {
    IMAGE_LINK.replace_all(content, PLACEHOLDER).into_owned()
}
