use std::collections::HashMap;

use super::xml::Element;

/// Style name ↔ style id lookup built from `word/styles.xml`.
///
/// Paragraphs reference styles by id (`Heading1`), the formatting contract names
/// them by their display name (`Heading 1`). Built-in names are stored in lower
/// case by Word (`heading 1`), so names compare case-insensitively.
#[derive(Default)]
pub struct StyleTable {
    id_to_name: HashMap<String, String>,
    name_to_id: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    pub fn from_styles(styles: &Element) -> StyleTable {
        let mut table = StyleTable::default();
        for style in styles.children_named("w:style") {
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style.child_val("w:name").unwrap_or(id);
            if style.attr("w:type") == Some("paragraph")
                && style
                    .attr("w:default")
                    .is_some_and(|v| v == "1" || v == "true")
            {
                table.default_paragraph = Some(id.to_string());
            }
            table.id_to_name.insert(id.to_string(), name.to_string());
            table
                .name_to_id
                .entry(name.to_lowercase())
                .or_insert_with(|| id.to_string());
        }
        table
    }

    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.id_to_name.get(id).map(String::as_str)
    }

    /// Unstyled paragraphs and the default paragraph style both count as Normal.
    pub fn is_normal(&self, style_id: Option<&str>) -> bool {
        match style_id {
            None => true,
            Some(id) if self.default_paragraph.as_deref() == Some(id) => true,
            Some(_) => self.is_named(style_id, "Normal"),
        }
    }

    pub fn is_named(&self, style_id: Option<&str>, name: &str) -> bool {
        style_id
            .and_then(|id| self.name_of(id).or(Some(id)))
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Mutable access to the `w:style` element with display name `name`.
pub(crate) fn find_style_mut<'a>(styles: &'a mut Element, name: &str) -> Option<&'a mut Element> {
    styles.elements_mut().find(|s| {
        s.is("w:style")
            && s.child_val("w:name")
                .or(s.attr("w:styleId"))
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}
