use crate::docx::Element;
use crate::docx::wml::RPR_ORDER;

/// Tags run (or style) properties with `lang` on all three script axes. Any
/// previous `w:lang` is dropped first, so exactly one tag remains.
pub fn set_language(rpr: &mut Element, lang: &str) {
    rpr.remove_children("w:lang");
    let tag = Element::new("w:lang")
        .with_attr("w:val", lang)
        .with_attr("w:eastAsia", lang)
        .with_attr("w:bidi", lang);
    rpr.insert_ordered(tag, RPR_ORDER);
}
