//! Text cleanup for server-provided content.

/// Entities emitted by the catalog's rich-text editor, in replacement order.
///
/// Replacement is sequential, so `&amp;lt;` decodes all the way to `<`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", "\u{a0}"),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&lsquo;", "'"),
    ("&rsquo;", "'"),
    ("&mdash;", "\u{2014}"),
    ("&ndash;", "\u{2013}"),
    ("&hellip;", "\u{2026}"),
    ("&copy;", "\u{a9}"),
    ("&reg;", "\u{ae}"),
    ("&trade;", "\u{2122}"),
    ("&euro;", "\u{20ac}"),
    ("&pound;", "\u{a3}"),
    ("&yen;", "\u{a5}"),
    ("&cent;", "\u{a2}"),
    ("&#xA0;", "\u{a0}"),
    ("&#160;", "\u{a0}"),
    ("&#38;", "&"),
    ("&#60;", "<"),
    ("&#62;", ">"),
];

/// Decode the HTML entities used in business descriptions and trim the result.
///
/// Unknown entities are left as-is.
///
/// ```
/// use mybn_core::text::decode_html_entities;
///
/// assert_eq!(decode_html_entities("Fish &amp; Chips "), "Fish & Chips");
/// ```
#[must_use]
pub fn decode_html_entities(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let decoded = ENTITIES
        .iter()
        .fold(text.to_owned(), |acc, (entity, replacement)| {
            if acc.contains(entity) {
                acc.replace(entity, replacement)
            } else {
                acc
            }
        });

    decoded.trim().to_owned()
}
