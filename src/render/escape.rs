//! HTML entity escaping for the two embedding contexts: element body and
//! double-quoted attribute value.
//!
//! Both escapers are single-pass character scans, so each input character is
//! mapped to its entity exactly once. There is no substitution ordering to get
//! wrong and no way to re-escape an entity the scan itself produced, which is
//! what makes the escape reversible byte-for-byte by standard entity decoding.

/// Escape text for an element body: `& < > " '`.
pub(crate) fn escape_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted attribute value: `" & < >`.
/// Single quotes may stay literal because the attribute is "-delimited.
pub(crate) fn escape_attribute(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
