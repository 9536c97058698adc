//! Fence normalization: rewrite the malformed fence shapes the model emits
//! into canonical triple-backtick form, and strip a known stray token.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::blocks::find_fence;

/// Literal noise token the model sometimes emits verbatim.
const STRAY_TOKEN: &str = "CODEBLOCKPLACEHOLDER";

/// ``lang ... ` — double-backtick opener closed by a single backtick.
static DOUBLE_BACKTICK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"``(\w*)\s*\n([\s\S]+?)\n`").unwrap());

/// `lang at line start ... ` — single-backtick opener with a language tag.
static SINGLE_BACKTICK_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^`(\w*)\s*\n([\s\S]+?)\n`").unwrap());

/// Normalize fences in `text`. Well-formed triple-backtick fences pass
/// through byte-for-byte; the rewrite rules only ever see the stretches of
/// text between them, so they cannot corrupt a valid fence.
pub(super) fn normalize_fences(text: &str) -> String {
    let text = text.replace(STRAY_TOKEN, "");
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(m) = find_fence(&text, pos) {
        out.push_str(&normalize_plain(&text[pos..m.start]));
        out.push_str(&text[m.start..m.end]);
        pos = m.end;
    }
    out.push_str(&normalize_plain(&text[pos..]));
    out
}

/// Apply the malformed-fence rewrites to a stretch of non-fenced text.
/// The double-backtick rule must run first: a malformed double-backtick
/// opener also matches the single-backtick pattern.
fn normalize_plain(segment: &str) -> String {
    let first = DOUBLE_BACKTICK_OPEN.replace_all(segment, canonical_fence);
    SINGLE_BACKTICK_OPEN
        .replace_all(first.as_ref(), canonical_fence)
        .into_owned()
}

fn canonical_fence(caps: &Captures<'_>) -> String {
    let lang = match caps.get(1) {
        Some(m) if !m.as_str().is_empty() => m.as_str(),
        _ => "text",
    };
    format!("```{}\n{}\n```", lang, caps[2].trim())
}
