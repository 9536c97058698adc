//! Inline formatting for prose outside code blocks.
//!
//! Runs on the placeholder-bearing text, so none of these rules can touch
//! extracted code content. Order matters: escape first (so no raw markup
//! survives into the output), then inline code (so bold/italic cannot reach
//! inside a code span), then bold before italic (single `*` is a subset of
//! `**`), then line breaks.

use std::sync::LazyLock;

use regex::Regex;

use super::escape::escape_body;

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+?)`").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*|__(.*?)__").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*|_(.*?)_").unwrap());

pub(super) fn format_inline(text: &str) -> String {
    let escaped = escape_body(text);
    let code = INLINE_CODE.replace_all(&escaped, "<code class=\"inline-code\">${1}</code>");
    let bold = BOLD.replace_all(&code, "<strong>${1}${2}</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>${1}${2}</em>");
    italic.replace('\n', "<br />")
}
