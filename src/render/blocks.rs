//! Code block extraction: scan normalized text for canonical triple-backtick
//! fences, lift each one out as a [`CodeBlock`], and leave a placeholder token
//! at its position for later reinsertion.

use super::escape::{escape_attribute, escape_body};

/// One extracted code block: the exact trimmed content plus its escaped forms.
#[derive(Debug, Clone)]
pub(crate) struct CodeBlock {
    /// Lower-cased language identifier, `None` when the fence carried none.
    pub(crate) language: Option<String>,
    /// The trimmed fence body, exactly as it must reach the clipboard.
    pub(crate) raw: String,
    /// `raw` escaped for element-body context.
    pub(crate) display: String,
}

impl CodeBlock {
    fn new(lang: &str, body: &str) -> Self {
        let raw = body.trim().to_string();
        let display = escape_body(&raw);
        let language = if lang.is_empty() {
            None
        } else {
            Some(lang.to_ascii_lowercase())
        };
        Self {
            language,
            raw,
            display,
        }
    }

    /// Self-contained HTML fragment: a copy button carrying the
    /// attribute-escaped payload, and the language-tagged code display.
    pub(crate) fn to_html(&self) -> String {
        let class = match &self.language {
            Some(lang) => format!("language-{}", lang),
            None => "language-text".to_string(),
        };
        format!(
            "<div class=\"code-block\">\
             <button class=\"copy-code-btn\" type=\"button\" \
             data-clipboard-text=\"{attr}\" \
             aria-label=\"Copy code to clipboard\">Copy</button>\
             <pre><code class=\"{class}\">{display}</code></pre>\
             </div>",
            attr = escape_attribute(&self.raw),
            class = class,
            display = self.display,
        )
    }
}

/// Span of one canonical fence: byte range of the whole match (including any
/// trailing blank line), language tag, and body.
pub(super) struct FenceMatch<'a> {
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) lang: &'a str,
    pub(super) body: &'a str,
}

/// Find the next canonical fence at or after byte offset `from`: three
/// backticks, an optional language identifier, a newline, the body, a newline,
/// three backticks, and an optional trailing blank line.
///
/// Anything that does not complete the pattern (stray backticks, an unclosed
/// opener) is skipped over and stays ordinary text.
pub(super) fn find_fence(text: &str, from: usize) -> Option<FenceMatch<'_>> {
    let mut search = from;
    loop {
        let rel = text[search..].find("```")?;
        let start = search + rel;
        let after_open = start + 3;
        let Some(line_len) = text[after_open..].find('\n') else {
            // No newline after the opener anywhere; no fence can close.
            return None;
        };
        let lang = &text[after_open..after_open + line_len];
        if !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            // Step one byte, not past the opener: in a longer backtick run
            // (e.g. four backticks) the fence may start inside it.
            search = start + 1;
            continue;
        }
        let body_start = after_open + line_len + 1;
        let Some(close_rel) = text[body_start..].find("\n```") else {
            search = start + 1;
            continue;
        };
        let body = &text[body_start..body_start + close_rel];
        let mut end = body_start + close_rel + 4;
        // Consume an optional trailing blank line after the closing fence.
        let tail = &text[end..];
        let ws_len = tail.len() - tail.trim_start().len();
        if let Some(nl) = tail[..ws_len].rfind('\n') {
            end += nl + 1;
        }
        return Some(FenceMatch {
            start,
            end,
            lang,
            body,
        });
    }
}

/// Replace every canonical fence in `text` with `placeholder` and collect the
/// corresponding [`CodeBlock`]s in source order. The number of placeholder
/// occurrences in the returned text always equals the number of blocks.
pub(super) fn extract_code_blocks(text: &str, placeholder: &str) -> (String, Vec<CodeBlock>) {
    let mut out = String::with_capacity(text.len());
    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some(m) = find_fence(text, pos) {
        out.push_str(&text[pos..m.start]);
        out.push_str(placeholder);
        blocks.push(CodeBlock::new(m.lang, m.body));
        pos = m.end;
    }
    out.push_str(&text[pos..]);
    (out, blocks)
}
