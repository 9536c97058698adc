//! Safe-HTML rendering of chat messages.
//!
//! The pipeline for one message is a synchronous, pure transform:
//! raw text → fence normalization → code block extraction (placeholders in,
//! blocks out) → inline formatting of the remaining prose → placeholder
//! reinsertion. All untrusted text is entity-escaped before any markup tags
//! are added, so the result is safe to embed in a display surface directly.

mod blocks;
mod escape;
mod fences;
mod inline;


pub(crate) use blocks::CodeBlock;

use crate::core::message::{ChatMessage, Role, Source};

/// Output of rendering one message: the markup plus the extracted code
/// blocks, in source order, for the clipboard controller to bind.
#[derive(Debug, Clone)]
pub(crate) struct RenderedMessage {
    pub(crate) html: String,
    pub(crate) blocks: Vec<CodeBlock>,
}

// Private-use scalars survive every escaping and formatting pass untouched,
// and the token is lengthened below until it does not occur in the input.
const PLACEHOLDER_SEED: &str = "\u{e000}\u{e001}";

fn placeholder_for(text: &str) -> String {
    let mut token = PLACEHOLDER_SEED.to_string();
    while text.contains(&token) {
        token.push('\u{e000}');
    }
    token
}

/// Render one message body to markup.
pub(crate) fn render_message(text: &str) -> RenderedMessage {
    let normalized = fences::normalize_fences(text);
    let placeholder = placeholder_for(&normalized);
    let (with_placeholders, blocks) = blocks::extract_code_blocks(&normalized, &placeholder);
    let formatted = inline::format_inline(&with_placeholders);
    let html = reinsert(&formatted, &placeholder, &blocks);
    RenderedMessage { html, blocks }
}

/// Splice the rendered code block fragments back into the formatted prose at
/// the placeholder positions, preserving source order.
fn reinsert(formatted: &str, placeholder: &str, blocks: &[CodeBlock]) -> String {
    if blocks.is_empty() {
        let mut out = String::new();
        push_paragraph(&mut out, formatted);
        return out;
    }
    debug_assert_eq!(formatted.matches(placeholder).count(), blocks.len());
    // A message that is exactly one code block renders as the bare fragment,
    // without the paragraph wrapper prose would get.
    if blocks.len() == 1 && formatted.trim() == placeholder {
        return blocks[0].to_html();
    }
    let mut out = String::new();
    for (i, segment) in formatted.split(placeholder).enumerate() {
        push_paragraph(&mut out, segment);
        if let Some(block) = blocks.get(i) {
            out.push_str(&block.to_html());
        }
    }
    out
}

fn push_paragraph(out: &mut String, segment: &str) {
    let trimmed = strip_edge_breaks(segment);
    if trimmed.is_empty() {
        return;
    }
    out.push_str("<p class=\"message-text\">");
    out.push_str(trimmed);
    out.push_str("</p>");
}

/// Drop whitespace and `<br />` runs at either end of a prose segment; they
/// are artifacts of the newlines that separated the segment from a fence.
fn strip_edge_breaks(segment: &str) -> &str {
    let mut s = segment.trim();
    loop {
        if let Some(rest) = s.strip_prefix("<br />") {
            s = rest.trim_start();
            continue;
        }
        if let Some(rest) = s.strip_suffix("<br />") {
            s = rest.trim_end();
            continue;
        }
        return s;
    }
}

/// Render a full message bubble: the pipeline output wrapped in a role-tagged
/// container, plus the source pills for cited agent replies.
pub(crate) fn render_bubble(message: &ChatMessage) -> RenderedMessage {
    let body = render_message(&message.text);
    let role_class = match message.role {
        Role::User => "message-user",
        Role::Agent => "message-agent",
        Role::Error => "message-error",
    };
    let mut html = format!(
        "<div class=\"message {}\" data-message-id=\"{}\">",
        role_class,
        escape::escape_attribute(&message.id),
    );
    html.push_str(&body.html);
    if message.role == Role::Agent && !message.sources.is_empty() {
        html.push_str("<div class=\"sources\"><h4>Sources:</h4>");
        for source in &message.sources {
            html.push_str(&source_pill(source));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    RenderedMessage {
        html,
        blocks: body.blocks,
    }
}

fn source_pill(source: &Source) -> String {
    format!(
        "<a class=\"source-pill\" href=\"{uri}\" title=\"{uri}\" \
         target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>",
        uri = escape::escape_attribute(&source.uri),
        label = escape::escape_body(&source_label(source)),
    )
}

/// Pill label: the title, unless it is empty or itself a URL, in which case
/// fall back to the hostname (without `www.`), then to a truncated URI.
fn source_label(source: &Source) -> String {
    let title = source.title.trim();
    if !title.is_empty() && !title.starts_with("http") {
        return title.to_string();
    }
    if let Some(host) = hostname(&source.uri) {
        return host.trim_start_matches("www.").to_string();
    }
    let prefix: String = source.uri.chars().take(30).collect();
    if source.uri.chars().count() > 30 {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

fn hostname(uri: &str) -> Option<&str> {
    let rest = uri.split_once("://")?.1;
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() { None } else { Some(host) }
}
