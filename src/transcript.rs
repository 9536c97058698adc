//! Standalone HTML transcript: the rendered bubbles wrapped in a complete
//! document, for export and for opening in a browser.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;

use crate::core::message::ChatMessage;
use crate::render;

const STYLE: &str = "\
body { font-family: sans-serif; background: #f8f9fa; margin: 0; padding: 1.5rem; }\n\
main { max-width: 48rem; margin: 0 auto; display: flex; flex-direction: column; gap: .75rem; }\n\
.message { padding: .75rem 1rem; border-radius: .75rem; max-width: 85%; overflow-wrap: break-word; }\n\
.message-user { background: #2563eb; color: #fff; align-self: flex-end; }\n\
.message-agent { background: #fff; border: 1px solid #e5e7eb; align-self: flex-start; }\n\
.message-error { background: #fee2e2; color: #b91c1c; border: 1px solid #fca5a5; align-self: flex-start; }\n\
.message-text { margin: .25rem 0; }\n\
.code-block { position: relative; margin: .5rem 0; }\n\
.code-block pre { background: #1f2937; color: #f3f4f6; padding: 2rem .75rem .75rem; border-radius: .375rem; overflow-x: auto; }\n\
.copy-code-btn { position: absolute; top: .5rem; right: .5rem; font-size: .75rem; padding: .25rem .5rem; }\n\
.inline-code { background: #e5e7eb; color: #374151; padding: .1rem .35rem; border-radius: .25rem; font-family: monospace; }\n\
.sources { margin-top: .75rem; padding-top: .5rem; border-top: 1px solid #d1d5db; }\n\
.sources h4 { margin: 0 0 .4rem; font-size: .75rem; }\n\
.source-pill { display: inline-block; background: #e5e7eb; color: #374151; font-size: .75rem; padding: .25rem .6rem; border-radius: 9999px; margin-right: .4rem; text-decoration: none; }\n";

/// Render the whole conversation as a self-contained HTML document.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    let mut body = String::new();
    for message in messages {
        body.push_str(&render::render_bubble(message).html);
    }
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>CodeMaster transcript</title>\n<style>\n{style}</style>\n</head>\n<body>\n\
         <header><h1>CodeMaster transcript</h1><p>{timestamp}</p></header>\n\
         <main>\n{body}\n</main>\n</body>\n</html>\n",
        style = STYLE,
        timestamp = Local::now().format("%Y-%m-%d %H:%M"),
        body = body,
    )
}

/// Write the transcript to `path`.
pub fn export(messages: &[ChatMessage], path: &Path) -> io::Result<()> {
    fs::write(path, render_transcript(messages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_wraps_messages_in_document() {
        let messages = [
            ChatMessage::user("hello"),
            ChatMessage::agent("```rust\nfn main() {}\n```", Vec::new()),
        ];
        let html = render_transcript(&messages);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("message-user"));
        assert!(html.contains("language-rust"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("transcript.html");
        let messages = [ChatMessage::user("a < b")];
        export(&messages, &path).expect("export");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("a &lt; b"));
    }
}
