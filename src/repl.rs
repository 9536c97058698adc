//! Interactive chat loop on stdin/stdout.
//!
//! Each agent turn re-renders the full message list onto the surface and
//! re-binds the copy controls; `/copy N` clicks control N, `/export` and
//! `/open` write the HTML transcript.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::clipboard::{ClipboardController, CopyBindings};
use crate::core::config::Config;
use crate::core::message::ChatMessage;
use crate::core::session::Session;
use crate::render::{self, RenderedMessage};
use crate::surface::Surface;
use crate::transcript;

const GREETING: &str = "Hello! I'm CodeMaster, your expert AI coding partner. \
How can I help you solve a programming challenge, debug code, or understand a new concept today?";

const HELP: &str = "Commands: /copy N (copy code block N), /export [PATH], /open [PATH], /quit";

const DEFAULT_TRANSCRIPT: &str = "transcript.html";

pub async fn run(config: &Config) -> io::Result<()> {
    let mut session = Session::new(config);
    let mut messages = vec![ChatMessage::agent(GREETING, Vec::new())];
    let mut surface = Surface::new();
    let controller = ClipboardController::new();
    let mut bindings: Option<CopyBindings> = None;
    rerender(&messages, &mut surface, &controller, &mut bindings);

    println!("{}", GREETING);
    println!("{}", HELP);

    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if let Some(command) = input.strip_prefix('/') {
            if !handle_command(command, &messages, &bindings) {
                break;
            }
            continue;
        }

        messages.push(ChatMessage::user(input));
        match session.send_command(input).await {
            Ok(reply) => {
                println!("{}", reply.text);
                for source in &reply.sources {
                    println!("  source: {}", source.uri);
                }
                messages.push(ChatMessage::agent(reply.text, reply.sources));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                messages.push(ChatMessage::error(e.to_string()));
            }
        }
        let rendered = rerender(&messages, &mut surface, &controller, &mut bindings);
        print_copy_hints(&rendered);
    }
    Ok(())
}

/// Re-render the message list onto the surface and re-bind copy handlers.
/// The old binding is dropped first; a render may have at most one.
fn rerender(
    messages: &[ChatMessage],
    surface: &mut Surface,
    controller: &ClipboardController,
    bindings: &mut Option<CopyBindings>,
) -> Vec<RenderedMessage> {
    *bindings = None;
    let rendered: Vec<RenderedMessage> = messages.iter().map(render::render_bubble).collect();
    surface.show(&rendered);
    match controller.attach(surface) {
        Ok(b) => *bindings = Some(b),
        Err(e) => log::warn!("Could not bind copy controls: {}", e),
    }
    rendered
}

/// List the copy controls of the latest message, with surface-wide indices.
fn print_copy_hints(rendered: &[RenderedMessage]) {
    let Some((last, earlier)) = rendered.split_last() else {
        return;
    };
    if last.blocks.is_empty() {
        return;
    }
    let offset: usize = earlier.iter().map(|m| m.blocks.len()).sum();
    for (i, block) in last.blocks.iter().enumerate() {
        let lang = block.language.as_deref().unwrap_or("text");
        println!(
            "  [{index}] {lang} code block ({lines} lines) - /copy {index}",
            index = offset + i,
            lang = lang,
            lines = block.raw.lines().count(),
        );
    }
}

/// Handle a slash command. Returns false when the loop should exit.
fn handle_command(
    command: &str,
    messages: &[ChatMessage],
    bindings: &Option<CopyBindings>,
) -> bool {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("quit") | Some("exit") => return false,
        Some("copy") => {
            let index = parts.next().and_then(|n| n.parse::<usize>().ok());
            match (index, bindings) {
                (Some(index), Some(bindings)) => match bindings.click(index) {
                    Some(label) => println!("{}", label.as_str()),
                    None => println!("No code block {}", index),
                },
                _ => println!("Usage: /copy N"),
            }
        }
        Some("export") | Some("open") => {
            let open = command.starts_with("open");
            let path: PathBuf = parts
                .next()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT));
            export_transcript(messages, &path, open);
        }
        _ => println!("{}", HELP),
    }
    true
}

fn export_transcript(messages: &[ChatMessage], path: &Path, open: bool) {
    if let Err(e) = transcript::export(messages, path) {
        eprintln!("Error: could not write {}: {}", path.display(), e);
        return;
    }
    println!("Wrote {}", path.display());
    if open {
        if let Err(e) = opener::open(path) {
            eprintln!("Error: could not open {}: {}", path.display(), e);
        }
    }
}
