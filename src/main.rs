//! # CodeMaster - AI coding assistant chat
//!
//! Entry point for CodeMaster, a chat client whose agent replies are rendered
//! into safe HTML transcripts: fenced code blocks get copy-to-clipboard
//! controls, everything untrusted is entity-escaped.
//!
//! ## Modes
//! - Single prompt with `-p` or `--prompt` (optionally `--export`/`--open`)
//! - Interactive chat loop (default)

mod clipboard;
mod core;
mod render;
mod repl;
mod surface;
mod transcript;

use std::path::PathBuf;

use clap::Parser;
use dotenv::dotenv;

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "An AI coding assistant chat that renders replies as safe HTML"
)]
struct Args {
    /// Send a single prompt then exit (without opening the chat loop)
    #[arg(
        short = 'p',
        long,
        help = "Provide a prompt to get an immediate AI response"
    )]
    prompt: Option<String>,

    /// Write the rendered HTML transcript to this path after the run
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Open the exported transcript in the default browser (implies --export)
    #[arg(long)]
    open: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging (warn level by default; use RUST_LOG=debug for verbose)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init()
        .ok();

    let args = Args::parse();

    // Load configuration (print user-friendly message; exit uses Display not Debug)
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Some(prompt) = args.prompt {
        let mut session = core::session::Session::new(&config);
        let mut messages = vec![core::message::ChatMessage::user(&prompt)];
        let reply = session.send_command(&prompt).await?;
        println!("{}", reply.text);
        for source in &reply.sources {
            println!("  source: {}", source.uri);
        }
        messages.push(core::message::ChatMessage::agent(reply.text, reply.sources));

        let export_path = args
            .export
            .or_else(|| args.open.then(|| PathBuf::from("transcript.html")));
        if let Some(path) = export_path {
            transcript::export(&messages, &path)?;
            eprintln!("Wrote {}", path.display());
            if args.open {
                opener::open(&path)?;
            }
        }
        return Ok(());
    }

    repl::run(&config).await?;
    Ok(())
}
