//! CLI definitions for bite.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// bite CLI.
#[derive(Parser)]
#[command(name = "bite")]
#[command(about = "Transcript sync bridge between a web editor and a local companion")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.bite/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the companion endpoint in the foreground
    Serve {
        /// Listen host (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides [server].port)
        #[arg(long)]
        port: Option<u16>,

        /// Append received transcripts to this Markdown file
        #[arg(long)]
        outline: Option<PathBuf>,
    },

    /// Attach an in-memory page to a running companion and replay its commands
    Attach {
        /// Page fixture (JSON: sections, speed, playhead)
        #[arg(long)]
        page: PathBuf,

        /// Push a content snapshot as soon as the session opens
        #[arg(long)]
        push_content: bool,
    },

    /// Queue a push message on a running companion
    Send {
        /// Command object or `[command, patch]` array, as JSON
        message: String,
    },

    /// Render a content snapshot file as a Markdown outline
    Outline {
        /// Content payload (JSON keyed by section label)
        file: PathBuf,
    },
}
