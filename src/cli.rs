//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};

/// Phrase cards with background images from a fallback chain of image backends.
#[derive(Parser, Debug)]
#[command(name = "phrasebook", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Listen address (overrides config and `PHRASEBOOK_BIND`).
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Ask the image chain for one locator and print it.
    Generate {
        /// Text the image should illustrate.
        #[arg(conflicts_with = "text_file")]
        text: Option<String>,

        /// Path to a file containing the text.
        #[arg(short = 'f', long, conflicts_with = "text")]
        text_file: Option<String>,

        /// Tag passed to the backends (repeatable).
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
}

impl Command {
    /// Resolve the text from either the positional argument or the file flag.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not `generate`, if neither text nor
    /// text-file is provided, or if the file cannot be read.
    pub fn resolve_text(&self) -> Result<String, std::io::Error> {
        match self {
            Self::Generate { text: Some(text), .. } => Ok(text.clone()),
            Self::Generate { text_file: Some(path), .. } => std::fs::read_to_string(path),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Provide a text string or use -f/--text-file",
            )),
        }
    }
}
