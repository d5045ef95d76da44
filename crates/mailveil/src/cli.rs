use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailveil")]
#[command(about = "Redact PII from email text and images before sending", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Redact a draft and write the result without sending
    Preview {
        #[command(flatten)]
        draft: DraftArgs,

        /// Directory for the redacted body and images
        #[arg(long, default_value = "redacted")]
        out: PathBuf,
    },

    /// Redact a draft and send it
    Send {
        #[command(flatten)]
        draft: DraftArgs,
    },

    /// List redaction categories and their placeholders
    Categories,

    /// Manage the settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct DraftArgs {
    /// Recipients, separated by `,` or `;`
    #[arg(long)]
    pub to: String,

    /// Carbon-copy recipients
    #[arg(long, default_value = "")]
    pub cc: String,

    /// Subject line (never redacted)
    #[arg(long, default_value = "")]
    pub subject: String,

    /// Body text
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Image to attach (repeatable, at most 4)
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Category to leave unredacted (repeatable)
    #[arg(long = "disable", value_name = "CATEGORY")]
    pub disabled: Vec<String>,

    /// Redact only these categories (repeatable)
    #[arg(long = "only", value_name = "CATEGORY", conflicts_with = "disabled")]
    pub only: Vec<String>,

    /// Placeholder override (repeatable)
    #[arg(long = "placeholder", value_name = "CATEGORY=TEXT")]
    pub placeholders: Vec<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file path
    Path,

    /// Print the effective configuration with keys masked
    Show,

    /// Write a settings file with the current configuration
    Init,
}
