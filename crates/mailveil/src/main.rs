//! `mailveil` - Redact PII from email text and images before sending
//!
//! Body text is rewritten by a language model; images go through OCR, box
//! classification and compositing. Delivery uses Mailpit locally or Resend
//! with `SendGrid` fallback in production.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use mailveil_core::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailveil=info,mailveil_core=info,mailveil_ai=info,mailveil_ocr=info,mailveil_dispatch=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    info!("Starting mailveil");
    let config = Config::load().await?;

    match cli.command {
        cli::Commands::Preview { draft, out } => commands::draft::preview(&config, &draft, &out).await,
        cli::Commands::Send { draft } => commands::draft::send(&config, &draft).await,
        cli::Commands::Categories => {
            commands::settings::categories(&config);
            Ok(())
        }
        cli::Commands::Config(command) => commands::settings::handle(command, &config).await,
    }
}
