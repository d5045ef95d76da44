//! Settings file and category listing.

use crate::cli::ConfigCommands;
use anyhow::Result;
use mailveil_core::Config;
use mailveil_redact::RedactionCategory;

const MASK: &str = "********";

/// Copy of `config` safe to print.
pub fn masked(config: &Config) -> Config {
    let mask = |key: &Option<String>| key.as_ref().map(|_| MASK.to_string());
    Config {
        groq_api_key: mask(&config.groq_api_key),
        ocrspace_api_key: mask(&config.ocrspace_api_key),
        resend_api_key: mask(&config.resend_api_key),
        sendgrid_api_key: mask(&config.sendgrid_api_key),
        ..config.clone()
    }
}

/// Runs a `config` subcommand.
pub async fn handle(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Path => println!("{}", Config::settings_path().display()),
        ConfigCommands::Show => println!("{}", serde_json::to_string_pretty(&masked(config))?),
        ConfigCommands::Init => {
            // Keys stay in the environment.
            let file = Config {
                groq_api_key: None,
                ocrspace_api_key: None,
                resend_api_key: None,
                sendgrid_api_key: None,
                ..config.clone()
            };
            file.save().await?;
            println!("Wrote {}", Config::settings_path().display());
        }
    }
    Ok(())
}

/// Prints every category with its state and placeholder.
pub fn categories(config: &Config) {
    for category in RedactionCategory::ALL {
        let state = if config.redaction.is_enabled(category) { "on " } else { "off" };
        println!(
            "{state}  {:<12} {:<16} {}",
            category.as_str(),
            config.redaction.placeholder(category),
            category.description()
        );
    }
}
