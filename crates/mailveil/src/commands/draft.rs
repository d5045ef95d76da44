//! Preview and send.

use crate::cli::DraftArgs;
use anyhow::{Context, Result, bail};
use mailveil_core::{Config, Delivery, RemoteRedactor, Session};
use mailveil_dispatch::Attachment;
use mailveil_redact::{RedactionCategory, RedactionSettings};
use std::path::Path;
use tracing::info;

fn parse_category(name: &str) -> Result<RedactionCategory> {
    RedactionCategory::parse(name).with_context(|| {
        let known: Vec<&str> = RedactionCategory::ALL.iter().map(RedactionCategory::as_str).collect();
        format!("Unknown category '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Applies the command-line category options on top of `base`.
pub fn settings_from(args: &DraftArgs, base: &RedactionSettings) -> Result<RedactionSettings> {
    let mut settings = base.clone();

    if !args.only.is_empty() {
        let only = args
            .only
            .iter()
            .map(|name| parse_category(name))
            .collect::<Result<Vec<_>>>()?;
        for category in RedactionCategory::ALL {
            settings.set_enabled(category, only.contains(&category));
        }
    }

    for name in &args.disabled {
        settings.set_enabled(parse_category(name)?, false);
    }

    for pair in &args.placeholders {
        let Some((name, text)) = pair.split_once('=') else {
            bail!("Placeholder '{pair}' must look like CATEGORY=TEXT");
        };
        settings.set_placeholder(parse_category(name)?, text);
    }

    Ok(settings)
}

async fn compose(config: &Config, args: &DraftArgs) -> Result<Session> {
    let mut session = Session::new(settings_from(args, &config.redaction)?);

    let body = match (&args.body, &args.body_file) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read body from {}", path.display()))?,
        (None, None) => String::new(),
    };

    let draft = session.draft_mut()?;
    draft.to.clone_from(&args.to);
    draft.cc.clone_from(&args.cc);
    draft.subject.clone_from(&args.subject);
    draft.body = body;

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image {}", path.display()))?,
        );
    }
    session.add_images(images)?;

    Ok(session)
}

fn print_feedback(session: &Session) {
    for line in session.feedback().render().lines() {
        println!("{line}");
    }
}

/// Redacts the draft and writes `body.txt` and the images into `out`.
pub async fn preview(config: &Config, args: &DraftArgs, out: &Path) -> Result<()> {
    let mut session = compose(config, args).await?;
    let redactor = RemoteRedactor::from_config(config);

    let redacted = session.preview(&redactor).await?.clone();
    print_feedback(&session);

    tokio::fs::create_dir_all(out)
        .await
        .with_context(|| format!("Failed to create {}", out.display()))?;
    tokio::fs::write(out.join("body.txt"), &redacted.body).await?;

    for (index, image) in redacted.images.into_iter().enumerate() {
        let attachment = Attachment::image(index, image);
        tokio::fs::write(out.join(&attachment.filename), &attachment.data).await?;
    }

    info!("Preview written to {}", out.display());
    println!("\n{}", redacted.body);
    Ok(())
}

/// Redacts the draft and sends it with the configured delivery mode.
pub async fn send(config: &Config, args: &DraftArgs) -> Result<()> {
    let mut session = compose(config, args).await?;
    let redactor = RemoteRedactor::from_config(config);
    let delivery = Delivery::from_config(config);

    session.preview(&redactor).await?;
    let report = session.send(&delivery).await?;
    print_feedback(&session);

    if !report.is_delivered() {
        bail!("{}", report.summary());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args() -> DraftArgs {
        DraftArgs {
            to: "a@x.io".to_string(),
            cc: String::new(),
            subject: String::new(),
            body: None,
            body_file: None,
            images: Vec::new(),
            disabled: Vec::new(),
            only: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    #[test]
    fn test_only_and_placeholder() {
        let mut args = args();
        args.only = vec!["phone".to_string(), "Email".to_string()];
        args.placeholders = vec!["phone=[TEL]".to_string()];

        let settings = settings_from(&args, &RedactionSettings::default()).unwrap();
        assert_eq!(
            settings.enabled_categories(),
            vec![RedactionCategory::Email, RedactionCategory::Phone]
        );
        assert_eq!(settings.placeholder(RedactionCategory::Phone), "[TEL]");
    }

    #[test]
    fn test_disable_keeps_others() {
        let mut args = args();
        args.disabled = vec!["ssn".to_string()];
        let settings = settings_from(&args, &RedactionSettings::default()).unwrap();
        assert!(!settings.is_enabled(RedactionCategory::Ssn));
        assert!(settings.is_enabled(RedactionCategory::Name));
    }

    #[test]
    fn test_bad_options_rejected() {
        let mut args = args();
        args.disabled = vec!["shoe size".to_string()];
        let err = settings_from(&args, &RedactionSettings::default()).unwrap_err();
        assert!(err.to_string().starts_with("Unknown category 'shoe size'"));

        let mut args = self::args();
        args.placeholders = vec!["phone".to_string()];
        assert!(settings_from(&args, &RedactionSettings::default()).is_err());
    }
}
