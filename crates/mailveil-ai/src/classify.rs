//! Sensitivity classification of OCR boxes.

use crate::client::AiClient;
use crate::error::{Error, Result};
use crate::prompt::classification_prompt;
use mailveil_redact::{
    FeedbackSink, RedactionCategory, RedactionSettings, SensitivityMap, TextBox,
    merge_same_category,
};
use serde_json::Value;
use tracing::{debug, info};

/// Temperature for classification.
const CLASSIFY_TEMPERATURE: f32 = 0.1;

/// Entries listed individually in feedback.
const FEEDBACK_PREVIEW: usize = 5;

impl AiClient {
    /// Classifies every box in one request.
    ///
    /// The reply is filtered locally: unknown labels, out-of-range indices
    /// and disabled categories never reach the returned map. Empty input or
    /// nothing enabled returns an empty map without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is not a JSON object.
    pub async fn classify_boxes(
        &self,
        boxes: &[TextBox],
        settings: &RedactionSettings,
        feedback: &impl FeedbackSink,
    ) -> Result<SensitivityMap> {
        if boxes.is_empty() {
            return Ok(SensitivityMap::new());
        }
        let Some(prompt) = classification_prompt(boxes, settings) else {
            debug!("No categories enabled, skipping classification");
            return Ok(SensitivityMap::new());
        };

        feedback.emit(&format!("Classifying {} text region(s)...", boxes.len()));

        let completion = self.complete(&prompt, CLASSIFY_TEMPERATURE).await?;
        let map = parse_sensitivity_response(&completion.content, boxes.len(), settings)?;

        info!("Classifier identified {} sensitive item(s)", map.len());
        report(&map, boxes, feedback);

        Ok(map)
    }
}

/// Removes markdown code fences around a model reply.
#[must_use]
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();

    let inner = if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            trimmed.to_string()
        }
    } else {
        trimmed.to_string()
    };

    inner.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses a classifier reply of the form `{"index": "category", ...}`.
///
/// Entries that do not name a valid index or an enabled category are dropped.
///
/// # Errors
///
/// Returns a malformed error if the reply is not a JSON object.
pub fn parse_sensitivity_response(
    content: &str,
    box_count: usize,
    settings: &RedactionSettings,
) -> Result<SensitivityMap> {
    let cleaned = strip_code_fences(content);

    let Value::Object(entries) = serde_json::from_str::<Value>(&cleaned)? else {
        return Err(Error::InvalidResponse(
            "expected a JSON object of index to category".to_string(),
        ));
    };

    let mut map = SensitivityMap::new();
    for (key, label) in entries {
        let Ok(index) = key.trim().parse::<usize>() else {
            debug!("Ignoring non-numeric key '{key}'");
            continue;
        };
        let Some(category) = label.as_str().and_then(RedactionCategory::parse) else {
            debug!("Ignoring unknown category {label} for box {index}");
            continue;
        };
        map.insert(index, category);
    }

    let before = map.len();
    map.retain_valid(box_count, settings);
    if map.len() < before {
        debug!(
            "Dropped {} entries for disabled categories or unknown boxes",
            before - map.len()
        );
    }

    Ok(map)
}

/// Attaches categories to boxes, drops disabled ones and merges same-category neighbours.
#[must_use]
pub fn find_sensitive_boxes(
    boxes: &[TextBox],
    map: &SensitivityMap,
    settings: &RedactionSettings,
) -> Vec<TextBox> {
    merge_same_category(map.select(boxes, settings))
}

fn report(map: &SensitivityMap, boxes: &[TextBox], feedback: &impl FeedbackSink) {
    feedback.emit(&format!("Identified {} sensitive item(s)", map.len()));

    for (index, category) in map.iter().take(FEEDBACK_PREVIEW) {
        if let Some(text_box) = boxes.get(index) {
            feedback.emit(&format!("  • {category}: '{}'", text_box.text));
        }
    }
    if map.len() > FEEDBACK_PREVIEW {
        feedback.emit(&format!("  ... and {} more", map.len() - FEEDBACK_PREVIEW));
    }
}
