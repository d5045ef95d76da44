//! OCR.space client.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mailveil_redact::{FeedbackSink, TextBox};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default OCR.space endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OCR engine 2 handles structured documents better than engine 1.
const OCR_ENGINE: &str = "2";

/// Characters of an error body kept in [`Error::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// OCR.space client.
#[derive(Debug, Clone)]
pub struct OcrClient {
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
    http_client: Client,
}

/// Decoded OCR reply.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrOutcome {
    /// Recognized words, possibly none.
    Words(Vec<TextBox>),
    /// The service processed the request but reported an error.
    ServiceError(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    #[serde(default)]
    error_message: Option<Value>,
    #[serde(default)]
    parsed_results: Vec<ParsedResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    text_overlay: Option<TextOverlay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextOverlay {
    #[serde(default)]
    lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Line {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Word {
    #[serde(default)]
    word_text: String,
    #[serde(default)]
    left: f64,
    #[serde(default)]
    top: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl OcrClient {
    /// Creates a client for the default endpoint.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
            http_client: Client::new(),
        }
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks whether an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Extracts word boxes from an encoded image.
    ///
    /// A service-reported processing error or an image without text yields
    /// an empty list; both are valid results and are reported through
    /// `feedback`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no key is configured, the request fails,
    /// or the status is not a success. Returns a malformed error if the
    /// reply is not valid JSON.
    pub async fn extract_text_with_boxes(
        &self,
        image_bytes: &[u8],
        feedback: &impl FeedbackSink,
    ) -> Result<Vec<TextBox>> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        feedback.emit("Extracting text from image...");

        let data_uri = format!(
            "data:{};base64,{}",
            sniff_mime_type(image_bytes),
            STANDARD.encode(image_bytes)
        );
        let params = [
            ("apikey", api_key),
            ("base64Image", data_uri.as_str()),
            ("OCREngine", OCR_ENGINE),
            ("scale", "true"),
            ("isTable", "false"),
            ("detectOrientation", "true"),
        ];

        debug!("OCR request to {} ({} image bytes)", self.endpoint, image_bytes.len());

        let response = self
            .http_client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        match parse_ocr_response(&body)? {
            OcrOutcome::Words(boxes) if boxes.is_empty() => {
                info!("OCR found no text");
                feedback.emit("No text detected in image");
                Ok(boxes)
            }
            OcrOutcome::Words(boxes) => {
                info!("OCR found {} words", boxes.len());
                feedback.emit(&format!("Found {} text elements", boxes.len()));
                Ok(boxes)
            }
            OcrOutcome::ServiceError(message) => {
                warn!("OCR service error: {message}");
                feedback.emit(&format!("OCR service error: {message}"));
                Ok(Vec::new())
            }
        }
    }
}

/// Decodes an OCR.space reply.
///
/// Words with blank text are skipped; negative geometry is clamped to zero.
///
/// # Errors
///
/// Returns an error if the body is not a JSON object of the expected shape.
pub fn parse_ocr_response(body: &str) -> Result<OcrOutcome> {
    let response: OcrResponse = serde_json::from_str(body)?;

    if response.is_errored_on_processing {
        return Ok(OcrOutcome::ServiceError(error_message(
            response.error_message.as_ref(),
        )));
    }

    let boxes = response
        .parsed_results
        .into_iter()
        .next()
        .and_then(|result| result.text_overlay)
        .map(|overlay| {
            overlay
                .lines
                .into_iter()
                .flat_map(|line| line.words)
                .filter_map(|word| {
                    let text = word.word_text.trim();
                    (!text.is_empty())
                        .then(|| TextBox::new(text, word.left, word.top, word.width, word.height))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(OcrOutcome::Words(boxes))
}

/// `ErrorMessage` is either a string or a list of strings.
fn error_message(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(messages)) => messages
            .first()
            .map_or_else(|| "Unknown error".to_string(), |m| {
                m.as_str().map_or_else(|| m.to_string(), str::to_string)
            }),
        Some(Value::Null) | None => "Unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or("image/png", |format| format.to_mime_type())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mailveil_redact::{ErrorKind, NoFeedback};

    const SAMPLE: &str = r#"{
        "ParsedResults": [{
            "TextOverlay": {
                "Lines": [
                    {"LineText": "Jane Doe", "Words": [
                        {"WordText": "Jane", "Left": 10, "Top": 5, "Height": 12, "Width": 30},
                        {"WordText": "Doe", "Left": 45.5, "Top": 5, "Height": 12, "Width": 25}
                    ], "MaxHeight": 12, "MinTop": 5},
                    {"LineText": "x", "Words": [
                        {"WordText": "   ", "Left": 0, "Top": 0, "Height": 1, "Width": 1},
                        {"WordText": "555-0100", "Left": -2, "Top": 30, "Height": 12, "Width": 60}
                    ]}
                ],
                "HasOverlay": true
            },
            "FileParseExitCode": 1,
            "ParsedText": "Jane Doe\r\n555-0100\r\n"
        }],
        "OCRExitCode": 1,
        "IsErroredOnProcessing": false,
        "ProcessingTimeInMilliseconds": "312"
    }"#;

    #[test]
    fn test_parse_words() {
        let OcrOutcome::Words(boxes) = parse_ocr_response(SAMPLE).unwrap() else {
            panic!("expected words");
        };
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].text, "Jane");
        assert_eq!((boxes[1].x, boxes[1].width), (45.5, 25.0));
        assert_eq!(boxes[2].text, "555-0100");
        assert_eq!(boxes[2].x, 0.0);
        assert!(boxes.iter().all(|b| b.category.is_none()));
    }

    #[test]
    fn test_parse_no_text() {
        let body = r#"{"ParsedResults": [{"TextOverlay": {"Lines": []}}], "IsErroredOnProcessing": false}"#;
        assert_eq!(parse_ocr_response(body).unwrap(), OcrOutcome::Words(Vec::new()));

        let body = r#"{"IsErroredOnProcessing": false}"#;
        assert_eq!(parse_ocr_response(body).unwrap(), OcrOutcome::Words(Vec::new()));
    }

    #[test]
    fn test_parse_service_error_list() {
        let body = r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["File failed validation", "second"]}"#;
        assert_eq!(
            parse_ocr_response(body).unwrap(),
            OcrOutcome::ServiceError("File failed validation".to_string())
        );
    }

    #[test]
    fn test_parse_service_error_string() {
        let body = r#"{"IsErroredOnProcessing": true, "ErrorMessage": "Invalid API key"}"#;
        assert_eq!(
            parse_ocr_response(body).unwrap(),
            OcrOutcome::ServiceError("Invalid API key".to_string())
        );

        let body = r#"{"IsErroredOnProcessing": true}"#;
        assert_eq!(
            parse_ocr_response(body).unwrap(),
            OcrOutcome::ServiceError("Unknown error".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_ocr_response("\"The API key is invalid\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(parse_ocr_response("<html></html>").is_err());
    }

    #[test]
    fn test_sniff_mime_type() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniff_mime_type(&png), "image/png");
        assert_eq!(sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime_type(b"????"), "image/png");
    }

    #[test]
    fn test_missing_key_is_transport() {
        let client = OcrClient::new(None);
        assert!(!client.has_api_key());
        let err = tokio_test::block_on(client.extract_text_with_boxes(b"img", &NoFeedback)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
