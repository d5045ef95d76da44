//! Prompt construction.
//!
//! Prompts only ever mention enabled categories. Rules tied to a category
//! are included only when that category is enabled.

use mailveil_redact::{RedactionCategory, RedactionSettings, TextBox};

/// Builds the body-text redaction prompt.
///
/// Returns `None` when no category is enabled.
#[must_use]
pub fn text_prompt(text: &str, settings: &RedactionSettings) -> Option<String> {
    let enabled = settings.enabled_categories();
    if enabled.is_empty() {
        return None;
    }

    let mut prompt = String::from(
        "You are an email privacy protection tool. Redact ONLY the sensitive information \
         types listed below from the following email content by replacing them with the \
         specified placeholders:\n\n",
    );

    for category in &enabled {
        prompt.push_str(&format!(
            "- {} → {}\n",
            category.text_description(),
            settings.placeholder(*category)
        ));
    }

    prompt.push_str(
        "\nCRITICAL RULES:\n\
         1. ONLY redact the types listed above. Do NOT redact anything else.\n\
         2. Leave ALL other information completely unchanged, including any types not listed above.\n\
         3. DO NOT redact company names, organization names, or business names.\n\
         4. DO NOT redact common nouns, generic terms, or non-sensitive information.\n\
         5. Replace each item with the EXACT placeholder shown for its type.\n\
         6. If a type is not in the list above, leave it exactly as it appears in the original text.\n",
    );

    if enabled.contains(&RedactionCategory::Id) {
        prompt.push_str(
            "7. FOR ID NUMBERS: Redact ALL identification numbers including alphanumeric IDs with \
             hyphens and prefixes like \"Document ID:\", \"Verification ID:\", \"Reference ID:\". \
             Examples: \"HC-9920-ALPHA\", \"PASS-99283-TX\", \"Document ID: HC-9920-ALPHA\".\n",
        );
    }

    prompt.push_str(
        "\nBe thorough and catch all instances of the listed types. Return ONLY the redacted \
         email content with no additional commentary or explanation.\n\n\
         Email content to redact:\n",
    );
    prompt.push_str(text);

    Some(prompt)
}

/// Builds the OCR box classification prompt.
///
/// Boxes are listed as `index: text` lines. Returns `None` when no
/// category is enabled.
#[must_use]
pub fn classification_prompt(boxes: &[TextBox], settings: &RedactionSettings) -> Option<String> {
    let enabled = settings.enabled_categories();
    if enabled.is_empty() {
        return None;
    }

    let mut prompt = String::from(
        "Analyze the following text extracted from an image via OCR. Identify which items \
         contain sensitive information that should be redacted.\n\n\
         For each line number that contains sensitive information, classify it as one of \
         these types ONLY:\n",
    );

    for category in &enabled {
        prompt.push_str(&format!("- {}: {}\n", category.as_str(), category.description()));
    }

    prompt.push_str(
        "\nCRITICAL RULES:\n\
         - ONLY classify the types listed above. Never use a type that is not listed, even if \
         something looks similar.\n\
         - DO NOT classify company names, organization names, or business names.\n\
         - DO NOT confuse types: names are \"name\" not \"id\", emails are \"email\" not \"address\".\n\
         - Common nouns and generic terms are NOT sensitive information.\n\
         - If unsure whether something matches a listed type, do NOT include it.\n",
    );

    for category in &enabled {
        if let Some(rule) = category_rule(*category) {
            prompt.push_str("- ");
            prompt.push_str(rule);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nText to analyze:\n");
    for (index, text_box) in boxes.iter().enumerate() {
        prompt.push_str(&format!("{index}: {}\n", text_box.text));
    }

    prompt.push_str(
        "\nRespond with ONLY a valid JSON object in this exact format:\n\
         {\n  \"0\": \"name\",\n  \"5\": \"email\",\n  \"12\": \"phone\"\n}\n\n\
         Include ONLY the line numbers that contain sensitive information matching the types \
         above. Do NOT include any explanation, markdown formatting, or additional text.",
    );

    Some(prompt)
}

const fn category_rule(category: RedactionCategory) -> Option<&'static str> {
    match category {
        RedactionCategory::Name => Some(
            "FOR NAMES: classify BOTH first names AND last names as \"name\", even when they \
             appear in separate boxes or on adjacent lines.",
        ),
        RedactionCategory::Password => Some(
            "FOR PASSWORDS: classify the ACTUAL password values, NOT labels like \"Password:\". \
             In \"Password (Secure!Health99)\" classify \"Secure!Health99\".",
        ),
        RedactionCategory::Token => Some(
            "FOR TOKENS: classify the ACTUAL token values, NOT labels like \"Access Token:\". \
             If \"Token:\" is on one line and the value on the next, classify the value line.",
        ),
        RedactionCategory::CreditCard => Some(
            "FOR CREDIT CARDS: classify full card numbers in any format AND masked formats like \
             \"Visa **** 9901\"; the brand, the masked section and the last 4 digits are all \
             credit_card, but label words like \"Payment Card:\" are not.",
        ),
        RedactionCategory::Id => Some(
            "FOR IDs: if a box holds both a label and a value (\"Document ID: HC-9920-ALPHA\") \
             classify the whole box as id. If the label and value are in separate boxes, \
             classify the value box. Alphanumeric hyphenated patterns like \"ABC-1234-XYZ\" \
             near ID labels are id.",
        ),
        RedactionCategory::Address => Some(
            "FOR ADDRESSES: classify the actual street, city, state and zip values, NOT labels \
             like \"Mailing Address:\".",
        ),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt_lists_only_enabled() {
        let mut settings = RedactionSettings::only(&[RedactionCategory::Email, RedactionCategory::Phone]);
        settings.set_placeholder(RedactionCategory::Email, "<mail>");

        let prompt = text_prompt("Call me at 555-0100", &settings).unwrap();
        assert!(prompt.contains("Email addresses (anything with @ symbol) → <mail>"));
        assert!(prompt.contains("Phone numbers (any format) → [PHONE]\n"));
        assert!(!prompt.contains("[NAME]"));
        assert!(!prompt.contains("FOR ID NUMBERS"));
        assert!(prompt.ends_with("Call me at 555-0100"));
    }

    #[test]
    fn test_text_prompt_none_enabled() {
        assert!(text_prompt("hello", &RedactionSettings::none_enabled()).is_none());
    }

    #[test]
    fn test_text_prompt_id_rule() {
        let prompt = text_prompt("x", &RedactionSettings::only(&[RedactionCategory::Id])).unwrap();
        assert!(prompt.contains("FOR ID NUMBERS"));
    }

    #[test]
    fn test_classification_prompt_indexes_boxes() {
        let boxes = vec![
            TextBox::new("Jane", 0.0, 0.0, 10.0, 10.0),
            TextBox::new("Doe", 20.0, 0.0, 10.0, 10.0),
        ];
        let settings = RedactionSettings::only(&[RedactionCategory::Name]);
        let prompt = classification_prompt(&boxes, &settings).unwrap();

        assert!(prompt.contains("0: Jane\n1: Doe\n"));
        assert!(prompt.contains("- name: Person's name"));
        assert!(prompt.contains("FOR NAMES"));
        assert!(!prompt.contains("- ssn:"));
        assert!(!prompt.contains("FOR PASSWORDS"));
    }

    #[test]
    fn test_classification_prompt_none_enabled() {
        let boxes = vec![TextBox::new("x", 0.0, 0.0, 1.0, 1.0)];
        assert!(classification_prompt(&boxes, &RedactionSettings::none_enabled()).is_none());
    }
}
