//! PII categories and per-category redaction settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A category of personally identifiable information.
///
/// The set is closed. Declaration order is the order categories are listed
/// to the classifier and in settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionCategory {
    /// A person's name (never organization names).
    Name,
    /// Email address.
    Email,
    /// Phone number in any format.
    Phone,
    /// Street address, city, state, zip code.
    Address,
    /// Social Security Number.
    Ssn,
    /// Credit card number, including masked card references.
    CreditCard,
    /// API key.
    ApiKey,
    /// Password value.
    Password,
    /// Token value (JWT, session, API tokens).
    Token,
    /// Identification number.
    Id,
    /// Dollar amount.
    Dollar,
    /// Bank or customer account number.
    Account,
}

impl RedactionCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::Ssn,
        Self::CreditCard,
        Self::ApiKey,
        Self::Password,
        Self::Token,
        Self::Id,
        Self::Dollar,
        Self::Account,
    ];

    /// Parse a classifier label. Returns `None` for labels outside the set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "address" => Some(Self::Address),
            "ssn" => Some(Self::Ssn),
            "credit_card" => Some(Self::CreditCard),
            "api_key" => Some(Self::ApiKey),
            "password" => Some(Self::Password),
            "token" => Some(Self::Token),
            "id" => Some(Self::Id),
            "dollar" => Some(Self::Dollar),
            "account" => Some(Self::Account),
            _ => None,
        }
    }

    /// Label used on the wire and in settings files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::Ssn => "ssn",
            Self::CreditCard => "credit_card",
            Self::ApiKey => "api_key",
            Self::Password => "password",
            Self::Token => "token",
            Self::Id => "id",
            Self::Dollar => "dollar",
            Self::Account => "account",
        }
    }

    /// Placeholder used when the user has not edited it.
    #[must_use]
    pub const fn default_placeholder(&self) -> &'static str {
        match self {
            Self::Name => "[NAME]",
            Self::Email => "[EMAIL]",
            Self::Phone => "[PHONE]",
            Self::Address => "[ADDRESS]",
            Self::Ssn => "[SSN]",
            Self::CreditCard => "[CC CARD]",
            Self::ApiKey => "[KEY]",
            Self::Password => "[PASS]",
            Self::Token => "[TOKEN]",
            Self::Id => "[ID]",
            Self::Dollar => "[$]",
            Self::Account => "[ACCOUNT]",
        }
    }

    /// Description given to the classifier when labelling OCR boxes.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Name => {
                "Person's name (first name, last name, full name, or any part of a person's \
                 name) - NOT company names or organization names. IMPORTANT: If you see a first \
                 name, also classify the adjacent last name as 'name' even if it appears in a \
                 separate box."
            }
            Self::Email => "Email address (anything with @ symbol)",
            Self::Phone => "Phone number (any format)",
            Self::Address => "Street address, city, state, zip code",
            Self::Ssn => "Social Security Number",
            Self::CreditCard => {
                "Credit card numbers and card details. This includes full card numbers (like \
                 1234 5678 9012 3456, 1234-5678-9012-3456, 1234567890123456) AND masked card \
                 formats like 'Visa **** 9901', '**** 9901', or similar. Treat the card brand \
                 (e.g., 'Visa'), the masked section (****), and the last 4 digits together as \
                 credit_card so the ENTIRE card reference is redacted, not just part of it."
            }
            Self::ApiKey => "API keys",
            Self::Password => {
                "Passwords, passcodes, or password values (the actual password text, not just \
                 the word 'Password' label)"
            }
            Self::Token => {
                "Tokens (the actual token values, NOT the word 'Token' label itself). Look for \
                 token values that appear next to, below, or after labels like 'Token:', 'Access \
                 Token:', 'API Token:', 'Authentication Token:', etc. Tokens can be long \
                 alphanumeric strings, JWT tokens (often starting with 'eyJ'), API tokens, \
                 session tokens, etc."
            }
            Self::Id => {
                "Identification numbers (user IDs, employee IDs, customer IDs, document IDs, \
                 verification IDs, any alphanumeric IDs with or without hyphens like \
                 'HC-9920-ALPHA', 'PASS-99283-TX') - NOT company names. If you see a label like \
                 'Document ID:' in one box and 'HC-9920-ALPHA' in the next box, classify \
                 'HC-9920-ALPHA' as id. If the entire text box contains 'Document ID: \
                 HC-9920-ALPHA' together, classify the WHOLE box as id."
            }
            Self::Dollar => "Dollar amounts, prices, salaries",
            Self::Account => "Account numbers, bank account numbers",
        }
    }

    /// Description given to the classifier when rewriting body text.
    #[must_use]
    pub const fn text_description(&self) -> &'static str {
        match self {
            Self::Name => "Names (people's names, first names, last names, full names)",
            Self::Email => "Email addresses (anything with @ symbol)",
            Self::Phone => "Phone numbers (any format)",
            Self::Address => "Physical addresses (street addresses, cities, states, zip codes)",
            Self::Ssn => "Social Security Numbers",
            Self::CreditCard => "Credit card numbers",
            Self::ApiKey => "API keys",
            Self::Password => "Passwords",
            Self::Token => "Tokens",
            Self::Id => {
                "ID numbers (user IDs, employee IDs, customer IDs, document IDs, verification \
                 IDs, any alphanumeric IDs with or without hyphens, formats like \
                 'HC-9920-ALPHA', 'PASS-99283-TX', 'Document ID: XXX-XXXX-XXX', 'Verification \
                 ID: XXX-XXXX-XXX', etc)"
            }
            Self::Dollar => "Dollar amounts (prices, salaries, costs, $ amounts)",
            Self::Account => "Account numbers (bank accounts, customer accounts)",
        }
    }
}

impl std::fmt::Display for RedactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-controlled state of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySetting {
    /// Whether the category is redacted at all.
    pub enabled: bool,
    /// Replacement text in the body and label text on images.
    pub placeholder: String,
}

impl CategorySetting {
    fn default_for(category: RedactionCategory) -> Self {
        Self {
            enabled: true,
            placeholder: category.default_placeholder().to_string(),
        }
    }
}

/// Enablement and placeholder for every [`RedactionCategory`].
///
/// Passed as a single value into every component. Always holds an entry for
/// each category; missing entries in a settings file fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<RedactionCategory, CategorySetting>")]
#[serde(into = "BTreeMap<RedactionCategory, CategorySetting>")]
pub struct RedactionSettings {
    categories: BTreeMap<RedactionCategory, CategorySetting>,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<RedactionCategory, CategorySetting>> for RedactionSettings {
    fn from(mut categories: BTreeMap<RedactionCategory, CategorySetting>) -> Self {
        for category in RedactionCategory::ALL {
            categories
                .entry(category)
                .or_insert_with(|| CategorySetting::default_for(category));
        }
        Self { categories }
    }
}

impl From<RedactionSettings> for BTreeMap<RedactionCategory, CategorySetting> {
    fn from(settings: RedactionSettings) -> Self {
        settings.categories
    }
}

impl RedactionSettings {
    /// Creates settings with every category enabled and default placeholders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings with every category disabled.
    #[must_use]
    pub fn none_enabled() -> Self {
        let mut settings = Self::default();
        for setting in settings.categories.values_mut() {
            setting.enabled = false;
        }
        settings
    }

    /// Creates settings where only the given categories are enabled.
    #[must_use]
    pub fn only(enabled: &[RedactionCategory]) -> Self {
        let mut settings = Self::none_enabled();
        for category in enabled {
            settings.set_enabled(*category, true);
        }
        settings
    }

    /// Returns the setting for a category.
    #[must_use]
    pub fn get(&self, category: RedactionCategory) -> CategorySetting {
        self.categories
            .get(&category)
            .cloned()
            .unwrap_or_else(|| CategorySetting::default_for(category))
    }

    /// Checks whether a category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: RedactionCategory) -> bool {
        self.categories.get(&category).is_some_and(|s| s.enabled)
    }

    /// Returns the current placeholder for a category.
    #[must_use]
    pub fn placeholder(&self, category: RedactionCategory) -> &str {
        self.categories
            .get(&category)
            .map_or_else(|| category.default_placeholder(), |s| s.placeholder.as_str())
    }

    /// Enables or disables a category.
    pub fn set_enabled(&mut self, category: RedactionCategory, enabled: bool) {
        self.categories
            .entry(category)
            .or_insert_with(|| CategorySetting::default_for(category))
            .enabled = enabled;
    }

    /// Replaces the placeholder of a category.
    pub fn set_placeholder(&mut self, category: RedactionCategory, placeholder: impl Into<String>) {
        self.categories
            .entry(category)
            .or_insert_with(|| CategorySetting::default_for(category))
            .placeholder = placeholder.into();
    }

    /// Enabled categories in declaration order.
    #[must_use]
    pub fn enabled_categories(&self) -> Vec<RedactionCategory> {
        RedactionCategory::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    /// Checks whether at least one category is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.categories.values().any(|s| s.enabled)
    }

    /// Restores defaults: everything enabled, default placeholders.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
