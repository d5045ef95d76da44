//! OCR text boxes and classifier output.

use crate::category::{RedactionCategory, RedactionSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OCR-detected word, or a merged group of words.
///
/// Coordinates are image pixels with a top-left origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Recognized text.
    pub text: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Category assigned by the classifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RedactionCategory>,
}

impl TextBox {
    /// Creates an unclassified box. Negative values are clamped to zero.
    #[must_use]
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            x: x.max(0.0),
            y: y.max(0.0),
            width: width.max(0.0),
            height: height.max(0.0),
            category: None,
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: RedactionCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Classifier output: box index to category.
///
/// Indices refer to positions in the box sequence that was classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitivityMap {
    entries: BTreeMap<usize, RedactionCategory>,
}

impl SensitivityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a category to a box index, replacing any previous one.
    pub fn insert(&mut self, index: usize, category: RedactionCategory) {
        self.entries.insert(index, category);
    }

    /// Returns the category of a box index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RedactionCategory> {
        self.entries.get(&index).copied()
    }

    /// Number of classified boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether nothing was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, RedactionCategory)> + '_ {
        self.entries.iter().map(|(i, c)| (*i, *c))
    }

    /// Drops entries whose category is disabled or whose index is out of range.
    pub fn retain_valid(&mut self, box_count: usize, settings: &RedactionSettings) {
        self.entries
            .retain(|index, category| *index < box_count && settings.is_enabled(*category));
    }

    /// Returns the classified boxes with their category attached.
    ///
    /// Boxes of disabled categories are left out even if the map names them.
    #[must_use]
    pub fn select(&self, boxes: &[TextBox], settings: &RedactionSettings) -> Vec<TextBox> {
        boxes
            .iter()
            .enumerate()
            .filter_map(|(index, text_box)| {
                let category = self.get(index)?;
                settings
                    .is_enabled(category)
                    .then(|| text_box.clone().with_category(category))
            })
            .collect()
    }
}

impl FromIterator<(usize, RedactionCategory)> for SensitivityMap {
    fn from_iter<I: IntoIterator<Item = (usize, RedactionCategory)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn boxes() -> Vec<TextBox> {
        vec![
            TextBox::new("John", 0.0, 0.0, 40.0, 12.0),
            TextBox::new("123-45-6789", 50.0, 0.0, 90.0, 12.0),
            TextBox::new("hello", 0.0, 20.0, 40.0, 12.0),
        ]
    }

    #[test]
    fn test_new_clamps_negative_geometry() {
        let b = TextBox::new("x", -3.0, -1.0, -5.0, 4.0);
        assert_eq!((b.x, b.y, b.width, b.height), (0.0, 0.0, 0.0, 4.0));
    }

    #[test]
    fn test_select_attaches_categories() {
        let map: SensitivityMap = [(0, RedactionCategory::Name)].into_iter().collect();
        let selected = map.select(&boxes(), &RedactionSettings::default());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].text, "John");
        assert_eq!(selected[0].category, Some(RedactionCategory::Name));
    }

    #[test]
    fn test_select_suppresses_disabled_category() {
        let map: SensitivityMap = [(0, RedactionCategory::Name), (1, RedactionCategory::Ssn)]
            .into_iter()
            .collect();
        let mut settings = RedactionSettings::default();
        settings.set_enabled(RedactionCategory::Ssn, false);

        let selected = map.select(&boxes(), &settings);
        assert_eq!(selected.len(), 1);
        assert!(
            selected
                .iter()
                .all(|b| b.category != Some(RedactionCategory::Ssn))
        );
    }

    #[test]
    fn test_retain_valid_drops_out_of_range_and_disabled() {
        let mut map: SensitivityMap = [
            (0, RedactionCategory::Name),
            (1, RedactionCategory::Ssn),
            (7, RedactionCategory::Email),
        ]
        .into_iter()
        .collect();
        map.retain_valid(3, &RedactionSettings::only(&[RedactionCategory::Name]));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(0), Some(RedactionCategory::Name));
    }
}
