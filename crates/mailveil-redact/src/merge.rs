//! Box merging geometry.
//!
//! Two passes share one traversal: boxes are sorted by `y` then `x`
//! (stable), and each box either joins the current group or closes it.
//! The sort order decides which boxes count as neighbours when the
//! thresholds are borderline.

use crate::category::RedactionCategory;
use crate::text_box::TextBox;

/// Default horizontal gap for line merging, in pixels.
pub const LINE_MERGE_DISTANCE: f64 = 20.0;

/// Vertical tolerance for line merging, as a fraction of the previous box height.
const LINE_Y_TOLERANCE: f64 = 0.5;

/// Vertical tolerance for same-category merging.
const CATEGORY_Y_TOLERANCE: f64 = 0.6;

/// Maximum horizontal gap between two boxes of a category that still merge.
///
/// First and last names are often far apart, split numbers are not.
#[must_use]
pub const fn max_gap(category: Option<RedactionCategory>) -> f64 {
    match category {
        Some(RedactionCategory::Name) => 100.0,
        Some(RedactionCategory::Phone | RedactionCategory::CreditCard) => 15.0,
        _ => 30.0,
    }
}

/// Merges raw OCR word boxes into line-level boxes.
///
/// Two consecutive boxes join when `|Δy| < 0.5 × previous height` and the
/// horizontal gap is in `[0, max_distance)`. Not part of the default
/// pipeline, which classifies word boxes directly.
#[must_use]
pub fn merge_adjacent_boxes(boxes: Vec<TextBox>, max_distance: f64) -> Vec<TextBox> {
    merge_sorted(boxes, |prev, next| {
        same_line(prev, next, LINE_Y_TOLERANCE) && within_gap(prev, next, max_distance)
    })
}

/// Merges classified boxes of the same category that sit on one line.
///
/// Two consecutive boxes join when they share a category,
/// `|Δy| < 0.6 × previous height`, and the gap is in
/// `[0, max_gap(category))`.
#[must_use]
pub fn merge_same_category(boxes: Vec<TextBox>) -> Vec<TextBox> {
    merge_sorted(boxes, |prev, next| {
        prev.category == next.category
            && same_line(prev, next, CATEGORY_Y_TOLERANCE)
            && within_gap(prev, next, max_gap(prev.category))
    })
}

/// Collapses a group into its bounding box.
///
/// Text is the space-joined member text in group order; the category is
/// taken from the first member. A single-member group is returned as is.
/// Returns `None` for an empty group.
#[must_use]
pub fn merge_group(group: Vec<TextBox>) -> Option<TextBox> {
    if group.len() <= 1 {
        return group.into_iter().next();
    }

    let min_x = group.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
    let min_y = group.iter().map(|b| b.y).fold(f64::INFINITY, f64::min);
    let max_x = group.iter().map(TextBox::right).fold(f64::NEG_INFINITY, f64::max);
    let max_y = group.iter().map(TextBox::bottom).fold(f64::NEG_INFINITY, f64::max);

    let text = group
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(TextBox {
        text,
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
        category: group[0].category,
    })
}

fn same_line(prev: &TextBox, next: &TextBox, tolerance: f64) -> bool {
    (next.y - prev.y).abs() < prev.height * tolerance
}

fn within_gap(prev: &TextBox, next: &TextBox, max_distance: f64) -> bool {
    let gap = next.x - prev.right();
    (0.0..max_distance).contains(&gap)
}

fn merge_sorted<F>(mut boxes: Vec<TextBox>, joins: F) -> Vec<TextBox>
where
    F: Fn(&TextBox, &TextBox) -> bool,
{
    boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut merged = Vec::new();
    let mut current: Vec<TextBox> = Vec::new();

    for text_box in boxes {
        let extends = current.last().is_some_and(|prev| joins(prev, &text_box));
        if !extends {
            merged.extend(merge_group(std::mem::take(&mut current)));
        }
        current.push(text_box);
    }
    merged.extend(merge_group(current));

    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn typed(text: &str, x: f64, y: f64, w: f64, category: RedactionCategory) -> TextBox {
        TextBox::new(text, x, y, w, 12.0).with_category(category)
    }

    #[test]
    fn test_phone_boxes_merge_within_gap() {
        let boxes = vec![
            typed("555", 10.0, 5.0, 30.0, RedactionCategory::Phone),
            typed("0100", 42.0, 5.0, 30.0, RedactionCategory::Phone),
        ];
        let merged = merge_same_category(boxes);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "555 0100");
        assert_eq!(merged[0].category, Some(RedactionCategory::Phone));
        assert_eq!((merged[0].x, merged[0].width), (10.0, 62.0));
    }

    #[test]
    fn test_phone_boxes_split_beyond_gap() {
        let boxes = vec![
            typed("555", 10.0, 5.0, 30.0, RedactionCategory::Phone),
            typed("0100", 60.0, 5.0, 30.0, RedactionCategory::Phone),
        ];
        assert_eq!(merge_same_category(boxes).len(), 2);
    }

    #[test]
    fn test_name_gap_tolerance() {
        let near = vec![
            typed("Jane", 0.0, 0.0, 40.0, RedactionCategory::Name),
            typed("Doe", 130.0, 0.0, 30.0, RedactionCategory::Name),
        ];
        assert_eq!(merge_same_category(near).len(), 1);

        let far = vec![
            typed("Jane", 0.0, 0.0, 40.0, RedactionCategory::Name),
            typed("Doe", 150.0, 0.0, 30.0, RedactionCategory::Name),
        ];
        assert_eq!(merge_same_category(far).len(), 2);
    }

    #[test]
    fn test_different_categories_never_merge() {
        let boxes = vec![
            typed("Jane", 0.0, 0.0, 40.0, RedactionCategory::Name),
            typed("jane@x.io", 45.0, 0.0, 80.0, RedactionCategory::Email),
        ];
        assert_eq!(merge_same_category(boxes).len(), 2);
    }

    #[test]
    fn test_overlapping_boxes_do_not_merge() {
        // Negative gap
        let boxes = vec![
            typed("4111", 0.0, 0.0, 40.0, RedactionCategory::CreditCard),
            typed("1111", 35.0, 0.0, 40.0, RedactionCategory::CreditCard),
        ];
        assert_eq!(merge_same_category(boxes).len(), 2);
    }

    #[test]
    fn test_different_lines_do_not_merge() {
        let boxes = vec![
            typed("Main", 0.0, 0.0, 40.0, RedactionCategory::Address),
            typed("Street", 45.0, 8.0, 40.0, RedactionCategory::Address),
        ];
        // |Δy| = 8 >= 0.6 * 12
        assert_eq!(merge_same_category(boxes).len(), 2);
    }

    #[test]
    fn test_sort_order_is_y_then_x() {
        let boxes = vec![
            typed("b", 50.0, 0.0, 10.0, RedactionCategory::Id),
            typed("c", 0.0, 40.0, 10.0, RedactionCategory::Id),
            typed("a", 30.0, 0.0, 10.0, RedactionCategory::Id),
        ];
        let merged = merge_same_category(boxes);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "a b");
        assert_eq!(merged[1].text, "c");
    }

    #[test]
    fn test_line_merge_groups_words() {
        let boxes = vec![
            TextBox::new("world", 60.0, 1.0, 40.0, 12.0),
            TextBox::new("hello", 10.0, 0.0, 40.0, 12.0),
            TextBox::new("below", 10.0, 30.0, 40.0, 12.0),
        ];
        let merged = merge_adjacent_boxes(boxes, LINE_MERGE_DISTANCE);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "hello world");
        assert_eq!((merged[0].y, merged[0].height), (0.0, 13.0));
        assert_eq!(merged[1].text, "below");
    }

    #[test]
    fn test_line_merge_respects_distance() {
        let boxes = vec![
            TextBox::new("hello", 10.0, 0.0, 40.0, 12.0),
            TextBox::new("world", 75.0, 0.0, 40.0, 12.0),
        ];
        assert_eq!(merge_adjacent_boxes(boxes, LINE_MERGE_DISTANCE).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_same_category(Vec::new()).is_empty());
        assert!(merge_adjacent_boxes(Vec::new(), LINE_MERGE_DISTANCE).is_empty());
        assert!(merge_group(Vec::new()).is_none());
    }

    #[test]
    fn test_single_box_group_is_unchanged() {
        let b = typed("x", 1.5, 2.5, 3.0, RedactionCategory::Dollar);
        assert_eq!(merge_group(vec![b.clone()]), Some(b));
    }

    fn arb_box() -> impl Strategy<Value = TextBox> {
        (0.0f64..500.0, 0.0f64..500.0, 0.0f64..200.0, 0.0f64..50.0)
            .prop_map(|(x, y, w, h)| TextBox::new("w", x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_group_is_union(group in prop::collection::vec(arb_box(), 1..12)) {
            let merged = merge_group(group.clone()).unwrap();
            let min_x = group.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
            let min_y = group.iter().map(|b| b.y).fold(f64::INFINITY, f64::min);
            let max_r = group.iter().map(TextBox::right).fold(f64::NEG_INFINITY, f64::max);
            let max_b = group.iter().map(TextBox::bottom).fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(merged.x, min_x);
            prop_assert_eq!(merged.y, min_y);
            prop_assert!((merged.right() - max_r).abs() < 1e-9);
            prop_assert!((merged.bottom() - max_b).abs() < 1e-9);
        }

        #[test]
        fn prop_merging_never_loses_words(boxes in prop::collection::vec(arb_box(), 0..20)) {
            let count = boxes.len();
            let merged = merge_adjacent_boxes(boxes, LINE_MERGE_DISTANCE);
            let words: usize = merged.iter().map(|b| b.text.split(' ').count()).sum();
            prop_assert_eq!(words, count);
        }

        #[test]
        fn prop_merged_category_is_uniform(
            boxes in prop::collection::vec((arb_box(), 0usize..3), 0..20)
        ) {
            let pool = [RedactionCategory::Name, RedactionCategory::Phone, RedactionCategory::Id];
            let typed: Vec<TextBox> = boxes
                .into_iter()
                .map(|(b, i)| b.with_category(pool[i]))
                .collect();
            for merged in merge_same_category(typed) {
                prop_assert!(merged.category.is_some());
            }
        }
    }
}
