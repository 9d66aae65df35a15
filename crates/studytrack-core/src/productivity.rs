//! Post-session productivity accounting.
//!
//! Two computations live here: the efficiency score derived from the
//! self-reported completion percentage and the distraction count, and the
//! productive / not-productive classification of a session by its label.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::session::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Productivity {
    Productive,
    NotProductive,
}

/// Snapshot of `label text -> is productive` for one user.
///
/// Always replaced wholesale when the label set changes; never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelProductivityMap(HashMap<String, bool>);

impl LabelProductivityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label_text: impl Into<String>, is_productive: bool) {
        self.0.insert(label_text.into(), is_productive);
    }

    pub fn get(&self, label_text: &str) -> Option<bool> {
        self.0.get(label_text).copied()
    }

    pub fn contains(&self, label_text: &str) -> bool {
        self.0.contains_key(label_text)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Label texts in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.0.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

impl FromIterator<(String, bool)> for LabelProductivityMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, bool>> for LabelProductivityMap {
    fn from(map: HashMap<String, bool>) -> Self {
        Self(map)
    }
}

/// `actual - (100 - 2 * distractions)`.
///
/// Positive means more efficient than the distraction-adjusted baseline.
/// Unclamped: the result may be negative or exceed 100.
// TODO: replace once a validated productivity model exists; the linear
// baseline is provisional and existing scores depend on it staying as is.
pub fn compute_efficiency(actual_productivity_percent: u8, distraction_count: u32) -> i64 {
    let baseline = 100 - 2 * i64::from(distraction_count);
    i64::from(actual_productivity_percent) - baseline
}

/// Unknown labels count as not productive.
pub fn classify_label(label_text: &str, map: &LabelProductivityMap) -> Productivity {
    match map.get(label_text) {
        Some(true) => Productivity::Productive,
        Some(false) => Productivity::NotProductive,
        None => {
            tracing::debug!(label = label_text, "label missing from productivity map");
            Productivity::NotProductive
        }
    }
}

pub fn classify(record: &SessionRecord, map: &LabelProductivityMap) -> Productivity {
    classify_label(&record.label_text, map)
}

/// Completion percentage must be within 0..=100.
pub fn validate_percent(percent: u32) -> Result<u8, ValidationError> {
    u8::try_from(percent)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "actual_productivity_percent".into(),
            message: format!("{percent} is outside 0..=100"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_examples() {
        assert_eq!(compute_efficiency(100, 0), 0);
        assert_eq!(compute_efficiency(50, 0), -50);
        assert_eq!(compute_efficiency(100, 10), 20);
    }

    #[test]
    fn efficiency_is_unclamped() {
        assert_eq!(compute_efficiency(0, 0), -100);
        assert_eq!(compute_efficiency(100, 100), 200);
    }

    #[test]
    fn unknown_label_is_not_productive() {
        let map: LabelProductivityMap = [("Math".to_string(), true)].into_iter().collect();
        assert_eq!(classify_label("Math", &map), Productivity::Productive);
        assert_eq!(classify_label("History", &map), Productivity::NotProductive);
    }

    #[test]
    fn explicit_false_is_not_productive() {
        let mut map = LabelProductivityMap::new();
        map.insert("Games", false);
        assert_eq!(classify_label("Games", &map), Productivity::NotProductive);
    }

    #[test]
    fn percent_bounds() {
        assert_eq!(validate_percent(0), Ok(0));
        assert_eq!(validate_percent(100), Ok(100));
        assert!(validate_percent(101).is_err());
        assert!(validate_percent(1000).is_err());
    }

    #[test]
    fn labels_are_sorted() {
        let map: LabelProductivityMap = [
            ("Physics".to_string(), true),
            ("Art".to_string(), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.labels(), vec!["Art", "Physics"]);
    }
}
