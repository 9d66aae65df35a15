//! Labels as seen by the core: read-only rows owned by the store, and the
//! snapshot feed that pushes a fresh productivity map whenever they change.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::productivity::LabelProductivityMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub user_id: String,
    pub text: String,
    pub is_productive: bool,
}

impl<'a> FromIterator<&'a Label> for LabelProductivityMap {
    fn from_iter<I: IntoIterator<Item = &'a Label>>(iter: I) -> Self {
        iter.into_iter()
            .map(|label| (label.text.clone(), label.is_productive))
            .collect()
    }
}

/// Latest-snapshot channel for the label productivity map.
///
/// The store side publishes complete snapshots; readers only ever see the
/// most recent one.
#[derive(Debug)]
pub struct LabelFeed {
    tx: watch::Sender<LabelProductivityMap>,
}

impl LabelFeed {
    pub fn new(initial: LabelProductivityMap) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: LabelProductivityMap) {
        tracing::debug!(labels = snapshot.len(), "label snapshot published");
        self.tx.send_replace(snapshot);
    }

    pub fn latest(&self) -> LabelProductivityMap {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LabelProductivityMap> {
        self.tx.subscribe()
    }
}

impl Default for LabelFeed {
    fn default() -> Self {
        Self::new(LabelProductivityMap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str, is_productive: bool) -> Label {
        Label {
            id: 0,
            user_id: "u1".into(),
            text: text.into(),
            is_productive,
        }
    }

    #[test]
    fn map_from_labels() {
        let labels = vec![label("Math", true), label("Games", false)];
        let map: LabelProductivityMap = labels.iter().collect();
        assert_eq!(map.get("Math"), Some(true));
        assert_eq!(map.get("Games"), Some(false));
    }

    #[tokio::test]
    async fn subscribers_see_only_latest_snapshot() {
        let feed = LabelFeed::default();
        let mut rx = feed.subscribe();

        let first: LabelProductivityMap = [label("Math", true)].iter().collect();
        let second: LabelProductivityMap = [label("History", false)].iter().collect();
        feed.publish(first);
        feed.publish(second.clone());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), second);
        assert_eq!(feed.latest(), second);
        assert!(!feed.latest().contains("Math"));
    }
}
