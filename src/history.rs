//! # Edit History
//!
//! Undo and redo over whole-scene snapshots. Every edit records the scene
//! as it looks afterwards, under a short action label:
//!
//! ```text
//!   entries   [open] [add sticker] [rotate] [filter: blur]
//!   index                             ▲
//!             undo ◀──                └── current      ──▶ redo
//! ```
//!
//! Recording after an undo drops the redo tail. The list keeps at most
//! `limit` entries and forgets the oldest first.

use crate::scene::Scene;
use chrono::{DateTime, Local};

/// Snapshots kept by [`History::new`].
pub const HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub action: String,
    pub at: DateTime<Local>,
    pub scene: Scene,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl History {
    /// A history whose only entry is `initial`.
    pub fn new(initial: &Scene) -> Self {
        Self::with_limit(initial, HISTORY_LIMIT)
    }

    /// Like [`History::new`], keeping at most `limit` entries (at least one).
    pub fn with_limit(initial: &Scene, limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                action: "open".into(),
                at: Local::now(),
                scene: initial.clone(),
            }],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Record `scene` as the result of `action`.
    pub fn record(&mut self, action: impl Into<String>, scene: &Scene) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            action: action.into(),
            at: Local::now(),
            scene: scene.clone(),
        });
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
        log::debug!("history: {} ({}/{})", self.entries[self.index].action, self.index + 1, self.entries.len());
    }

    pub fn current(&self) -> &Scene {
        &self.entries[self.index].scene
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back. Returns the scene to show, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Scene> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> Option<&Scene> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Go straight to entry `index`, as picked from the history list.
    pub fn jump(&mut self, index: usize) -> Option<&Scene> {
        if index >= self.entries.len() {
            return None;
        }
        self.index = index;
        Some(self.current())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextLayer;
    use pretty_assertions::assert_eq;

    fn titled(text: &str) -> Scene {
        let mut scene = Scene::default();
        scene.set_text(TextLayer::new(text));
        scene
    }

    fn title(scene: Option<&Scene>) -> Option<String> {
        scene.and_then(Scene::text).map(|t| t.content.clone())
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(&titled("a"));
        history.record("edit", &titled("b"));
        history.record("edit", &titled("c"));
        assert_eq!(title(history.undo()), Some("b".into()));
        assert_eq!(title(history.undo()), Some("a".into()));
        assert!(history.undo().is_none());
        assert_eq!(title(history.redo()), Some("b".into()));
        assert!(history.can_redo());
    }

    #[test]
    fn test_record_drops_redo_tail() {
        let mut history = History::new(&titled("a"));
        history.record("edit", &titled("b"));
        history.record("edit", &titled("c"));
        history.undo();
        history.record("other", &titled("d"));
        assert!(!history.can_redo());
        let actions: Vec<&str> = history.entries().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["open", "edit", "other"]);
        assert_eq!(title(Some(history.current())), Some("d".into()));
    }

    #[test]
    fn test_oldest_entries_are_forgotten() {
        let mut history = History::with_limit(&titled("0"), 3);
        for i in 1..=4 {
            history.record(format!("step {}", i), &titled(&i.to_string()));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(title(history.jump(0)), Some("2".into()));
        assert!(history.jump(3).is_none());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_default_limit() {
        let mut history = History::new(&Scene::default());
        for i in 0..40 {
            history.record(format!("step {}", i), &Scene::default());
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.entries()[0].action, "step 10");
    }
}
