//! Selection movement and re-selection after the filtered list changes.

use super::App;

impl App {
    /// Move the selection by `delta` rows, clamped to the list. No wraparound.
    pub(super) fn move_selection(&mut self, delta: isize) {
        let Some(current) = self.selected else {
            return;
        };
        let last = self.filtered.len().saturating_sub(1);
        self.select(Some(current.saturating_add_signed(delta).min(last)));
    }

    /// Set the selection and keep the list widget's state in step.
    pub(super) fn select(&mut self, index: Option<usize>) {
        self.selected = index;
        self.list_state.select(index);
    }

    pub(super) fn position_of(&self, id: &str) -> Option<usize> {
        self.filtered.iter().position(|s| s.candidate.id == id)
    }

    /// Select `id` if it is still listed, otherwise `fallback` clamped to the
    /// list; nothing when the list is empty.
    pub(super) fn reselect(&mut self, id: Option<&str>, fallback: usize) {
        let index = id.and_then(|id| self.position_of(id)).or_else(|| {
            self.filtered
                .len()
                .checked_sub(1)
                .map(|last| fallback.min(last))
        });
        self.select(index);
    }
}
