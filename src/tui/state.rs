//! Shared cursor navigation for list-like panes.

/// Number of rows moved per page-up/page-down action.
pub(crate) const PAGE_SIZE: usize = 10;

/// Trait for list-based navigation state.
///
/// Movement always clamps to `[0, total - 1]`; nothing wraps around.
pub trait ListNavigation {
    /// Get the current selection index.
    fn selected(&self) -> usize;

    /// Set the selection index.
    fn set_selected(&mut self, idx: usize);

    /// Get the total number of items.
    fn total(&self) -> usize;

    /// Move selection by `delta` rows, clamped at both ends.
    fn select_by(&mut self, delta: isize) {
        let total = self.total();
        if total == 0 {
            return;
        }
        let last = total - 1;
        let target = self
            .selected()
            .saturating_add_signed(delta)
            .min(last);
        if target != self.selected() {
            self.set_selected(target);
        }
    }

    /// Move selection to the next item.
    fn select_next(&mut self) {
        self.select_by(1);
    }

    /// Move selection to the previous item.
    fn select_prev(&mut self) {
        self.select_by(-1);
    }

    /// Move selection up by a page.
    fn page_up(&mut self) {
        self.select_by(-(PAGE_SIZE as isize));
    }

    /// Move selection down by a page.
    fn page_down(&mut self) {
        self.select_by(PAGE_SIZE as isize);
    }

    /// Move to the first item.
    fn go_first(&mut self) {
        if self.total() > 0 {
            self.set_selected(0);
        }
    }

    /// Move to the last item.
    fn go_last(&mut self) {
        let total = self.total();
        if total > 0 {
            self.set_selected(total - 1);
        }
    }
}
