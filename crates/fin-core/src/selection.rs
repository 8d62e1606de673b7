//! Highlighted-row tracking with wraparound.

/// Result of a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Selection went from nothing to `index`; the query should be recorded
    Entered(usize),
    /// Selection moved between rows
    Moved(usize),
}

/// `None` means the query field has focus; `Some(i)` means row `i` does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    index: Option<usize>,
}

impl Selection {
    #[must_use]
    pub fn index(self) -> Option<usize> {
        self.index
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        self.index.is_some()
    }

    /// Move down over `len` rows. No-op on an empty list.
    pub fn move_next(&mut self, len: usize) -> Option<Step> {
        if len == 0 {
            return None;
        }
        Some(match self.index {
            None => self.enter(0),
            Some(i) => self.moved((i + 1) % len, len),
        })
    }

    /// Move up over `len` rows. No-op on an empty list.
    pub fn move_previous(&mut self, len: usize) -> Option<Step> {
        if len == 0 {
            return None;
        }
        Some(match self.index {
            None => self.enter(len - 1),
            Some(i) => self.moved((i + len - 1) % len, len),
        })
    }

    /// Jump straight to `index`, ignoring out-of-range requests.
    pub fn select(&mut self, index: usize, len: usize) -> Option<Step> {
        if index >= len {
            return None;
        }
        Some(match self.index {
            None => self.enter(index),
            Some(_) => self.moved(index, len),
        })
    }

    /// Return focus to the query field. Reports whether a row was selected.
    pub fn clear(&mut self) -> bool {
        self.index.take().is_some()
    }

    fn enter(&mut self, index: usize) -> Step {
        self.index = Some(index);
        Step::Entered(index)
    }

    fn moved(&mut self, index: usize, len: usize) -> Step {
        debug_assert!(
            self.index.is_some_and(|i| i < len),
            "selection outlived its result set"
        );
        self.index = Some(index);
        Step::Moved(index)
    }
}
