//! Query history with a cyclic recall cursor.

/// Append-only log of submitted queries.
///
/// Entries are never deduplicated or evicted within a session. The cursor,
/// when set, is always a valid index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryRing {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl HistoryRing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, query: impl Into<String>) {
        self.entries.push(query.into());
    }

    /// Step the cursor toward older entries, wrapping at the start.
    ///
    /// From no cursor this jumps to the newest entry. Returns the recalled
    /// entry, or `None` when the ring is empty.
    pub fn cycle_backward(&mut self) -> Option<&str> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let next = match self.cursor {
            None => len - 1,
            Some(i) => (i + len - 1) % len,
        };
        self.recall(next)
    }

    /// Step the cursor toward newer entries, wrapping at the end.
    ///
    /// Without an active recall this does nothing.
    pub fn cycle_forward(&mut self) -> Option<&str> {
        let len = self.entries.len();
        let current = self.cursor?;
        if len == 0 {
            return None;
        }
        self.recall((current + 1) % len)
    }

    /// Drop the cursor, keeping every entry.
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn recall(&mut self, index: usize) -> Option<&str> {
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }
}
