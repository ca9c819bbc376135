/// Explicit application state
///
/// The original app kept the current selection and the book-open flag in
/// ambient module globals. Here they live in one owned struct that the
/// presentation layer injects where needed, so every read and write goes
/// through defined accessors.
///
/// The resolution token implements the cancellation rule for in-flight
/// image-to-geometry work: changing the selection invalidates any token
/// handed out before the change, and a stale result is simply discarded.

/// Guard token for an in-flight geometry resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionToken(u64);

/// Application state shared between the UI shell and the library.
#[derive(Debug, Default)]
pub struct AppState {
    selected: Option<String>,
    book_open: bool,
    resolution_gen: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected cover id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Change the selection. Any resolution started before this call
    /// becomes stale.
    pub fn select(&mut self, id: Option<String>) {
        if self.selected != id {
            self.selected = id;
            self.resolution_gen += 1;
        }
    }

    /// Whether the 3D book is currently shown open.
    pub fn is_open(&self) -> bool {
        self.book_open
    }

    /// Flip the open/closed state; returns the new value.
    pub fn toggle_open(&mut self) -> bool {
        self.book_open = !self.book_open;
        self.book_open
    }

    /// Start a geometry resolution for the current selection.
    pub fn begin_resolution(&self) -> ResolutionToken {
        ResolutionToken(self.resolution_gen)
    }

    /// True when a result produced under `token` may still be applied.
    /// False means the selection changed in the meantime and the result
    /// must be discarded.
    pub fn resolution_current(&self, token: ResolutionToken) -> bool {
        token.0 == self.resolution_gen
    }
}
