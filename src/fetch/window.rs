//! Pagination window over a 1-based item list.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("page size must be at least 2, got {0}")]
    PageSizeTooSmall(usize),
    #[error("increment must be at least 2, got {0}")]
    IncrementTooSmall(usize),
}

/// Positions `from..=to` of the list to fetch next.
///
/// Every window produced here satisfies `to > from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: usize,
    pub to: usize,
    pub page_size: usize,
}

impl Window {
    pub fn initial(page_size: usize) -> Result<Self, WindowError> {
        if page_size < 2 {
            return Err(WindowError::PageSizeTooSmall(page_size));
        }
        Ok(Self {
            from: 1,
            to: page_size,
            page_size,
        })
    }

    /// The window directly after this one, `increment` items wide.
    ///
    /// Callers validate `increment` with [`Window::check_increment`].
    pub fn advanced(&self, increment: usize) -> Self {
        Self {
            from: self.to + 1,
            to: self.to + increment,
            page_size: self.page_size,
        }
    }

    /// A window from position 1 through at least `count`.
    ///
    /// Never narrower than this window, so `to > from` still holds.
    pub fn covering(&self, count: usize) -> Self {
        Self {
            from: 1,
            to: count.max(self.to),
            page_size: self.page_size,
        }
    }

    /// Reject increments that would produce a window with `to <= from`.
    pub fn check_increment(increment: usize) -> Result<usize, WindowError> {
        if increment < 2 {
            return Err(WindowError::IncrementTooSmall(increment));
        }
        Ok(increment)
    }

    /// Number of positions covered.
    pub fn span(&self) -> usize {
        self.to - self.from + 1
    }
}
