//! Last-wins tickets for deferred results.
//!
//! Each request takes a [`Ticket`] from a [`LastWins`]. Issuing a new ticket
//! (or cancelling) makes every earlier ticket stale, so an older request that
//! resolves late can check [`Ticket::is_current`] and drop its result.
//!
//! # Example
//!
//! ```ignore
//! let requests = LastWins::new();
//!
//! let first = requests.issue();
//! let second = requests.issue();
//! assert!(!first.is_current());
//! assert!(second.is_current());
//! ```

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct LastWins {
    generation: Rc<Cell<u64>>,
}

impl LastWins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket; all previously issued tickets become stale.
    pub fn issue(&self) -> Ticket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        Ticket {
            generation: next,
            current: self.generation.clone(),
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn cancel(&self) {
        self.generation.set(self.generation.get() + 1);
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    current: Rc<Cell<u64>>,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_wins() {
        let requests = LastWins::new();
        let first = requests.issue();
        assert!(first.is_current());

        let second = requests.issue();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_cancel_invalidates_all() {
        let requests = LastWins::new();
        let ticket = requests.issue();
        requests.cancel();
        assert!(!ticket.is_current());
    }
}
