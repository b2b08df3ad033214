//! Fetch sessions
//!
//! Every sync cycle begins a session and carries its token through all of its
//! network calls. Beginning a new session invalidates every older token, so
//! fetches still in flight from an earlier cycle resolve into a no-op when
//! they compare their token before committing. Nothing is cancelled on the
//! wire; stale results are discarded on arrival.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token stamped on one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared monotonic session counter. Clones observe the same counter.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    current: Arc<AtomicU64>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch cycle, invalidating all earlier tokens.
    pub fn begin(&self) -> SessionToken {
        SessionToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: SessionToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    /// Latest token handed out, if any session has begun.
    pub fn current(&self) -> Option<SessionToken> {
        match self.current.load(Ordering::SeqCst) {
            0 => None,
            n => Some(SessionToken(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_invalidates_older_tokens() {
        let sessions = SessionManager::new();
        assert_eq!(sessions.current(), None);

        let first = sessions.begin();
        assert!(sessions.is_current(first));

        let second = sessions.begin();
        assert!(second > first);
        assert!(!sessions.is_current(first));
        assert!(sessions.is_current(second));
        assert_eq!(sessions.current(), Some(second));
    }

    #[test]
    fn test_clones_share_the_counter() {
        let sessions = SessionManager::new();
        let handle = sessions.clone();
        let token = sessions.begin();
        handle.begin();
        assert!(!sessions.is_current(token));
    }
}
