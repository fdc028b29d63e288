//! Transient status line messages.

use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A single status message that clears itself after a duration.
///
/// Used for in-band reporting of failures that must not end the session,
/// such as a rescan whose metadata fetch failed.
#[derive(Debug, Clone)]
pub struct StatusNotice {
    message: Option<(NoticeLevel, String)>,
    set_at: Option<Instant>,
    ttl: Duration,
}

impl Default for StatusNotice {
    fn default() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }
}

impl StatusNotice {
    #[must_use]
    pub const fn with_ttl(ttl: Duration) -> Self {
        Self {
            message: None,
            set_at: None,
            ttl,
        }
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.set(NoticeLevel::Info, msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.set(NoticeLevel::Error, msg.into());
    }

    fn set(&mut self, level: NoticeLevel, msg: String) {
        self.message = Some((level, msg));
        self.set_at = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.set_at = None;
    }

    /// Drop the message once it has outlived its ttl. Returns true if it was cleared.
    pub fn expire(&mut self) -> bool {
        match self.set_at {
            Some(set_at) if set_at.elapsed() >= self.ttl => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<(NoticeLevel, &str)> {
        self.message
            .as_ref()
            .map(|(level, msg)| (*level, msg.as_str()))
    }
}
