//! Transient status notices and the clock that expires them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// How long a notice stays visible.
pub const NOTICE_SECONDS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// An action armed by a notice and cancelled when the notice goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    ClearAll,
}

/// A status message shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub shown_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingAction>,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>, shown_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at,
            pending: None,
        }
    }

    pub fn with_pending(mut self, action: PendingAction) -> Self {
        self.pending = Some(action);
        self
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.shown_at + Duration::seconds(NOTICE_SECONDS)
    }

    /// Still on screen at `now`.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Time source for notice expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Manually advanced clock shared between a test and the session.
    #[derive(Clone)]
    pub(crate) struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self(Arc::new(AtomicI64::new(1_714_000_000)))
        }

        pub(crate) fn advance(&self, seconds: i64) {
            self.0.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_opt(self.0.load(Ordering::SeqCst), 0)
                .single()
                .unwrap()
        }
    }

    #[test]
    fn test_notice_visible_for_ten_seconds() {
        let clock = ManualClock::new();
        let notice = Notice::new(NoticeKind::Success, "Trip added successfully!", clock.now());

        clock.advance(9);
        assert!(notice.is_visible(clock.now()));
        clock.advance(1);
        assert!(!notice.is_visible(clock.now()));
    }

    #[test]
    fn test_pending_action_attached() {
        let now = SystemClock.now();
        let notice = Notice::new(NoticeKind::Info, "confirm", now).with_pending(PendingAction::ClearAll);
        assert_eq!(notice.pending, Some(PendingAction::ClearAll));
        assert_eq!(notice.to_string(), "confirm");
    }
}
