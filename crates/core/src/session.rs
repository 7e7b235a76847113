//! Admin session state machine.
//!
//! ```text
//!                  LoggedIn
//!  Unauthenticated ────────▶ Authenticated ──TimerFired──▶ Expired
//!         ▲                        │                          │
//!         └──────── LoggedOut ─────┴──────────────────────────┘
//! ```
//!
//! Transitions are pure; the storefront's auth service owns the timer and the
//! token store and feeds events in.

use core::fmt;

use chrono::{DateTime, Duration, Utc};

/// Lifetime of an admin token, counted from issuance. No sliding window.
pub const ADMIN_SESSION_TTL_SECS: i64 = 3600;

/// A token issued by the admin auth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: String,
    issued_at: DateTime<Utc>,
}

impl AdminSession {
    #[must_use]
    pub fn new(token: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            issued_at,
        }
    }

    /// Bearer token for dashboard requests.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(ADMIN_SESSION_TTL_SECS)
    }

    /// Whether the session is past its lifetime at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Inputs to [`SessionStatus::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were exchanged for a token, or a stored token was adopted.
    LoggedIn(AdminSession),
    /// The expiry timer for the current session fired.
    TimerFired,
    /// Explicit logout.
    LoggedOut,
}

/// Where the admin session stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Authenticated(AdminSession),
    /// The timer fired; the caller should show the expiry notice and return
    /// to the landing view.
    Expired,
}

impl SessionStatus {
    /// Next state after `event`.
    #[must_use]
    pub fn apply(self, event: SessionEvent) -> Self {
        match (self, event) {
            (_, SessionEvent::LoggedIn(session)) => Self::Authenticated(session),
            (_, SessionEvent::LoggedOut) => Self::Unauthenticated,
            (Self::Authenticated(_), SessionEvent::TimerFired) => Self::Expired,
            (state, SessionEvent::TimerFired) => state,
        }
    }

    /// Dashboard access is presence of a live token and nothing else.
    #[must_use]
    pub const fn can_access_dashboard(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub const fn session(&self) -> Option<&AdminSession> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Unauthenticated | Self::Expired => None,
        }
    }

    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdminSession {
        AdminSession::new("tok", Utc::now())
    }

    #[test]
    fn test_login_authenticates() {
        let status = SessionStatus::default().apply(SessionEvent::LoggedIn(session()));
        assert!(status.can_access_dashboard());
        assert_eq!(status.session().map(AdminSession::token), Some("tok"));
    }

    #[test]
    fn test_timer_expires_authenticated_session() {
        let status = SessionStatus::Authenticated(session()).apply(SessionEvent::TimerFired);
        assert_eq!(status, SessionStatus::Expired);
        assert!(!status.can_access_dashboard());
    }

    #[test]
    fn test_timer_is_ignored_when_not_authenticated() {
        assert_eq!(
            SessionStatus::Unauthenticated.apply(SessionEvent::TimerFired),
            SessionStatus::Unauthenticated
        );
        assert_eq!(
            SessionStatus::Expired.apply(SessionEvent::TimerFired),
            SessionStatus::Expired
        );
    }

    #[test]
    fn test_logout_from_any_state() {
        for status in [
            SessionStatus::Unauthenticated,
            SessionStatus::Authenticated(session()),
            SessionStatus::Expired,
        ] {
            assert_eq!(
                status.apply(SessionEvent::LoggedOut),
                SessionStatus::Unauthenticated
            );
        }
    }

    #[test]
    fn test_login_after_expiry() {
        let status = SessionStatus::Expired.apply(SessionEvent::LoggedIn(session()));
        assert!(status.can_access_dashboard());
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc::now();
        let session = AdminSession::new("tok", issued);
        let ttl = Duration::seconds(ADMIN_SESSION_TTL_SECS);
        assert!(!session.is_expired_at(issued + ttl - Duration::seconds(1)));
        assert!(session.is_expired_at(issued + ttl));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", AdminSession::new("super-secret", Utc::now()));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
