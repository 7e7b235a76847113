//! Admin authentication service.
//!
//! Exchanges the shared admin credential for a bearer token, persists it, and
//! arms a one-shot expiry timer. When the timer fires the token is purged and
//! the session moves to [`SessionStatus::Expired`]; observers subscribed via
//! [`AdminAuthService::subscribe`] should show the expiry notice and return
//! to the landing view.
//!
//! Each armed timer carries the generation it was armed for. Logout and
//! re-login bump the generation and abort the old task, so a superseded timer
//! can never expire a newer session.

mod error;
mod token_store;

pub use error::AuthError;
pub use token_store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore, TokenStoreError};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use paperback_core::{
    ADMIN_SESSION_TTL_SECS, AdminSession, Book, NewBook, SessionEvent, SessionStatus,
};

use crate::api::ApiClient;
use crate::error::add_breadcrumb;
use crate::services::InFlightGuard;

/// Admin authentication service.
///
/// Cheap to clone; clones share the session, the timer and the token store.
#[derive(Clone)]
pub struct AdminAuthService {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    ttl: Duration,
    status: watch::Sender<SessionStatus>,
    generation: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
    login_in_flight: AtomicBool,
}

impl AdminAuthService {
    /// Create the service with the standard one-hour session lifetime.
    ///
    /// A token already in `store` counts as an authenticated session. No
    /// timer is armed for it; only a login in this process arms one.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self::with_session_ttl(
            api,
            store,
            Duration::from_secs(ADMIN_SESSION_TTL_SECS.unsigned_abs()),
        )
    }

    /// Create the service with a custom session lifetime.
    #[must_use]
    pub fn with_session_ttl(api: ApiClient, store: Arc<dyn TokenStore>, ttl: Duration) -> Self {
        let initial = match store.load() {
            Ok(Some(token)) => {
                debug!("Found stored admin token");
                SessionStatus::Authenticated(AdminSession::new(
                    token.expose_secret(),
                    Utc::now(),
                ))
            }
            Ok(None) => SessionStatus::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Could not read stored admin token");
                SessionStatus::Unauthenticated
            }
        };

        let (status, _) = watch::channel(initial);

        Self {
            inner: Arc::new(AuthInner {
                api,
                store,
                ttl,
                status,
                generation: AtomicU64::new(0),
                timer: Mutex::new(None),
                login_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.inner.status.borrow().clone()
    }

    /// Receive every status change, including timer-driven expiry.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    /// Dashboard access is presence of a live token.
    #[must_use]
    pub fn can_access_dashboard(&self) -> bool {
        self.inner.status.borrow().can_access_dashboard()
    }

    /// Exchange credentials for a token and start the session.
    ///
    /// # Errors
    ///
    /// - `AuthError::AlreadyInFlight` if a login is outstanding; nothing is sent
    /// - `AuthError::InvalidCredentials` if the service rejects the credentials
    /// - `AuthError::Remote` if the service fails or cannot be reached
    /// - `AuthError::Store` if the token cannot be persisted
    ///
    /// The session status is unchanged on error.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), AuthError> {
        let _guard =
            InFlightGuard::acquire(&self.inner.login_in_flight).ok_or(AuthError::AlreadyInFlight)?;

        let token = match self.inner.api.admin_login(username, password).await {
            Ok(token) => token,
            Err(e) if e.is_client_error() => {
                warn!(error = %e, "Admin credentials rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!(error = %e, "Admin login failed");
                return Err(AuthError::Remote(e.reason()));
            }
        };

        self.establish(&token)?;

        info!("Admin login successful");
        add_breadcrumb("auth", "Admin login", &[("username", username)]);

        Ok(())
    }

    /// End the session: purge the token and cancel any pending timer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the token could not be removed. The
    /// session is logged out regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        let inner = &self.inner;
        let mut timer = inner.lock_timer();
        inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let removed = inner.store.remove();
        inner.transition(SessionEvent::LoggedOut);
        drop(timer);

        info!("Admin logged out");
        removed.map_err(AuthError::from)
    }

    /// The bearer token of the live session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` after the timer fired, or
    /// `AuthError::NotAuthenticated` if nobody logged in.
    pub fn require_session(&self) -> Result<SecretString, AuthError> {
        match &*self.inner.status.borrow() {
            SessionStatus::Authenticated(session) => {
                Ok(SecretString::from(session.token().to_owned()))
            }
            SessionStatus::Expired => Err(AuthError::SessionExpired),
            SessionStatus::Unauthenticated => Err(AuthError::NotAuthenticated),
        }
    }

    /// Add a book to the inventory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` or `AuthError::SessionExpired`
    /// without sending anything when there is no live session, and
    /// `AuthError::Remote` if the service rejects the book.
    #[instrument(skip(self, book), fields(title = %book.title))]
    pub async fn add_book(&self, book: &NewBook) -> Result<Book, AuthError> {
        let token = self.require_session()?;

        let created = self
            .inner
            .api
            .create_book(book, &token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to add book");
                AuthError::Remote(e.reason())
            })?;

        info!(book_id = %created.id, "Book added");
        Ok(created)
    }

    /// Persist `token`, start its session and arm the expiry timer.
    ///
    /// The timer lock is held from the save until the new generation is
    /// published, so a previous session's timer cannot purge the new token.
    fn establish(&self, token: &SecretString) -> Result<(), AuthError> {
        let inner = &self.inner;
        let mut timer = inner.lock_timer();

        inner.store.save(token)?;

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner.transition(SessionEvent::LoggedIn(AdminSession::new(
            token.expose_secret(),
            Utc::now(),
        )));

        let deadline = tokio::time::Instant::now() + inner.ttl;
        let weak: Weak<AuthInner> = Arc::downgrade(inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation);
            }
        });

        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
        Ok(())
    }
}

impl AuthInner {
    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: SessionEvent) {
        self.status
            .send_modify(|status| *status = std::mem::take(status).apply(event));
    }

    /// Timer callback for the session armed at `generation`.
    fn expire(&self, generation: u64) {
        let mut timer = self.lock_timer();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Ignoring superseded session timer");
            return;
        }
        timer.take();

        if let Err(e) = self.store.remove() {
            warn!(error = %e, "Could not purge expired admin token");
        }
        self.transition(SessionEvent::TimerFired);
        info!("Admin session expired");
    }
}

impl Drop for AuthInner {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_timer().take() {
            handle.abort();
        }
    }
}
