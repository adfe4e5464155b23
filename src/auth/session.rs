use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::PatientRecord;

pub const SESSION_COOKIE: &str = "sessionid";

pub type SessionId = Uuid;

/// Everything the service keeps about one browser between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<Uuid>,
    pub otp: Option<String>,
    pub email: Option<String>,
    /// Set once the submitted OTP matched; required before a new password is accepted.
    pub otp_verified: bool,
    pub prediction: Option<String>,
    pub last_input: Option<PatientRecord>,
}

/// Where the password-reset flow stands for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetStage {
    AwaitingEmail,
    AwaitingOtp,
    AwaitingNewPassword,
}

impl SessionData {
    pub fn reset_stage(&self) -> ResetStage {
        match (&self.otp, &self.email) {
            (Some(_), Some(_)) if self.otp_verified => ResetStage::AwaitingNewPassword,
            (Some(_), Some(_)) => ResetStage::AwaitingOtp,
            _ => ResetStage::AwaitingEmail,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

#[derive(Debug)]
struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

/// In-process session storage with idle expiry.
#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    ttl: Duration,
    cookie_secure: bool,
}

impl SessionStore {
    pub fn new(ttl: Duration, cookie_secure: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            cookie_secure,
        }
    }

    pub fn create(&self) -> SessionId {
        let id = Uuid::new_v4();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            id,
            SessionEntry {
                data: SessionData::default(),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Live sessions only; an expired entry is dropped on sight.
    pub fn exists(&self, id: &SessionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(id) {
            Some(entry) if entry.last_seen.elapsed() > self.ttl => {
                entries.remove(id);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Snapshot of the session data; unknown or expired ids read as empty.
    pub fn load(&self, id: &SessionId) -> SessionData {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(id)
            .filter(|entry| entry.last_seen.elapsed() <= self.ttl)
            .map(|entry| entry.data.clone())
            .unwrap_or_default()
    }

    /// Mutate the session in place, creating it when missing, and refresh its idle timer.
    pub fn update<R>(&self, id: &SessionId, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let entry = entries.entry(*id).or_insert_with(|| SessionEntry {
            data: SessionData::default(),
            last_seen: now,
        });
        if entry.last_seen.elapsed() > self.ttl {
            entry.data = SessionData::default();
        }
        entry.last_seen = now;
        f(&mut entry.data)
    }

    /// Move the data to a fresh id; the old id stops resolving.
    pub fn cycle(&self, id: &SessionId) -> SessionId {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let data = entries
            .remove(id)
            .filter(|entry| entry.last_seen.elapsed() <= self.ttl)
            .map(|entry| entry.data)
            .unwrap_or_default();
        let new_id = Uuid::new_v4();
        entries.insert(
            new_id,
            SessionEntry {
                data,
                last_seen: Instant::now(),
            },
        );
        new_id
    }

    /// Drop every session idle for longer than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() <= self.ttl);
        before - entries.len()
    }

    /// Purge expired sessions every `period` for the lifetime of the runtime.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, "purged expired sessions");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cookie(&self, id: SessionId) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .build()
    }
}

/// Per-request handle on the caller's session. Nothing is stored until the
/// first write, so anonymous browsing leaves the store untouched.
#[derive(Debug, Clone)]
pub struct Session {
    id: Arc<Mutex<Option<SessionId>>>,
    store: SessionStore,
}

impl Session {
    /// A session that has not been saved yet.
    pub fn new(store: SessionStore) -> Self {
        Self {
            id: Arc::new(Mutex::new(None)),
            store,
        }
    }

    /// A session already present in the store.
    pub fn resume(id: SessionId, store: SessionStore) -> Self {
        Self {
            id: Arc::new(Mutex::new(Some(id))),
            store,
        }
    }

    pub fn id(&self) -> Option<SessionId> {
        *self.id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn data(&self) -> SessionData {
        self.id().map(|id| self.store.load(&id)).unwrap_or_default()
    }

    /// Mutate the session data, saving the session first if it is new.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut id = self.id.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *id.get_or_insert_with(|| self.store.create());
        self.store.update(&current, f)
    }

    /// Attach `user_id` to the session under a fresh session id.
    pub fn login(&self, user_id: Uuid) {
        let mut id = self.id.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = match *id {
            Some(current) => self.store.cycle(&current),
            None => self.store.create(),
        };
        *id = Some(fresh);
        self.store.update(&fresh, |data| data.user_id = Some(user_id));
    }

    /// Forget the user and the prediction state. Any in-flight password reset
    /// (`otp`, `email`) stays in place.
    pub fn logout(&self) {
        if self.id().is_none() {
            return;
        }
        self.update(|data| {
            data.user_id = None;
            data.prediction = None;
            data.last_input = None;
        });
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthError::MissingSession)
    }
}

/// Resolve the session cookie for every request. A cookie is issued only once
/// the handler has written to a new session or rotated its id.
pub async fn session_middleware(
    State(store): State<SessionStore>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .filter(|id| store.exists(id));

    let session = match existing {
        Some(id) => Session::resume(id, store.clone()),
        None => Session::new(store.clone()),
    };
    request.extensions_mut().insert(session.clone());

    let response = next.run(request).await;

    match session.id() {
        Some(id) if existing != Some(id) => {
            tracing::debug!(session_id = %id, "issuing session cookie");
            (jar.add(store.cookie(id)), response).into_response()
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60), false)
    }

    #[test]
    fn test_update_and_load_round_trip() {
        let store = store();
        let id = store.create();

        store.update(&id, |data| {
            data.prediction = Some("No Heart Disease".to_string());
        });

        assert_eq!(store.load(&id).prediction.as_deref(), Some("No Heart Disease"));
        assert_eq!(store.load(&Uuid::new_v4()), SessionData::default());
    }

    #[test]
    fn test_cycle_moves_data_to_new_id() {
        let store = store();
        let id = store.create();
        store.update(&id, |data| data.email = Some("a@b.org".to_string()));

        let new_id = store.cycle(&id);

        assert_ne!(id, new_id);
        assert!(!store.exists(&id));
        assert_eq!(store.load(&new_id).email.as_deref(), Some("a@b.org"));
    }

    #[test]
    fn test_expired_sessions_are_purged() {
        let store = SessionStore::new(Duration::ZERO, false);
        let id = store.create();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.load(&id), SessionData::default());
        assert_eq!(store.purge_expired(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_logout_keeps_reset_state() {
        let store = store();
        let session = Session::new(store.clone());
        session.update(|data| {
            data.otp = Some("123456".to_string());
            data.email = Some("a@b.org".to_string());
            data.prediction = Some("High Risk".to_string());
        });
        session.login(Uuid::new_v4());

        session.logout();

        let data = session.data();
        assert!(!data.is_authenticated());
        assert_eq!(data.prediction, None);
        assert_eq!(data.last_input, None);
        assert_eq!(data.otp.as_deref(), Some("123456"));
        assert_eq!(data.email.as_deref(), Some("a@b.org"));
    }

    #[test]
    fn test_login_rotates_session_id() {
        let store = store();
        let first = store.create();
        let session = Session::resume(first, store.clone());

        session.login(Uuid::new_v4());

        assert_ne!(session.id(), Some(first));
        assert!(session.data().is_authenticated());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_new_session_is_saved_on_first_write() {
        let store = store();
        let session = Session::new(store.clone());

        assert_eq!(session.data(), SessionData::default());
        session.logout();
        assert!(session.id().is_none());
        assert!(store.is_empty());

        session.update(|data| data.email = Some("a@b.org".to_string()));

        let id = session.id().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load(&id).email.as_deref(), Some("a@b.org"));
    }

    #[test]
    fn test_login_saves_a_new_session() {
        let store = store();
        let session = Session::new(store.clone());
        let user_id = Uuid::new_v4();

        session.login(user_id);

        assert_eq!(store.len(), 1);
        assert_eq!(session.data().user_id, Some(user_id));
    }

    #[test]
    fn test_reset_stage_transitions() {
        let mut data = SessionData::default();
        assert_eq!(data.reset_stage(), ResetStage::AwaitingEmail);

        data.otp = Some("000111".to_string());
        data.email = Some("a@b.org".to_string());
        assert_eq!(data.reset_stage(), ResetStage::AwaitingOtp);

        data.otp_verified = true;
        assert_eq!(data.reset_stage(), ResetStage::AwaitingNewPassword);
    }
}
