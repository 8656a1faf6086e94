//! Per-request session handles and the typed accessor.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::{header::SET_COOKIE, Extensions, HeaderMap, HeaderValue};
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::{SessionId, SessionRecord, SessionValue};
use crate::error::SessionError;
use crate::store::SessionStore;
use crate::Result;

/// Cookie staging and response bookkeeping for one handle.
#[derive(Debug, Default)]
struct Outgoing {
    /// `Set-Cookie` value produced by the last save or destroy.
    cookie: Option<HeaderValue>,
    /// Whether the binder has already written the response headers.
    committed: bool,
}

struct HandleInner {
    name: String,
    store: Arc<dyn SessionStore>,
    headers: HeaderMap,
    record: OnceCell<Arc<Mutex<SessionRecord>>>,
    /// Bumped by every modification.
    version: AtomicU64,
    /// Highest version handed to the store.
    saved_version: AtomicU64,
    outgoing: Mutex<Outgoing>,
}

impl HandleInner {
    fn is_dirty(&self) -> bool {
        self.version.load(Ordering::Acquire) != self.saved_version.load(Ordering::Acquire)
    }

    fn mark_saved(&self, version: u64) {
        self.saved_version.fetch_max(version, Ordering::AcqRel);
    }
}

/// The session bound to one request.
///
/// Created unmaterialized by the session layer; the record is fetched from
/// the store on the first [`start`](SessionHandle::start). Clones share the
/// same state.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

impl SessionHandle {
    /// Create an unmaterialized handle for a request.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn SessionStore>,
        request_headers: HeaderMap,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                store,
                headers: request_headers,
                record: OnceCell::new(),
                version: AtomicU64::new(0),
                saved_version: AtomicU64::new(0),
                outgoing: Mutex::new(Outgoing::default()),
            }),
        }
    }

    /// Find the handle bound to a request.
    pub fn from_extensions(extensions: &Extensions) -> Result<Self> {
        extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or(SessionError::NotBound)
    }

    /// Session (cookie) name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the record has been fetched from the store.
    pub fn is_materialized(&self) -> bool {
        self.inner.record.initialized()
    }

    /// Materialize the session.
    ///
    /// The first successful call loads the record from the store; later calls
    /// return the same record. A failed load is not cached.
    pub async fn start(&self) -> Result<Session> {
        let inner = &self.inner;
        let record = inner
            .record
            .get_or_try_init(|| async {
                let record = inner.store.load(&inner.name, &inner.headers).await?;
                tracing::debug!(
                    name = %inner.name,
                    session = %record.id,
                    is_new = record.is_new,
                    "session materialized"
                );
                Ok::<_, SessionError>(Arc::new(Mutex::new(record)))
            })
            .await?;

        Ok(Session {
            handle: Arc::clone(inner),
            record: Arc::clone(record),
        })
    }

    /// Save the session if it was modified and not saved since.
    pub(crate) async fn save_if_dirty(&self) {
        let Some(record) = self.inner.record.get() else {
            return;
        };
        if !self.inner.is_dirty() {
            return;
        }

        let session = Session {
            handle: Arc::clone(&self.inner),
            record: Arc::clone(record),
        };
        if let Err(e) = session.save().await {
            tracing::warn!(name = %self.inner.name, error = %e, "session auto-save failed");
        }
    }

    /// Write the staged cookie into the response and lock further saves.
    pub(crate) fn commit(&self, response_headers: &mut HeaderMap) {
        let mut outgoing = self.inner.outgoing.lock();
        outgoing.committed = true;
        if let Some(cookie) = outgoing.cookie.take() {
            response_headers.append(SET_COOKIE, cookie);
        }
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("name", &self.inner.name)
            .field("materialized", &self.is_materialized())
            .finish_non_exhaustive()
    }
}

/// Look up the request's session and materialize it.
///
/// Fails with [`SessionError::NotBound`] if the session layer did not run
/// for this request, or with the store's error if loading fails.
pub async fn start(extensions: &Extensions) -> Result<Session> {
    SessionHandle::from_extensions(extensions)?.start().await
}

/// A materialized session.
///
/// All accessors operate on the record shared by every clone of the
/// request's [`SessionHandle`].
#[derive(Clone)]
pub struct Session {
    handle: Arc<HandleInner>,
    record: Arc<Mutex<SessionRecord>>,
}

impl Session {
    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.record.lock().id
    }

    /// Whether the store created this session for the current request.
    pub fn is_new(&self) -> bool {
        self.record.lock().is_new
    }

    /// Session (cookie) name.
    pub fn name(&self) -> &str {
        &self.handle.name
    }

    fn touch(&self) {
        self.handle.version.fetch_add(1, Ordering::AcqRel);
    }

    /// Store a value, replacing any previous one.
    pub fn set<V>(&self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.set_value(key, SessionValue::new(value));
    }

    /// Store an already wrapped value.
    pub fn set_value(&self, key: impl Into<String>, value: SessionValue) {
        self.record.lock().values.insert(key.into(), value);
        self.touch();
    }

    /// Read a value as `T`.
    ///
    /// Returns `Ok(None)` when nothing is stored under `key`. A value stored as
    /// `Arc<T>` or `Box<T>` also reads as `T`. Any other type is a
    /// [`SessionError::TypeMismatch`].
    pub fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: Any + Clone,
    {
        let record = self.record.lock();
        let Some(value) = record.values.get(key) else {
            return Ok(None);
        };
        value
            .cloned::<T>()
            .map(Some)
            .ok_or_else(|| SessionError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: value.type_name(),
            })
    }

    /// Copy a value into `dst`.
    ///
    /// Returns `Ok(false)` when the key is absent. `dst` is only written on
    /// `Ok(true)`.
    pub fn get_into<T>(&self, key: &str, dst: &mut T) -> Result<bool>
    where
        T: Any + Clone,
    {
        match self.get::<T>(key)? {
            Some(value) => {
                *dst = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read a value that must be present.
    ///
    /// Absence is reported as [`SessionError::KeyNotFound`], so handlers can
    /// propagate it straight into an error response with `?`.
    pub fn must_get<T>(&self, key: &str) -> Result<T>
    where
        T: Any + Clone,
    {
        self.get::<T>(key)?
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    /// The stored value without a type check.
    pub fn get_raw(&self, key: &str) -> Option<SessionValue> {
        self.record.lock().values.get(key).cloned()
    }

    /// Whether a value is stored under `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.record.lock().values.contains_key(key)
    }

    /// Remove a value. No-op for absent keys.
    pub fn delete(&self, key: &str) {
        if self.record.lock().values.remove(key).is_some() {
            self.touch();
        }
    }

    /// Remove all values. Flashes are kept.
    pub fn clear(&self) {
        self.record.lock().values.clear();
        self.touch();
    }

    /// Stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.record.lock().values.keys().cloned().collect()
    }

    /// Take all flashes of a category (`None` for the default one).
    pub fn flashes(&self, category: Option<&str>) -> Vec<SessionValue> {
        let flashes = self.record.lock().take_flashes(category);
        if !flashes.is_empty() {
            self.touch();
        }
        flashes
    }

    /// Queue a flash in a category (`None` for the default one).
    pub fn add_flash<V>(&self, value: V, category: Option<&str>)
    where
        V: Any + Send + Sync,
    {
        self.record
            .lock()
            .push_flash(SessionValue::new(value), category);
        self.touch();
    }

    /// Persist the session through the store.
    ///
    /// The store's cookie is attached to the response by the session layer.
    /// Changes made while the store write is pending stay dirty and are
    /// picked up by the next save or auto-save.
    ///
    /// Fails with [`SessionError::ResponseCommitted`] once the response has
    /// left the layer. If that happens while the store write is pending, the
    /// store keeps the record but the client never receives its cookie.
    pub async fn save(&self) -> Result<()> {
        self.ensure_open()?;

        let (version, snapshot) = self.snapshot();
        let cookie = self.handle.store.save(&self.handle.name, &snapshot).await?;

        self.stage(cookie)?;
        self.record.lock().is_new = false;
        self.handle.mark_saved(version);
        tracing::debug!(name = %self.handle.name, session = %snapshot.id, "session saved");
        Ok(())
    }

    /// Remove the session from the store and expire the client's cookie.
    ///
    /// Values and flashes are cleared locally as well. As with
    /// [`save`](Session::save), a commit during the store call returns
    /// [`SessionError::ResponseCommitted`] after the store already dropped
    /// the record, and the expiring cookie is not delivered.
    pub async fn destroy(&self) -> Result<()> {
        self.ensure_open()?;

        let (version, snapshot) = {
            let mut record = self.record.lock();
            let version = self.handle.version.load(Ordering::Acquire);
            let snapshot = record.clone();
            record.values.clear();
            record.flashes.clear();
            (version, snapshot)
        };
        let cookie = self
            .handle
            .store
            .destroy(&self.handle.name, &snapshot)
            .await?;

        self.stage(cookie)?;
        self.handle.mark_saved(version);
        tracing::debug!(name = %self.handle.name, session = %snapshot.id, "session destroyed");
        Ok(())
    }

    /// Copy the record together with the version it reflects.
    fn snapshot(&self) -> (u64, SessionRecord) {
        let record = self.record.lock();
        (self.handle.version.load(Ordering::Acquire), record.clone())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.handle.outgoing.lock().committed {
            return Err(SessionError::ResponseCommitted);
        }
        Ok(())
    }

    fn stage(&self, cookie: Option<HeaderValue>) -> Result<()> {
        let mut outgoing = self.handle.outgoing.lock();
        if outgoing.committed {
            return Err(SessionError::ResponseCommitted);
        }
        if cookie.is_some() {
            outgoing.cookie = cookie;
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.handle.name)
            .field("record", &*self.record.lock())
            .finish()
    }
}
