//! Session binding middleware.
//!
//! [`SessionLayer`] inserts a fresh [`SessionHandle`] into every request's
//! extensions before the inner service runs, then writes any cookie staged
//! by [`Session::save`](crate::Session::save) into the response.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::session::SessionHandle;
use crate::store::SessionStore;

/// Layer that binds a session to each request.
#[derive(Clone)]
pub struct SessionLayer {
    name: Arc<str>,
    store: Arc<dyn SessionStore>,
    auto_save: bool,
}

impl SessionLayer {
    /// Bind sessions called `name` backed by `store`.
    pub fn new(name: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            name: Arc::from(name.into()),
            store,
            auto_save: false,
        }
    }

    /// Save modified sessions automatically after the handler returns.
    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Session (cookie) name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SessionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLayer")
            .field("name", &self.name)
            .field("auto_save", &self.auto_save)
            .finish_non_exhaustive()
    }
}

impl<S> Layer<S> for SessionLayer {
    type Service = SessionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService {
            inner,
            layer: self.clone(),
        }
    }
}

/// Service produced by [`SessionLayer`].
#[derive(Clone, Debug)]
pub struct SessionService<S> {
    inner: S,
    layer: SessionLayer,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SessionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let handle = SessionHandle::new(
            self.layer.name.as_ref(),
            Arc::clone(&self.layer.store),
            request.headers().clone(),
        );
        // Replaces a handle bound by an outer layer
        request.extensions_mut().insert(handle.clone());

        // The ready service is the one to call; leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let auto_save = self.layer.auto_save;

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            if auto_save {
                handle.save_if_dirty().await;
            }
            handle.commit(response.headers_mut());
            Ok(response)
        })
    }
}
