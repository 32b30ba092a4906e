//! Session gate for axum routers.
//!
//! Runs only the cheap phase of validation. Handlers that need the user id
//! call [`SessionClient::decode_identity_from_record`] on the
//! [`RawSession`] found in request extensions.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use axum::{Extension, Router, middleware, routing::get};
//! use djsession::api::axum::{SessionAuth, require_session};
//! use djsession::RawSession;
//!
//! let auth = SessionAuth::new(Arc::new(client));
//! let app: Router = Router::new()
//!     .route("/api/dashboard", get(|Extension(raw): Extension<RawSession>| async move { raw.session_key }))
//!     .layer(middleware::from_fn_with_state(auth, require_session::<PostgresSessionStore>));
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::{SessionClient, SessionError, SessionStore};

/// Default redirect target, Django's `LOGIN_URL` convention.
pub const DEFAULT_LOGIN_REDIRECT_URL: &str = "/account/login";

/// Custom rejection. Replaces the default redirect.
pub type ErrorHandler = Arc<dyn Fn(SessionError) -> Response + Send + Sync>;

/// State for [`require_session`].
pub struct SessionAuth<S: SessionStore> {
    client: Arc<SessionClient<S>>,
    login_redirect_url: String,
    on_error: Option<ErrorHandler>,
}

impl<S: SessionStore> Clone for SessionAuth<S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            login_redirect_url: self.login_redirect_url.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<S: SessionStore> SessionAuth<S> {
    pub fn new(client: Arc<SessionClient<S>>) -> Self {
        Self {
            client,
            login_redirect_url: DEFAULT_LOGIN_REDIRECT_URL.to_owned(),
            on_error: None,
        }
    }

    #[must_use]
    pub fn with_login_redirect(mut self, url: impl Into<String>) -> Self {
        self.login_redirect_url = url.into();
        self
    }

    #[must_use]
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(SessionError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn client(&self) -> &Arc<SessionClient<S>> {
        &self.client
    }

    pub fn login_redirect_url(&self) -> &str {
        &self.login_redirect_url
    }

    fn reject(&self, error: SessionError) -> Response {
        match &self.on_error {
            Some(handler) => handler(error),
            None => (
                StatusCode::FOUND,
                [(LOCATION, self.login_redirect_url.clone())],
            )
                .into_response(),
        }
    }
}

/// Middleware that requires a live session cookie.
///
/// On success the [`RawSession`](crate::RawSession) is inserted into the
/// request extensions, payload still encoded. A missing cookie or any
/// validation failure redirects (`302`) to the login URL, or goes to the
/// configured error handler.
pub async fn require_session<S>(
    State(auth): State<SessionAuth<S>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    S: SessionStore + 'static,
{
    let session_key = jar
        .get(auth.client.session_cookie_name())
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty());

    let Some(session_key) = session_key else {
        log::warn!(target: "djsession::middleware", "msg=\"no session cookie\", path=\"{}\"", request.uri().path());
        return auth.reject(SessionError::SessionNotFound);
    };

    match auth.client.get_raw_session(&session_key).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            let prefix: String = session_key.chars().take(8).collect();
            log::warn!(target: "djsession::middleware", "msg=\"session rejected\", cookie_prefix=\"{prefix}...\", error=\"{e}\"");
            auth.reject(e)
        }
    }
}
