use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Method, Uri},
    middleware::Next,
    response::Response,
    Extension,
};
use chrono::{DateTime, Utc};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    adapters::{routing::VerbRules, state::AppState},
    application::error::ApplicationError,
    domain::models::session::RequestContext,
};

/// Largest form body buffered while looking for the `method` field.
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// Set on requests whose verb was rewritten by [`override_method`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOverride {
    pub original: Method,
    pub logical: Method,
}

/// Resolves the session cookie into a [`RequestContext`] extension.
/// Any pending flash message is consumed here.
pub async fn load_request_context(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApplicationError> {
    let context = match session_id_from_headers(request.headers(), &app_state.config.session_cookie)
    {
        Some(session_id) => {
            let repo = &app_state.session_repository;
            let user = repo.get_user(&session_id).await?;
            let flash = repo.take_flash(&session_id).await?;
            RequestContext { user, flash }
        }
        None => RequestContext::anonymous(),
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Logs one line per request, noting whether a user is logged in.
pub async fn log_request(
    Extension(context): Extension<RequestContext>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Report the verb the client actually sent
    let method = request
        .extensions()
        .get::<MethodOverride>()
        .map(|o| o.original.clone())
        .unwrap_or_else(|| request.method().clone());

    info!(
        "{}",
        request_line(Utc::now(), &method, request.uri(), context.is_authenticated())
    );
    next.run(request).await
}

/// Rewrites POST submissions to their logical verb before the router sees
/// them. Must wrap the router rather than be layered inside it.
pub async fn override_method(
    State(rules): State<Arc<VerbRules>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApplicationError> {
    let reads_form = match rules.find(request.method(), request.uri().path()) {
        Some(rule) => rule.reads_form(),
        None => return Ok(next.run(request).await),
    };

    let (mut parts, body) = request.into_parts();

    let (body, form_method) = if reads_form && is_urlencoded(&parts.headers) {
        let bytes = to_bytes(body, FORM_BODY_LIMIT).await.map_err(form_body_error)?;
        let form_method = form_method_field(&bytes);
        (Body::from(bytes), form_method)
    } else {
        (body, None)
    };

    if let Some(logical) = rules.resolve(&parts.method, parts.uri.path(), form_method.as_deref())
    {
        debug!(
            "Routing {} {} as {}",
            parts.method,
            parts.uri.path(),
            logical
        );
        parts.extensions.insert(MethodOverride {
            original: parts.method.clone(),
            logical: logical.clone(),
        });
        parts.method = logical;
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[derive(Deserialize)]
struct MethodField {
    method: Option<String>,
}

fn form_method_field(bytes: &[u8]) -> Option<String> {
    serde_urlencoded::from_bytes::<MethodField>(bytes)
        .ok()
        .and_then(|field| field.method)
}

fn form_body_error(error: axum::Error) -> ApplicationError {
    let inner = error.into_inner();
    if inner.is::<LengthLimitError>() {
        ApplicationError::PayloadTooLarge
    } else {
        ApplicationError::BadRequest(format!("Unreadable form body: {}", inner))
    }
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn request_line(now: DateTime<Utc>, method: &Method, uri: &Uri, authenticated: bool) -> String {
    let auth_type = if authenticated {
        "Authenticated"
    } else {
        "Non-Authenticated"
    };
    format!(
        "[{}]: {} {} ({} User)",
        now.format("%a, %d %b %Y %H:%M:%S GMT"),
        method,
        uri,
        auth_type
    )
}
