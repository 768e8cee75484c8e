//! Single-identity access gate.
//!
//! A request passes when the identity header set by the fronting auth proxy
//! names the allowed identity, or when it carries the configured bearer key.
//! With neither configured, nothing passes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use config::AuthConfig;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    identity_header: HeaderName,
    allowed_identity: Option<String>,
    api_key: Option<String>,
}

impl AuthPolicy {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let header_name = config.identity_header.to_lowercase();
        let identity_header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            ApiError::Configuration(format!(
                "Invalid identity header {:?}: {e}",
                config.identity_header,
            ))
        })?;

        Ok(Self {
            identity_header,
            allowed_identity: config.allowed_identity.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        if let Some(allowed) = &self.allowed_identity {
            let identity = headers
                .get(&self.identity_header)
                .and_then(|v| v.to_str().ok())
                .map(str::trim);
            if identity == Some(allowed.as_str()) {
                return true;
            }
        }

        if let Some(api_key) = &self.api_key {
            let bearer = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));
            if bearer == Some(api_key.as_str()) {
                return true;
            }
        }

        false
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if state.auth.authorize(request.headers()) {
        return Ok(next.run(request).await);
    }

    tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
    Err(ApiError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy(identity: Option<&str>, key: Option<&str>) -> AuthPolicy {
        AuthPolicy::from_config(&AuthConfig {
            allowed_identity: identity.map(str::to_string),
            api_key: key.map(str::to_string),
            ..AuthConfig::default()
        })
        .unwrap()
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_identity_header_must_match() {
        let policy = policy(Some("octocat"), None);
        assert!(policy.authorize(&headers(&[("x-forwarded-user", "octocat")])));
        assert!(!policy.authorize(&headers(&[("x-forwarded-user", "someone-else")])));
        assert!(!policy.authorize(&HeaderMap::new()));
    }

    #[test]
    fn test_bearer_key() {
        let policy = policy(None, Some("0123456789abcdef"));
        assert!(policy.authorize(&headers(&[("authorization", "Bearer 0123456789abcdef")])));
        assert!(!policy.authorize(&headers(&[("authorization", "Bearer wrong")])));
        assert!(!policy.authorize(&headers(&[("authorization", "0123456789abcdef")])));
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        let policy = policy(None, None);
        assert!(!policy.authorize(&headers(&[("authorization", "Bearer 0123456789abcdef")])));
        assert!(!policy.authorize(&headers(&[("x-forwarded-user", "octocat")])));
    }

    #[test]
    fn test_custom_identity_header() {
        let policy = AuthPolicy::from_config(&AuthConfig {
            allowed_identity: Some("octocat".to_string()),
            identity_header: "X-Auth-Request-User".to_string(),
            api_key: None,
        })
        .unwrap();
        assert!(policy.authorize(&headers(&[("x-auth-request-user", "octocat")])));
    }
}
