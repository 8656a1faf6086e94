//! Session cookie attributes.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use cookie::time::Duration;
use cookie::Cookie;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::Result;

/// SameSite attribute of the session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    None,
    #[default]
    Lax,
    Strict,
}

/// Attributes written alongside the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    /// Cookie path.
    pub path: Option<String>,
    /// Cookie domain.
    pub domain: Option<String>,
    /// Lifetime in seconds; `None` makes a browser-session cookie.
    pub max_age: Option<u64>,
    /// Only send over HTTPS.
    pub secure: bool,
    /// Hide from scripts.
    pub http_only: bool,
    /// SameSite policy.
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: Some("/".to_string()),
            domain: None,
            max_age: None,
            secure: false,
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

impl CookieOptions {
    /// Render a `Set-Cookie` header line.
    pub fn render(&self, name: &str, value: &str) -> String {
        self.build(name, value, self.max_age).to_string()
    }

    /// Render a `Set-Cookie` line that makes the client drop the cookie.
    pub fn render_expired(&self, name: &str) -> String {
        self.build(name, "", Some(0)).to_string()
    }

    fn build(&self, name: &str, value: &str, max_age: Option<u64>) -> Cookie<'static> {
        let mut cookie = Cookie::build((name.to_string(), value.to_string()))
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(path) = &self.path {
            cookie = cookie.path(path.clone());
        }
        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone());
        }
        if let Some(max_age) = max_age {
            let secs = i64::try_from(max_age).unwrap_or(i64::MAX);
            cookie = cookie.max_age(Duration::seconds(secs));
        }
        if let Some(same_site) = self.same_site {
            cookie = cookie.same_site(cookie::SameSite::from(same_site));
        }

        cookie.build()
    }

    /// Check that `path` and `domain` cannot smuggle extra attributes.
    ///
    /// Returns the name of the first offending attribute.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        let attributes = [("path", &self.path), ("domain", &self.domain)];
        for (attribute, value) in attributes {
            if let Some(value) = value {
                if !is_valid_attribute_value(value) {
                    return Err(attribute);
                }
            }
        }
        Ok(())
    }

    /// Render into a header value.
    pub fn header_value(&self, name: &str, value: &str) -> Result<HeaderValue> {
        self.to_header_value(self.render(name, value))
    }

    /// Render an expiring cookie into a header value.
    pub fn expired_header_value(&self, name: &str) -> Result<HeaderValue> {
        self.to_header_value(self.render_expired(name))
    }

    fn to_header_value(&self, rendered: String) -> Result<HeaderValue> {
        self.validate()
            .map_err(|attribute| SessionError::Store(format!("invalid cookie {}", attribute)))?;
        HeaderValue::from_str(&rendered)
            .map_err(|e| SessionError::Store(format!("invalid cookie header: {}", e)))
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(same_site: SameSite) -> Self {
        match same_site {
            SameSite::None => cookie::SameSite::None,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::Strict => cookie::SameSite::Strict,
        }
    }
}

/// Attribute values may not contain separators or control characters.
fn is_valid_attribute_value(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c != ';' && !c.is_control())
}

/// Find the value of the request cookie called `name`.
///
/// Unparseable cookie pairs are skipped; if several cookies share the name,
/// the first one wins.
pub fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|parsed| parsed.ok())
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}
