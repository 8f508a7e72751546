//! Navigation intents and guard decisions
//!
//! A [`NavigationIntent`] is captured when the guard sends a user to sign-in
//! and travels in the sign-in location as the `redirect` search parameter:
//!
//! ```text
//! /dashboard?month=5  ->  /signin?redirect=%2Fdashboard%3Fmonth%3D5
//! ```

use serde::Serialize;
use url::form_urlencoded;

/// Search parameter carrying the return path
pub const REDIRECT_PARAM: &str = "redirect";

/// Split a location into its path and optional query string
///
/// A trailing `?` with nothing after it yields `None` for the query.
pub fn split_location(location: &str) -> (&str, Option<&str>) {
    match location.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (location, None),
    }
}

/// The destination a user tried to reach before being sent to sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    /// Path plus query string, exactly as requested
    return_path: String,
}

impl NavigationIntent {
    pub fn new(return_path: impl Into<String>) -> Self {
        Self {
            return_path: return_path.into(),
        }
    }

    /// Build from a path and optional query parameters
    pub fn from_parts(path: &str, query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.is_empty() => Self::new(format!("{}?{}", path, q)),
            _ => Self::new(path),
        }
    }

    pub fn return_path(&self) -> &str {
        &self.return_path
    }

    /// Path component of the return path, without the query
    pub fn path(&self) -> &str {
        split_location(&self.return_path).0
    }

    /// Take the return path, discarding the intent
    pub fn into_return_path(self) -> String {
        self.return_path
    }

    /// Encode as the `redirect=...` search string
    pub fn to_search_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(REDIRECT_PARAM, &self.return_path)
            .finish()
    }

    /// Recover an intent from a sign-in search string
    ///
    /// Only same-origin paths (leading `/`, not `//`) are accepted so a
    /// crafted link cannot bounce the user off-site after sign-in.
    pub fn from_search_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| value.starts_with('/') && !value.starts_with("//"))
            .map(Self::new)
    }

    /// Full sign-in location carrying this intent
    pub fn sign_in_location(&self, sign_in_path: &str) -> String {
        format!("{}?{}", sign_in_path, self.to_search_query())
    }
}

/// Terminal output of one guard evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum GuardDecision {
    /// Proceed with the requested navigation
    Allow,
    /// Abort the navigation and go to `to`, carrying the original target
    Redirect { to: String, intent: NavigationIntent },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Location to navigate to instead, if this is a redirect
    pub fn redirect_location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Redirect { to, intent } => Some(intent.sign_in_location(to)),
        }
    }
}
