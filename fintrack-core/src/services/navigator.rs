//! Navigator - applies the route guard to protected routes

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::navigation::split_location;
use crate::domain::GuardDecision;

use super::RouteGuard;

/// Where the dashboard lives; also the default post-sign-in destination
pub const DASHBOARD_PATH: &str = "/dashboard";

/// A known client route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub protected: bool,
}

impl Route {
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protected: false,
        }
    }

    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protected: true,
        }
    }
}

/// Result of one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum NavigationOutcome {
    /// The view at `path` may be shown
    Rendered { path: String },
    /// The navigation was replaced by a visit to `location`
    Redirected { location: String },
    NotFound { path: String },
}

/// Route table plus the guard that protects part of it
pub struct Navigator {
    guard: Arc<RouteGuard>,
    routes: Vec<Route>,
}

impl Navigator {
    /// Navigator with the landing page, sign-in, and the dashboard
    pub fn new(guard: Arc<RouteGuard>) -> Self {
        let routes = vec![
            Route::public("/"),
            Route::public(guard.sign_in_path()),
            Route::protected(DASHBOARD_PATH),
        ];
        Self { guard, routes }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.retain(|r| r.path != route.path);
        self.routes.push(route);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn guard(&self) -> &Arc<RouteGuard> {
        &self.guard
    }

    /// Navigate to `location` (path with optional query)
    pub async fn navigate(&self, location: &str) -> NavigationOutcome {
        let (path, _) = split_location(location);
        let path = normalize(path);

        let Some(route) = self.routes.iter().find(|r| r.path == path) else {
            return NavigationOutcome::NotFound {
                path: path.to_string(),
            };
        };

        if !route.protected {
            return NavigationOutcome::Rendered {
                path: route.path.clone(),
            };
        }

        debug!(path, "evaluating guard for protected route");
        match self.guard.evaluate(location).await {
            GuardDecision::Allow => NavigationOutcome::Rendered {
                path: route.path.clone(),
            },
            GuardDecision::Redirect { to, intent } => NavigationOutcome::Redirected {
                location: intent.sign_in_location(&to),
            },
        }
    }
}

/// Drop a trailing slash except on the root
fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ if path.is_empty() => "/",
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::adapters::demo::demo_identity;
    use crate::adapters::memory::InMemoryIdentityProvider;
    use crate::ports::IdentityProvider;
    use crate::services::SessionStore;

    fn navigator(provider: &Arc<InMemoryIdentityProvider>) -> Navigator {
        let provider: Arc<dyn IdentityProvider> = provider.clone();
        let guard = RouteGuard::new(Arc::new(SessionStore::new()), provider, "/signin");
        Navigator::new(Arc::new(guard))
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/dashboard/"), "/dashboard");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[tokio::test]
    async fn test_public_routes_skip_guard() {
        let provider = Arc::new(InMemoryIdentityProvider::signed_out());
        let nav = navigator(&provider);

        assert_eq!(
            nav.navigate("/").await,
            NavigationOutcome::Rendered { path: "/".into() }
        );
        assert_eq!(
            nav.navigate("/signin?redirect=%2Fdashboard").await,
            NavigationOutcome::Rendered { path: "/signin".into() }
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_protected_route_redirects_when_signed_out() {
        let provider = Arc::new(InMemoryIdentityProvider::signed_out());
        let nav = navigator(&provider);

        assert_eq!(
            nav.navigate("/dashboard?month=5").await,
            NavigationOutcome::Redirected {
                location: "/signin?redirect=%2Fdashboard%3Fmonth%3D5".into()
            }
        );
    }

    #[tokio::test]
    async fn test_protected_route_renders_when_signed_in() {
        let provider = Arc::new(InMemoryIdentityProvider::signed_in(demo_identity()));
        let nav = navigator(&provider);

        assert_eq!(
            nav.navigate("/dashboard/").await,
            NavigationOutcome::Rendered { path: "/dashboard".into() }
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let provider = Arc::new(InMemoryIdentityProvider::signed_out());
        let nav = navigator(&provider).with_route(Route::protected("/reports"));

        assert!(matches!(nav.navigate("/nope").await, NavigationOutcome::NotFound { .. }));
        assert!(matches!(
            nav.navigate("/reports").await,
            NavigationOutcome::Redirected { .. }
        ));
    }
}
