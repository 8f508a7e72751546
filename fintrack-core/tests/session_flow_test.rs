//! End-to-end session flow through the public API
//!
//! Protected navigation -> redirect to sign-in with intent -> sign-in
//! completes -> user lands back where they started.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fintrack_core::adapters::demo::demo_identity;
use fintrack_core::adapters::memory::{IdentityOutcome, InMemoryIdentityProvider};
use fintrack_core::domain::navigation::split_location;
use fintrack_core::ports::IdentityProvider;
use fintrack_core::services::{
    NavigationOutcome, Navigator, RouteGuard, SessionStore, SignInService,
};
use fintrack_core::{NavigationIntent, SessionState};

struct Harness {
    provider: Arc<InMemoryIdentityProvider>,
    store: Arc<SessionStore>,
    navigator: Navigator,
    sign_in: SignInService,
}

fn harness(provider: InMemoryIdentityProvider) -> Harness {
    let provider = Arc::new(provider);
    let dyn_provider: Arc<dyn IdentityProvider> = provider.clone();
    let store = Arc::new(SessionStore::new());
    let guard = Arc::new(RouteGuard::new(
        Arc::clone(&store),
        Arc::clone(&dyn_provider),
        "/signin",
    ));
    Harness {
        navigator: Navigator::new(guard),
        sign_in: SignInService::new(
            Arc::clone(&store),
            dyn_provider,
            "http://localhost:8000/api/v1",
            "/signin",
        ),
        provider,
        store,
    }
}

#[tokio::test]
async fn test_redirect_then_sign_in_returns_to_original_location() {
    let h = harness(InMemoryIdentityProvider::signed_out());

    let outcome = h.navigator.navigate("/dashboard?month=5&tab=expenses").await;
    let NavigationOutcome::Redirected { location } = outcome else {
        panic!("expected redirect, got {outcome:?}");
    };
    assert_eq!(
        location,
        "/signin?redirect=%2Fdashboard%3Fmonth%3D5%26tab%3Dexpenses"
    );
    assert_eq!(h.store.current(), SessionState::Anonymous);

    // The sign-in view renders without another redirect
    let (path, query) = split_location(&location);
    assert_eq!(
        h.navigator.navigate(&location).await,
        NavigationOutcome::Rendered {
            path: path.to_string()
        }
    );

    // OAuth round trip sets the session cookie
    h.provider
        .set_outcome(IdentityOutcome::SignedIn(demo_identity()));
    let intent = query.and_then(NavigationIntent::from_search_query);
    let signed_in = h.sign_in.complete(intent).await.unwrap();

    assert_eq!(signed_in.destination, "/dashboard?month=5&tab=expenses");
    assert_eq!(signed_in.identity, demo_identity());
    assert!(h.store.is_authenticated());

    let calls_before = h.provider.call_count();
    assert_eq!(
        h.navigator.navigate(&signed_in.destination).await,
        NavigationOutcome::Rendered {
            path: "/dashboard".to_string()
        }
    );
    assert_eq!(h.provider.call_count(), calls_before);
}

#[tokio::test]
async fn test_sign_out_forces_fresh_check() {
    let h = harness(InMemoryIdentityProvider::signed_in(demo_identity()));

    assert!(matches!(
        h.navigator.navigate("/dashboard").await,
        NavigationOutcome::Rendered { .. }
    ));
    assert_eq!(h.provider.call_count(), 1);

    h.sign_in.sign_out();
    h.provider.set_outcome(IdentityOutcome::Unauthorized);

    assert_eq!(
        h.navigator.navigate("/dashboard").await,
        NavigationOutcome::Redirected {
            location: "/signin?redirect=%2Fdashboard".to_string()
        }
    );
    assert_eq!(h.provider.call_count(), 2);
}

#[tokio::test]
async fn test_unreachable_server_behaves_like_signed_out() {
    let h = harness(InMemoryIdentityProvider::new(IdentityOutcome::Unreachable));

    assert_eq!(
        h.navigator.navigate("/dashboard").await,
        NavigationOutcome::Redirected {
            location: "/signin?redirect=%2Fdashboard".to_string()
        }
    );
    assert!(h.sign_in.complete(None).await.is_err());
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn test_public_routes_skip_the_guard() {
    let h = harness(InMemoryIdentityProvider::signed_out());

    assert_eq!(
        h.navigator.navigate("/").await,
        NavigationOutcome::Rendered {
            path: "/".to_string()
        }
    );
    assert_eq!(
        h.navigator.navigate("/nowhere").await,
        NavigationOutcome::NotFound {
            path: "/nowhere".to_string()
        }
    );
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn test_listeners_observe_every_transition() {
    let h = harness(InMemoryIdentityProvider::signed_in(demo_identity()));
    let seen = Arc::new(AtomicUsize::new(0));
    let authenticated_seen = Arc::new(AtomicUsize::new(0));

    let (s, a) = (Arc::clone(&seen), Arc::clone(&authenticated_seen));
    let id = h.store.subscribe(move |state| {
        s.fetch_add(1, Ordering::SeqCst);
        if state.is_authenticated() {
            a.fetch_add(1, Ordering::SeqCst);
        }
    });

    h.navigator.navigate("/dashboard").await;
    h.sign_in.sign_out();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert_eq!(authenticated_seen.load(Ordering::SeqCst), 1);

    assert!(h.store.unsubscribe(id));
    h.sign_in.sign_out();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}
