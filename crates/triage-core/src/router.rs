//! Session-gated router.
//!
//! Every navigation first runs the guard, then compares the resolved route
//! with the current one. Equal routes are a no-op and emit no render. The
//! guard never fails: it silently swaps the destination.
//!
//! | session | requested              | resolved  |
//! |---------|------------------------|-----------|
//! | absent  | home, dashboard        | login     |
//! | present | login, signup          | home      |
//! | any     | anything else          | unchanged |

use crate::route::Route;

/// Apply the session guard to a requested route.
pub fn guard(target: Route, authenticated: bool) -> Route {
    if !authenticated && target.requires_session() {
        Route::Login
    } else if authenticated && target.guest_only() {
        Route::Home
    } else {
        target
    }
}

/// A route change that produced a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Option<Route>,
    pub requested: Route,
    pub resolved: Route,
}

impl Transition {
    /// True when the guard replaced the requested route.
    pub fn redirected(&self) -> bool {
        self.requested != self.resolved
    }
}

/// Result of one navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The route changed and a render was emitted.
    Rendered(Transition),
    /// The resolved route equals the current one.
    Unchanged,
}

impl Navigation {
    pub fn rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    current: Route,
    renders: u64,
}

impl Router {
    /// Resolve the initial route from a persisted fragment (default home),
    /// with the guard applied. Counts as the first render.
    pub fn start(fragment: Option<&str>, authenticated: bool) -> (Self, Transition) {
        let requested = fragment.map(Route::parse).unwrap_or(Route::Home);
        let resolved = guard(requested.clone(), authenticated);
        let transition = Transition {
            from: None,
            requested,
            resolved: resolved.clone(),
        };
        log::debug!(
            "router start: requested {} resolved {}",
            transition.requested,
            transition.resolved
        );
        (
            Self {
                current: resolved,
                renders: 1,
            },
            transition,
        )
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Fragment of the current route, for persisting.
    pub fn fragment(&self) -> String {
        self.current.fragment()
    }

    /// Number of renders emitted so far, including the initial one.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn navigate(&mut self, target: Route, authenticated: bool) -> Navigation {
        let resolved = guard(target.clone(), authenticated);
        if resolved == self.current {
            log::debug!("router: {} is current, no render", resolved);
            return Navigation::Unchanged;
        }
        let from = std::mem::replace(&mut self.current, resolved.clone());
        self.renders += 1;
        let transition = Transition {
            from: Some(from),
            requested: target,
            resolved,
        };
        log::debug!(
            "router: {} -> {} (requested {}{})",
            transition.from.as_ref().map(|r| r.fragment()).unwrap_or_default(),
            transition.resolved,
            transition.requested,
            if transition.redirected() { ", redirected" } else { "" }
        );
        Navigation::Rendered(transition)
    }
}
