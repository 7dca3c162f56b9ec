//! Route enumeration and hash-fragment addressing.
//!
//! The fragment (`#/dashboard`, `#/verify-email?token=...`) is the only
//! externally observable address. Parsing never fails: anything unrecognised
//! becomes [`Route::NotFound`] carrying the original path.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
    Result,
    Privacy,
    VerifyEmail { token: Option<String> },
    NotFound { path: String },
}

impl Route {
    /// Parse a navigation fragment. A leading `#` is optional; an empty
    /// fragment means home.
    pub fn parse(fragment: &str) -> Self {
        let raw = fragment.trim().trim_start_matches('#');
        let (path, query) = match raw.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (raw, None),
        };
        match path {
            "" | "/" => Self::Home,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/dashboard" => Self::Dashboard,
            "/result" => Self::Result,
            "/privacy" => Self::Privacy,
            "/verify-email" => Self::VerifyEmail {
                token: query.and_then(|q| query_param(q, "token")),
            },
            other => Self::NotFound {
                path: other.to_string(),
            },
        }
    }

    /// Path component without the leading `#`.
    pub fn path(&self) -> &str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Result => "/result",
            Self::Privacy => "/privacy",
            Self::VerifyEmail { .. } => "/verify-email",
            Self::NotFound { path } => path,
        }
    }

    /// Full fragment, including `#` and any query.
    pub fn fragment(&self) -> String {
        match self {
            Self::VerifyEmail { token: Some(t) } => format!("#/verify-email?token={t}"),
            other => format!("#{}", other.path()),
        }
    }

    /// Routes that need a session.
    pub fn requires_session(&self) -> bool {
        matches!(self, Self::Home | Self::Dashboard)
    }

    /// Routes that make no sense with a session.
    pub fn guest_only(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Route::parse("#/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("#"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("#/signup"), Route::Signup);
        assert_eq!(Route::parse("#/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("#/result"), Route::Result);
        assert_eq!(Route::parse("#/privacy"), Route::Privacy);
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert_eq!(
            Route::parse("#/nope"),
            Route::NotFound {
                path: "/nope".into()
            }
        );
    }

    #[test]
    fn verify_email_token() {
        assert_eq!(
            Route::parse("#/verify-email?token=abc&x=1"),
            Route::VerifyEmail {
                token: Some("abc".into())
            }
        );
        assert_eq!(
            Route::parse("#/verify-email"),
            Route::VerifyEmail { token: None }
        );
        assert_eq!(
            Route::parse("#/verify-email?token="),
            Route::VerifyEmail { token: None }
        );
    }

    #[test]
    fn fragment_round_trips() {
        for frag in ["#/", "#/login", "#/privacy", "#/verify-email?token=t1", "#/x/y"] {
            assert_eq!(Route::parse(frag).fragment(), frag);
        }
    }

    #[test]
    fn guard_classes() {
        assert!(Route::Home.requires_session());
        assert!(Route::Dashboard.requires_session());
        assert!(!Route::Result.requires_session());
        assert!(Route::Login.guest_only());
        assert!(!Route::Privacy.guest_only());
    }
}
