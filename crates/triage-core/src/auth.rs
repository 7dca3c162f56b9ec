//! Local-only authentication.
//!
//! [`LocalAuthService`] keeps a small user registry, optionally persisted as
//! `users.json`. Nothing leaves the machine. Passwords are stored as a SHA-256
//! digest salted with the account email; session and verification tokens are
//! random UUIDs.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, FieldError};
use crate::session::{Session, User};

pub const MSG_EMAIL_TAKEN: &str = "Email already registered";
pub const MSG_BAD_CREDENTIALS: &str = "Invalid credentials";
pub const MSG_NO_TOKEN: &str = "No verification token provided";
pub const MSG_VERIFIED: &str = "Email verified successfully!";
pub const MSG_VERIFY_FAILED: &str = "Verification failed. The token may be invalid or expired.";

/// Live session tokens kept per account. Older ones are revoked first.
pub const MAX_SESSIONS_PER_ACCOUNT: usize = 5;

pub trait AuthService {
    /// Register a new account and sign it in.
    fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<Session, AuthError>;

    fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Revoke the session's token. Unknown tokens are ignored.
    fn logout(&mut self, session: &Session) -> Result<(), AuthError>;

    /// Whether a persisted session is still backed by the registry.
    fn validate(&self, session: &Session) -> bool;

    /// Consume an email verification token, returning the verified address.
    fn verify_email(&mut self, token: &str) -> Result<String, AuthError>;

    /// Outstanding verification token for `email`, if the address is not yet
    /// verified. Stands in for the email that would carry the link.
    fn verification_token(&self, email: &str) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    name: String,
    email: String,
    password_digest: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    verification_token: Option<String>,
    #[serde(default)]
    tokens: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registry {
    version: u32,
    accounts: Vec<Account>,
}

fn password_digest(email: &str, password: &str) -> String {
    let mut h = Sha256::new();
    h.update(email.to_lowercase().as_bytes());
    h.update([0u8]);
    h.update(password.as_bytes());
    let digest: [u8; 32] = h.finalize().into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

// ---------------------------------------------------------------------------
// LocalAuthService
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LocalAuthService {
    registry: Registry,
    path: Option<PathBuf>,
}

impl LocalAuthService {
    /// Registry that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            registry: Registry {
                version: 1,
                accounts: Vec::new(),
            },
            path: None,
        }
    }

    /// Open (or start) a registry backed by a JSON file. A corrupt file is
    /// logged and replaced by an empty registry on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let path = path.into();
        let registry = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(registry) => registry,
                Err(e) => {
                    log::warn!("user registry {} is corrupt, starting empty: {e}", path.display());
                    Registry {
                        version: 1,
                        accounts: Vec::new(),
                    }
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Registry {
                version: 1,
                accounts: Vec::new(),
            },
            Err(e) => return Err(AuthError::Storage(e)),
        };
        Ok(Self {
            registry,
            path: Some(path),
        })
    }

    fn persist(&self) -> Result<(), AuthError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.registry).map_err(io::Error::other)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn account(&self, email: &str) -> Option<&Account> {
        self.registry
            .accounts
            .iter()
            .find(|a| same_email(&a.email, email))
    }

    fn account_mut(&mut self, email: &str) -> Option<&mut Account> {
        self.registry
            .accounts
            .iter_mut()
            .find(|a| same_email(&a.email, email))
    }

    fn issue_session(&mut self, email: &str) -> Result<Session, AuthError> {
        let token = Uuid::new_v4().to_string();
        let account = self
            .account_mut(email)
            .ok_or_else(|| AuthError::Rejected(FieldError::new("password", MSG_BAD_CREDENTIALS)))?;
        account.tokens.push(token.clone());
        if account.tokens.len() > MAX_SESSIONS_PER_ACCOUNT {
            let stale = account.tokens.len() - MAX_SESSIONS_PER_ACCOUNT;
            account.tokens.drain(..stale);
            log::debug!("revoked {stale} stale session(s) for {}", account.email);
        }
        let user = User {
            name: account.name.clone(),
            email: account.email.clone(),
        };
        self.persist()?;
        Ok(Session { user, token })
    }

    pub fn pending_verification(&self, email: &str) -> Option<&str> {
        self.account(email)
            .filter(|a| !a.verified)
            .and_then(|a| a.verification_token.as_deref())
    }

    pub fn is_verified(&self, email: &str) -> bool {
        self.account(email).is_some_and(|a| a.verified)
    }

    pub fn user_count(&self) -> usize {
        self.registry.accounts.len()
    }
}

impl AuthService for LocalAuthService {
    fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if self.account(email).is_some() {
            return Err(AuthError::Rejected(FieldError::new("email", MSG_EMAIL_TAKEN)));
        }
        self.registry.accounts.push(Account {
            name: name.trim().to_string(),
            email: email.to_string(),
            password_digest: password_digest(email, password),
            verified: false,
            verification_token: Some(Uuid::new_v4().to_string()),
            tokens: Vec::new(),
        });
        let session = self.issue_session(email)?;
        log::info!("signed up {}", session.user.email);
        Ok(session)
    }

    fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        let ok = self
            .account(email)
            .is_some_and(|a| a.password_digest == password_digest(email, password));
        if !ok {
            return Err(AuthError::Rejected(FieldError::new(
                "password",
                MSG_BAD_CREDENTIALS,
            )));
        }
        let session = self.issue_session(email)?;
        log::info!("logged in {}", session.user.email);
        Ok(session)
    }

    fn logout(&mut self, session: &Session) -> Result<(), AuthError> {
        let revoked = match self.account_mut(&session.user.email) {
            Some(account) => {
                let before = account.tokens.len();
                account.tokens.retain(|t| *t != session.token);
                before != account.tokens.len()
            }
            None => false,
        };
        if revoked {
            self.persist()?;
        }
        log::info!("logged out {}", session.user.email);
        Ok(())
    }

    fn validate(&self, session: &Session) -> bool {
        self.account(&session.user.email)
            .is_some_and(|a| a.tokens.iter().any(|t| *t == session.token))
    }

    fn verify_email(&mut self, token: &str) -> Result<String, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Rejected(FieldError::new("token", MSG_NO_TOKEN)));
        }
        let account = self
            .registry
            .accounts
            .iter_mut()
            .find(|a| a.verification_token.as_deref() == Some(token))
            .ok_or_else(|| AuthError::Rejected(FieldError::new("token", MSG_VERIFY_FAILED)))?;
        account.verified = true;
        account.verification_token = None;
        let email = account.email.clone();
        self.persist()?;
        log::info!("verified {email}");
        Ok(email)
    }

    fn verification_token(&self, email: &str) -> Option<String> {
        self.pending_verification(email.trim()).map(str::to_string)
    }
}
