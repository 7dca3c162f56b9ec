//! Form input and local validation.
//!
//! Validation runs before any service call and reports every failing field
//! at once, keyed by the input name the view shows the message under.

use crate::error::FormErrors;
use crate::file_reader::ImageFile;

pub const MIN_PASSWORD_LEN: usize = 8;

pub const MSG_NAME_REQUIRED: &str = "Name is required";
pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_PASSWORD_REQUIRED: &str = "Password is required";
pub const MSG_PASSWORD_SHORT: &str = "Use at least 8 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_IMAGE_REQUIRED: &str = "Please select an image";

/// Shown when the auth service fails for a reason other than a field.
pub const MSG_LOGIN_FAILED: &str = "Login failed. Try again.";
pub const MSG_SIGNUP_FAILED: &str = "Signup failed. Try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", MSG_EMAIL_REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", MSG_PASSWORD_REQUIRED);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", MSG_NAME_REQUIRED);
        }
        if self.email.trim().is_empty() {
            errors.add("email", MSG_EMAIL_REQUIRED);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add("password", MSG_PASSWORD_SHORT);
        }
        if self.password != self.confirm {
            errors.add("confirm", MSG_PASSWORD_MISMATCH);
        }
        errors.into_result()
    }
}

/// The upload form needs a selected image.
pub fn validate_upload(file: Option<&ImageFile>) -> Result<&ImageFile, FormErrors> {
    file.ok_or_else(|| {
        let mut errors = FormErrors::new();
        errors.add("image", MSG_IMAGE_REQUIRED);
        errors
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let err = LoginForm::default().validate().unwrap_err();
        assert_eq!(err.get("email"), Some(MSG_EMAIL_REQUIRED));
        assert_eq!(err.get("password"), Some(MSG_PASSWORD_REQUIRED));

        let blank_email = LoginForm {
            email: "   ".into(),
            password: "x".into(),
        };
        assert_eq!(blank_email.validate().unwrap_err().len(), 1);
    }

    #[test]
    fn signup_rules() {
        let form = SignupForm {
            name: " ".into(),
            email: "a@b.c".into(),
            password: "short".into(),
            confirm: "shorter".into(),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.get("name"), Some(MSG_NAME_REQUIRED));
        assert_eq!(err.get("email"), None);
        assert_eq!(err.get("password"), Some(MSG_PASSWORD_SHORT));
        assert_eq!(err.get("confirm"), Some(MSG_PASSWORD_MISMATCH));
    }

    #[test]
    fn valid_signup_passes() {
        let form = SignupForm {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            password: "longenough".into(),
            confirm: "longenough".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn upload_without_file_is_invalid() {
        let err = validate_upload(None).unwrap_err();
        assert_eq!(err.get("image"), Some(MSG_IMAGE_REQUIRED));
    }
}
