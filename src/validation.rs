//! Client-side input checks.
//!
//! A failing check blocks the action before any optimistic patch or
//! network call. Every rule that fails is reported, not just the first.

use std::fmt;

use crate::model::{ChangePassword, NewPost, NewUser, ResetPassword, SignIn};

const MIN_PASSWORD_LEN: usize = 8;

/// Every message produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was pushed.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Comment and reply bodies must contain something besides whitespace.
pub fn comment(content: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(content) {
        errors.push("Comment cannot be empty.");
    }
    errors.into_result()
}

pub fn sign_in(credentials: &SignIn) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(&credentials.email) {
        errors.push("Email is required.");
    }
    if credentials.password.is_empty() {
        errors.push("Password is required.");
    }
    errors.into_result()
}

pub fn registration(user: &NewUser) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(&user.first_name) {
        errors.push("First name is required.");
    }
    if is_blank(&user.last_name) {
        errors.push("Last name is required.");
    }
    if is_blank(&user.user_name) {
        errors.push("Username is required.");
    }
    if is_blank(&user.email) {
        errors.push("Email is required.");
    } else if !user.email.contains('@') {
        errors.push("Email is not valid.");
    }
    if user.password.is_empty() {
        errors.push("Password is required.");
    } else {
        password_rules(&user.password, None, &mut errors);
    }
    errors.into_result()
}

pub fn change_password(change: &ChangePassword) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let current = change.current_password.as_str();
    let new = change.new_password.as_str();
    let confirm = change.confirm_password.as_str();

    if is_blank(current) {
        errors.push("Current password is required.");
    }

    if is_blank(new) {
        errors.push("New password is required.");
    } else {
        let current = (!current.is_empty()).then_some(current);
        password_rules(new, current, &mut errors);
    }

    if is_blank(confirm) {
        errors.push("Confirm password is required.");
    } else if new != confirm {
        errors.push("New password and confirm password do not match.");
    }

    errors.into_result()
}

pub fn forgot_password(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(email) {
        errors.push("Email is required.");
    } else if !is_email(email.trim()) {
        errors.push("Please enter a valid email address.");
    }
    errors.into_result()
}

pub fn reset_password(reset: &ResetPassword) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(&reset.token) || is_blank(&reset.email) {
        errors.push("The reset link is incomplete.");
    }

    if is_blank(&reset.password) {
        errors.push("Please enter your new password.");
    } else {
        password_rules(&reset.password, None, &mut errors);
    }

    if is_blank(&reset.confirm_password) {
        errors.push("Please confirm your new password.");
    } else if reset.password != reset.confirm_password {
        errors.push("Passwords do not match.");
    }

    errors.into_result()
}

fn password_rules(password: &str, current: Option<&str>, errors: &mut ValidationErrors) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        ));
    }
    if !password.chars().any(char::is_alphabetic) {
        errors.push("Password must contain at least one letter.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number.");
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        errors.push("Password must contain at least one special character.");
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push("Password must contain at least one uppercase letter.");
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push("Password must contain at least one lowercase letter.");
    }
    if password.chars().any(char::is_whitespace) {
        errors.push("Password must not contain spaces.");
    }
    if let Some(current) = current {
        if password.contains(current) {
            errors.push("New password must not contain your current password.");
        }
    }
    let mut chars = password.chars();
    if let Some(first) = chars.next() {
        if password.chars().count() > 1 && chars.all(|c| c == first) {
            errors.push("Password must not be a repeated single character.");
        }
    }
    if password.to_lowercase().contains("password") {
        errors.push("Password must not contain the word 'password'.");
    }
}

/// A post needs a title, some content, or at least one attachment.
pub fn new_post(post: &NewPost) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let has_title = post.title.as_deref().is_some_and(|t| !is_blank(t));
    let has_content = post.content.as_deref().is_some_and(|c| !is_blank(c));
    if !has_title && !has_content && post.media.is_empty() {
        errors.push("Post must have a title, content or media.");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(current: &str, new: &str, confirm: &str) -> ChangePassword {
        ChangePassword {
            current_password: current.into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_blank_comment_rejected() {
        assert!(comment("   \n").is_err());
        assert!(comment("nice post").is_ok());
    }

    #[test]
    fn test_strong_password_accepted() {
        assert!(change_password(&change("OldPass1!", "N3w-Secret!", "N3w-Secret!")).is_ok());
    }

    #[test]
    fn test_weak_password_lists_every_failure() {
        let errors = change_password(&change("old", "abc", "abd")).unwrap_err();
        let messages = errors.messages();
        assert!(messages.iter().any(|m| m.contains("at least 8")));
        assert!(messages.iter().any(|m| m.contains("number")));
        assert!(messages.iter().any(|m| m.contains("special")));
        assert!(messages.iter().any(|m| m.contains("uppercase")));
        assert!(messages.iter().any(|m| m.contains("do not match")));
    }

    #[test]
    fn test_password_containing_current_rejected() {
        let errors = change_password(&change("Abc123!x", "Abc123!xYZ", "Abc123!xYZ")).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["New password must not contain your current password.".to_string()]
        );
    }

    #[test]
    fn test_word_password_and_repeats_rejected() {
        let errors = change_password(&change("x", "MyPassword1!", "MyPassword1!")).unwrap_err();
        assert!(errors.messages().iter().any(|m| m.contains("'password'")));

        let errors = change_password(&change("x", "aaaaaaaa", "aaaaaaaa")).unwrap_err();
        assert!(errors.messages().iter().any(|m| m.contains("repeated")));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email("ada@example.com"));
        assert!(!is_email("ada@example"));
        assert!(!is_email("ada example@x.io"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("a@b@c.io"));
        assert!(forgot_password("  ").is_err());
        assert!(forgot_password("ada@example.com").is_ok());
    }

    #[test]
    fn test_reset_password_rules() {
        let reset = ResetPassword {
            email: "ada@example.com".into(),
            token: "tok".into(),
            password: "N3w-Secret!".into(),
            confirm_password: "N3w-Secret!".into(),
        };
        assert!(reset_password(&reset).is_ok());

        let mismatch = ResetPassword {
            confirm_password: "N3w-Secret?".into(),
            ..reset.clone()
        };
        let errors = reset_password(&mismatch).unwrap_err();
        assert_eq!(errors.messages(), ["Passwords do not match."]);

        let no_token = ResetPassword {
            token: String::new(),
            ..reset
        };
        assert!(reset_password(&no_token).is_err());
    }

    #[test]
    fn test_sign_in_requires_fields() {
        let errors = sign_in(&SignIn {
            email: " ".into(),
            password: String::new(),
        })
        .unwrap_err();
        assert_eq!(errors.messages().len(), 2);
    }

    #[test]
    fn test_registration_checks_email() {
        let user = NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada.example.com".into(),
            password: "Engine#1843".into(),
            ..Default::default()
        };
        let errors = registration(&user).unwrap_err();
        assert_eq!(errors.messages(), ["Email is not valid.".to_string()]);
    }

    #[test]
    fn test_empty_post_rejected() {
        assert!(new_post(&NewPost::default()).is_err());
        let post = NewPost {
            content: Some("hello".into()),
            ..Default::default()
        };
        assert!(new_post(&post).is_ok());
    }
}
