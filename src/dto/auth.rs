use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::FieldError, models::User, session::Flash};

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        } else if !(3..=50).contains(&username.chars().count()) {
            errors.push(FieldError::new(
                "username",
                "Username must be between 3 and 50 characters",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !looks_like_email(email) {
            errors.push(FieldError::new("email", "Please provide a valid email address"));
        } else if email.chars().count() > 100 {
            errors.push(FieldError::new("email", "Email must not exceed 100 characters"));
        }

        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if self.password.chars().count() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }
        if self.password != self.confirm_password {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push(FieldError::new("full_name", "Full name is required"));
        } else if full_name.chars().count() > 100 {
            errors.push(FieldError::new(
                "full_name",
                "Full name must not exceed 100 characters",
            ));
        }

        check_max(&mut errors, "phone_number", self.phone_number.as_deref(), 20);
        check_max(&mut errors, "address", self.address.as_deref(), 200);
        check_max(&mut errors, "city", self.city.as_deref(), 200);
        check_max(&mut errors, "state", self.state.as_deref(), 200);
        check_max(&mut errors, "zip_code", self.zip_code.as_deref(), 200);

        errors
    }
}

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct LoginForm {
    pub username_or_email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.username_or_email.trim().is_empty() {
            errors.push(FieldError::new(
                "username_or_email",
                "Username or email is required",
            ));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        errors
    }
}

/// Editable profile fields. `None` leaves a field untouched.
#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthPage {
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfilePage {
    pub user: User,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardPage {
    pub user: User,
    pub cart_item_count: i64,
    pub flash: Option<Flash>,
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn check_max(errors: &mut Vec<FieldError>, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.push(FieldError::new(
            field,
            format!("{field} must not exceed {max} characters"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegisterForm {
        RegisterForm {
            username: "jdoe".into(),
            email: "jdoe@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            full_name: "Jane Doe".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_registration_has_no_errors() {
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn mismatched_confirmation_is_reported() {
        let form = RegisterForm {
            confirm_password: "other".into(),
            ..valid_form()
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "confirm_password");
    }

    #[test]
    fn rejects_short_username_and_bad_email() {
        let form = RegisterForm {
            username: "jd".into(),
            email: "not-an-email".into(),
            ..valid_form()
        };
        let fields: Vec<_> = form.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["username", "email"]);
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm {
            username_or_email: "  ".into(),
            password: String::new(),
        }
        .validate();
        assert_eq!(errors.len(), 2);
    }
}
