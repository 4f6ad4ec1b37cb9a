//! Edit-time checks applied before a record reaches the cache.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::{Validate, ValidationErrorsKind};

use super::types::User;

/// Email syntax accepted by the form: dot-separated local part without a
/// leading, trailing or doubled dot, hostname labels, alphabetic TLD of two or
/// more letters.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^(?:[a-z0-9_'+-]+\.)*[a-z0-9_'+-]*[a-z0-9_+-]@(?:[a-z0-9][a-z0-9-]*\.)+[a-z]{2,}$")
    .expect("valid regex")
});

/// Editable field of a user record, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Name,
  Username,
  Email,
  Phone,
  Website,
}

impl Field {
  pub const ALL: [Field; 5] = [
    Field::Name,
    Field::Username,
    Field::Email,
    Field::Phone,
    Field::Website,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Field::Name => "Name",
      Field::Username => "Username",
      Field::Email => "Email",
      Field::Phone => "Phone",
      Field::Website => "Website",
    }
  }

  /// Struct field name, as reported by `validator`.
  fn key(&self) -> &'static str {
    match self {
      Field::Name => "name",
      Field::Username => "username",
      Field::Email => "email",
      Field::Phone => "phone",
      Field::Website => "website",
    }
  }
}

/// One field that failed its check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
  pub field: Field,
  pub message: String,
}

/// Every failed field of a draft, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
  /// Message for `field`, if it failed.
  pub fn for_field(&self, field: Field) -> Option<&str> {
    self
      .0
      .iter()
      .find(|e| e.field == field)
      .map(|e| e.message.as_str())
  }
}

impl From<validator::ValidationErrors> for ValidationErrors {
  fn from(errors: validator::ValidationErrors) -> Self {
    let by_field = errors.errors();
    let failed = Field::ALL
      .iter()
      .filter_map(|&field| match by_field.get(field.key())? {
        ValidationErrorsKind::Field(errors) => {
          let first = errors.first()?;
          let message = first.message.clone().unwrap_or_else(|| first.code.clone());
          Some(ValidationError {
            field,
            message: Cow::into_owned(message),
          })
        }
        _ => None,
      })
      .collect();
    Self(failed)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self
      .0
      .iter()
      .map(|e| format!("{}: {}", e.field.label(), e.message))
      .collect();
    write!(f, "{}", parts.join(", "))
  }
}

/// Form contents for creating or editing a user.
///
/// Values are checked as typed; surrounding whitespace is neither trimmed
/// nor rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct UserDraft {
  #[validate(length(min = 1, message = "Name is required"))]
  pub name: String,
  #[validate(length(min = 1, message = "Username is required"))]
  pub username: String,
  #[validate(regex(path = *EMAIL, message = "Invalid email address"))]
  pub email: String,
  #[validate(length(min = 1, message = "Phone number is required"))]
  pub phone: String,
  #[validate(url(message = "Invalid URL"))]
  pub website: String,
}

impl UserDraft {
  pub fn from_user(user: &User) -> Self {
    Self {
      name: user.name.clone(),
      username: user.username.clone(),
      email: user.email.clone(),
      phone: user.phone.clone(),
      website: user.website.clone(),
    }
  }

  pub fn get(&self, field: Field) -> &str {
    match field {
      Field::Name => &self.name,
      Field::Username => &self.username,
      Field::Email => &self.email,
      Field::Phone => &self.phone,
      Field::Website => &self.website,
    }
  }

  pub fn set(&mut self, field: Field, value: String) {
    match field {
      Field::Name => self.name = value,
      Field::Username => self.username = value,
      Field::Email => self.email = value,
      Field::Phone => self.phone = value,
      Field::Website => self.website = value,
    }
  }

  /// Check every field, collecting all failures.
  pub fn check(&self) -> Result<(), ValidationErrors> {
    self.validate().map_err(ValidationErrors::from)
  }

  /// Validate and build the record for `id`.
  pub fn into_user(self, id: u64) -> Result<User, ValidationErrors> {
    self.check()?;
    Ok(User {
      id,
      name: self.name,
      username: self.username,
      email: self.email,
      phone: self.phone,
      website: self.website,
    })
  }
}
