use serde::{Deserialize, Serialize};

/// Id reserved for a user that has not been created yet.
pub const NEW_USER_ID: u64 = 0;

/// A user record as served by the directory API.
///
/// Unknown keys in the payload (the demo API also returns `address` and
/// `company`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: u64,
  pub name: String,
  pub username: String,
  pub email: String,
  pub phone: String,
  pub website: String,
}

impl User {
  /// True for the create-mode sentinel.
  pub fn is_new(&self) -> bool {
    self.id == NEW_USER_ID
  }
}
