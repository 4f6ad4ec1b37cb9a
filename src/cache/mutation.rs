//! Pure collection mutations applied by the user cache.

use crate::users::{User, NEW_USER_ID};

/// A change to the user collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
  /// Append a newly created user
  Insert(User),
  /// Replace the user with `id`
  Replace { id: u64, user: User },
  /// Drop the user with `id`
  Remove(u64),
}

impl Mutation {
  /// Apply this mutation to `users`, producing the next collection.
  ///
  /// Returns `None` when the mutation leaves the collection unchanged: a
  /// replace or remove of an id that is not present, a replace whose record
  /// carries a different id, or an insert whose id is the create sentinel or
  /// already taken.
  pub fn apply(&self, users: &[User]) -> Option<Vec<User>> {
    match self {
      Mutation::Insert(user) => {
        if user.id == NEW_USER_ID || users.iter().any(|u| u.id == user.id) {
          return None;
        }
        let mut next = Vec::with_capacity(users.len() + 1);
        next.extend_from_slice(users);
        next.push(user.clone());
        Some(next)
      }
      Mutation::Replace { id, user } => {
        if user.id != *id {
          return None;
        }
        let pos = users.iter().position(|u| u.id == *id)?;
        let mut next = users.to_vec();
        next[pos] = user.clone();
        Some(next)
      }
      Mutation::Remove(id) => {
        if !users.iter().any(|u| u.id == *id) {
          return None;
        }
        Some(users.iter().filter(|u| u.id != *id).cloned().collect())
      }
    }
  }

  /// Short label for log lines.
  pub fn describe(&self) -> String {
    match self {
      Mutation::Insert(user) => format!("insert {}", user.id),
      Mutation::Replace { id, .. } => format!("replace {}", id),
      Mutation::Remove(id) => format!("remove {}", id),
    }
  }
}

/// Apply `mutations` in order, skipping the ones that change nothing.
pub fn apply_all(users: Vec<User>, mutations: &[Mutation]) -> Vec<User> {
  mutations
    .iter()
    .fold(users, |acc, m| m.apply(&acc).unwrap_or(acc))
}
