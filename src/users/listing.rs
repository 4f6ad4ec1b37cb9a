//! Display list derivation: text filter plus sort.

use std::cmp::Ordering;

use super::types::User;

/// Field the list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  #[default]
  Name,
  Email,
}

impl SortKey {
  fn field<'a>(&self, user: &'a User) -> &'a str {
    match self {
      SortKey::Name => &user.name,
      SortKey::Email => &user.email,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      SortKey::Name => "Name",
      SortKey::Email => "Email",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

impl SortDirection {
  fn flipped(self) -> Self {
    match self {
      SortDirection::Ascending => SortDirection::Descending,
      SortDirection::Descending => SortDirection::Ascending,
    }
  }
}

/// Active sort column and direction. Starts at name, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
  pub key: SortKey,
  pub direction: SortDirection,
}

impl SortState {
  /// Pick `key`: flips the direction if it is already active, otherwise
  /// switches to it ascending.
  pub fn toggle(&mut self, key: SortKey) {
    if self.key == key {
      self.direction = self.direction.flipped();
    } else {
      self.key = key;
      self.direction = SortDirection::Ascending;
    }
  }

  /// Arrow for `key` in the sort bar, empty when `key` is not active.
  pub fn indicator(&self, key: SortKey) -> &'static str {
    match (self.key == key, self.direction) {
      (false, _) => "",
      (true, SortDirection::Ascending) => "▲",
      (true, SortDirection::Descending) => "▼",
    }
  }

  fn compare(&self, a: &User, b: &User) -> Ordering {
    let ord = self.key.field(a).cmp(self.key.field(b));
    match self.direction {
      SortDirection::Ascending => ord,
      SortDirection::Descending => ord.reverse(),
    }
  }
}

/// True if `user`'s name or username contains `query`, ignoring case.
/// An empty query matches everyone.
pub fn matches(user: &User, query: &str) -> bool {
  if query.is_empty() {
    return true;
  }
  let needle = query.to_lowercase();
  user.name.to_lowercase().contains(&needle) || user.username.to_lowercase().contains(&needle)
}

/// Users matching `query`, ordered by `sort`. Ties keep collection order.
pub fn view(users: &[User], query: &str, sort: SortState) -> Vec<User> {
  let mut shown: Vec<User> = users.iter().filter(|u| matches(u, query)).cloned().collect();
  shown.sort_by(|a, b| sort.compare(a, b));
  shown
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(id: u64, name: &str, username: &str, email: &str) -> User {
    User {
      id,
      name: name.to_string(),
      username: username.to_string(),
      email: email.to_string(),
      phone: "555-0100".to_string(),
      website: "https://example.com".to_string(),
    }
  }

  fn test_users() -> Vec<User> {
    vec![
      user(1, "Carol", "cdanvers", "zed@example.com"),
      user(2, "Alice", "alice1", "bob@example.com"),
      user(3, "Bob", "bobby", "alice@example.com"),
    ]
  }

  fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
  }

  #[test]
  fn test_sort_by_name_ascending() {
    let shown = view(&test_users(), "", SortState::default());
    assert_eq!(names(&shown), vec!["Alice", "Bob", "Carol"]);
  }

  #[test]
  fn test_sort_by_email_descending() {
    let sort = SortState {
      key: SortKey::Email,
      direction: SortDirection::Descending,
    };
    let shown = view(&test_users(), "", sort);
    let emails: Vec<&str> = shown.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(
      emails,
      vec!["zed@example.com", "bob@example.com", "alice@example.com"]
    );
  }

  #[test]
  fn test_sort_is_case_sensitive_lexicographic() {
    let users = vec![user(1, "bob", "b", "b@x.io"), user(2, "Zed", "z", "z@x.io")];
    let shown = view(&users, "", SortState::default());
    // Uppercase sorts before lowercase in plain string ordering.
    assert_eq!(names(&shown), vec!["Zed", "bob"]);
  }

  #[test]
  fn test_filter_matches_name() {
    let users = vec![
      user(1, "Alice", "alice1", "a@x.io"),
      user(2, "Bob", "bobby", "b@x.io"),
    ];
    let shown = view(&users, "ali", SortState::default());
    assert_eq!(names(&shown), vec!["Alice"]);
  }

  #[test]
  fn test_filter_matches_username_case_insensitive() {
    let shown = view(&test_users(), "DANV", SortState::default());
    assert_eq!(names(&shown), vec!["Carol"]);
  }

  #[test]
  fn test_filter_ignores_email() {
    // "zed" only appears in Carol's email
    let shown = view(&test_users(), "zed", SortState::default());
    assert!(shown.is_empty());
  }

  #[test]
  fn test_ties_keep_collection_order() {
    let users = vec![
      user(1, "Sam", "first", "s@x.io"),
      user(2, "Sam", "second", "s@x.io"),
    ];
    let shown = view(&users, "", SortState::default());
    assert_eq!(shown[0].id, 1);
    assert_eq!(shown[1].id, 2);
  }

  #[test]
  fn test_view_leaves_input_untouched() {
    let users = test_users();
    let before = users.clone();
    let _ = view(&users, "a", SortState::default());
    assert_eq!(users, before);
  }

  #[test]
  fn test_toggle_state_machine() {
    let mut sort = SortState::default();
    assert_eq!(sort.key, SortKey::Name);
    assert_eq!(sort.direction, SortDirection::Ascending);

    sort.toggle(SortKey::Name);
    assert_eq!(sort.direction, SortDirection::Descending);

    sort.toggle(SortKey::Email);
    assert_eq!(sort.key, SortKey::Email);
    assert_eq!(sort.direction, SortDirection::Ascending);

    sort.toggle(SortKey::Email);
    assert_eq!(sort.direction, SortDirection::Descending);

    sort.toggle(SortKey::Name);
    assert_eq!(sort.key, SortKey::Name);
    assert_eq!(sort.direction, SortDirection::Ascending);
  }

  #[test]
  fn test_indicator() {
    let mut sort = SortState::default();
    assert_eq!(sort.indicator(SortKey::Name), "▲");
    assert_eq!(sort.indicator(SortKey::Email), "");

    sort.toggle(SortKey::Name);
    assert_eq!(sort.indicator(SortKey::Name), "▼");
  }
}
