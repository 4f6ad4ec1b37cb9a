//! Shared test doubles for cache and view tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::cache::UserCache;
use crate::users::{SourceError, User, UserSource};

pub fn user(id: u64, name: &str) -> User {
  User {
    id,
    name: name.to_string(),
    username: name.to_lowercase(),
    email: format!("{}@example.com", name.to_lowercase()),
    phone: "555-0100".to_string(),
    website: "https://example.com".to_string(),
  }
}

pub fn sample_users() -> Vec<User> {
  vec![user(1, "Alice"), user(2, "Bob")]
}

pub fn unavailable() -> SourceError {
  SourceError::Status {
    status: 503,
    url: "http://test/users".to_string(),
  }
}

/// Scripted `UserSource` that counts calls and can hold fetches on a gate.
///
/// Fetch results are handed out in order; once exhausted, fetches return an
/// empty list. `replace` echoes its input unless a result is scripted. Fetches
/// and replaces can each be held on their own gate.
#[derive(Default)]
pub struct FakeSource {
  fetch_results: Mutex<VecDeque<Result<Vec<User>, SourceError>>>,
  replace_result: Mutex<Option<Result<User, SourceError>>>,
  gate: Option<Notify>,
  replace_gate: Option<Notify>,
  fetch_calls: AtomicUsize,
  replace_calls: AtomicUsize,
}

impl FakeSource {
  pub fn with_fetches(results: Vec<Result<Vec<User>, SourceError>>) -> Self {
    Self {
      fetch_results: Mutex::new(results.into()),
      ..Default::default()
    }
  }

  /// Hold every fetch until `release()` is called once per fetch.
  pub fn gated(mut self) -> Self {
    self.gate = Some(Notify::new());
    self
  }

  /// Hold every `replace` until `release_replace()` is called once per call.
  pub fn gated_replace(mut self) -> Self {
    self.replace_gate = Some(Notify::new());
    self
  }

  pub fn with_replace_result(self, result: Result<User, SourceError>) -> Self {
    *self.replace_result.lock().unwrap() = Some(result);
    self
  }

  pub fn release(&self) {
    if let Some(gate) = &self.gate {
      gate.notify_one();
    }
  }

  pub fn release_replace(&self) {
    if let Some(gate) = &self.replace_gate {
      gate.notify_one();
    }
  }

  pub fn fetch_calls(&self) -> usize {
    self.fetch_calls.load(Ordering::SeqCst)
  }

  pub fn replace_calls(&self) -> usize {
    self.replace_calls.load(Ordering::SeqCst)
  }

  pub fn cache(self: &Arc<Self>) -> UserCache {
    UserCache::new(Arc::clone(self) as Arc<dyn UserSource>)
  }
}

#[async_trait]
impl UserSource for FakeSource {
  async fn fetch_all(&self) -> Result<Vec<User>, SourceError> {
    self.fetch_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
    self
      .fetch_results
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(Vec::new()))
  }

  async fn replace(&self, user: &User) -> Result<User, SourceError> {
    self.replace_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(gate) = &self.replace_gate {
      gate.notified().await;
    }
    self
      .replace_result
      .lock()
      .unwrap()
      .clone()
      .unwrap_or_else(|| Ok(user.clone()))
  }
}

/// Cache already holding `users`.
pub async fn loaded_cache(users: Vec<User>) -> (Arc<FakeSource>, UserCache) {
  let source = Arc::new(FakeSource::with_fetches(vec![Ok(users)]));
  let cache = source.cache();
  cache.get_or_fetch().await.unwrap();
  (source, cache)
}

/// Let spawned tasks run.
pub async fn settle() {
  tokio::time::sleep(Duration::from_millis(20)).await;
}
