//! The user cache: single owner of the in-memory user collection.

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::mutation::{apply_all, Mutation};
use crate::users::{FetchError, SourceError, UpdateError, User, UserSource};

/// Immutable view of the collection handed to readers.
pub type Snapshot = Arc<[User]>;

type SharedFetch = Shared<BoxFuture<'static, Result<Snapshot, FetchError>>>;

enum Slot {
  /// Nothing loaded yet, or the last load failed
  Empty,
  /// A fetch task is running
  Loading {
    generation: u64,
    fetch: SharedFetch,
    abort: AbortHandle,
    /// Collection being refreshed, still served to readers
    previous: Option<Snapshot>,
    /// Mutations to replay on top of the fetched collection
    deferred: Vec<Mutation>,
  },
  Ready(Snapshot),
}

struct Inner {
  source: Arc<dyn UserSource>,
  slot: Mutex<Slot>,
  next_generation: AtomicU64,
}

/// In-memory store of the user collection.
///
/// Loads the collection from the remote source on first read and then serves
/// every reader from memory. Mutations swap in a new snapshot under a short
/// lock, so readers never see a half-applied change. Cloning is cheap and
/// every clone shares the same collection.
#[derive(Clone)]
pub struct UserCache {
  inner: Arc<Inner>,
}

impl UserCache {
  pub fn new(source: Arc<dyn UserSource>) -> Self {
    Self {
      inner: Arc::new(Inner {
        source,
        slot: Mutex::new(Slot::Empty),
        next_generation: AtomicU64::new(0),
      }),
    }
  }

  /// Return the collection, fetching it first if it has never been loaded.
  ///
  /// Callers arriving while a fetch is in flight wait on that same fetch.
  /// On failure the cache stays empty and the next call tries again.
  pub async fn get_or_fetch(&self) -> Result<Snapshot, FetchError> {
    let fetch = {
      let mut slot = self.inner.lock();
      match &*slot {
        Slot::Ready(users) => return Ok(Arc::clone(users)),
        Slot::Loading { fetch, .. } => fetch.clone(),
        Slot::Empty => self.inner.start_fetch(&mut slot, None),
      }
    };
    fetch.await
  }

  /// Reload the collection from the remote source.
  ///
  /// The current collection keeps being served until the new one lands, and
  /// is kept if the reload fails.
  pub async fn refresh(&self) -> Result<Snapshot, FetchError> {
    let fetch = {
      let mut slot = self.inner.lock();
      let previous = match &*slot {
        Slot::Loading { fetch, .. } => Err(fetch.clone()),
        Slot::Ready(users) => Ok(Some(Arc::clone(users))),
        Slot::Empty => Ok(None),
      };
      match previous {
        Err(pending) => pending,
        Ok(previous) => self.inner.start_fetch(&mut slot, previous),
      }
    };
    fetch.await
  }

  /// Abort an in-flight fetch. Returns false if nothing was loading.
  ///
  /// Waiters receive `FetchError::Cancelled`; a refresh falls back to the
  /// collection it was replacing.
  pub fn cancel_fetch(&self) -> bool {
    let mut slot = self.inner.lock();
    match std::mem::replace(&mut *slot, Slot::Empty) {
      Slot::Loading {
        abort,
        previous,
        deferred,
        ..
      } => {
        abort.abort();
        if previous.is_none() && !deferred.is_empty() {
          warn!(count = deferred.len(), "dropping changes made during cancelled load");
        }
        *slot = previous.map(Slot::Ready).unwrap_or(Slot::Empty);
        info!("user fetch cancelled");
        true
      }
      other => {
        *slot = other;
        false
      }
    }
  }

  /// Current collection without triggering a fetch.
  pub fn snapshot(&self) -> Option<Snapshot> {
    match &*self.inner.lock() {
      Slot::Ready(users) => Some(Arc::clone(users)),
      Slot::Loading { previous, .. } => previous.clone(),
      Slot::Empty => None,
    }
  }

  /// Look up one user in the current collection.
  pub fn get(&self, id: u64) -> Option<User> {
    self
      .snapshot()
      .and_then(|users| users.iter().find(|u| u.id == id).cloned())
  }

  pub fn is_loading(&self) -> bool {
    matches!(&*self.inner.lock(), Slot::Loading { .. })
  }

  /// Append a new user. Ignored if the id is `0` or already present.
  pub fn insert(&self, user: User) {
    self.inner.mutate(Mutation::Insert(user));
  }

  /// Replace the user with `id` locally, without asking the remote source.
  /// Ignored if no user has that id.
  pub fn replace(&self, id: u64, user: User) {
    self.inner.mutate(Mutation::Replace { id, user });
  }

  /// Remove the user with `id`. Ignored if no user has that id.
  pub fn remove(&self, id: u64) {
    self.inner.mutate(Mutation::Remove(id));
  }

  /// Save `candidate` to the remote source, then store the server's version.
  ///
  /// The cache is only touched after the remote call succeeds and answers
  /// with the same id.
  pub async fn replace_confirmed(&self, candidate: User) -> Result<User, UpdateError> {
    let id = candidate.id;
    let confirmed = self
      .inner
      .source
      .replace(&candidate)
      .await
      .map_err(|source| {
        warn!(id, error = %source, "remote update failed");
        UpdateError { id, source }
      })?;

    if confirmed.id != id {
      warn!(id, returned = confirmed.id, "remote update answered for another user");
      return Err(UpdateError {
        id,
        source: SourceError::Decode(format!(
          "expected user {} in response, got {}",
          id, confirmed.id
        )),
      });
    }

    self.replace(id, confirmed.clone());
    Ok(confirmed)
  }

  /// A fresh id for a user created locally.
  ///
  /// Milliseconds since the Unix epoch, bumped past the largest id already
  /// in the collection. Never `0`.
  pub fn next_id(&self) -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let max = self
      .snapshot()
      .and_then(|users| users.iter().map(|u| u.id).max())
      .unwrap_or(0);
    now.max(max.saturating_add(1)).max(1)
  }
}

impl Inner {
  fn lock(&self) -> MutexGuard<'_, Slot> {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Spawn the fetch task and move `slot` to `Loading`.
  ///
  /// The task writes its result into the cache itself, so the load completes
  /// even if every caller stops waiting.
  fn start_fetch(self: &Arc<Self>, slot: &mut Slot, previous: Option<Snapshot>) -> SharedFetch {
    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
    info!(generation, refresh = previous.is_some(), "fetching users");

    let inner = Arc::clone(self);
    let task = tokio::spawn(async move {
      let result = inner.source.fetch_all().await;
      inner.complete_fetch(generation, result)
    });
    let abort = task.abort_handle();

    let fetch = async move {
      match task.await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Cancelled),
      }
    }
    .boxed()
    .shared();

    *slot = Slot::Loading {
      generation,
      fetch: fetch.clone(),
      abort,
      previous,
      deferred: Vec::new(),
    };
    fetch
  }

  fn complete_fetch(
    &self,
    generation: u64,
    result: Result<Vec<User>, SourceError>,
  ) -> Result<Snapshot, FetchError> {
    let mut slot = self.lock();

    let (previous, deferred) = match std::mem::replace(&mut *slot, Slot::Empty) {
      Slot::Loading {
        generation: current,
        previous,
        deferred,
        ..
      } if current == generation => (previous, deferred),
      other => {
        // Cancelled; leave the cache alone.
        *slot = other;
        debug!(generation, ok = result.is_ok(), "discarding stale fetch result");
        return Err(FetchError::Cancelled);
      }
    };

    match result {
      Ok(users) => {
        let fetched = users.len();
        let snapshot: Snapshot = apply_all(users, &deferred).into();
        info!(fetched, replayed = deferred.len(), "users loaded");
        *slot = Slot::Ready(Arc::clone(&snapshot));
        Ok(snapshot)
      }
      Err(e) => {
        warn!(error = %e, "failed to fetch users");
        match previous {
          Some(users) => *slot = Slot::Ready(users),
          None if !deferred.is_empty() => {
            warn!(count = deferred.len(), "dropping changes made during failed load");
          }
          None => {}
        }
        Err(e.into())
      }
    }
  }

  fn mutate(&self, mutation: Mutation) {
    let mut slot = self.lock();
    match &mut *slot {
      Slot::Ready(users) => match mutation.apply(&**users) {
        Some(next) => {
          debug!(mutation = %mutation.describe(), size = next.len(), "applied");
          *users = next.into();
        }
        None => debug!(mutation = %mutation.describe(), "no-op"),
      },
      Slot::Loading {
        previous, deferred, ..
      } => {
        // Show it now on the collection being refreshed, replay it on the new one.
        if let Some(users) = previous {
          if let Some(next) = mutation.apply(&**users) {
            *users = next.into();
          }
        }
        debug!(mutation = %mutation.describe(), "deferred until load completes");
        deferred.push(mutation);
      }
      Slot::Empty => {
        debug!(mutation = %mutation.describe(), "ignored, users not loaded");
      }
    }
  }
}
