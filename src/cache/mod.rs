//! In-memory user collection shared by every screen.
//!
//! - Loads the collection on first read, with one fetch shared by all callers
//! - Applies inserts, replaces and removes as whole-snapshot swaps
//! - Gates remote-confirmed updates on the remote source's answer

mod mutation;
mod store;

pub use store::{Snapshot, UserCache};
