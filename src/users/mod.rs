//! User records and the remote directory they come from.

mod error;
pub mod listing;
mod source;
mod types;
pub mod validation;

pub use error::{FetchError, SourceError, UpdateError};
pub use source::{HttpUserSource, UserSource};
pub use types::{User, NEW_USER_ID};
