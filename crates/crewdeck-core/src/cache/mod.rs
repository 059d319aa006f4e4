//! Query cache
//!
//! Keeps the last value fetched for each logical query and tells subscribers
//! when it changes. It is the single answer to "what does the dashboard
//! currently believe the backend holds".
//!
//! # Consistency
//!
//! - At most one fetch per key is in flight. Readers that arrive while it runs
//!   share its result.
//! - Every key carries a generation that invalidation bumps. A fetch result is
//!   accepted only for the generation it was issued under; older answers are
//!   discarded and the key is fetched again, so no read issued before an
//!   invalidation can be served after it.
//! - Every fetch settles to `Success` or `Error`, a timed out fetch included.
//!
//! # Example
//!
//! ```ignore
//! let cache = QueryCache::new(store, Duration::from_secs(10));
//! let mut agents = cache.subscribe(QueryKey::agents(), QueryOptions::default());
//! let state = agents.changed().await?;
//! ```

pub mod client;
pub mod key;
pub mod state;
pub mod subscription;

pub use client::QueryCache;
pub use key::QueryKey;
pub use state::{QueryState, QueryStatus};
pub use subscription::{QueryOptions, Subscription};
