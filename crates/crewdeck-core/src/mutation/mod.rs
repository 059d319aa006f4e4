//! Mutation coordinator
//!
//! Writes go to the store first. Only once the store has answered does the
//! coordinator touch the cache: on success it invalidates the keys the
//! mutation declares, on failure it leaves the cache alone so the last known
//! good data stays on screen. Either way an outcome is published for toast
//! style notification.

pub mod coordinator;
pub mod outcome;

pub use coordinator::MutationCoordinator;
pub use outcome::{Mutation, MutationOutcome};
