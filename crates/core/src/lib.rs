//! Runtime-checked ownership and borrowing for single resources.
//!
//! An [`Owner`] holds a resource and tracks who is looking at it: any number
//! of [`SharedBorrow`] handles, or exactly one [`ExclusiveBorrow`]. Requests
//! that would break that rule fail immediately with a [`BorrowError`] and
//! leave the bookkeeping untouched. Destruction and relocation are refused
//! while borrows are outstanding.
//!
//! Everything here is single-threaded; none of the types are `Send` or `Sync`.

/// Violation kinds and the error carrier.
pub mod error;
/// Exclusive borrow handle.
pub mod exclusive;
/// The resource owner.
pub mod owner;
/// Destroy-time violation reporting.
pub mod policy;
/// Shared borrow handle.
pub mod shared;
/// Borrow bookkeeping and its transitions.
pub mod state;

mod slot;

#[cfg(test)]
mod invariants;

pub use error::{BorrowError, BorrowErrorKind, Result};
pub use exclusive::ExclusiveBorrow;
pub use owner::Owner;
pub use policy::DropPolicy;
pub use shared::SharedBorrow;
pub use state::{BorrowPhase, BorrowState};
