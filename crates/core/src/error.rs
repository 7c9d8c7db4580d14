use std::fmt;

use crate::state::BorrowState;

/// Result alias used by every fallible operation in this crate.
pub type Result<T, E = BorrowError> = std::result::Result<T, E>;

/// Closed set of ownership and borrow contract violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorrowErrorKind {
	/// Owner destroyed while shared or exclusive borrows are outstanding.
	DestroyWhileBorrowed,
	/// Ownership transfer out of an owner that is currently borrowed.
	RelocateSourceWhileBorrowed,
	/// Ownership transfer into an owner whose current resource is borrowed.
	RelocateDestinationWhileBorrowed,
	/// Exclusive borrow requested while any borrow is held.
	///
	/// Covers both "already shared" and "already exclusive"; the attached
	/// [`BorrowState`] tells the two apart.
	AcquireExclusiveWhileBorrowed,
	/// Shared borrow requested while an exclusive borrow is held.
	AcquireSharedWhileExclusive,
	/// Direct mutable access through the owner while any borrow is held.
	DirectMutatingAccessWhileBorrowed,
	/// Direct read access through the owner while an exclusive borrow is held.
	DirectReadAccessWhileExclusivelyBorrowed,
	/// Shared release with no outstanding shared borrow.
	ReleaseUnmatchedSharedBorrow,
	/// Exclusive release with no outstanding exclusive borrow.
	ReleaseUnmatchedExclusiveBorrow,
	/// Operation on an owner whose resource was moved out or closed.
	EmptyOwner,
	/// One more shared borrow would overflow the counter.
	SharedCountOverflow,
}

impl BorrowErrorKind {
	/// Every kind, in declaration order.
	pub const ALL: [Self; 11] = [
		Self::DestroyWhileBorrowed,
		Self::RelocateSourceWhileBorrowed,
		Self::RelocateDestinationWhileBorrowed,
		Self::AcquireExclusiveWhileBorrowed,
		Self::AcquireSharedWhileExclusive,
		Self::DirectMutatingAccessWhileBorrowed,
		Self::DirectReadAccessWhileExclusivelyBorrowed,
		Self::ReleaseUnmatchedSharedBorrow,
		Self::ReleaseUnmatchedExclusiveBorrow,
		Self::EmptyOwner,
		Self::SharedCountOverflow,
	];

	/// Stable snake_case name, suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::DestroyWhileBorrowed => "destroy_while_borrowed",
			Self::RelocateSourceWhileBorrowed => "relocate_source_while_borrowed",
			Self::RelocateDestinationWhileBorrowed => "relocate_destination_while_borrowed",
			Self::AcquireExclusiveWhileBorrowed => "acquire_exclusive_while_borrowed",
			Self::AcquireSharedWhileExclusive => "acquire_shared_while_exclusive",
			Self::DirectMutatingAccessWhileBorrowed => "direct_mutating_access_while_borrowed",
			Self::DirectReadAccessWhileExclusivelyBorrowed => {
				"direct_read_access_while_exclusively_borrowed"
			}
			Self::ReleaseUnmatchedSharedBorrow => "release_unmatched_shared_borrow",
			Self::ReleaseUnmatchedExclusiveBorrow => "release_unmatched_exclusive_borrow",
			Self::EmptyOwner => "empty_owner",
			Self::SharedCountOverflow => "shared_count_overflow",
		}
	}

	/// Human-readable description of the violated rule.
	pub const fn message(self) -> &'static str {
		match self {
			Self::DestroyWhileBorrowed => "cannot destroy owner while it is borrowed",
			Self::RelocateSourceWhileBorrowed => "cannot move out of owner while it is borrowed",
			Self::RelocateDestinationWhileBorrowed => "cannot move into owner while it is borrowed",
			Self::AcquireExclusiveWhileBorrowed => "cannot borrow exclusively: already borrowed",
			Self::AcquireSharedWhileExclusive => "cannot borrow shared: already exclusively borrowed",
			Self::DirectMutatingAccessWhileBorrowed => "cannot access mutably while borrowed",
			Self::DirectReadAccessWhileExclusivelyBorrowed => {
				"cannot read while exclusively borrowed"
			}
			Self::ReleaseUnmatchedSharedBorrow => "released a shared borrow that was never acquired",
			Self::ReleaseUnmatchedExclusiveBorrow => {
				"released an exclusive borrow that was never acquired"
			}
			Self::EmptyOwner => "owner is empty: its resource was moved out or closed",
			Self::SharedCountOverflow => "too many shared borrows",
		}
	}
}

impl fmt::Display for BorrowErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.message())
	}
}

/// A detected contract violation.
///
/// Carries the violated rule and the borrow state observed when the
/// operation was refused. The state is the one the owner still has: failed
/// operations never mutate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} ({state})")]
pub struct BorrowError {
	kind: BorrowErrorKind,
	state: BorrowState,
}

impl BorrowError {
	pub const fn new(kind: BorrowErrorKind, state: BorrowState) -> Self {
		Self { kind, state }
	}

	pub const fn kind(&self) -> BorrowErrorKind {
		self.kind
	}

	/// Borrow state at the time of the violation.
	pub const fn state(&self) -> BorrowState {
		self.state
	}
}
