use std::fmt;

use crate::error::{BorrowError, BorrowErrorKind, Result};

/// Per-resource borrow bookkeeping: an exclusive flag and a shared count.
///
/// Fields are private; the only way to change a state is through the
/// transition methods below, each of which either applies fully or returns
/// an error and leaves `self` untouched. This keeps both invariants:
///
/// - `exclusive` implies `shared == 0`
/// - `shared > 0` implies `!exclusive`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BorrowState {
	exclusive: bool,
	shared: usize,
}

/// Coarse view of a [`BorrowState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorrowPhase {
	/// No borrows. Initial state, and the only one that permits destroy or relocate.
	Free,
	/// `n > 0` shared borrows outstanding.
	Shared(usize),
	/// One exclusive borrow outstanding.
	Exclusive,
}

impl BorrowState {
	/// The zero-borrow state.
	pub const FREE: Self = Self {
		exclusive: false,
		shared: 0,
	};

	pub const fn shared(&self) -> usize {
		self.shared
	}

	pub const fn is_exclusive(&self) -> bool {
		self.exclusive
	}

	/// Returns true if any borrow is outstanding.
	pub const fn is_borrowed(&self) -> bool {
		self.exclusive || self.shared > 0
	}

	pub const fn is_free(&self) -> bool {
		!self.is_borrowed()
	}

	pub const fn phase(&self) -> BorrowPhase {
		if self.exclusive {
			BorrowPhase::Exclusive
		} else if self.shared > 0 {
			BorrowPhase::Shared(self.shared)
		} else {
			BorrowPhase::Free
		}
	}

	/// `Free -> Shared(1)`, `Shared(n) -> Shared(n + 1)`.
	pub fn acquire_shared(&mut self) -> Result<()> {
		if self.exclusive {
			return Err(self.violation(BorrowErrorKind::AcquireSharedWhileExclusive));
		}
		let Some(next) = self.shared.checked_add(1) else {
			return Err(self.violation(BorrowErrorKind::SharedCountOverflow));
		};
		self.shared = next;
		self.debug_check();
		Ok(())
	}

	/// `Shared(1) -> Free`, `Shared(n) -> Shared(n - 1)`.
	pub fn release_shared(&mut self) -> Result<()> {
		if self.shared == 0 {
			return Err(self.violation(BorrowErrorKind::ReleaseUnmatchedSharedBorrow));
		}
		self.shared -= 1;
		self.debug_check();
		Ok(())
	}

	/// `Free -> Exclusive`.
	///
	/// Refused from `Shared` and from `Exclusive` with the same kind.
	pub fn acquire_exclusive(&mut self) -> Result<()> {
		if self.is_borrowed() {
			return Err(self.violation(BorrowErrorKind::AcquireExclusiveWhileBorrowed));
		}
		self.exclusive = true;
		self.debug_check();
		Ok(())
	}

	/// `Exclusive -> Free`.
	pub fn release_exclusive(&mut self) -> Result<()> {
		if !self.exclusive {
			return Err(self.violation(BorrowErrorKind::ReleaseUnmatchedExclusiveBorrow));
		}
		self.exclusive = false;
		self.debug_check();
		Ok(())
	}

	/// `Exclusive -> Shared(1)` without passing through `Free`.
	pub fn downgrade_exclusive(&mut self) -> Result<()> {
		if !self.exclusive {
			return Err(self.violation(BorrowErrorKind::ReleaseUnmatchedExclusiveBorrow));
		}
		self.exclusive = false;
		self.shared = 1;
		self.debug_check();
		Ok(())
	}

	/// Gate for destroying the owner of this state.
	pub fn check_destroy(&self) -> Result<()> {
		self.require_free(BorrowErrorKind::DestroyWhileBorrowed)
	}

	/// Gate for moving a resource out of the owner of this state.
	pub fn check_relocate_source(&self) -> Result<()> {
		self.require_free(BorrowErrorKind::RelocateSourceWhileBorrowed)
	}

	/// Gate for replacing the resource of the owner of this state.
	pub fn check_relocate_destination(&self) -> Result<()> {
		self.require_free(BorrowErrorKind::RelocateDestinationWhileBorrowed)
	}

	/// Gate for direct mutable access: any borrow blocks it.
	pub fn check_direct_write(&self) -> Result<()> {
		self.require_free(BorrowErrorKind::DirectMutatingAccessWhileBorrowed)
	}

	/// Gate for direct read access: only an exclusive borrow blocks it.
	pub fn check_direct_read(&self) -> Result<()> {
		if self.exclusive {
			return Err(self.violation(BorrowErrorKind::DirectReadAccessWhileExclusivelyBorrowed));
		}
		Ok(())
	}

	fn require_free(&self, kind: BorrowErrorKind) -> Result<()> {
		if self.is_borrowed() {
			return Err(self.violation(kind));
		}
		Ok(())
	}

	fn violation(&self, kind: BorrowErrorKind) -> BorrowError {
		BorrowError::new(kind, *self)
	}

	#[inline]
	fn debug_check(&self) {
		debug_assert!(
			!(self.exclusive && self.shared > 0),
			"exclusive and shared borrows coexist: {self:?}"
		);
	}
}

impl fmt::Display for BorrowState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.phase() {
			BorrowPhase::Free => f.write_str("not borrowed"),
			BorrowPhase::Shared(1) => f.write_str("1 shared borrow outstanding"),
			BorrowPhase::Shared(n) => write!(f, "{n} shared borrows outstanding"),
			BorrowPhase::Exclusive => f.write_str("exclusively borrowed"),
		}
	}
}
