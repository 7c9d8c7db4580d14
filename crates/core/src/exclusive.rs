use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::error::Result;
use crate::shared::SharedBorrow;
use crate::slot::Slot;
use crate::state::BorrowState;

/// Sole read-write access to an owned resource.
///
/// Obtained from [`Owner::borrow_exclusive`](crate::Owner::borrow_exclusive).
/// The handle cannot be cloned, only moved; moving it transfers the borrow
/// and the moved-from binding is never dropped, so the exclusive flag is
/// released exactly once.
pub struct ExclusiveBorrow<T> {
	/// `None` only after [`ExclusiveBorrow::downgrade`] handed the slot on.
	slot: Option<Rc<Slot<T>>>,
}

impl<T> ExclusiveBorrow<T> {
	/// Acquires the exclusive flag against `slot`. Nothing changes on failure.
	pub(crate) fn acquire(slot: &Rc<Slot<T>>) -> Result<Self> {
		slot.apply("acquire_exclusive", BorrowState::acquire_exclusive)?;
		Ok(Self {
			slot: Some(Rc::clone(slot)),
		})
	}

	/// Borrow state of the owner this handle borrows from.
	pub fn state(&self) -> BorrowState {
		self.slot().state()
	}

	/// Trades exclusive access for one shared unit.
	///
	/// The owner moves straight from `Exclusive` to `Shared(1)`; no other
	/// borrower can slip in between.
	pub fn downgrade(mut self) -> SharedBorrow<T> {
		let Some(slot) = self.slot.take() else {
			unreachable!("exclusive borrow used after downgrade");
		};
		let downgraded = slot.apply("downgrade_exclusive", BorrowState::downgrade_exclusive);
		debug_assert!(downgraded.is_ok(), "exclusive borrow not held at downgrade");
		SharedBorrow::from_acquired(slot)
	}

	fn slot(&self) -> &Slot<T> {
		match &self.slot {
			Some(slot) => slot.as_ref(),
			None => unreachable!("exclusive borrow used after downgrade"),
		}
	}
}

impl<T> Deref for ExclusiveBorrow<T> {
	type Target = T;

	fn deref(&self) -> &T {
		// SAFETY: the exclusive flag is held by this handle, so no shared
		// handle exists and the owner refuses `read` and `write`.
		unsafe { &*self.slot().as_ptr() }
	}
}

impl<T> DerefMut for ExclusiveBorrow<T> {
	fn deref_mut(&mut self) -> &mut T {
		// SAFETY: as for `deref`; `&mut self` rules out aliasing through this handle.
		unsafe { &mut *self.slot().as_ptr() }
	}
}

impl<T> Drop for ExclusiveBorrow<T> {
	fn drop(&mut self) {
		let Some(slot) = self.slot.take() else {
			return;
		};
		let released = slot.apply("release_exclusive", BorrowState::release_exclusive);
		if let Err(err) = &released {
			tracing::error!(%err, "exclusive borrow released without a matching acquire");
		}
		debug_assert!(released.is_ok(), "exclusive borrow released twice");
	}
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveBorrow<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ExclusiveBorrow").field(&**self).finish()
	}
}

impl<T: fmt::Display> fmt::Display for ExclusiveBorrow<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}
