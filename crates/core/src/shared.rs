use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::error::Result;
use crate::slot::Slot;
use crate::state::BorrowState;

/// One unit of shared, read-only access to an owned resource.
///
/// Obtained from [`Owner::borrow_shared`](crate::Owner::borrow_shared).
/// Every live handle holds exactly one unit of the owner's shared count:
/// cloning acquires another unit, dropping releases one. While any shared
/// handle is alive the owner refuses exclusive borrows, direct mutation,
/// relocation and destruction.
pub struct SharedBorrow<T> {
	slot: Rc<Slot<T>>,
}

impl<T> SharedBorrow<T> {
	/// Acquires a shared unit against `slot`. Nothing changes on failure.
	pub(crate) fn acquire(slot: &Rc<Slot<T>>) -> Result<Self> {
		slot.apply("acquire_shared", BorrowState::acquire_shared)?;
		Ok(Self {
			slot: Rc::clone(slot),
		})
	}

	/// Wraps a slot whose state already accounts for this handle.
	pub(crate) fn from_acquired(slot: Rc<Slot<T>>) -> Self {
		Self { slot }
	}

	/// Acquires another unit against the same owner.
	pub fn try_clone(&self) -> Result<Self> {
		Self::acquire(&self.slot)
	}

	/// Points this handle at the resource borrowed by `other`.
	///
	/// The new unit is acquired before the current one is released, so a
	/// refused acquire leaves both owners untouched.
	pub fn reassign(&mut self, other: &SharedBorrow<T>) -> Result<()> {
		*self = Self::acquire(&other.slot)?;
		Ok(())
	}

	/// Borrow state of the owner this handle borrows from.
	pub fn state(&self) -> BorrowState {
		self.slot.state()
	}

	/// Returns true if both handles borrow the same resource.
	pub fn ptr_eq(this: &Self, other: &Self) -> bool {
		Rc::ptr_eq(&this.slot, &other.slot)
	}
}

impl<T> Clone for SharedBorrow<T> {
	/// Acquires another unit against the same owner.
	///
	/// # Panics
	///
	/// Panics if the shared count would overflow. No other refusal is
	/// possible: `self` holds a unit, so no exclusive borrow can exist.
	fn clone(&self) -> Self {
		self.try_clone().unwrap_or_else(|err| panic!("{err}"))
	}

	fn clone_from(&mut self, source: &Self) {
		if let Err(err) = self.reassign(source) {
			panic!("{err}");
		}
	}
}

impl<T> Deref for SharedBorrow<T> {
	type Target = T;

	fn deref(&self) -> &T {
		// SAFETY: this handle holds a shared unit, so the slot is not
		// exclusively borrowed and the owner refuses `write` until it is released.
		unsafe { &*self.slot.as_ptr() }
	}
}

impl<T> Drop for SharedBorrow<T> {
	fn drop(&mut self) {
		let released = self.slot.apply("release_shared", BorrowState::release_shared);
		if let Err(err) = &released {
			tracing::error!(%err, "shared borrow released without a matching acquire");
		}
		debug_assert!(released.is_ok(), "shared borrow count underflow");
	}
}

impl<T: fmt::Debug> fmt::Debug for SharedBorrow<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SharedBorrow").field(&**self).finish()
	}
}

impl<T: fmt::Display> fmt::Display for SharedBorrow<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}
