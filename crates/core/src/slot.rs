use std::cell::{Cell, UnsafeCell};
use std::rc::Rc;

use crate::error::Result;
use crate::state::BorrowState;

/// Heap cell shared by an owner and every handle it has issued.
///
/// Handles keep the slot alive through `Rc`, so a handle that outlives its
/// owner still points at a live resource. Access to `value` is only sound
/// while `state` certifies it; callers check before dereferencing
/// [`Slot::as_ptr`].
pub(crate) struct Slot<T> {
	state: Cell<BorrowState>,
	value: UnsafeCell<T>,
}

impl<T> Slot<T> {
	pub(crate) fn new(value: T) -> Rc<Self> {
		Rc::new(Self {
			state: Cell::new(BorrowState::FREE),
			value: UnsafeCell::new(value),
		})
	}

	pub(crate) fn state(&self) -> BorrowState {
		self.state.get()
	}

	/// Runs `transition` on a copy of the state and stores it only on success.
	pub(crate) fn apply(
		&self,
		op: &'static str,
		transition: fn(&mut BorrowState) -> Result<()>,
	) -> Result<()> {
		let mut next = self.state.get();
		match transition(&mut next) {
			Ok(()) => {
				self.state.set(next);
				tracing::trace!(
					op,
					shared = next.shared(),
					exclusive = next.is_exclusive(),
					"borrow state changed"
				);
				Ok(())
			}
			Err(err) => {
				tracing::debug!(op, kind = err.kind().as_str(), state = %err.state(), "borrow refused");
				Err(err)
			}
		}
	}

	pub(crate) fn as_ptr(&self) -> *mut T {
		self.value.get()
	}

	pub(crate) fn into_inner(self) -> T {
		self.value.into_inner()
	}
}
