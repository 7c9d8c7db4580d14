use std::fmt;
use std::rc::Rc;

use crate::error::{BorrowError, BorrowErrorKind, Result};
use crate::exclusive::ExclusiveBorrow;
use crate::policy::DropPolicy;
use crate::shared::SharedBorrow;
use crate::slot::Slot;
use crate::state::BorrowState;

/// Sole owner of a resource, enforcing the borrow protocol at runtime.
///
/// Access goes through [`SharedBorrow`] and [`ExclusiveBorrow`] handles or
/// the gated [`read`](Self::read) / [`write`](Self::write) accessors. The
/// owner cannot be cloned. Ownership transfer is explicit
/// ([`take`](Self::take), [`relocate_to`](Self::relocate_to)) and leaves the
/// source empty; every later operation on an empty owner fails with
/// [`BorrowErrorKind::EmptyOwner`], except [`close`](Self::close).
///
/// Destruction should go through [`close`](Self::close), which reports
/// outstanding borrows as an error. Dropping a borrowed owner is routed
/// through its [`DropPolicy`].
pub struct Owner<T> {
	slot: Option<Rc<Slot<T>>>,
	policy: DropPolicy,
}

impl<T> Owner<T> {
	/// Takes ownership of `resource` with no borrows outstanding.
	pub fn new(resource: T) -> Self {
		Self::with_policy(resource, DropPolicy::default())
	}

	pub fn with_policy(resource: T, policy: DropPolicy) -> Self {
		Self {
			slot: Some(Slot::new(resource)),
			policy,
		}
	}

	/// Current borrow state. An empty owner reports [`BorrowState::FREE`].
	pub fn state(&self) -> BorrowState {
		self.slot.as_ref().map_or(BorrowState::FREE, |slot| slot.state())
	}

	/// Returns true once the resource has been moved out or closed.
	pub fn is_empty(&self) -> bool {
		self.slot.is_none()
	}

	pub fn is_borrowed(&self) -> bool {
		self.state().is_borrowed()
	}

	pub fn drop_policy(&self) -> DropPolicy {
		self.policy
	}

	pub fn set_drop_policy(&mut self, policy: DropPolicy) {
		self.policy = policy;
	}

	/// Acquires one unit of shared access.
	///
	/// Refused with [`BorrowErrorKind::AcquireSharedWhileExclusive`] while an
	/// exclusive borrow is held.
	pub fn borrow_shared(&self) -> Result<SharedBorrow<T>> {
		SharedBorrow::acquire(self.slot()?)
	}

	/// Acquires sole read-write access.
	///
	/// Refused with [`BorrowErrorKind::AcquireExclusiveWhileBorrowed`] while
	/// any borrow is held.
	pub fn borrow_exclusive(&mut self) -> Result<ExclusiveBorrow<T>> {
		ExclusiveBorrow::acquire(self.slot()?)
	}

	/// Direct read access. Shared borrows do not block it; an exclusive one does.
	pub fn read(&self) -> Result<&T> {
		let slot = self.slot()?;
		slot.state().check_direct_read()?;
		// SAFETY: no exclusive borrow is held, and acquiring one needs
		// `&mut self`, which the returned reference keeps out of reach.
		Ok(unsafe { &*slot.as_ptr() })
	}

	/// Direct mutable access. Any outstanding borrow blocks it.
	pub fn write(&mut self) -> Result<&mut T> {
		let slot = self.slot()?;
		slot.state().check_direct_write()?;
		// SAFETY: no handle is alive, and issuing one needs `&self`, which the
		// returned reference keeps out of reach.
		Ok(unsafe { &mut *slot.as_ptr() })
	}

	/// Runs `f` under a shared borrow that is released on every exit path.
	pub fn with_shared<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
		let guard = self.borrow_shared()?;
		Ok(f(&*guard))
	}

	/// Runs `f` under an exclusive borrow that is released on every exit path.
	pub fn with_exclusive<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
		let mut guard = self.borrow_exclusive()?;
		Ok(f(&mut *guard))
	}

	/// Destroys the resource, leaving the owner empty.
	///
	/// Refused with [`BorrowErrorKind::DestroyWhileBorrowed`] while any borrow
	/// is held; the owner is unchanged in that case. Closing an empty owner
	/// succeeds.
	pub fn close(&mut self) -> Result<()> {
		let Some(slot) = &self.slot else {
			return Ok(());
		};
		slot.state().check_destroy()?;
		self.slot = None;
		tracing::trace!("owner closed");
		Ok(())
	}

	/// Destroys the owner and hands back the resource.
	///
	/// On refusal the owner is returned untouched together with the error.
	pub fn into_inner(mut self) -> std::result::Result<T, (Self, BorrowError)> {
		if let Err(err) = self.slot().and_then(|slot| slot.state().check_destroy()) {
			return Err((self, err));
		}
		let Some(slot) = self.slot.take() else {
			unreachable!("slot checked above");
		};
		match Rc::try_unwrap(slot) {
			Ok(slot) => Ok(slot.into_inner()),
			Err(slot) => {
				// Free state implies no handle holds the slot.
				let err = BorrowError::new(BorrowErrorKind::DestroyWhileBorrowed, slot.state());
				self.slot = Some(slot);
				Err((self, err))
			}
		}
	}

	/// Moves the resource into a new owner, leaving `self` empty.
	///
	/// The new owner starts with zero borrows and inherits this owner's
	/// drop policy.
	pub fn take(&mut self) -> Result<Owner<T>> {
		self.slot()?.state().check_relocate_source()?;
		tracing::trace!("ownership taken");
		Ok(Owner {
			slot: self.slot.take(),
			policy: self.policy,
		})
	}

	/// Moves the resource into `dest`, releasing whatever `dest` held.
	///
	/// The destination is checked first: a borrowed destination refuses with
	/// [`BorrowErrorKind::RelocateDestinationWhileBorrowed`], then an empty or
	/// borrowed source refuses. On refusal neither owner changes.
	pub fn relocate_to(&mut self, dest: &mut Owner<T>) -> Result<()> {
		dest.state().check_relocate_destination()?;
		self.slot()?.state().check_relocate_source()?;
		let previous = std::mem::replace(&mut dest.slot, self.slot.take());
		tracing::trace!(replaced = previous.is_some(), "ownership relocated");
		drop(previous);
		Ok(())
	}

	fn slot(&self) -> Result<&Rc<Slot<T>>> {
		self.slot
			.as_ref()
			.ok_or(BorrowError::new(BorrowErrorKind::EmptyOwner, BorrowState::FREE))
	}
}

impl<T> Drop for Owner<T> {
	fn drop(&mut self) {
		let Some(slot) = self.slot.take() else {
			return;
		};
		if let Err(err) = slot.state().check_destroy() {
			// Handles keep the slot alive; the resource goes with the last of them.
			drop(slot);
			self.policy.report(&err);
		}
	}
}

impl<T> fmt::Debug for Owner<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Owner")
			.field("empty", &self.is_empty())
			.field("state", &self.state())
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}
