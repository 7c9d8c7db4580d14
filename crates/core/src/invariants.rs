use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{BorrowErrorKind, BorrowPhase, BorrowState, DropPolicy, Owner, SharedBorrow};

/// Must refuse an exclusive borrow while a shared one is alive, and grant it once released.
///
/// - Enforced in: `BorrowState::acquire_exclusive`
/// - Failure symptom: writer mutates data a reader is still looking at.
#[cfg_attr(test, test)]
pub(crate) fn test_exclusive_waits_for_shared_release() {
	let mut owner = Owner::new(42);
	let s1 = owner.borrow_shared().unwrap();

	let err = owner.borrow_exclusive().unwrap_err();
	assert_eq!(err.kind(), BorrowErrorKind::AcquireExclusiveWhileBorrowed);
	assert_eq!(owner.state().phase(), BorrowPhase::Shared(1));

	drop(s1);
	let mut m = owner.borrow_exclusive().unwrap();
	*m += 1;
	assert_eq!(*m, 43);
}

/// Must refuse destruction while a shared borrow is alive, and allow it after release.
///
/// - Enforced in: `Owner::close`
/// - Failure symptom: resource freed under a live reader.
#[cfg_attr(test, test)]
pub(crate) fn test_destroy_waits_for_release() {
	let mut owner = Owner::new(42);
	let s1 = owner.borrow_shared().unwrap();

	let err = owner.close().unwrap_err();
	assert_eq!(err.kind(), BorrowErrorKind::DestroyWhileBorrowed);
	assert!(!owner.is_empty());

	drop(s1);
	owner.close().unwrap();
	assert!(owner.is_empty());
}

/// Must move the resource with zero borrows and leave the source empty.
///
/// - Enforced in: `Owner::relocate_to`, `Owner::take`
/// - Failure symptom: two owners for one resource, or a stale count carried across.
#[cfg_attr(test, test)]
pub(crate) fn test_relocation_empties_source() {
	let mut source = Owner::new(42);
	let mut dest = source.take().unwrap();

	assert!(source.is_empty());
	source.close().unwrap();
	assert_eq!(dest.state(), BorrowState::FREE);
	assert_eq!(*dest.read().unwrap(), 42);

	let mut fresh = Owner::new(0);
	fresh.close().unwrap();
	dest.relocate_to(&mut fresh).unwrap();
	assert!(dest.is_empty());
	assert_eq!(*fresh.read().unwrap(), 42);
	assert_eq!(fresh.state(), BorrowState::FREE);
}

/// Must release shared borrows in any order.
///
/// - Enforced in: `BorrowState::release_shared`
/// - Failure symptom: owner stuck borrowed, or freed early, depending on release order.
#[cfg_attr(test, test)]
pub(crate) fn test_shared_release_is_commutative() {
	let owner = Owner::new(42);
	let s1 = owner.borrow_shared().unwrap();
	let s2 = owner.borrow_shared().unwrap();
	assert_eq!(owner.state().shared(), 2);

	drop(s1);
	assert_eq!(owner.state().shared(), 1);
	assert_eq!(*s2, 42);
	drop(s2);
	assert_eq!(owner.state(), BorrowState::FREE);
}

/// Must release an exclusive borrow exactly once when the handle is moved.
///
/// - Enforced in: `ExclusiveBorrow` drop
/// - Failure symptom: `ReleaseUnmatchedExclusiveBorrow` on the moved-from handle,
///   or the flag cleared while the new handle is still writing.
#[cfg_attr(test, test)]
pub(crate) fn test_moved_exclusive_releases_once() {
	let mut owner = Owner::new(vec![1]);
	let m1 = owner.borrow_exclusive().unwrap();

	let mut held = Vec::new();
	held.push(m1);
	assert!(owner.state().is_exclusive());

	let mut m2 = held.pop().unwrap();
	m2.push(2);
	assert!(owner.state().is_exclusive());

	drop(held);
	assert!(owner.state().is_exclusive());
	drop(m2);
	assert_eq!(owner.state(), BorrowState::FREE);
	assert_eq!(owner.read().unwrap(), &vec![1, 2]);
}

/// Must detect an owner going out of scope while handles it issued are still stored elsewhere.
///
/// The stored handles stay valid; detection does not invalidate them.
///
/// - Enforced in: `Owner` drop, `DropPolicy::report`
/// - Failure symptom: silent destruction under live readers.
#[cfg_attr(test, test)]
pub(crate) fn test_dangling_borrows_detected_at_scope_end() {
	let mut borrowed: Vec<SharedBorrow<i32>> = Vec::new();

	let result = catch_unwind(AssertUnwindSafe(|| {
		let test = Owner::new(100);
		for _ in 0..10 {
			borrowed.push(test.borrow_shared().unwrap());
		}
	}));

	let payload = result.unwrap_err();
	let message = payload.downcast_ref::<String>().unwrap();
	assert_eq!(
		message,
		"cannot destroy owner while it is borrowed (10 shared borrows outstanding)"
	);
	assert_eq!(borrowed.len(), 10);
	assert!(borrowed.iter().all(|b| **b == 100));
	assert_eq!(borrowed[0].state().shared(), 10);

	borrowed.truncate(1);
	assert_eq!(borrowed[0].state().shared(), 1);
}

/// Must keep outstanding handles usable when the drop policy only logs.
///
/// - Enforced in: `DropPolicy::Log`
/// - Failure symptom: use-after-free through a handle that outlived its owner.
#[cfg_attr(test, test)]
pub(crate) fn test_dangling_borrows_logged_policy() {
	let mut borrowed = Vec::new();
	{
		let test = Owner::with_policy(String::from("kept"), DropPolicy::Log);
		for _ in 0..10 {
			borrowed.push(test.borrow_shared().unwrap());
		}
	}
	assert!(borrowed.iter().all(|b| b.as_str() == "kept"));
	assert_eq!(borrowed[9].state().shared(), 10);
}

/// Must leave borrow state untouched when any gated operation is refused.
///
/// - Enforced in: `Slot::apply`, the `BorrowState::check_*` gates
/// - Failure symptom: leaked counts that block the owner forever.
#[cfg_attr(test, test)]
pub(crate) fn test_refusals_are_no_ops() {
	let mut owner = Owner::new(1);
	let mut other = Owner::new(2);
	let guard = owner.borrow_exclusive().unwrap();
	let before = owner.state();

	assert!(owner.borrow_shared().is_err());
	assert!(owner.borrow_exclusive().is_err());
	assert!(owner.read().is_err());
	assert!(owner.write().is_err());
	assert!(owner.close().is_err());
	assert!(owner.take().is_err());
	assert!(owner.relocate_to(&mut other).is_err());
	assert!(other.relocate_to(&mut owner).is_err());

	assert_eq!(owner.state(), before);
	assert_eq!(other.state(), BorrowState::FREE);
	assert_eq!(*other.read().unwrap(), 2);
	drop(guard);
}
