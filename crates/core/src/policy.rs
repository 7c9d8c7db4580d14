use crate::error::BorrowError;

/// How an [`Owner`](crate::Owner) reports outstanding borrows when it is
/// dropped without an explicit [`close`](crate::Owner::close).
///
/// Drop cannot return an error, so the violation is routed through this
/// policy instead. Outstanding handles are never invalidated; the resource
/// lives until the last of them is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DropPolicy {
	/// Log, then panic with the violation message.
	///
	/// Only logs when the thread is already unwinding.
	#[default]
	Panic,
	/// Log, then abort the process.
	Abort,
	/// Log at error level and continue.
	Log,
}

impl DropPolicy {
	/// Returns the appropriate policy based on build configuration.
	#[inline]
	pub fn for_build() -> Self {
		if cfg!(debug_assertions) {
			DropPolicy::Panic
		} else {
			DropPolicy::Log
		}
	}

	pub(crate) fn report(self, err: &BorrowError) {
		tracing::error!(
			kind = err.kind().as_str(),
			shared = err.state().shared(),
			exclusive = err.state().is_exclusive(),
			policy = ?self,
			"owner dropped with outstanding borrows"
		);
		match self {
			DropPolicy::Panic if !std::thread::panicking() => panic!("{err}"),
			DropPolicy::Panic | DropPolicy::Log => {}
			DropPolicy::Abort => std::process::abort(),
		}
	}
}
