//! Lock primitive used by the sequence types.
//!
//! Normal builds use `parking_lot::Mutex`. Under `RUSTFLAGS="--cfg loom"`
//! the mutex is `loom::sync::Mutex` behind the same method names, so the
//! model checker can explore every interleaving of the critical sections.
//! Loom has no timed acquisition; `try_lock_for` degrades to a single
//! `try_lock` there. A cfg rather than a Cargo feature keeps
//! `--all-features` builds on `parking_lot`, where sequences work outside
//! `loom::model`.

#[cfg(not(loom))]
pub(crate) use parking_lot::{Mutex, MutexGuard};

#[cfg(loom)]
pub(crate) use self::model::{Mutex, MutexGuard};

#[cfg(loom)]
mod model {
    use std::sync::PoisonError;
    use std::time::Duration;

    pub(crate) use loom::sync::MutexGuard;

    pub(crate) struct Mutex<T>(loom::sync::Mutex<T>);

    impl<T> Mutex<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(loom::sync::Mutex::new(value))
        }

        pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }

        pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
            self.0.try_lock().ok()
        }

        pub(crate) fn try_lock_for(&self, _timeout: Duration) -> Option<MutexGuard<'_, T>> {
            self.try_lock()
        }

        pub(crate) fn into_inner(self) -> T {
            self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
