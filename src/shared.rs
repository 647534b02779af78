//! Whole-record locking for a service shared across execution contexts.
//!
//! When the lock service runs on its own thread, or is reached from
//! interrupt context, the entire record sits behind one critical-section
//! mutex.  Fields are never locked individually: every access sees a
//! consistent state, index and value.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::app::service::LockService;

pub struct SharedLockService {
    inner: CriticalSectionMutex<RefCell<LockService>>,
}

impl SharedLockService {
    pub const fn new(service: LockService) -> Self {
        Self {
            inner: CriticalSectionMutex::new(RefCell::new(service)),
        }
    }

    /// Run `f` with exclusive access to the service.
    ///
    /// Panics if called re-entrantly from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut LockService) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn into_inner(self) -> LockService {
        self.inner.into_inner().into_inner()
    }
}
