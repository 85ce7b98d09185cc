use core::cell::UnsafeCell;
use core::task::{Poll, Waker};

use crate::platform::GLOBAL;
use crate::value::Cancelled;

/// The interior-mutable cell addressed by both halves of a
/// [`ValueChannel`](super::ValueChannel) pair. There is exactly one of
/// these per pair; `Sender`/`Receiver` hold only a pointer to it, so
/// moving either endpoint never has to fix up a back-pointer: nothing
/// ever points *at* an endpoint, only *through* it at this cell.
///
/// Every field is touched only while holding [`GLOBAL`]; the raw
/// `UnsafeCell` accesses below are all soundness-equivalent to a
/// `Mutex<Inner>`, just without the borrow-checked wrapper type, to
/// match the teacher's existing `sync::new_spsc::oneshot` idiom.
pub(crate) struct Shared<T> {
    value: UnsafeCell<Option<T>>,
    waker: UnsafeCell<Option<Waker>>,
    /// `true` until the pair's single terminal event (delivered,
    /// cancelled, or receiver-gone) has occurred.
    linked: UnsafeCell<bool>,
    /// Only meaningful when `boxed`: counts live endpoints, so the
    /// second one to drop knows it must free the box. Storage placed
    /// by `initialize_value_pair` is owned by the caller's
    /// `ValueChannel`, not by refcount, so this is simply never
    /// consulted in that case.
    refs: UnsafeCell<u8>,
    boxed: bool,
}

unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Shared<T> {
    pub(crate) const fn cold(boxed: bool) -> Self {
        Self {
            value: UnsafeCell::new(None),
            waker: UnsafeCell::new(None),
            linked: UnsafeCell::new(false),
            refs: UnsafeCell::new(0),
            boxed,
        }
    }

    /// Links the pair and installs the receiver's waker. Called
    /// exactly once per live pair, either right after construction
    /// (boxed path, not yet published) or through [`GLOBAL`] (in-place
    /// path, storage may already be shared).
    pub(crate) fn activate(&self, waker: Waker) {
        let _guard = GLOBAL.acquire();
        unsafe {
            *self.value.get() = None;
            *self.waker.get() = Some(waker);
            *self.linked.get() = true;
            *self.refs.get() = 2;
        }
    }

    /// `Sender::send`. Stores `value` and fires the receiver's waker
    /// if the pair is still linked; a no-op (returns the value back)
    /// if the receiver already went away. Idempotent: a second call
    /// after the pair is unlinked always falls into the `Err` arm
    /// without touching `value`/`waker` again.
    pub(crate) fn send(&self, value: T) -> Result<(), T> {
        let _guard = GLOBAL.acquire();
        unsafe {
            if !*self.linked.get() {
                return Err(value);
            }
            *self.value.get() = Some(value);
            *self.linked.get() = false;
            if let Some(waker) = (*self.waker.get()).take() {
                waker.wake();
            }
        }
        Ok(())
    }

    /// `Receiver::poll`. A value present always wins (even after the
    /// pair has since unlinked via the same `send` call that stored
    /// it). Once the value has been taken, a later poll falls through
    /// to the `linked == false` branch and reports `Cancelled`, the
    /// spec.md §9 resolution for polling an already-delivered channel
    /// again.
    pub(crate) fn poll(&self) -> Poll<Result<T, Cancelled>> {
        let _guard = GLOBAL.acquire();
        unsafe {
            if let Some(value) = (*self.value.get()).take() {
                return Poll::Ready(Ok(value));
            }
            if !*self.linked.get() {
                return Poll::Ready(Err(Cancelled));
            }
        }
        Poll::Pending
    }

    /// Snapshot-only: whether the receiver has gone away. Does not
    /// register for a wakeup, matching the teacher's
    /// `new_spsc::oneshot::Sender::is_canceled` contract.
    pub(crate) fn is_canceled(&self) -> bool {
        let _guard = GLOBAL.acquire();
        unsafe { !*self.linked.get() }
    }

    /// Sender dropped without sending: cancels if still linked, fires
    /// the waker, then releases this endpoint's share of the cell.
    /// Returns whether the caller must finalize the cell now.
    pub(crate) fn on_sender_drop(&self) -> bool {
        let _guard = GLOBAL.acquire();
        unsafe {
            if *self.linked.get() {
                *self.linked.get() = false;
                if let Some(waker) = (*self.waker.get()).take() {
                    waker.wake();
                }
            }
            self.release_locked()
        }
    }

    /// Receiver dropped: silently unlinks (nothing left to notify,
    /// the receiver was the only one holding a waker) and releases
    /// this endpoint's share.
    pub(crate) fn on_receiver_drop(&self) -> bool {
        let _guard = GLOBAL.acquire();
        unsafe {
            *self.linked.get() = false;
            *self.waker.get() = None;
            self.release_locked()
        }
    }

    /// Must be called while holding `GLOBAL`.
    unsafe fn release_locked(&self) -> bool {
        if !self.boxed {
            return false;
        }
        let refs = unsafe { &mut *self.refs.get() };
        *refs -= 1;
        *refs == 0
    }

    pub(crate) fn boxed(&self) -> bool {
        self.boxed
    }
}
