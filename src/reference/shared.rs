use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::task::{Poll, Waker};

use crate::platform::GLOBAL;
use crate::reference::Status;

/// The interior-mutable cell addressed by both halves of a
/// [`RefChannel`](super::RefChannel) pair.
///
/// Unlike [`crate::value::shared::Shared`], this cell does not own the
/// payload: `target` points at a buffer the *caller* owns and which
/// must outlive both endpoints (spec.md §9). Only the control fields
/// below (`done`, `cancelled`, `linked`, `waker`, `refs`) are
/// lock-protected; reads/writes through `target` itself happen outside
/// the lock, with exclusivity guaranteed instead by the aliasing
/// invariant (spec.md §3.6): the caller must not touch the buffer
/// between construction and the terminal event.
pub(crate) struct Shared<T> {
    target: UnsafeCell<NonNull<T>>,
    waker: UnsafeCell<Option<Waker>>,
    /// Set once the sender has committed a delivery (`set`/`commit`).
    done: UnsafeCell<bool>,
    /// Set once the sender was dropped without committing.
    cancelled: UnsafeCell<bool>,
    /// `true` until `done`/`cancelled` is latched.
    linked: UnsafeCell<bool>,
    refs: UnsafeCell<u8>,
    boxed: bool,
}

unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Shared<T> {
    pub(crate) const fn cold(boxed: bool) -> Self {
        Self {
            target: UnsafeCell::new(NonNull::dangling()),
            waker: UnsafeCell::new(None),
            done: UnsafeCell::new(false),
            cancelled: UnsafeCell::new(false),
            linked: UnsafeCell::new(false),
            refs: UnsafeCell::new(0),
            boxed,
        }
    }

    /// Links the pair against `target`, installing `waker` on the
    /// receiver.
    pub(crate) fn activate(&self, target: NonNull<T>, waker: Waker) {
        let _guard = GLOBAL.acquire();
        unsafe {
            *self.target.get() = target;
            *self.waker.get() = Some(waker);
            *self.done.get() = false;
            *self.cancelled.get() = false;
            *self.linked.get() = true;
            *self.refs.get() = 2;
        }
    }

    /// Raw access to the caller's buffer. Never taken under the lock;
    /// see the aliasing invariant on the type itself.
    pub(crate) fn target(&self) -> NonNull<T> {
        unsafe { *self.target.get() }
    }

    /// `commit`/the tail of `set`: latches delivery and fires the
    /// waker, unless the pair already reached its terminal event.
    pub(crate) fn commit(&self) {
        let _guard = GLOBAL.acquire();
        unsafe {
            if *self.linked.get() {
                *self.linked.get() = false;
                *self.done.get() = true;
                if let Some(waker) = (*self.waker.get()).take() {
                    waker.wake();
                }
            }
        }
    }

    /// Sender dropped (with or without prior `modify_unsafe` calls)
    /// without calling `set`/`commit`: latches cancellation.
    pub(crate) fn on_sender_drop(&self) -> bool {
        let _guard = GLOBAL.acquire();
        unsafe {
            if *self.linked.get() {
                *self.linked.get() = false;
                *self.cancelled.get() = true;
                if let Some(waker) = (*self.waker.get()).take() {
                    waker.wake();
                }
            }
            self.release_locked()
        }
    }

    /// Receiver dropped: silently unlinks, releases this endpoint's
    /// share.
    pub(crate) fn on_receiver_drop(&self) -> bool {
        let _guard = GLOBAL.acquire();
        unsafe {
            *self.linked.get() = false;
            *self.waker.get() = None;
            self.release_locked()
        }
    }

    pub(crate) fn poll(&self) -> Poll<Status> {
        let _guard = GLOBAL.acquire();
        unsafe {
            if *self.cancelled.get() {
                return Poll::Ready(Status::Cancelled);
            }
            if *self.done.get() {
                return Poll::Ready(Status::Ok);
            }
        }
        Poll::Pending
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
