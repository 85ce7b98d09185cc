use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::contract;
use crate::reference::receiver::RefReceiver;
use crate::reference::shared::Shared;

/// The sending half of a [`RefChannel`](super::RefChannel) pair.
///
/// Non-copyable, non-assignable, movable. Unlike
/// [`ValueSender`](crate::value::ValueSender), this endpoint never
/// owns the payload; it mutates the receiver's target buffer in
/// place, either once via [`set`](Self::set) or incrementally via
/// [`modify_unsafe`](Self::modify_unsafe) followed by
/// [`commit`](Self::commit).
pub struct RefSender<'ch, T> {
    pub(super) shared: NonNull<Shared<T>>,
    pub(super) _marker: PhantomData<&'ch Shared<T>>,
}

unsafe impl<T: Send> Send for RefSender<'_, T> {}

impl<'ch, T> RefSender<'ch, T> {
    pub(super) fn new(shared: NonNull<Shared<T>>) -> Self {
        Self { shared, _marker: PhantomData }
    }

    /// Overwrites the target buffer with `value` and commits.
    ///
    /// Consumes `self`, so a second `set`/`commit` is a compile error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use std::task::Wake;
    /// # struct NoopWaker;
    /// # impl Wake for NoopWaker {
    /// #     fn wake(self: Arc<Self>) {}
    /// # }
    /// use std::task::Poll;
    /// use tether_core::reference::{initialize_ref_pair, RefChannel, Status};
    ///
    /// let channel = RefChannel::new();
    /// let mut buf = 0_i32;
    /// let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, Arc::new(NoopWaker).into());
    /// tx.set(7);
    /// assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
    /// assert_eq!(buf, 7);
    /// ```
    pub fn set(self, value: T) {
        unsafe {
            let shared = self.shared.as_ref();
            *shared.target().as_ptr() = value;
        }
        self.commit();
    }

    /// Mutates the target buffer in place through `f`, without
    /// latching the terminal event.
    ///
    /// # Safety contract
    ///
    /// The caller must not alias the target buffer from anywhere else
    /// while `f` runs. This is the aliasing invariant spec.md §3.6
    /// describes; it is not enforced by the type system, only (in
    /// debug host builds) by a re-entrancy trip-wire, see
    /// [`contract::guarded`]. Call [`commit`](Self::commit) afterwards
    /// to wake the receiver; `modify_unsafe` by itself does not.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use std::task::Wake;
    /// # struct NoopWaker;
    /// # impl Wake for NoopWaker {
    /// #     fn wake(self: Arc<Self>) {}
    /// # }
    /// use std::task::Poll;
    /// use tether_core::reference::{initialize_ref_pair, RefChannel, Status};
    ///
    /// let channel = RefChannel::new();
    /// let mut buf = vec![1, 2, 3];
    /// let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, Arc::new(NoopWaker).into());
    /// tx.modify_unsafe(|v| v.push(4));
    /// assert_eq!(rx.poll(), Poll::Pending);
    /// tx.commit();
    /// assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
    /// assert_eq!(buf, vec![1, 2, 3, 4]);
    /// ```
    pub fn modify_unsafe(&self, f: impl FnOnce(&mut T)) {
        contract::guarded(|| unsafe {
            let shared = self.shared.as_ref();
            f(&mut *shared.target().as_ptr());
        });
    }

    /// Latches the pending mutation(s) as delivered and wakes the
    /// receiver. A bare `commit()` with no prior `modify_unsafe` call
    /// delivers the buffer's current contents unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use std::task::Wake;
    /// # struct NoopWaker;
    /// # impl Wake for NoopWaker {
    /// #     fn wake(self: Arc<Self>) {}
    /// # }
    /// use std::task::Poll;
    /// use tether_core::reference::{initialize_ref_pair, RefChannel, Status};
    ///
    /// let channel = RefChannel::new();
    /// let mut buf = 0_i32;
    /// let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, Arc::new(NoopWaker).into());
    /// tx.modify_unsafe(|v| *v += 1);
    /// tx.modify_unsafe(|v| *v += 1);
    /// tx.commit();
    /// assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
    /// assert_eq!(buf, 2);
    /// ```
    pub fn commit(self) {
        unsafe { self.shared.as_ref().commit() };
        // `self` drops normally here: `Shared::commit` already unlinked
        // the pair, so the `Drop` impl's `on_sender_drop` call only
        // releases this endpoint's refcount share, it does not flip
        // `cancelled` (the pair is no longer linked by the time it runs).
    }

    /// Whether this sender and `receiver` were produced by the same
    /// pair constructor call.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use std::task::Wake;
    /// # struct NoopWaker;
    /// # impl Wake for NoopWaker {
    /// #     fn wake(self: Arc<Self>) {}
    /// # }
    /// use tether_core::reference::{initialize_ref_pair, RefChannel};
    ///
    /// let channel = RefChannel::new();
    /// let mut buf = 0_i32;
    /// let (tx, rx) = initialize_ref_pair(&channel, &mut buf, Arc::new(NoopWaker).into());
    /// assert!(tx.is_connected_to(&rx));
    /// ```
    pub fn is_connected_to(&self, receiver: &RefReceiver<'_, T>) -> bool {
        self.shared == receiver.shared
    }
}

impl<T> Drop for RefSender<'_, T> {
    fn drop(&mut self) {
        let finalize = unsafe { self.shared.as_ref().on_sender_drop() };
        if finalize {
            unsafe { crate::reference::channel::finalize_boxed(self.shared) };
        }
    }
}
