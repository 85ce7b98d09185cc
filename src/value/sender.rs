use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::value::receiver::ValueReceiver;
use crate::value::shared::Shared;

/// The sending half of a [`ValueChannel`](super::ValueChannel) pair.
///
/// Non-copyable, non-assignable, movable: moving a `ValueSender` is a
/// plain move of the pointer it carries, nothing on the receiver side
/// needs to be fixed up (see [`Shared`] for why).
pub struct ValueSender<'ch, T> {
    pub(super) shared: NonNull<Shared<T>>,
    pub(super) _marker: PhantomData<&'ch Shared<T>>,
}

unsafe impl<T: Send> Send for ValueSender<'_, T> {}

impl<'ch, T> ValueSender<'ch, T> {
    pub(super) fn new(shared: NonNull<Shared<T>>) -> Self {
        Self { shared, _marker: PhantomData }
    }

    /// Delivers `value` to the receiver and fires its waker.
    ///
    /// Consumes `self`: a second `send` is a compile error, not a
    /// runtime no-op, which is a strictly stronger guarantee than
    /// spec.md's "idempotent after the first terminal event". Rust's
    /// ownership model makes the second call impossible to write
    /// rather than merely harmless.
    ///
    /// If the receiver has already been dropped, the value is simply
    /// dropped along with it; this is not reported as an error, per
    /// spec.md §4.1 ("loss of value when the receiver has already gone
    /// away is not an error").
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
    /// use tether_core::value::{initialize_value_pair, ValueChannel};
    ///
    /// let channel = ValueChannel::new();
    /// let (tx, mut rx) = initialize_value_pair(&channel, Arc::new(NoopWaker).into());
    /// tx.send(42);
    /// assert_eq!(rx.poll(), Poll::Ready(Ok(42)));
    /// ```
    pub fn send(self, value: T) {
        let _ = unsafe { self.shared.as_ref().send(value) };
    }

    /// Like [`send`](Self::send), but constructs the value in place
    /// from `f` instead of requiring the caller to build it first. This
    /// is the "in-place construction" variant spec.md §4.1 mentions
    /// alongside by-value/by-move `send`.
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
    /// use tether_core::value::{initialize_value_pair, ValueChannel};
    ///
    /// let channel = ValueChannel::new();
    /// let (tx, mut rx) = initialize_value_pair(&channel, Arc::new(NoopWaker).into());
    /// tx.send_with(|| String::from("hi"));
    /// assert_eq!(rx.poll(), Poll::Ready(Ok(String::from("hi"))));
    /// ```
    pub fn send_with(self, f: impl FnOnce() -> T) {
        self.send(f())
    }

    /// Snapshot of whether the receiver has already gone away. Unlike
    /// a hypothetical wake-on-cancel future, this does not register
    /// any state and may be stale the instant it returns: spec.md's
    /// data model gives the sender no waker slot of its own to park
    /// on (see SPEC_FULL.md §4.1).
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
    /// use tether_core::value::{initialize_value_pair, ValueChannel};
    ///
    /// let channel = ValueChannel::<u8>::new();
    /// let (tx, rx) = initialize_value_pair(&channel, Arc::new(NoopWaker).into());
    /// assert!(!tx.is_canceled());
    /// drop(rx);
    /// assert!(tx.is_canceled());
    /// ```
    pub fn is_canceled(&self) -> bool {
        unsafe { self.shared.as_ref().is_canceled() }
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
    /// use tether_core::value::{initialize_value_pair, ValueChannel};
    ///
    /// let channel = ValueChannel::<u8>::new();
    /// let (tx, rx) = initialize_value_pair(&channel, Arc::new(NoopWaker).into());
    /// assert!(tx.is_connected_to(&rx));
    /// ```
    pub fn is_connected_to(&self, receiver: &ValueReceiver<'_, T>) -> bool {
        self.shared == receiver.shared
    }
}

impl<T> Drop for ValueSender<'_, T> {
    fn drop(&mut self) {
        let finalize = unsafe { self.shared.as_ref().on_sender_drop() };
        if finalize {
            unsafe { crate::value::channel::finalize_boxed(self.shared) };
        }
    }
}
