use core::marker::PhantomData;
use core::ptr::NonNull;
use core::task::Poll;

use crate::value::shared::Shared;
use crate::value::Cancelled;

/// The receiving half of a [`ValueChannel`](super::ValueChannel) pair.
///
/// Non-copyable, non-assignable, movable. Call [`poll`](Self::poll)
/// whenever the cooperative dispatcher schedules the task this
/// receiver belongs to; the waker supplied at pair construction is
/// what gets the task rescheduled again.
pub struct ValueReceiver<'ch, T> {
    pub(super) shared: NonNull<Shared<T>>,
    pub(super) _marker: PhantomData<&'ch Shared<T>>,
}

unsafe impl<T: Send> Send for ValueReceiver<'_, T> {}

impl<'ch, T> ValueReceiver<'ch, T> {
    pub(super) fn new(shared: NonNull<Shared<T>>) -> Self {
        Self { shared, _marker: PhantomData }
    }

    /// Non-blocking query for the delivered value.
    ///
    /// Returns `Ready(Ok(value))` exactly once over the pair's
    /// lifetime; a later call (there is no reason for a well-behaved
    /// caller to make one, since the value has already been moved out)
    /// returns `Ready(Err(Cancelled))`, per the resolution of spec.md
    /// §9's open question. Returns `Ready(Err(Cancelled))` if the
    /// sender was dropped before sending. Otherwise returns `Pending`;
    /// the waker installed at construction time fires exactly once,
    /// when the pair reaches its terminal event.
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
    /// use tether_core::value::{initialize_value_pair, Cancelled, ValueChannel};
    ///
    /// let channel = ValueChannel::<u8>::new();
    /// let (tx, mut rx) = initialize_value_pair(&channel, Arc::new(NoopWaker).into());
    /// assert_eq!(rx.poll(), Poll::Pending);
    /// drop(tx);
    /// assert_eq!(rx.poll(), Poll::Ready(Err(Cancelled)));
    /// ```
    pub fn poll(&mut self) -> Poll<Result<T, Cancelled>> {
        unsafe { self.shared.as_ref().poll() }
    }
}

impl<T> Drop for ValueReceiver<'_, T> {
    fn drop(&mut self) {
        let finalize = unsafe { self.shared.as_ref().on_receiver_drop() };
        if finalize {
            unsafe { crate::value::channel::finalize_boxed(self.shared) };
        }
    }
}
