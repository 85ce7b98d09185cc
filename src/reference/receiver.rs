use core::marker::PhantomData;
use core::ptr::NonNull;
use core::task::Poll;

use crate::reference::shared::Shared;
use crate::reference::Status;

/// The receiving half of a [`RefChannel`](super::RefChannel) pair.
///
/// Non-copyable, non-assignable, movable. [`poll`](Self::poll) reports
/// whether the sender has committed a delivery into the buffer this
/// pair was constructed with; the value itself is never routed
/// through this type, only the notification is.
pub struct RefReceiver<'ch, T> {
    pub(super) shared: NonNull<Shared<T>>,
    pub(super) _marker: PhantomData<&'ch Shared<T>>,
}

unsafe impl<T: Send> Send for RefReceiver<'_, T> {}

impl<'ch, T> RefReceiver<'ch, T> {
    pub(super) fn new(shared: NonNull<Shared<T>>) -> Self {
        Self { shared, _marker: PhantomData }
    }

    /// Non-blocking query for the pair's terminal event.
    ///
    /// Returns `Ready(Status::Ok)` once the sender has called
    /// [`set`](crate::reference::RefSender::set) or
    /// [`commit`](crate::reference::RefSender::commit), and
    /// `Ready(Status::Cancelled)` if the sender dropped without
    /// committing. Otherwise `Pending`.
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
    /// assert_eq!(rx.poll(), Poll::Pending);
    /// drop(tx);
    /// assert_eq!(rx.poll(), Poll::Ready(Status::Cancelled));
    /// ```
    pub fn poll(&mut self) -> Poll<Status> {
        unsafe { self.shared.as_ref().poll() }
    }
}

impl<T> Drop for RefReceiver<'_, T> {
    fn drop(&mut self) {
        let finalize = unsafe { self.shared.as_ref().on_receiver_drop() };
        if finalize {
            unsafe { crate::reference::channel::finalize_boxed(self.shared) };
        }
    }
}
