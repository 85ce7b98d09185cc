use core::ptr::NonNull;
use core::task::Waker;

use crate::value::receiver::ValueReceiver;
use crate::value::sender::ValueSender;
use crate::value::shared::Shared;

/// Caller-owned storage for one [`ValueChannel`] pair's shared state.
///
/// Place one of these in a `static` or on the stack of whichever scope
/// will outlive both endpoints, then call [`initialize_value_pair`] on
/// it. This is the allocation-free counterpart to
/// [`make_value_pair`](super::make_value_pair): the borrow checker,
/// not a refcount, is what tells the shared cell's last endpoint it is
/// safe to stop touching it.
pub struct ValueChannel<T> {
    shared: Shared<T>,
}

impl<T> ValueChannel<T> {
    /// Creates inert storage. Does not link anything yet; pass it to
    /// [`initialize_value_pair`] to get a usable pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use tether_core::value::ValueChannel;
    ///
    /// let channel: ValueChannel<u32> = ValueChannel::new();
    /// ```
    pub const fn new() -> Self {
        Self { shared: Shared::cold(false) }
    }
}

impl<T> Default for ValueChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Links `channel` and returns its sender/receiver halves, installing
/// `waker` on the receiver.
///
/// This is the allocation-free sibling of [`make_value_pair`]: no
/// heap allocation occurs, and the returned endpoints cannot outlive
/// `channel`.
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
/// tx.send(7);
/// assert_eq!(rx.poll(), Poll::Ready(Ok(7)));
/// ```
pub fn initialize_value_pair<T>(
    channel: &ValueChannel<T>,
    waker: Waker,
) -> (ValueSender<'_, T>, ValueReceiver<'_, T>) {
    channel.shared.activate(waker);
    let ptr = NonNull::from(&channel.shared);
    (ValueSender::new(ptr), ValueReceiver::new(ptr))
}

/// Creates a new, heap-boxed one-shot value channel, returning its
/// sender/receiver halves and installing `waker` on the receiver.
///
/// The two endpoints are fully owned: they can be moved independently,
/// sent to other threads, and outlive the scope that created them.
/// The shared cell is freed when the second endpoint drops.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "alloc")] {
/// # use std::sync::Arc;
/// # use std::task::Wake;
/// # struct NoopWaker;
/// # impl Wake for NoopWaker {
/// #     fn wake(self: Arc<Self>) {}
/// # }
/// use std::task::Poll;
/// use tether_core::value::make_value_pair;
///
/// let (tx, mut rx) = make_value_pair::<u32>(Arc::new(NoopWaker).into());
/// tx.send(7);
/// assert_eq!(rx.poll(), Poll::Ready(Ok(7)));
/// # }
/// ```
#[cfg(feature = "alloc")]
pub fn make_value_pair<T>(waker: Waker) -> (ValueSender<'static, T>, ValueReceiver<'static, T>) {
    let shared = Shared::cold(true);
    shared.activate(waker);
    let ptr = unsafe { NonNull::new_unchecked(alloc::boxed::Box::into_raw(alloc::boxed::Box::new(shared))) };
    (ValueSender::new(ptr), ValueReceiver::new(ptr))
}

/// Frees a boxed [`Shared`] cell once both endpoints have dropped.
///
/// # Safety
///
/// `ptr` must have come from [`make_value_pair`], and the caller must
/// be the last live endpoint referencing it (`on_sender_drop`/
/// `on_receiver_drop` returned `true`).
#[cfg(feature = "alloc")]
pub(crate) unsafe fn finalize_boxed<T>(ptr: NonNull<Shared<T>>) {
    debug_assert!(unsafe { ptr.as_ref().boxed() });
    drop(unsafe { alloc::boxed::Box::from_raw(ptr.as_ptr()) });
}

#[cfg(not(feature = "alloc"))]
pub(crate) unsafe fn finalize_boxed<T>(_ptr: NonNull<Shared<T>>) {
    unreachable!("finalize_boxed is only reachable through the `alloc`-gated make_value_pair")
}
