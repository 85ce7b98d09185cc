use core::ptr::NonNull;
use core::task::Waker;

use crate::reference::receiver::RefReceiver;
use crate::reference::sender::RefSender;
use crate::reference::shared::Shared;

/// Caller-owned storage for one [`RefChannel`] pair's control state.
///
/// This holds only the pair's bookkeeping (linkage, waker, terminal
/// flags). The payload buffer mutated in place by the sender is a
/// separate, caller-supplied `&mut T` passed to
/// [`initialize_ref_pair`]. Place a `RefChannel` in a `static` or on
/// the stack of whichever scope will outlive both endpoints.
pub struct RefChannel<T> {
    shared: Shared<T>,
}

impl<T> RefChannel<T> {
    /// Creates inert storage. Does not link anything yet; pass it to
    /// [`initialize_ref_pair`] along with the buffer to mutate.
    ///
    /// # Examples
    ///
    /// ```
    /// use tether_core::reference::RefChannel;
    ///
    /// let channel: RefChannel<u32> = RefChannel::new();
    /// ```
    pub const fn new() -> Self {
        Self { shared: Shared::cold(false) }
    }
}

impl<T> Default for RefChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Links `channel` against `target` and returns its sender/receiver
/// halves, installing `waker` on the receiver.
///
/// `target` must remain untouched by anyone other than the sender
/// (through [`RefSender::set`]/[`RefSender::modify_unsafe`]) until the
/// pair reaches its terminal event. This is spec.md §3.6's aliasing
/// invariant and is the caller's responsibility to uphold; it is
/// asserted only in debug, `host`-feature re-entrancy checks, not
/// proven by the type system.
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
pub fn initialize_ref_pair<'ch, T>(
    channel: &'ch RefChannel<T>,
    target: &'ch mut T,
    waker: Waker,
) -> (RefSender<'ch, T>, RefReceiver<'ch, T>) {
    channel.shared.activate(NonNull::from(target), waker);
    let ptr = NonNull::from(&channel.shared);
    (RefSender::new(ptr), RefReceiver::new(ptr))
}

/// Creates a new, heap-boxed one-shot reference channel over `target`,
/// returning its sender/receiver halves and installing `waker` on the
/// receiver.
///
/// # Safety
///
/// `target` must remain valid and exclusively reachable through the
/// returned endpoints for as long as either endpoint is alive. This
/// function cannot borrow-check that for you the way
/// [`initialize_ref_pair`] does, since the endpoints it returns are
/// `'static`.
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
/// use tether_core::reference::{make_ref_pair, Status};
///
/// let mut buf = Box::new(0_u64);
/// let target = std::ptr::NonNull::from(buf.as_mut());
/// let (tx, mut rx) = unsafe { make_ref_pair(target, Arc::new(NoopWaker).into()) };
/// tx.set(9);
/// assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
/// assert_eq!(*buf, 9);
/// # }
/// ```
#[cfg(feature = "alloc")]
pub unsafe fn make_ref_pair<T>(
    target: NonNull<T>,
    waker: Waker,
) -> (RefSender<'static, T>, RefReceiver<'static, T>) {
    let shared = Shared::cold(true);
    shared.activate(target, waker);
    let ptr = unsafe { NonNull::new_unchecked(alloc::boxed::Box::into_raw(alloc::boxed::Box::new(shared))) };
    (RefSender::new(ptr), RefReceiver::new(ptr))
}

/// Frees a boxed [`Shared`] cell once both endpoints have dropped.
///
/// # Safety
///
/// `ptr` must have come from [`make_ref_pair`], and the caller must be
/// the last live endpoint referencing it (`on_sender_drop`/
/// `on_receiver_drop` returned `true`).
#[cfg(feature = "alloc")]
pub(crate) unsafe fn finalize_boxed<T>(ptr: NonNull<Shared<T>>) {
    debug_assert!(unsafe { ptr.as_ref().boxed() });
    drop(unsafe { alloc::boxed::Box::from_raw(ptr.as_ptr()) });
}

#[cfg(not(feature = "alloc"))]
pub(crate) unsafe fn finalize_boxed<T>(_ptr: NonNull<Shared<T>>) {
    unreachable!("finalize_boxed is only reachable through the `alloc`-gated make_ref_pair")
}
