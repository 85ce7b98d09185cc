//! A one-shot channel for mutating a caller-owned buffer in place and
//! signaling completion, rather than transferring a value by move.
//!
//! See [`RefChannel`] and [`initialize_ref_pair`]/[`make_ref_pair`] for
//! the two ways to construct a pair.

mod channel;
mod receiver;
mod sender;
mod shared;

pub use self::channel::{initialize_ref_pair, RefChannel};
pub use self::receiver::RefReceiver;
pub use self::sender::RefSender;

#[cfg(feature = "alloc")]
pub use self::channel::make_ref_pair;

use core::fmt;

/// Terminal outcome of a [`RefChannel`] pair, returned by
/// [`RefReceiver::poll`].
///
/// Unlike [`crate::value::Cancelled`], this is not an error type on
/// its own. A [`RefChannel`] carries no payload to hand back, so
/// "cancelled" and "delivered" are both just notifications about a
/// buffer the receiver already has access to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// The sender committed a delivery; the target buffer holds the
    /// sender's mutation.
    Ok,
    /// The sender was dropped before committing; the target buffer is
    /// left exactly as the sender's last `modify_unsafe` (if any) left
    /// it.
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "reference channel delivered"),
            Status::Cancelled => write!(f, "reference channel canceled: sender dropped before committing"),
        }
    }
}

#[cfg(feature = "host")]
impl std::error::Error for Status {}

#[cfg(all(test, feature = "host"))]
mod tests {
    use core::task::{Context, Poll};

    use super::*;

    fn test_waker() -> (core::task::Waker, alloc::sync::Arc<core::sync::atomic::AtomicBool>) {
        use alloc::sync::Arc;
        use core::sync::atomic::{AtomicBool, Ordering};
        use core::task::{RawWaker, RawWakerVTable, Waker};

        fn raw(data: *const ()) -> RawWaker {
            RawWaker::new(data, &VTABLE)
        }
        unsafe fn clone(data: *const ()) -> RawWaker {
            unsafe { Arc::increment_strong_count(data as *const AtomicBool) };
            raw(data)
        }
        unsafe fn wake(data: *const ()) {
            unsafe { wake_by_ref(data) };
            unsafe { drop(Arc::from_raw(data as *const AtomicBool)) };
        }
        unsafe fn wake_by_ref(data: *const ()) {
            unsafe { &*(data as *const AtomicBool) }.store(true, Ordering::SeqCst);
        }
        unsafe fn drop_waker(data: *const ()) {
            unsafe { drop(Arc::from_raw(data as *const AtomicBool)) };
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop_waker);

        let flag = Arc::new(AtomicBool::new(false));
        let ptr = Arc::into_raw(flag.clone()) as *const ();
        (unsafe { Waker::from_raw(raw(ptr)) }, flag)
    }

    #[allow(dead_code)]
    fn noop_context<'a>(waker: &'a core::task::Waker) -> Context<'a> {
        Context::from_waker(waker)
    }

    #[test]
    fn set_then_poll_delivers_ok_and_mutates_buffer() {
        let (waker, woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = 0_i32;
        let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, waker);
        assert_eq!(rx.poll(), Poll::Pending);
        tx.set(42);
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
        assert_eq!(buf, 42);
    }

    #[test]
    fn modify_then_commit_delivers_ok() {
        let (waker, woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = vec![1, 2, 3];
        let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, waker);
        tx.modify_unsafe(|v| v.push(4));
        assert!(!woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Pending);
        tx.commit();
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }

    #[test]
    fn multiple_modify_unsafe_calls_before_single_commit() {
        let (waker, _woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = 0_i32;
        let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, waker);
        tx.modify_unsafe(|v| *v += 1);
        tx.modify_unsafe(|v| *v += 1);
        tx.modify_unsafe(|v| *v += 1);
        assert_eq!(rx.poll(), Poll::Pending);
        tx.commit();
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
        assert_eq!(buf, 3);
    }

    #[test]
    fn drop_sender_without_commit_is_cancelled_with_partial_mutation_visible() {
        let (waker, woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = 0_i32;
        let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, waker);
        tx.modify_unsafe(|v| *v = 7);
        drop(tx);
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Status::Cancelled));
        assert_eq!(buf, 7);
    }

    #[test]
    fn poll_after_terminal_event_is_stable() {
        let (waker, _woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = 0_i32;
        let (tx, mut rx) = initialize_ref_pair(&channel, &mut buf, waker);
        tx.set(1);
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
    }

    #[test]
    fn set_after_receiver_dropped_does_not_panic() {
        let (waker, _woken) = test_waker();
        let channel = RefChannel::new();
        let mut buf = 0_i32;
        let (tx, rx) = initialize_ref_pair(&channel, &mut buf, waker);
        drop(rx);
        tx.set(5);
        assert_eq!(buf, 5);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn boxed_pair_round_trip() {
        let (waker, _woken) = test_waker();
        let mut buf = Box::new(0_i32);
        let target = core::ptr::NonNull::from(buf.as_mut());
        let (tx, mut rx) = unsafe { make_ref_pair(target, waker) };
        tx.set(9);
        assert_eq!(rx.poll(), Poll::Ready(Status::Ok));
        assert_eq!(*buf, 9);
    }
}
