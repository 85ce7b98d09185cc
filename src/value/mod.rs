//! A one-shot channel for sending a single value between tasks.
//!
//! See [`ValueChannel`] and [`initialize_value_pair`]/
//! [`make_value_pair`] for the two ways to construct a pair.

mod channel;
mod receiver;
mod sender;
mod shared;

pub use self::channel::{initialize_value_pair, ValueChannel};
pub use self::receiver::ValueReceiver;
pub use self::sender::ValueSender;

#[cfg(feature = "alloc")]
pub use self::channel::make_value_pair;

use core::fmt;

/// Error returned from [`ValueReceiver::poll`] when the corresponding
/// [`ValueSender`] was dropped before sending a value (or, per
/// spec.md's resolution of its own open question, when the receiver
/// polls again after already having taken the delivered value).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value channel canceled: sender dropped before sending")
    }
}

#[cfg(feature = "host")]
impl std::error::Error for Cancelled {}

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
    fn send_then_poll_delivers_ok() {
        let (waker, woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, mut rx) = initialize_value_pair(&channel, waker);
        assert_eq!(rx.poll(), Poll::Pending);
        tx.send(42);
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Ok(42)));
    }

    #[test]
    fn poll_after_delivery_is_cancelled_not_repeatable() {
        let (waker, _woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, mut rx) = initialize_value_pair(&channel, waker);
        tx.send(7);
        assert_eq!(rx.poll(), Poll::Ready(Ok(7)));
        assert_eq!(rx.poll(), Poll::Ready(Err(Cancelled)));
    }

    #[test]
    fn drop_sender_then_poll_is_cancelled() {
        let (waker, woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, mut rx) = initialize_value_pair(&channel, waker);
        drop(tx);
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Err(Cancelled)));
    }

    #[test]
    fn poll_before_send_is_pending_and_waker_is_retained() {
        let (waker, woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, mut rx) = initialize_value_pair(&channel, waker);
        assert_eq!(rx.poll(), Poll::Pending);
        assert!(!woken.load(core::sync::atomic::Ordering::SeqCst));
        tx.send(1);
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn send_after_receiver_dropped_is_silent_no_op() {
        let (waker, _woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, rx) = initialize_value_pair(&channel, waker);
        drop(rx);
        tx.send(99);
    }

    #[test]
    fn is_canceled_reflects_receiver_drop() {
        let (waker, _woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, rx) = initialize_value_pair(&channel, waker);
        assert!(!tx.is_canceled());
        drop(rx);
        assert!(tx.is_canceled());
    }

    #[test]
    fn moving_sender_preserves_linkage() {
        let (waker, woken) = test_waker();
        let channel = ValueChannel::new();
        let (tx, mut rx) = initialize_value_pair(&channel, waker);
        let tx2 = tx;
        tx2.send("hi");
        assert!(woken.load(core::sync::atomic::Ordering::SeqCst));
        assert_eq!(rx.poll(), Poll::Ready(Ok("hi")));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn boxed_pair_round_trip_and_is_freed() {
        let (waker, _woken) = test_waker();
        let (tx, mut rx) = make_value_pair(waker);
        tx.send(5);
        assert_eq!(rx.poll(), Poll::Ready(Ok(5)));
    }
}
