#![cfg(loom)]

use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::task::{Poll, RawWaker, RawWakerVTable, Waker};

use tether_core::reference::{make_ref_pair, Status};

fn counting_waker(counter: &'static AtomicUsize) -> Waker {
    fn raw(data: *const ()) -> RawWaker {
        RawWaker::new(data, &VTABLE)
    }
    unsafe fn clone(data: *const ()) -> RawWaker {
        raw(data)
    }
    unsafe fn wake(data: *const ()) {
        wake_by_ref(data);
    }
    unsafe fn wake_by_ref(data: *const ()) {
        unsafe { &*(data as *const AtomicUsize) }.fetch_add(1, SeqCst);
    }
    unsafe fn drop_waker(_data: *const ()) {}
    static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop_waker);
    unsafe { Waker::from_raw(raw(counter as *const AtomicUsize as *const ())) }
}

/// `modify_unsafe` followed by a `commit` racing the receiver's poll
/// must never observe a torn write — the buffer mutation happens
/// outside the lock, but `commit` fully happens-before the wake.
#[test]
fn loom_modify_then_commit_is_visible_to_racing_poll() {
    loom::model(|| {
        let counter: &'static _ = Box::leak(Box::new(AtomicUsize::new(0)));
        let mut buf = Box::new(0_i32);
        let target = std::ptr::NonNull::from(buf.as_mut());
        let (tx, mut rx) = unsafe { make_ref_pair(target, counting_waker(counter)) };
        let sender = loom::thread::spawn(move || {
            tx.modify_unsafe(|v| *v = 5);
            tx.commit();
        });
        sender.join().unwrap();
        loop {
            if let Poll::Ready(status) = rx.poll() {
                assert_eq!(status, Status::Ok);
                break;
            }
        }
        assert_eq!(*buf, 5);
    });
}

/// Sender drop racing receiver drop must not double-free the boxed
/// shared cell.
#[test]
fn loom_concurrent_drop_does_not_double_free() {
    loom::model(|| {
        let counter: &'static _ = Box::leak(Box::new(AtomicUsize::new(0)));
        let mut buf = Box::new(0_i32);
        let target = std::ptr::NonNull::from(buf.as_mut());
        let (tx, rx) = unsafe { make_ref_pair(target, counting_waker(counter)) };
        let t = loom::thread::spawn(move || drop(tx));
        drop(rx);
        t.join().unwrap();
    });
}
