use core::hint;
use core::sync::atomic::{AtomicBool, Ordering::*};

#[cfg(not(feature = "host"))]
extern "C" {
    fn tether_save_and_disable_interrupts() -> u32;
    fn tether_restore_interrupts(status: u32);
}

/// The single, process-wide, interrupt-safe spinlock described in the
/// locking protocol: every mutation of a channel pair's back-pointer
/// graph (move, destruction, send, poll) happens while a
/// [`LockGuard`] from this type is held.
///
/// Acquiring it disables interrupts for the current core (so it is
/// safe to take from an interrupt handler) *and* spins on an atomic
/// flag (so it is also safe when the sender and receiver live on
/// different cores or OS threads). Nested acquisition from the same
/// execution context deadlocks by design: critical sections here are
/// meant to be O(1) and must never call back into code that takes the
/// lock again. See [`crate::reference::RefSender::modify_unsafe`] for
/// the one place this crate documents that constraint to callers.
pub struct Lock {
    held: AtomicBool,
}

/// RAII guard returned by [`Lock::acquire`]. Interrupts and the atomic
/// flag are released together when this is dropped.
#[must_use = "the lock is released when the guard is dropped, not when it is acquired"]
pub struct LockGuard<'a> {
    lock: &'a Lock,
    irq_save: u32,
}

impl Lock {
    /// Creates a new, unlocked lock. `const fn` so it can back the
    /// single [`GLOBAL`] instance.
    pub const fn new() -> Self {
        Self { held: AtomicBool::new(false) }
    }

    /// Disables interrupts, then spins until the atomic flag is
    /// acquired. Returns a guard that restores both on drop.
    pub fn acquire(&self) -> LockGuard<'_> {
        let irq_save = Self::pause_interrupts();
        while self.held.swap(true, Acquire) {
            hint::spin_loop();
        }
        LockGuard { lock: self, irq_save }
    }

    #[cfg(not(feature = "host"))]
    fn pause_interrupts() -> u32 {
        unsafe { tether_save_and_disable_interrupts() }
    }

    #[cfg(feature = "host")]
    fn pause_interrupts() -> u32 {
        0
    }

    #[cfg(not(feature = "host"))]
    fn restore_interrupts(status: u32) {
        unsafe { tether_restore_interrupts(status) }
    }

    #[cfg(feature = "host")]
    fn restore_interrupts(_status: u32) {}
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Release);
        Lock::restore_interrupts(self.irq_save);
    }
}

/// The single global instance. Lazily acquired on first use, never
/// destroyed, one per process --- exactly the contract spec.md's
/// external-interfaces section asks of the mutual-exclusion
/// collaborator.
pub static GLOBAL: Lock = Lock::new();
