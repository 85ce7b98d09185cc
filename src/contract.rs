//! Debug-only re-entrancy detection for the `modify_unsafe` contract.
//!
//! spec.md §9 suggests detecting this in debug builds via "a
//! thread-local 'lock held' flag that the API checks"; production
//! behavior stays the documented deadlock. This never allocates and
//! never runs in release builds.

#[cfg(all(debug_assertions, feature = "host"))]
std::thread_local! {
    static IN_CRITICAL: core::cell::Cell<bool> = const { core::cell::Cell::new(false) };
}

/// Runs `f` while marking the current thread as "inside a channel
/// critical section". If `f` calls back into any channel API that
/// checks this guard, the re-entrant call `debug_assert!`s instead of
/// silently spinning forever against the already-held
/// [`crate::platform::Lock`].
#[inline]
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(all(debug_assertions, feature = "host"))]
    {
        let was_set = IN_CRITICAL.with(|flag| flag.replace(true));
        debug_assert!(
            !was_set,
            "tether-core: re-entrant call into a channel API from inside \
             modify_unsafe (or another critical section); this deadlocks \
             in release builds"
        );
        let result = f();
        IN_CRITICAL.with(|flag| flag.set(was_set));
        result
    }
    #[cfg(not(all(debug_assertions, feature = "host")))]
    {
        f()
    }
}
