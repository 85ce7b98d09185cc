//! Platform glue consumed, not owned, by this crate.
//!
//! The process-wide interrupt-safe spinlock that every [`crate::value`]
//! and [`crate::reference`] pair mutates under is a narrow interface
//! onto the platform: disabling and re-enabling interrupts is delegated
//! to `tether_save_and_disable_interrupts`/`tether_restore_interrupts`,
//! two symbols a concrete platform crate is expected to provide (in the
//! style of `drone-stm32f1`/`drone-stm32l4` providing
//! `drone_save_and_disable_interrupts`). Under the `host` feature, used
//! for tests and for targets that run under an OS rather than bare
//! metal, these are stubbed out and cross-thread exclusion is carried
//! entirely by the atomic spin in [`Lock`].

mod lock;

pub use self::lock::{Lock, LockGuard, GLOBAL};
