//! A one-shot, ISR-safe sender/receiver pair.
//!
//! This crate gives two cooperating tasks a way to hand off exactly one
//! value ([`value`]) or to mutate a caller-owned buffer in place
//! ([`reference`]): a producer that may run on another thread or inside
//! an interrupt handler, and a consumer polled by a cooperative
//! dispatcher. Both flavors are built on a single process-wide
//! interrupt-safe spinlock ([`platform::Lock`]); see that module for
//! the synchronization contract every other piece of this crate relies
//! on.
//!
//! Two constructors exist for each flavor: `make_*_pair` (behind the
//! `alloc` feature) boxes the shared state and hands back fully owned,
//! independently movable endpoints; `initialize_*_pair` places the
//! shared state into a caller-owned [`value::ValueChannel`]/
//! [`reference::RefChannel`] instead, for targets without an allocator.
#![cfg_attr(not(feature = "host"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod contract;
pub mod platform;
pub mod reference;
pub mod value;

pub use crate::reference::{
    initialize_ref_pair, RefChannel, RefReceiver, RefSender, Status,
};
pub use crate::value::{
    initialize_value_pair, Cancelled, ValueChannel, ValueReceiver, ValueSender,
};

#[cfg(feature = "alloc")]
pub use crate::reference::make_ref_pair;
#[cfg(feature = "alloc")]
pub use crate::value::make_value_pair;
