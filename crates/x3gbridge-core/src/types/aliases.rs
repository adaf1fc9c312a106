//! Type aliases for shared state.
//!
//! The forward translator and the response translator both hold a handle to
//! the same [`MachineState`](crate::data::MachineState). Only one host line is
//! processed at a time, but the daemon bridge may hand the session to a
//! worker thread, so the handle is thread-safe.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use x3gbridge_core::types::*;
//!
//! let machine: SharedMachine = thread_safe_rw(MachineState::default());
//! machine.write().program_state = ProgramState::Running;
//! ```

use crate::data::MachineState;
use parking_lot::RwLock;
use std::sync::Arc;

/// A thread-safe, read-write-locked wrapper for cross-thread sharing.
///
/// Uses `parking_lot::RwLock` for better performance than `std::sync::RwLock`.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Handle to the machine/session state shared by both translation directions.
pub type SharedMachine = ThreadSafeRw<MachineState>;

/// Create a new thread-safe read-write wrapper.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
