//! # X3GBridge Core
//!
//! Core types and utilities for X3GBridge.
//! Provides the shared machine/session state, the error taxonomy and the
//! type aliases used by the translation and settings crates.

pub mod data;
pub mod error;
pub mod types;

pub use data::{
    AxisMask, ExtruderExcess, MachineProfile, MachineState, Position, ProgramState, StepsPerMm,
};

pub use error::{Error, Result, TableError};

pub use types::{thread_safe_rw, SharedMachine, ThreadSafeRw};
