//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for the shared machine state handle.

pub mod aliases;

pub use aliases::*;
