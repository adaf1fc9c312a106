//! Firmware protocol support
//!
//! Supported protocols:
//! - x3g/s3g: binary protocol spoken by MakerBot and Sailfish firmware

pub mod x3g;

pub use x3g::{Command, DeviceCode, DeviceResponse, HostCommand, Outcome, Packet};
