//! x3g (s3g) protocol vocabulary
//!
//! Command and status codes, the packet/response envelope and the outcome
//! codes that the response translator interprets.

pub mod codes;
pub mod outcome;
pub mod response;

pub use codes::{
    is_queueable, BuildStatus, Command, FirmwareVariant, MotherboardFlags, ToolQuery,
    QUEUEABLE_BIT, SD_FILE_NOT_FOUND,
};
pub use outcome::{decode_outcome, DeviceCode, Outcome, OutcomeText};
pub use response::{
    BuildStatistics, DeviceResponse, FirmwareInfo, HostCommand, Packet, ResponseEnvelope,
    SdResponse, StepPosition,
};
