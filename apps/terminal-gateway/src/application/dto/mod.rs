//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod envelope;
mod session_dto;

pub use envelope::{Envelope, normalize};
pub use session_dto::{DisconnectedDto, SessionSummaryDto};
