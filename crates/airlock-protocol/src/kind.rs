//! The closed set of operation kinds accepted by the gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Operation kinds, in wire-code order (`type` field, 0–8).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum RequestKind {
    /// Build and transmit a subsystem command.
    SendCommand = 0,
    /// Read a telemetry snapshot for a subsystem.
    GetTelemetry = 1,
    /// Read overall system status.
    GetSystemStatus = 2,
    /// Manage a component lifecycle (start, stop, restart, status).
    ManageComponent = 3,
    /// List the entries of a directory.
    ListFiles = 4,
    /// Read the contents of a file.
    ReadFile = 5,
    /// Write a file (refused by standing policy).
    WriteFile = 6,
    /// Read recent gateway audit events.
    GetEventLog = 7,
    /// Emergency stop: always admitted, forces safe mode.
    EmergencyStop = 8,
}

/// Error produced when a wire code falls outside the closed kind set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown request kind code {0}")]
pub struct UnknownKindError(pub u8);

impl RequestKind {
    /// Number of kinds in the closed set.
    pub const COUNT: usize = 9;

    /// Wire code carried in the request `type` field.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether this kind requires a non-empty `app_name` target.
    #[must_use]
    pub const fn requires_target(self) -> bool {
        matches!(
            self,
            Self::SendCommand | Self::GetTelemetry | Self::ManageComponent
        )
    }
}

impl TryFrom<u8> for RequestKind {
    type Error = UnknownKindError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::SendCommand),
            1 => Ok(Self::GetTelemetry),
            2 => Ok(Self::GetSystemStatus),
            3 => Ok(Self::ManageComponent),
            4 => Ok(Self::ListFiles),
            5 => Ok(Self::ReadFile),
            6 => Ok(Self::WriteFile),
            7 => Ok(Self::GetEventLog),
            8 => Ok(Self::EmergencyStop),
            other => Err(UnknownKindError(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn codes_round_trip_for_every_kind() {
        for kind in RequestKind::iter() {
            assert_eq!(RequestKind::try_from(kind.code()), Ok(kind));
        }
    }

    #[test]
    fn rejects_out_of_range_code() {
        assert_eq!(RequestKind::try_from(9), Err(UnknownKindError(9)));
        assert_eq!(RequestKind::try_from(255), Err(UnknownKindError(255)));
    }

    #[test]
    fn target_requirement_matches_kind() {
        assert!(RequestKind::SendCommand.requires_target());
        assert!(RequestKind::GetTelemetry.requires_target());
        assert!(RequestKind::ManageComponent.requires_target());
        assert!(!RequestKind::ReadFile.requires_target());
        assert!(!RequestKind::EmergencyStop.requires_target());
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(RequestKind::SendCommand.to_string(), "send_command");
        assert_eq!(RequestKind::EmergencyStop.to_string(), "emergency_stop");
    }
}
