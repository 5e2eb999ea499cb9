// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Falcon BMS shared memory telemetry
//!
//! BMS publishes its state in four named shared memory regions. Three hold
//! fixed-layout C structs; the fourth holds a length-prefixed string table
//! with paths such as the active key file.
//!
//! Every poll opens each region, copies it out, closes it and decodes the
//! copy. Nothing is cached between polls.

pub mod layout;
pub mod region;
pub mod snapshot;
pub mod strings;

#[cfg(test)]
pub(crate) mod fixtures;

pub use region::{MemoryRegions, Region, RegionSource, SharedMemorySource};
pub use snapshot::{FlightRecords, TelemetrySnapshot};
pub use strings::{StringIdentifier, StringTable};

use thiserror::Error;

/// Errors raised while reading telemetry.
///
/// All of them are transient and the polling loop retries on the next
/// tick. They differ in what they say about BMS: a region that cannot be
/// opened means BMS is not running, while a region that opens but does
/// not decode only means this copy was caught mid-update.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TelemetryError {
    /// The mapping does not exist or could not be opened.
    #[error("Shared memory region {region} unavailable: {reason}")]
    RegionUnavailable { region: Region, reason: String },

    /// The mapping was read but its contents did not decode.
    #[error("Shared memory region {region} malformed: {reason}")]
    RegionMalformed { region: Region, reason: String },
}

impl TelemetryError {
    pub(crate) fn unavailable(region: Region, reason: impl Into<String>) -> Self {
        TelemetryError::RegionUnavailable {
            region,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(region: Region, reason: impl Into<String>) -> Self {
        TelemetryError::RegionMalformed {
            region,
            reason: reason.into(),
        }
    }

    /// The region that failed.
    pub fn region(&self) -> Region {
        match self {
            TelemetryError::RegionUnavailable { region, .. }
            | TelemetryError::RegionMalformed { region, .. } => *region,
        }
    }

    /// Whether the region could not be opened at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, TelemetryError::RegionUnavailable { .. })
    }
}
