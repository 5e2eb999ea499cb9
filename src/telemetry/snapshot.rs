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

//! One tick's worth of telemetry
//!
//! A snapshot is either built whole from all four regions or not at all.
//! There is no partially filled snapshot and no field is defaulted.

use crate::telemetry::{
    layout::{FlightData, FlightData2, IntellivibeData, CMDS_MODE_STANDBY},
    Region, RegionSource, StringTable, TelemetryError,
};

/// The three fixed-layout records, decoded
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlightRecords {
    pub flight_data: FlightData,
    pub flight_data2: FlightData2,
    pub intellivibe: IntellivibeData,
}

impl FlightRecords {
    /// Reads and decodes the three fixed-layout regions.
    pub fn read(source: &impl RegionSource) -> Result<Self, TelemetryError> {
        Ok(Self {
            flight_data: decode(source, Region::FlightData, FlightData::decode)?,
            flight_data2: decode(source, Region::FlightData2, FlightData2::decode)?,
            intellivibe: decode(source, Region::Intellivibe, IntellivibeData::decode)?,
        })
    }
}

fn decode<T>(
    source: &impl RegionSource,
    region: Region,
    decoder: fn(&[u8]) -> Option<T>,
) -> Result<T, TelemetryError> {
    let bytes = source.read(region)?;
    decoder(&bytes).ok_or_else(|| {
        TelemetryError::malformed(region, format!("region truncated to {} bytes", bytes.len()))
    })
}

/// Reads and decodes the string table region.
pub fn read_strings(source: &impl RegionSource) -> Result<StringTable, TelemetryError> {
    StringTable::decode(&source.read(Region::StringTable)?)
}

/// Immutable view of the simulator for one polling tick
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TelemetrySnapshot {
    pub in_3d: bool,
    pub on_ground: bool,
    pub end_flight: bool,
    pub main_power_on: bool,
    /// Raw CMDS mode; 1 is STBY
    pub system_mode_code: i32,
    /// Key file BMS reports, empty if it reported none
    pub active_config_path: String,
}

impl TelemetrySnapshot {
    /// Combines decoded records and the string table.
    pub fn assemble(records: &FlightRecords, strings: &StringTable) -> Self {
        Self {
            in_3d: records.intellivibe.in_3d,
            on_ground: records.intellivibe.on_ground,
            end_flight: records.intellivibe.end_flight,
            main_power_on: records.flight_data.main_power_on(),
            system_mode_code: records.flight_data2.cmds_mode,
            active_config_path: strings.key_file().unwrap_or_default().to_string(),
        }
    }

    pub fn cmds_in_standby(&self) -> bool {
        self.system_mode_code == CMDS_MODE_STANDBY
    }
}
