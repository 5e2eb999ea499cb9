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

//! Byte layout of the fixed-size BMS telemetry structs
//!
//! Offsets follow the publisher's C structs with natural alignment on a
//! little-endian target. Only the fields the session needs are decoded.
//! Decoding never reads past the buffer; a short buffer yields `None`.

pub const FLIGHT_DATA_SIZE: usize = 1920;
pub const FLIGHT_DATA_VERSION_OFFSET: usize = 1900;
pub const MAIN_POWER_OFFSET: usize = 1916;

pub const FLIGHT_DATA2_SIZE: usize = 1264;
pub const CMDS_MODE_OFFSET: usize = 44;
pub const FLIGHT_DATA2_VERSION_OFFSET: usize = 76;

pub const INTELLIVIBE_SIZE: usize = 52;
pub const END_FLIGHT_OFFSET: usize = 13;
pub const IN_3D_OFFSET: usize = 15;
pub const ON_GROUND_OFFSET: usize = 19;

pub const STRING_AREA_SIZE: usize = 1024 * 1024;

/// CMDS mode value for STBY.
pub const CMDS_MODE_STANDBY: i32 = 1;

pub(crate) fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(i32::from_le_bytes)
}

pub(crate) fn read_bool(data: &[u8], offset: usize) -> Option<bool> {
    data.get(offset).map(|b| *b != 0)
}

/// Fields read from `FalconSharedMemoryArea`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlightData {
    pub version: i32,
    /// 0 = off, 1 = battery, 2 = main generator
    pub main_power: i32,
}

impl FlightData {
    pub fn decode(data: &[u8]) -> Option<Self> {
        Some(Self {
            version: read_i32_le(data, FLIGHT_DATA_VERSION_OFFSET)?,
            main_power: read_i32_le(data, MAIN_POWER_OFFSET)?,
        })
    }

    pub fn main_power_on(&self) -> bool {
        self.main_power != 0
    }
}

/// Fields read from `FalconSharedMemoryArea2`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FlightData2 {
    pub version: i32,
    pub cmds_mode: i32,
}

impl FlightData2 {
    pub fn decode(data: &[u8]) -> Option<Self> {
        Some(Self {
            version: read_i32_le(data, FLIGHT_DATA2_VERSION_OFFSET)?,
            cmds_mode: read_i32_le(data, CMDS_MODE_OFFSET)?,
        })
    }
}

/// Fields read from `FalconIntellivibeSharedMemoryArea`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntellivibeData {
    pub end_flight: bool,
    pub in_3d: bool,
    pub on_ground: bool,
}

impl IntellivibeData {
    pub fn decode(data: &[u8]) -> Option<Self> {
        Some(Self {
            end_flight: read_bool(data, END_FLIGHT_OFFSET)?,
            in_3d: read_bool(data, IN_3D_OFFSET)?,
            on_ground: read_bool(data, ON_GROUND_OFFSET)?,
        })
    }
}
