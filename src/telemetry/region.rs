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

//! Named shared memory regions and the sources that read them

use std::{collections::HashMap, fmt};

use crate::telemetry::{layout, TelemetryError};

/// One of the shared memory regions BMS publishes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Region {
    FlightData,
    FlightData2,
    Intellivibe,
    StringTable,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::FlightData,
        Region::FlightData2,
        Region::Intellivibe,
        Region::StringTable,
    ];

    /// Name of the Windows file mapping.
    pub fn name(self) -> &'static str {
        match self {
            Region::FlightData => "FalconSharedMemoryArea",
            Region::FlightData2 => "FalconSharedMemoryArea2",
            Region::Intellivibe => "FalconIntellivibeSharedMemoryArea",
            Region::StringTable => "FalconSharedMemoryAreaString",
        }
    }

    /// Number of bytes mapped and copied for this region.
    pub fn size(self) -> usize {
        match self {
            Region::FlightData => layout::FLIGHT_DATA_SIZE,
            Region::FlightData2 => layout::FLIGHT_DATA2_SIZE,
            Region::Intellivibe => layout::INTELLIVIBE_SIZE,
            Region::StringTable => layout::STRING_AREA_SIZE,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can produce the raw bytes of a region
///
/// Implementations return a private copy; the caller never holds a view
/// into live shared memory.
pub trait RegionSource {
    fn read(&self, region: Region) -> Result<Vec<u8>, TelemetryError>;
}

/// Reads regions from the live Windows file mappings.
///
/// On other platforms every read fails with `RegionUnavailable`, which the
/// polling loop treats the same as BMS not running.
#[derive(Clone, Copy, Debug, Default)]
pub struct SharedMemorySource;

impl RegionSource for SharedMemorySource {
    fn read(&self, region: Region) -> Result<Vec<u8>, TelemetryError> {
        read_mapping(region.name(), region.size())
            .map_err(|reason| TelemetryError::unavailable(region, reason))
    }
}

/// Open the mapping, copy `size` bytes, unmap and close. Returns error on any failure.
#[cfg(windows)]
#[allow(unsafe_code)]
fn read_mapping(name: &str, size: usize) -> Result<Vec<u8>, String> {
    use std::ffi::OsStr;
    use std::io;
    use std::os::windows::ffi::OsStrExt;
    use winapi::um::{
        handleapi::CloseHandle,
        memoryapi::{MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, FILE_MAP_READ},
    };

    let wide_name: Vec<u16> = OsStr::new(name)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: wide_name is null-terminated and outlives the call. The view
    // is `size` bytes long and is copied out before it is unmapped.
    unsafe {
        let handle = OpenFileMappingW(FILE_MAP_READ, 0, wide_name.as_ptr());
        if handle.is_null() {
            return Err(format!("open failed: {}", io::Error::last_os_error()));
        }

        let view = MapViewOfFile(handle, FILE_MAP_READ, 0, 0, size);
        if view.is_null() {
            let err = io::Error::last_os_error();
            CloseHandle(handle);
            return Err(format!("map failed: {}", err));
        }

        let data = std::slice::from_raw_parts(view as *const u8, size).to_vec();
        UnmapViewOfFile(view);
        CloseHandle(handle);
        Ok(data)
    }
}

#[cfg(not(windows))]
fn read_mapping(_name: &str, _size: usize) -> Result<Vec<u8>, String> {
    Err("shared memory is only available on Windows".to_string())
}

/// In-memory regions, for tests and offline replay.
///
/// A region that was never inserted reads as unavailable, like a mapping
/// BMS has not created.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegions {
    regions: HashMap<Region, Vec<u8>>,
}

impl MemoryRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: Region, bytes: Vec<u8>) {
        self.regions.insert(region, bytes);
    }

    pub fn remove(&mut self, region: Region) -> Option<Vec<u8>> {
        self.regions.remove(&region)
    }

    pub fn with(mut self, region: Region, bytes: Vec<u8>) -> Self {
        self.insert(region, bytes);
        self
    }
}

impl RegionSource for MemoryRegions {
    fn read(&self, region: Region) -> Result<Vec<u8>, TelemetryError> {
        self.regions
            .get(&region)
            .cloned()
            .ok_or_else(|| TelemetryError::unavailable(region, "mapping does not exist"))
    }
}

impl<S: RegionSource + ?Sized> RegionSource for &S {
    fn read(&self, region: Region) -> Result<Vec<u8>, TelemetryError> {
        (**self).read(region)
    }
}
