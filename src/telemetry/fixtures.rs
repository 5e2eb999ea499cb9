//! Byte-level builders for telemetry regions

use crate::telemetry::{layout::*, MemoryRegions, Region};

/// Telemetry values a test wants the regions to carry
#[derive(Clone, Debug)]
pub struct Cockpit {
    pub in_3d: bool,
    pub on_ground: bool,
    pub end_flight: bool,
    pub main_power: i32,
    pub cmds_mode: i32,
    pub key_file: String,
}

impl Cockpit {
    /// Sitting cold and dark on the ramp with CMDS in STBY.
    pub fn ramp_start(key_file: &str) -> Self {
        Self {
            in_3d: true,
            on_ground: true,
            end_flight: false,
            main_power: 0,
            cmds_mode: CMDS_MODE_STANDBY,
            key_file: key_file.to_string(),
        }
    }

    /// Back in the UI after ending the flight.
    pub fn debriefing(key_file: &str) -> Self {
        Self {
            in_3d: false,
            on_ground: true,
            end_flight: true,
            main_power: 0,
            cmds_mode: 0,
            key_file: key_file.to_string(),
        }
    }

    pub fn regions(&self) -> MemoryRegions {
        let mut fd = vec![0u8; FLIGHT_DATA_SIZE];
        fd[FLIGHT_DATA_VERSION_OFFSET..FLIGHT_DATA_VERSION_OFFSET + 4]
            .copy_from_slice(&118i32.to_le_bytes());
        fd[MAIN_POWER_OFFSET..MAIN_POWER_OFFSET + 4].copy_from_slice(&self.main_power.to_le_bytes());

        let mut fd2 = vec![0u8; FLIGHT_DATA2_SIZE];
        fd2[CMDS_MODE_OFFSET..CMDS_MODE_OFFSET + 4].copy_from_slice(&self.cmds_mode.to_le_bytes());

        let mut ivd = vec![0u8; INTELLIVIBE_SIZE];
        ivd[END_FLIGHT_OFFSET] = u8::from(self.end_flight);
        ivd[IN_3D_OFFSET] = u8::from(self.in_3d);
        ivd[ON_GROUND_OFFSET] = u8::from(self.on_ground);

        MemoryRegions::new()
            .with(Region::FlightData, fd)
            .with(Region::FlightData2, fd2)
            .with(Region::Intellivibe, ivd)
            .with(Region::StringTable, string_area(&[(0, "Falcon BMS.exe"), (1, &self.key_file)]))
    }
}

/// Encodes a string table the way BMS lays it out.
pub fn string_area(entries: &[(u32, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, text) in entries {
        body.extend_from_slice(&id.to_le_bytes());
        body.extend_from_slice(&(text.len() as u32).to_le_bytes());
        body.extend_from_slice(text.as_bytes());
        body.push(0);
    }

    let mut data = Vec::with_capacity(12 + body.len());
    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&body);
    data
}
