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

//! BMS string table decoding
//!
//! Layout of `FalconSharedMemoryAreaString`, all words little-endian `u32`:
//!
//! ```text
//! version | count | data_size | { id | length | bytes[length] | NUL } * count
//! ```
//!
//! Decoding stops after exactly `count` entries. The rest of the region
//! is ignored.

use nom::{
    bytes::complete::take, combinator::map_res, multi::count, number::complete::le_u32, IResult,
    Parser,
};

use crate::telemetry::{Region, TelemetryError};

macro_rules! string_identifiers {
    ($($name:ident = $id:literal),* $(,)?) => {
        /// Identifier of a string table entry
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum StringIdentifier {
            $($name,)*
            /// An identifier newer than this build knows about
            Unknown(u32),
        }

        impl StringIdentifier {
            pub fn from_id(id: u32) -> Self {
                match id {
                    $($id => StringIdentifier::$name,)*
                    other => StringIdentifier::Unknown(other),
                }
            }

        }
    };
}

string_identifiers! {
    BmsExe = 0,
    KeyFile = 1,
    BmsBasedir = 2,
    BmsBinDirectory = 3,
    BmsDataDirectory = 4,
    BmsUIArtDirectory = 5,
    BmsUserDirectory = 6,
    BmsAcmiDirectory = 7,
    BmsBriefingsDirectory = 8,
    BmsConfigDirectory = 9,
    BmsLogsDirectory = 10,
    BmsPatchDirectory = 11,
    BmsPictureDirectory = 12,
    ThrName = 13,
    ThrCampaigndir = 14,
    ThrTerraindir = 15,
    ThrArtdir = 16,
    ThrMoviedir = 17,
    ThrUisounddir = 18,
    ThrObjectdir = 19,
    Thr3ddatadir = 20,
    ThrMisctexdir = 21,
    ThrSounddir = 22,
    ThrTacrefdir = 23,
    ThrSplashdir = 24,
    ThrCockpitdir = 25,
    ThrSimdatadir = 26,
    ThrSubtitlesdir = 27,
    ThrTacrefpicsdir = 28,
    AcName = 29,
    AcNCTR = 30,
    ButtonsFile = 31,
    CockpitFile = 32,
    NavPoint = 33,
    ThrTerrdatadir = 34,
}

/// Decoded string table
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringTable {
    pub version: u32,
    pub data_size: u32,
    entries: Vec<(StringIdentifier, String)>,
}

impl StringTable {
    /// Decodes a copy of the string region.
    ///
    /// # Errors
    ///
    /// `RegionMalformed` if the buffer ends before `count` entries have
    /// been read or an entry is not valid UTF-8.
    pub fn decode(data: &[u8]) -> Result<Self, TelemetryError> {
        table(data)
            .map(|(_, table)| table)
            .map_err(|e| TelemetryError::malformed(Region::StringTable, e.to_string()))
    }

    pub fn entries(&self) -> &[(StringIdentifier, String)] {
        &self.entries
    }

    /// First entry with the given identifier.
    pub fn get(&self, id: StringIdentifier) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, value)| value.as_str())
    }

    /// Path of the key file BMS is currently using, if it published one.
    pub fn key_file(&self) -> Option<&str> {
        self.get(StringIdentifier::KeyFile)
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

fn table(input: &[u8]) -> IResult<&[u8], StringTable> {
    let (input, version) = le_u32(input)?;
    let (input, n) = le_u32(input)?;
    let (input, data_size) = le_u32(input)?;
    let (input, entries) = count(entry, n as usize).parse(input)?;

    Ok((
        input,
        StringTable {
            version,
            data_size,
            entries,
        },
    ))
}

fn entry(input: &[u8]) -> IResult<&[u8], (StringIdentifier, String)> {
    let (input, id) = le_u32(input)?;
    let (input, len) = le_u32(input)?;
    let (input, text) = map_res(take(len), |bytes: &[u8]| std::str::from_utf8(bytes)).parse(input)?;
    let (input, _nul) = take(1usize).parse(input)?;

    Ok((
        input,
        (
            StringIdentifier::from_id(id),
            text.trim_end_matches('\0').to_string(),
        ),
    ))
}
