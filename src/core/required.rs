// Copyright 2025 bakri (tidynest@proton.me)
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

//! Callbacks the randomizer needs bound to keyboard keys
//!
//! Switches that can be cycled (anti-collision light, HUD brightness) get a
//! single cycle callback. Switches that cannot (air source, fuel pump) list
//! one callback per position so a random position can be landed on by
//! pressing the positions in a shuffled order.

/// Callback BMS uses as a placeholder; lines naming it are never bindings.
pub const NO_OP_ACTION: &str = "SimDoNothing";

/// A fixed, versioned list of callbacks that must be bound
///
/// Order is significant: missing callbacks are reported and assigned keys
/// in this order, which keeps reconciliation output reproducible.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequiredActionSet {
    pub version: u32,
    pub actions: &'static [&'static str],
}

impl RequiredActionSet {
    /// The callback list shipped with this release.
    pub const STANDARD: RequiredActionSet = RequiredActionSet {
        version: 3,
        actions: STANDARD_ACTIONS,
    };

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(&action)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.iter().copied()
    }
}

impl Default for RequiredActionSet {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[rustfmt::skip]
const STANDARD_ACTIONS: &[&str] = &[
    // Multi-position switches, one callback per position
    "SimProbeHeatOn", "SimProbeHeatOff", "SimProbeHeatTest",
    "SimFuelPumpOff", "SimFuelPumpNorm", "SimFuelPumpAft", "SimFuelPumpFwd",
    "SimIFFMasterOff", "SimIFFMasterStby", "SimIFFMasterLow", "SimIFFMasterNorm", "SimIFFMasterEmerg",
    "SimBupUhfOff", "SimBupUhfMain", "SimBupUhfBoth",
    "SimBupUhfPreset", "SimBupUhfGuard", "SimBupUhfManual",
    "SimEWSModeOff", "SimEWSModeStby", "SimEWSModeMan", "SimEWSModeSemi", "SimEWSModeAuto", "SimEWSModeByp",
    "SimEWSProgOne", "SimEWSProgTwo", "SimEWSProgThree", "SimEWSProgFour",
    "SimRALTSTDBY", "SimRALTON", "SimRALTOFF",
    "SimAirSourceOff", "SimAirSourceNorm", "SimAirSourceDump", "SimAirSourceRam",
    "SimINSOff", "SimINSNorm", "SimINSNav",
    "SimFuelSwitchTest", "SimFuelSwitchNorm", "SimFuelSwitchResv", "SimFuelSwitchWingInt", "SimFuelSwitchWingExt", "SimFuelSwitchCenterExt",
    "SimExtlAntiColl",
    "SimAntiColModeOff", "SimAntiColMode1", "SimAntiColMode2", "SimAntiColMode3", "SimAntiColMode4", "SimAntiColModeA", "SimAntiColModeB", "SimAntiColModeC",
    "SimExtlSteady",
    "SimWingLightCycle",
    "SimFuselageLightCycle",
    "SimExtlPower",
    "SimExtlMasterOff", "SimExtlMasterCovertAll", "SimExtlMasterCovertAC", "SimExtlMasterCovertForm", "SimExtlMasterNorm",
    "SimEcmPowerOn", "SimEcmPowerOff",
    "SimXMTASPISToggle",
    // Toggles and cycles
    "SimEpuToggle",
    "SimLandingLightCycle",
    "SimParkingBrakeCycle",
    "SimLeftAPSwitch",
    "SimStepMasterArm",
    "SimDriftCO",
    "SimStepHSIMode",
    "SimRFSwitch",
    "SimAntennaSelectCycle",
    "SimAntiIceCycle",
    "SimHUDVelocity",
    "SimHUDRadar",
    "SimHUDBrightness",
    "SimReticleSwitch",
    "SimHUDDED",
    "SimAud1Com1",
    "SimAud1Com2",
    "SimDigitalBUP",
    "SimAltFlaps",
    "SimManualFlyup",
    "SimLEFLockSwitch",
    "SimTrimAPDisc",
    "SimToggleMasterFuel",
    "SimToggleAuxComMaster",
    "SimEngCont",
    "SimMPOToggle",
    "SimEWSRWRPower",
    "SimEWSJammerPower",
    "SimEWSMwsPower",
    "SimEWSChaffPower",
    "SimEWSFlarePower",
    "SimEWSO1Power",
    "SimEWSO2Power",
    "SimEwsJett",
    "SimGndJettEnable",
    "SimCATSwitch",
    "SimBrakeChannelToggle",
    "SimLaserArmToggle",
    "SimExtFuelTrans",
    // Avionics power
    "SimLeftHptPower",
    "SimRightHptPower",
    "SimFCRPower",
    "SimSMSPower",
    "SimFCCPower",
    "SimMFDPower",
    "SimUFCPower",
    "SimGPSPower",
    "SimDLPower",
    "SimMAPPower",
    "SimInhibitVMS",
];
