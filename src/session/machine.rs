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

//! Two-state session latch
//!
//! ```text
//!            in 3D, on ground, power off, CMDS STBY
//!   Armed ─────────────────────────────────────────▶ Triggered
//!     ▲                                                  │
//!     └──────────── out of 3D, flight ended ◀────────────┘
//! ```
//!
//! The trigger action runs before the state changes. If it fails the
//! latch stays `Armed` and the error is returned to the caller.

use std::fmt;

use crate::telemetry::TelemetrySnapshot;

/// Session latch state
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SessionState {
    /// Waiting for a cold ramp start
    #[default]
    Armed,
    /// Randomized this session; waiting for the flight to end
    Triggered,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Armed => write!(f, "armed"),
            SessionState::Triggered => write!(f, "triggered"),
        }
    }
}

/// What one step did
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Unchanged,
    /// Armed → Triggered; the trigger action ran
    Fired,
    /// Triggered → Armed
    Rearmed,
}

/// Cold and dark on the ground, in the pit, CMDS in STBY.
pub fn trigger_condition(snapshot: &TelemetrySnapshot) -> bool {
    snapshot.in_3d
        && snapshot.on_ground
        && !snapshot.main_power_on
        && snapshot.cmds_in_standby()
}

/// Left 3D after the flight ended.
pub fn rearm_condition(snapshot: &TelemetrySnapshot) -> bool {
    !snapshot.in_3d && snapshot.end_flight
}

/// The session latch
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Back to `Armed`, for when the simulator goes away.
    pub fn reset(&mut self) {
        self.state = SessionState::Armed;
    }

    /// Advances the latch by one tick.
    ///
    /// A tick without a snapshot changes nothing. `on_trigger` runs at most
    /// once, only on the Armed → Triggered edge.
    pub fn step<E>(
        &mut self,
        snapshot: Option<&TelemetrySnapshot>,
        on_trigger: impl FnOnce() -> Result<(), E>,
    ) -> Result<Transition, E> {
        let Some(snapshot) = snapshot else {
            return Ok(Transition::Unchanged);
        };

        match self.state {
            SessionState::Armed if trigger_condition(snapshot) => {
                on_trigger()?;
                self.state = SessionState::Triggered;
                Ok(Transition::Fired)
            }
            SessionState::Triggered if rearm_condition(snapshot) => {
                self.state = SessionState::Armed;
                Ok(Transition::Rearmed)
            }
            _ => Ok(Transition::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn snapshot(
        in_3d: bool,
        on_ground: bool,
        main_power_on: bool,
        system_mode_code: i32,
        end_flight: bool,
    ) -> TelemetrySnapshot {
        TelemetrySnapshot {
            in_3d,
            on_ground,
            end_flight,
            main_power_on,
            system_mode_code,
            active_config_path: "key".to_string(),
        }
    }

    fn all_snapshots() -> Vec<TelemetrySnapshot> {
        let mut out = Vec::new();
        for bits in 0..32u8 {
            for mode in [0, 1, 2] {
                out.push(snapshot(
                    bits & 1 != 0,
                    bits & 2 != 0,
                    bits & 4 != 0,
                    mode,
                    bits & 8 != 0 || bits & 16 != 0,
                ));
            }
        }
        out
    }

    #[test]
    fn test_trigger_only_on_exact_condition() {
        for snap in all_snapshots() {
            let mut machine = SessionMachine::new();
            let mut fired = 0;

            let transition = machine
                .step::<Infallible>(Some(&snap), || {
                    fired += 1;
                    Ok(())
                })
                .unwrap();

            let expected = snap.in_3d
                && snap.on_ground
                && !snap.main_power_on
                && snap.system_mode_code == 1;
            assert_eq!(transition == Transition::Fired, expected, "{:?}", snap);
            assert_eq!(fired, usize::from(expected));
        }
    }

    #[test]
    fn test_triggered_never_fires_again() {
        let cold = snapshot(true, true, false, 1, false);
        let mut machine = SessionMachine::new();
        machine.step::<Infallible>(Some(&cold), || Ok(())).unwrap();

        for _ in 0..5 {
            let transition = machine
                .step::<Infallible>(Some(&cold), || panic!("fired twice"))
                .unwrap();
            assert_eq!(transition, Transition::Unchanged);
        }
        assert_eq!(machine.state(), SessionState::Triggered);
    }

    #[test]
    fn test_rearm_only_on_exact_condition() {
        for snap in all_snapshots() {
            let mut machine = SessionMachine {
                state: SessionState::Triggered,
            };

            let transition = machine
                .step::<Infallible>(Some(&snap), || panic!("fired while triggered"))
                .unwrap();

            let expected = !snap.in_3d && snap.end_flight;
            assert_eq!(transition == Transition::Rearmed, expected, "{:?}", snap);
        }
    }

    #[test]
    fn test_rearm_does_not_fire_on_same_tick() {
        let mut machine = SessionMachine {
            state: SessionState::Triggered,
        };
        let debrief = snapshot(false, true, false, 1, true);

        let transition = machine
            .step::<Infallible>(Some(&debrief), || panic!("fired on rearm tick"))
            .unwrap();

        assert_eq!(transition, Transition::Rearmed);
        assert_eq!(machine.state(), SessionState::Armed);
    }

    #[test]
    fn test_failed_trigger_keeps_armed() {
        let cold = snapshot(true, true, false, 1, false);
        let mut machine = SessionMachine::new();

        let result = machine.step(Some(&cold), || Err("injector gone"));

        assert_eq!(result, Err("injector gone"));
        assert_eq!(machine.state(), SessionState::Armed);
    }

    #[test]
    fn test_no_snapshot_is_noop() {
        for state in [SessionState::Armed, SessionState::Triggered] {
            let mut machine = SessionMachine { state };
            let transition = machine
                .step::<Infallible>(None, || panic!("fired without telemetry"))
                .unwrap();

            assert_eq!(transition, Transition::Unchanged);
            assert_eq!(machine.state(), state);
        }
    }

    #[test]
    fn test_full_session_cycle() {
        let mut machine = SessionMachine::new();
        let mut fired = 0;
        let ticks = [
            snapshot(false, false, false, 0, false), // UI
            snapshot(true, true, false, 1, false),   // ramp, cold
            snapshot(true, true, true, 1, false),    // power on
            snapshot(true, false, true, 2, false),   // airborne
            snapshot(false, true, false, 0, true),   // debrief
            snapshot(true, true, false, 1, false),   // next ramp start
        ];

        for tick in &ticks {
            machine
                .step::<Infallible>(Some(tick), || {
                    fired += 1;
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(fired, 2);
        assert_eq!(machine.state(), SessionState::Triggered);
    }
}
