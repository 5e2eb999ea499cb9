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

//! Session driver tests
//!
//! Drive whole ticks against in-memory telemetry, a real key file in a
//! temp directory and a recording injector.

use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::PathBuf, time::Duration};
use tempfile::TempDir;

use crate::{
    config::{ConfigError, Reconciler},
    core::{KeyFile, Keyspace, Modifier, RequiredActionSet, ScanCode},
    input::{KeyEvent, Randomizer, RecordingInjector},
    session::{SessionDriver, SessionError, SessionState, Tick, Transition},
    telemetry::{fixtures::Cockpit, MemoryRegions, Region},
};

const REQUIRED: RequiredActionSet = RequiredActionSet {
    version: 1,
    actions: &["SimEpuToggle", "SimLeftAPSwitch"],
};

const KEY_FILE: &str = "\
# Cockpit
SimEpuToggle -1 0 0x2F 4 0 0 1 \"EPU\"
SimLeftAPSwitch -1 0 0XFFFFFFFF 0 0 0 1 \"AP\"
";

type TestDriver = SessionDriver<MemoryRegions, RecordingInjector, StdRng>;

/// Helper: key file on disk plus a driver wired to it
fn setup(injector: RecordingInjector) -> (TempDir, PathBuf, TestDriver) {
    let temp_dir = TempDir::new().unwrap();
    let key_path = temp_dir.path().join("BMS - Full.key");
    fs::write(&key_path, KEY_FILE).unwrap();

    let randomizer = Randomizer::with_rng(injector, REQUIRED, StdRng::seed_from_u64(5))
        .hold_delay(Duration::ZERO);
    let driver = SessionDriver::new(
        MemoryRegions::new(),
        randomizer,
        Reconciler::new(REQUIRED, Keyspace::standard()),
    )
    .interval(Duration::ZERO);

    (temp_dir, key_path, driver)
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_not_running_when_nothing_published() {
    let (_dir, _path, mut driver) = setup(RecordingInjector::new());

    assert_eq!(driver.tick().unwrap(), Tick::NotRunning);
    assert_eq!(driver.state(), SessionState::Armed);
    assert!(driver.key_file().is_none());
}

#[test]
fn test_ramp_start_reconciles_and_fires() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();

    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Fired));
    assert_eq!(driver.state(), SessionState::Triggered);
    assert_eq!(driver.key_file(), Some(key_path.as_path()));

    // The unbound callback got a key on disk before the presses were sent
    let rewritten = KeyFile::parse(&fs::read_to_string(&key_path).unwrap());
    assert!(rewritten.missing_actions(&REQUIRED).is_empty());

    // Both callbacks were pressed, the new one on its generated key
    let events = driver.randomizer().injector().events();
    assert!(events.contains(&KeyEvent::Press(ScanCode(0x2F))));
    assert!(events.contains(&KeyEvent::Press(ScanCode(0x02))));
}

#[test]
fn test_no_key_file_waits_without_touching_state() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();
    driver.tick().unwrap();

    *driver.source_mut() = Cockpit::ramp_start("").regions();
    assert_eq!(driver.tick().unwrap(), Tick::NoKeyFile);
    assert_eq!(driver.state(), SessionState::Triggered);
}

#[test]
fn test_losing_bms_resets_to_armed() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();
    driver.tick().unwrap();
    assert_eq!(driver.state(), SessionState::Triggered);

    driver.source_mut().remove(Region::StringTable);
    assert_eq!(driver.tick().unwrap(), Tick::NotRunning);
    assert_eq!(driver.state(), SessionState::Armed);
}

#[test]
fn test_torn_string_table_keeps_latch() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    let path = path_str(&key_path).to_string();
    *driver.source_mut() = Cockpit::ramp_start(&path).regions();
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Fired));
    let after_first = driver.randomizer().injector().events().len();

    // Header claims nine entries, none follow
    let mut torn = Vec::new();
    torn.extend_from_slice(&2u32.to_le_bytes());
    torn.extend_from_slice(&9u32.to_le_bytes());
    driver.source_mut().insert(Region::StringTable, torn);

    assert_eq!(driver.tick().unwrap(), Tick::NoSnapshot);
    assert_eq!(driver.state(), SessionState::Triggered);

    // Still cold on the ramp: no second randomization
    *driver.source_mut() = Cockpit::ramp_start(&path).regions();
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Unchanged));
    assert_eq!(driver.randomizer().injector().events().len(), after_first);
}

#[test]
fn test_truncated_flight_record_is_noop() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();
    driver.source_mut().insert(Region::FlightData2, vec![0; 8]);

    assert_eq!(driver.tick().unwrap(), Tick::NoSnapshot);
    assert_eq!(driver.state(), SessionState::Armed);
    assert!(driver.randomizer().injector().events().is_empty());
}

#[test]
fn test_missing_flight_record_is_noop() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();
    driver.source_mut().remove(Region::Intellivibe);

    assert_eq!(driver.tick().unwrap(), Tick::NoSnapshot);
    assert_eq!(driver.state(), SessionState::Armed);
    assert!(driver.randomizer().injector().events().is_empty());
}

#[test]
fn test_full_session_cycle() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    let path = path_str(&key_path).to_string();

    *driver.source_mut() = Cockpit::ramp_start(&path).regions();
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Fired));
    let after_first = driver.randomizer().injector().events().len();

    // Still on the ramp: no second randomization
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Unchanged));
    assert_eq!(driver.randomizer().injector().events().len(), after_first);

    *driver.source_mut() = Cockpit::debriefing(&path).regions();
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Rearmed));

    *driver.source_mut() = Cockpit::ramp_start(&path).regions();
    assert_eq!(driver.tick().unwrap(), Tick::Stepped(Transition::Fired));
    assert!(driver.randomizer().injector().events().len() > after_first);
}

#[test]
fn test_same_path_is_not_reloaded() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());
    let mut cockpit = Cockpit::ramp_start(path_str(&key_path));
    cockpit.main_power = 1;
    *driver.source_mut() = cockpit.regions();

    driver.tick().unwrap();
    let loaded = driver.bindings().len();

    fs::write(&key_path, "# emptied by hand\n").unwrap();
    driver.tick().unwrap();

    assert_eq!(driver.bindings().len(), loaded);
}

#[test]
fn test_path_change_reconciles_new_file() {
    let (dir, key_path, mut driver) = setup(RecordingInjector::new());
    let mut cockpit = Cockpit::ramp_start(path_str(&key_path));
    cockpit.main_power = 1;
    *driver.source_mut() = cockpit.regions();
    driver.tick().unwrap();

    let other_path = dir.path().join("Other.key");
    fs::write(&other_path, "# nothing bound\n").unwrap();
    cockpit.key_file = path_str(&other_path).to_string();
    *driver.source_mut() = cockpit.regions();
    driver.tick().unwrap();

    assert_eq!(driver.key_file(), Some(other_path.as_path()));
    let rewritten = KeyFile::parse(&fs::read_to_string(&other_path).unwrap());
    assert!(rewritten.missing_actions(&REQUIRED).is_empty());
    assert!(dir.path().join("Other.key.bak").exists());
}

#[test]
fn test_missing_key_file_is_fatal() {
    let (dir, _key_path, mut driver) = setup(RecordingInjector::new());
    let missing = dir.path().join("gone.key");
    *driver.source_mut() = Cockpit::ramp_start(path_str(&missing)).regions();

    assert!(matches!(
        driver.tick(),
        Err(SessionError::Config(ConfigError::NotFound(_)))
    ));
}

#[test]
fn test_exhausted_keyspace_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let key_path = temp_dir.path().join("BMS - Full.key");
    fs::write(&key_path, KEY_FILE).unwrap();

    let randomizer = Randomizer::with_rng(RecordingInjector::new(), REQUIRED, StdRng::seed_from_u64(0))
        .hold_delay(Duration::ZERO);
    let keyspace = Keyspace::with_modifiers([ScanCode(0x2F)], [Modifier::Alt]);
    let mut driver = SessionDriver::new(
        Cockpit::ramp_start(path_str(&key_path)).regions(),
        randomizer,
        Reconciler::new(REQUIRED, keyspace),
    );

    assert!(matches!(
        driver.tick(),
        Err(SessionError::Config(ConfigError::KeyspaceExhausted(_)))
    ));
    assert_eq!(fs::read_to_string(&key_path).unwrap(), KEY_FILE);
    assert!(driver.randomizer().injector().events().is_empty());
}

#[test]
fn test_injector_failure_is_fatal_and_stays_armed() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::failing_after(0));
    *driver.source_mut() = Cockpit::ramp_start(path_str(&key_path)).regions();

    assert!(matches!(driver.tick(), Err(SessionError::Inject(_))));
    assert_eq!(driver.state(), SessionState::Armed);
}

#[test]
fn test_startup_key_file_is_reconciled() {
    let (_dir, key_path, mut driver) = setup(RecordingInjector::new());

    driver.load_key_file(&key_path).unwrap();

    assert_eq!(driver.key_file(), Some(key_path.as_path()));
    let rewritten = KeyFile::parse(&fs::read_to_string(&key_path).unwrap());
    assert!(rewritten.missing_actions(&REQUIRED).is_empty());
}
