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

//! Input module tests
//!
//! Randomization runs against a recording injector with a seeded RNG and
//! no hold delay, so every test is deterministic and instant.

use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

use crate::{
    core::{Binding, KeyCode, KeyFile, Modifier, RequiredActionSet, ScanCode},
    input::{
        injector::{ALT_SCANCODE, CTRL_SCANCODE, SHIFT_SCANCODE},
        InjectError, InjectorMode, KeyEvent, KeyInjector, KeyboardInjector, Randomizer,
        RecordingInjector,
    },
};

use KeyEvent::{Press, Release};

const REQUIRED: RequiredActionSet = RequiredActionSet {
    version: 1,
    actions: &["SimEpuToggle", "SimLeftAPSwitch", "SimHUDBrtUp", "SimAirSourceOff"],
};

/// Helper: randomizer over a recording injector with a fixed seed
fn recording_randomizer(seed: u64) -> Randomizer<RecordingInjector, StdRng> {
    Randomizer::with_rng(RecordingInjector::new(), REQUIRED, StdRng::seed_from_u64(seed))
        .hold_delay(Duration::ZERO)
}

fn binding(action: &str, code: Option<u32>, modifier: Modifier) -> Binding {
    Binding {
        action: action.to_string(),
        input_code: code.map(ScanCode),
        modifier,
        description: String::new(),
    }
}

fn presses_of(events: &[KeyEvent], code: ScanCode) -> usize {
    events.iter().filter(|e| **e == Press(code)).count()
}

// ============================================================================
// Modifier composition
// ============================================================================

#[test]
fn test_plain_key() {
    let mut randomizer = recording_randomizer(1);
    randomizer
        .send_key(KeyCode::new(ScanCode(0x1E), Modifier::None))
        .unwrap();

    assert_eq!(
        randomizer.injector().events(),
        &[Press(ScanCode(0x1E)), Release(ScanCode(0x1E))]
    );
}

#[test]
fn test_ctrl_shift_alt_order() {
    let mut randomizer = recording_randomizer(1);
    let key = ScanCode(0x1E);
    randomizer
        .send_key(KeyCode::new(key, Modifier::CtrlShiftAlt))
        .unwrap();

    assert_eq!(
        randomizer.injector().events(),
        &[
            Press(CTRL_SCANCODE),
            Press(SHIFT_SCANCODE),
            Press(ALT_SCANCODE),
            Press(key),
            Release(key),
            Release(ALT_SCANCODE),
            Release(SHIFT_SCANCODE),
            Release(CTRL_SCANCODE),
        ]
    );
}

#[test]
fn test_alt_shift_is_replayed() {
    let mut randomizer = recording_randomizer(1);
    let key = ScanCode(0x12);
    randomizer
        .send_key(KeyCode::new(key, Modifier::AltShift))
        .unwrap();

    assert_eq!(
        randomizer.injector().events(),
        &[
            Press(ALT_SCANCODE),
            Press(SHIFT_SCANCODE),
            Press(key),
            Release(key),
            Release(SHIFT_SCANCODE),
            Release(ALT_SCANCODE),
        ]
    );
}

#[test]
fn test_every_modifier_is_balanced() {
    for digit in 0..=7u8 {
        let modifier = Modifier::from_digit(digit).unwrap();
        let mut randomizer = recording_randomizer(1);
        randomizer
            .send_key(KeyCode::new(ScanCode(0x30), modifier))
            .unwrap();

        let events = randomizer.injector().events();
        assert_eq!(events.len(), 2 * (modifier.keys().len() + 1));

        // Releases mirror presses
        let (presses, releases) = events.split_at(events.len() / 2);
        for (press, release) in presses.iter().zip(releases.iter().rev()) {
            match (press, release) {
                (Press(a), Release(b)) => assert_eq!(a, b),
                other => panic!("unbalanced events: {:?}", other),
            }
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_execute_presses_each_binding_one_to_six_times() {
    let bindings = vec![
        binding("SimEpuToggle", Some(0x2F), Modifier::Alt),
        binding("SimHUDBrtUp", Some(0x20), Modifier::None),
        binding("SimAirSourceOff", Some(0x21), Modifier::Ctrl),
    ];

    for seed in 0..20 {
        let mut randomizer = recording_randomizer(seed);
        let presses = randomizer.execute(&bindings).unwrap();

        let events = randomizer.injector().events();
        let mut total = 0;
        for code in [0x2F, 0x20, 0x21] {
            let n = presses_of(events, ScanCode(code));
            assert!((1..=6).contains(&n), "seed {}: {} presses", seed, n);
            total += n;
        }
        assert_eq!(presses, total);
    }
}

#[test]
fn test_execute_skips_unrequired_and_unassigned() {
    let bindings = vec![
        binding("SimEpuToggle", Some(0x2F), Modifier::None),
        binding("SimLeftAPSwitch", None, Modifier::None),
        binding("SimTriggerSecondDetent", Some(0x39), Modifier::None),
    ];

    let mut randomizer = recording_randomizer(7);
    randomizer.execute(&bindings).unwrap();

    let events = randomizer.injector().events();
    assert!(presses_of(events, ScanCode(0x2F)) >= 1);
    assert_eq!(presses_of(events, ScanCode(0x39)), 0);
    assert!(events
        .iter()
        .all(|e| matches!(e, Press(ScanCode(0x2F)) | Release(ScanCode(0x2F)))));
}

#[test]
fn test_execute_with_nothing_bound_sends_nothing() {
    let mut randomizer = recording_randomizer(3);
    assert_eq!(randomizer.execute(&[]).unwrap(), 0);
    assert!(randomizer.injector().events().is_empty());
}

#[test]
fn test_execute_is_reproducible_with_same_seed() {
    let bindings = vec![
        binding("SimEpuToggle", Some(0x2F), Modifier::None),
        binding("SimHUDBrtUp", Some(0x20), Modifier::Shift),
        binding("SimAirSourceOff", Some(0x21), Modifier::Ctrl),
        binding("SimLeftAPSwitch", Some(0x22), Modifier::CtrlAlt),
    ];

    let mut first = recording_randomizer(42);
    let mut second = recording_randomizer(42);
    first.execute(&bindings).unwrap();
    second.execute(&bindings).unwrap();

    assert_eq!(first.injector().events(), second.injector().events());
}

#[test]
fn test_execute_order_is_shuffled() {
    let bindings: Vec<Binding> = (0..4)
        .map(|i| binding(REQUIRED.actions[i], Some(0x10 + i as u32), Modifier::None))
        .collect();

    let first_key = |seed| {
        let mut randomizer = recording_randomizer(seed);
        randomizer.execute(&bindings).unwrap();
        randomizer.injector().events()[0]
    };

    let firsts: std::collections::HashSet<KeyEvent> = (0..50).map(first_key).collect();
    assert!(firsts.len() > 1, "first key never changes across seeds");
}

#[test]
fn test_injector_failure_stops_execution() {
    let bindings = vec![binding("SimEpuToggle", Some(0x2F), Modifier::CtrlShift)];
    let mut randomizer =
        Randomizer::with_rng(RecordingInjector::failing_after(1), REQUIRED, StdRng::seed_from_u64(0))
            .hold_delay(Duration::ZERO);

    let result = randomizer.execute(&bindings);

    assert!(matches!(result, Err(InjectError::SendFailed { .. })));
    assert_eq!(randomizer.injector().events().len(), 1);
}

#[test]
fn test_execute_from_parsed_key_file() {
    let key_file = KeyFile::parse(
        "\
SimEpuToggle -1 0 0x2F 4 0 0 1 \"EPU\"
SimLeftAPSwitch -1 0 0XFFFFFFFF 0 0 0 1 \"AP\"
SimHUDBrtUp -1 0 0x20 0 0 0 1 \"HUD\"
",
    );
    let bindings: Vec<Binding> = key_file.bindings().cloned().collect();

    let mut randomizer = recording_randomizer(11);
    randomizer.execute(&bindings).unwrap();

    let events = randomizer.injector().events();
    assert!(presses_of(events, ScanCode(0x2F)) >= 1);
    assert!(presses_of(events, ScanCode(0x20)) >= 1);
    // Alt goes down once per EPU press
    assert_eq!(
        presses_of(events, ALT_SCANCODE),
        presses_of(events, ScanCode(0x2F))
    );
}

// ============================================================================
// KeyboardInjector
// ============================================================================

#[test]
fn test_dryrun_never_fails_for_valid_codes() {
    let mut injector = KeyboardInjector::new(InjectorMode::DryRun);

    assert!(injector.press(ScanCode(0x1E)).is_ok());
    assert!(injector.release(ALT_SCANCODE).is_ok());
}

#[test]
fn test_dryrun_rejects_out_of_range_codes() {
    let mut injector = KeyboardInjector::new(InjectorMode::DryRun);

    assert!(matches!(
        injector.press(ScanCode(0x1_0000)),
        Err(InjectError::ScanCodeOutOfRange(_))
    ));
}

#[cfg(not(windows))]
#[test]
fn test_live_mode_unsupported_off_windows() {
    let mut injector = KeyboardInjector::new(InjectorMode::Live);

    assert!(matches!(
        injector.press(ScanCode(0x1E)),
        Err(InjectError::Unsupported)
    ));
}
