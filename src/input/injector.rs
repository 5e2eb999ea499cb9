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

//! Scancode-level key press and release

use std::io;
use thiserror::Error;
use tracing::debug;

use crate::core::{ModifierKey, ScanCode};

/// Left Ctrl.
pub const CTRL_SCANCODE: ScanCode = ScanCode(0x1D);
/// Left Shift.
pub const SHIFT_SCANCODE: ScanCode = ScanCode(0x2A);
/// Alt, sent as `0x38` with bit 11 set.
pub const ALT_SCANCODE: ScanCode = ScanCode(0x38 + 0x800);

/// Scancode sent for a modifier key.
pub fn modifier_scancode(key: ModifierKey) -> ScanCode {
    match key {
        ModifierKey::Ctrl => CTRL_SCANCODE,
        ModifierKey::Shift => SHIFT_SCANCODE,
        ModifierKey::Alt => ALT_SCANCODE,
    }
}

/// Errors raised while injecting key events.
///
/// Always fatal: a half-injected chord can leave modifiers held down.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Scancode does not fit the 16-bit field of a keyboard event.
    #[error("Scancode {0} is out of range for keyboard input")]
    ScanCodeOutOfRange(ScanCode),

    /// The OS refused the event.
    #[error("Failed to send key event for {scancode}: {source}")]
    SendFailed {
        scancode: ScanCode,
        #[source]
        source: io::Error,
    },

    /// Live injection was requested on a platform without it.
    #[error("Live key injection is only available on Windows")]
    Unsupported,
}

/// Capability to press and release a key by scancode.
pub trait KeyInjector {
    fn press(&mut self, scancode: ScanCode) -> Result<(), InjectError>;
    fn release(&mut self, scancode: ScanCode) -> Result<(), InjectError>;
}

/// Injector operation mode
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InjectorMode {
    /// Validation only - NEVER sends input
    DryRun,

    /// Sends events to whatever window has focus
    Live,
}

/// Injects scancode events through the OS input queue.
#[derive(Debug)]
pub struct KeyboardInjector {
    mode: InjectorMode,
}

impl KeyboardInjector {
    pub fn new(mode: InjectorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> InjectorMode {
        self.mode
    }

    fn send(&self, scancode: ScanCode, key_up: bool) -> Result<(), InjectError> {
        let wire = u16::try_from(scancode.0).map_err(|_| InjectError::ScanCodeOutOfRange(scancode))?;

        match self.mode {
            InjectorMode::DryRun => {
                debug!(%scancode, key_up, "[DryRun] Would send key event");
                Ok(())
            }
            InjectorMode::Live => send_scancode(scancode, wire, key_up),
        }
    }
}

impl KeyInjector for KeyboardInjector {
    fn press(&mut self, scancode: ScanCode) -> Result<(), InjectError> {
        self.send(scancode, false)
    }

    fn release(&mut self, scancode: ScanCode) -> Result<(), InjectError> {
        self.send(scancode, true)
    }
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn send_scancode(scancode: ScanCode, wire: u16, key_up: bool) -> Result<(), InjectError> {
    use std::mem;
    use winapi::um::winuser::{
        SendInput, INPUT, INPUT_KEYBOARD, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE,
    };

    let mut flags = KEYEVENTF_SCANCODE;
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }

    // SAFETY: INPUT is plain old data, so a zeroed value is valid. The
    // keyboard variant is fully written before the struct is handed over.
    unsafe {
        let mut input: INPUT = mem::zeroed();
        input.type_ = INPUT_KEYBOARD;
        let ki = input.u.ki_mut();
        ki.wVk = 0;
        ki.wScan = wire;
        ki.dwFlags = flags;
        ki.time = 0;
        ki.dwExtraInfo = 0;

        let sent = SendInput(1, &mut input, mem::size_of::<INPUT>() as i32);
        if sent == 1 {
            Ok(())
        } else {
            Err(InjectError::SendFailed {
                scancode,
                source: io::Error::last_os_error(),
            })
        }
    }
}

#[cfg(not(windows))]
fn send_scancode(_scancode: ScanCode, _wire: u16, _key_up: bool) -> Result<(), InjectError> {
    Err(InjectError::Unsupported)
}

/// A single injected event
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyEvent {
    Press(ScanCode),
    Release(ScanCode),
}

/// Records events instead of sending them.
///
/// Can be told to fail after a number of events, to exercise error paths.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    events: Vec<KeyEvent>,
    fail_after: Option<usize>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// An injector that accepts `n` events and fails every one after.
    pub fn failing_after(n: usize) -> Self {
        Self {
            events: Vec::new(),
            fail_after: Some(n),
        }
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    fn record(&mut self, event: KeyEvent, scancode: ScanCode) -> Result<(), InjectError> {
        if self.fail_after.is_some_and(|n| self.events.len() >= n) {
            return Err(InjectError::SendFailed {
                scancode,
                source: io::Error::other("injector closed"),
            });
        }
        self.events.push(event);
        Ok(())
    }
}

impl KeyInjector for RecordingInjector {
    fn press(&mut self, scancode: ScanCode) -> Result<(), InjectError> {
        self.record(KeyEvent::Press(scancode), scancode)
    }

    fn release(&mut self, scancode: ScanCode) -> Result<(), InjectError> {
        self.record(KeyEvent::Release(scancode), scancode)
    }
}
