/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered dig (only fires on initial press)
///
/// Terminals that never report key release fall back to a hold timeout.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use crate::sim::runner::Command;

/// After this long without a Press/Repeat event, the key counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_DIG_L: &[KeyCode] = &[KeyCode::Char('z'), KeyCode::Char('Z')];
const KEYS_DIG_R: &[KeyCode] = &[KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// Requests that act on the session rather than the runner.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Meta {
    Quit,
    Restart,
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    ctrl_c: bool,

    /// Only true when the terminal is known to report releases.
    pub honor_release: bool,
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            ctrl_c: false,
            honor_release: false,
        }
    }

    /// Ask the terminal for key release events. Call after raw mode is on.
    pub fn enable_release_events(&mut self) {
        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            self.honor_release = execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        }
        log::debug!("key release events: {}", self.honor_release);
    }

    pub fn restore(&mut self) -> io::Result<()> {
        if self.honor_release {
            self.honor_release = false;
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        Ok(())
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key);
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            self.ctrl_c = true;
            return;
        }
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code).is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    fn any_active(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|&c| self.is_held(c) || self.was_pressed(c))
    }

    fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|&c| self.was_pressed(c))
    }

    /// Dig presses win over held movement keys.
    pub fn command(&self) -> Option<Command> {
        if self.any_pressed(KEYS_DIG_L) {
            Some(Command::DigLeft)
        } else if self.any_pressed(KEYS_DIG_R) {
            Some(Command::DigRight)
        } else if self.any_active(KEYS_UP) {
            Some(Command::Up)
        } else if self.any_active(KEYS_DOWN) {
            Some(Command::Down)
        } else if self.any_active(KEYS_LEFT) {
            Some(Command::Left)
        } else if self.any_active(KEYS_RIGHT) {
            Some(Command::Right)
        } else {
            None
        }
    }

    pub fn meta(&self) -> Option<Meta> {
        if self.ctrl_c || self.any_pressed(KEYS_QUIT) {
            Some(Meta::Quit)
        } else if self.any_pressed(KEYS_RESTART) {
            Some(Meta::Restart)
        } else {
            None
        }
    }
}
