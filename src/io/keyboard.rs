//! Terminal keyboard input via crossterm.
//!
//! Terminals deliver key *events*, while the engine wants to *poll* each
//! key. [`KeyboardState`] bridges the two: it folds press / repeat /
//! release events into a per-key pressed table that implements
//! [`KeyPoller`].
//!
//! Most terminals only report presses. Key releases need the kitty
//! keyboard protocol ([`enable_key_releases`]). Without it a key counts as
//! held until `hold_timeout` seconds pass with no press or auto-repeat for
//! it; once a real release event is seen, the timeout is switched off.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::ExecutableCommand;
use std::io::stdout;

use crate::error::Result;
use crate::synth::{KeyLayout, KeyPoller};

/// What a key event meant to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Esc, `q` or Ctrl-C.
    Quit,
    /// A key of the layout changed state; carries its layout position.
    Key(usize),
    Ignored,
}

/// Ask the terminal to report key releases. Must run before entering the
/// alternate screen. Returns whether the terminal supports it.
pub fn enable_key_releases() -> Result<bool> {
    if !crossterm::terminal::supports_keyboard_enhancement()? {
        tracing::info!("terminal does not report key releases; using hold timeout");
        return Ok(false);
    }
    stdout().execute(PushKeyboardEnhancementFlags(
        KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
    ))?;
    Ok(true)
}

pub fn disable_key_releases() -> Result<()> {
    stdout().execute(PopKeyboardEnhancementFlags)?;
    Ok(())
}

pub fn is_quit(event: &KeyEvent) -> bool {
    match event.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardState {
    layout: KeyLayout,
    /// Time of the last press/repeat per layout position; `None` when up.
    last_seen: Vec<Option<f64>>,
    hold_timeout: f64,
    release_events: bool,
}

impl KeyboardState {
    pub fn new(layout: KeyLayout, hold_timeout: f64) -> Self {
        Self {
            last_seen: vec![None; layout.len()],
            layout,
            hold_timeout,
            release_events: false,
        }
    }

    /// Trust release events from the start instead of waiting to see one.
    pub fn with_release_events(mut self, enabled: bool) -> Self {
        self.release_events = enabled;
        self
    }

    /// Fold one terminal key event in at time `now`.
    pub fn handle(&mut self, event: &KeyEvent, now: f64) -> KeyAction {
        if event.kind != KeyEventKind::Release && is_quit(event) {
            return KeyAction::Quit;
        }

        let KeyCode::Char(c) = event.code else {
            return KeyAction::Ignored;
        };
        let Some(position) = self.layout.position(c) else {
            return KeyAction::Ignored;
        };

        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.last_seen[position] = Some(now),
            KeyEventKind::Release => {
                self.release_events = true;
                self.last_seen[position] = None;
            }
        }
        KeyAction::Key(position)
    }

    /// Release keys that have gone quiet for longer than the hold timeout.
    /// Does nothing once the terminal has shown it reports releases.
    pub fn expire(&mut self, now: f64) {
        if self.release_events {
            return;
        }
        for slot in &mut self.last_seen {
            if matches!(*slot, Some(seen) if now - seen > self.hold_timeout) {
                *slot = None;
            }
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    pub fn reports_releases(&self) -> bool {
        self.release_events
    }
}

impl KeyPoller for KeyboardState {
    fn is_pressed(&self, key: usize) -> bool {
        matches!(self.last_seen.get(key), Some(Some(_)))
    }
}
