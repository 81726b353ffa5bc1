/// Keyboard to command translation, with hold emulation for plain terminals
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use wire3d_core::Command;

/// Longer than a typical autorepeat delay, so a held key is not dropped
/// between its first press and first repeat.
pub const DEFAULT_HOLD_TIMEOUT: Duration = Duration::from_millis(550);

/// Held controls that map to start/stop command pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    TurnLeft,
    TurnRight,
    Forward,
    Back,
}

impl Control {
    const ALL: [Control; 4] = [
        Control::TurnLeft,
        Control::TurnRight,
        Control::Forward,
        Control::Back,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn start(self) -> Command {
        match self {
            Control::TurnLeft => Command::TurnLeftStart,
            Control::TurnRight => Command::TurnRightStart,
            Control::Forward => Command::MoveForwardStart,
            Control::Back => Command::MoveBackStart,
        }
    }

    pub fn stop(self) -> Command {
        match self {
            Control::TurnLeft => Command::TurnLeftStop,
            Control::TurnRight => Command::TurnRightStop,
            Control::Forward => Command::MoveForwardStop,
            Control::Back => Command::MoveBackStop,
        }
    }
}

/// What a key means to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Hold(Control),
    Fire,
    Quit,
}

pub fn key_action(code: KeyCode) -> Option<KeyAction> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char(' ') => KeyAction::Fire,
        KeyCode::Char('a') | KeyCode::Left => KeyAction::Hold(Control::TurnLeft),
        KeyCode::Char('d') | KeyCode::Right => KeyAction::Hold(Control::TurnRight),
        KeyCode::Char('w') | KeyCode::Up => KeyAction::Hold(Control::Forward),
        KeyCode::Char('s') | KeyCode::Down => KeyAction::Hold(Control::Back),
        _ => return None,
    };
    Some(action)
}

/// Turns key events into edge-triggered commands.
///
/// With `release_events` the terminal reports key-up and it is used directly.
/// Otherwise a control counts as released once no press or repeat has been
/// seen for `hold_timeout`.
pub struct KeyTracker {
    release_events: bool,
    hold_timeout: Duration,
    held: [Option<Instant>; 4],
}

impl KeyTracker {
    pub fn new(release_events: bool, hold_timeout: Duration) -> Self {
        Self {
            release_events,
            hold_timeout,
            held: [None; 4],
        }
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held[control.index()].is_some()
    }

    /// Translate one key event; `quit` is set for the quit key.
    pub fn handle(&mut self, event: KeyEvent, now: Instant, quit: &mut bool) -> Option<Command> {
        match (key_action(event.code)?, event.kind) {
            (KeyAction::Quit, KeyEventKind::Press) => {
                *quit = true;
                None
            }
            (KeyAction::Fire, KeyEventKind::Press) => Some(Command::Fire),
            (KeyAction::Hold(control), KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.press(control, now)
            }
            (KeyAction::Hold(control), KeyEventKind::Release) => self.release(control),
            _ => None,
        }
    }

    fn press(&mut self, control: Control, now: Instant) -> Option<Command> {
        let previous = self.held[control.index()].replace(now);
        previous.is_none().then(|| control.start())
    }

    fn release(&mut self, control: Control) -> Option<Command> {
        self.held[control.index()].take().map(|_| control.stop())
    }

    /// Stop commands for holds that have gone quiet
    pub fn expire(&mut self, now: Instant) -> Vec<Command> {
        if self.release_events {
            return Vec::new();
        }

        let mut stops = Vec::new();
        for control in Control::ALL {
            let slot = &mut self.held[control.index()];
            if let Some(last) = *slot {
                if now.duration_since(last) >= self.hold_timeout {
                    *slot = None;
                    stops.push(control.stop());
                }
            }
        }
        stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_press_then_release() {
        let mut tracker = KeyTracker::new(true, DEFAULT_HOLD_TIMEOUT);
        let mut quit = false;
        let now = Instant::now();

        let start = tracker.handle(key(KeyCode::Left, KeyEventKind::Press), now, &mut quit);
        assert_eq!(start, Some(Command::TurnLeftStart));
        let repeat = tracker.handle(key(KeyCode::Left, KeyEventKind::Repeat), now, &mut quit);
        assert_eq!(repeat, None);

        // Release reporting terminals never time out
        assert!(tracker.expire(now + Duration::from_secs(5)).is_empty());

        let stop = tracker.handle(key(KeyCode::Left, KeyEventKind::Release), now, &mut quit);
        assert_eq!(stop, Some(Command::TurnLeftStop));
        assert!(!quit);
    }

    #[test]
    fn test_hold_expires_without_release_events() {
        let mut tracker = KeyTracker::new(false, Duration::from_millis(100));
        let mut quit = false;
        let t0 = Instant::now();

        tracker.handle(key(KeyCode::Char('w'), KeyEventKind::Press), t0, &mut quit);
        // Autorepeat keeps the hold alive
        let t1 = t0 + Duration::from_millis(80);
        tracker.handle(key(KeyCode::Char('w'), KeyEventKind::Press), t1, &mut quit);
        assert!(tracker.expire(t0 + Duration::from_millis(150)).is_empty());
        assert!(tracker.is_held(Control::Forward));

        let stops = tracker.expire(t1 + Duration::from_millis(100));
        assert_eq!(stops, vec![Command::MoveForwardStop]);
        assert!(!tracker.is_held(Control::Forward));
    }

    #[test]
    fn test_fire_and_quit() {
        let mut tracker = KeyTracker::new(false, DEFAULT_HOLD_TIMEOUT);
        let mut quit = false;
        let now = Instant::now();

        let fire = tracker.handle(key(KeyCode::Char(' '), KeyEventKind::Press), now, &mut quit);
        assert_eq!(fire, Some(Command::Fire));
        assert!(tracker
            .handle(key(KeyCode::Char('x'), KeyEventKind::Press), now, &mut quit)
            .is_none());

        tracker.handle(key(KeyCode::Esc, KeyEventKind::Press), now, &mut quit);
        assert!(quit);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_action(KeyCode::Char('d')), Some(KeyAction::Hold(Control::TurnRight)));
        assert_eq!(key_action(KeyCode::Down), Some(KeyAction::Hold(Control::Back)));
        assert_eq!(key_action(KeyCode::Char('q')), Some(KeyAction::Quit));
        assert_eq!(key_action(KeyCode::Enter), None);
    }
}
