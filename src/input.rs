//! Key bindings: crossterm key events to game commands

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use tetrad::Command;
use tetrad::settings::Settings;

/// Key bindings configuration - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, Command)>,
}

impl KeyMap {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        let groups = [
            (&keys.move_left, Command::MoveLeft),
            (&keys.move_right, Command::MoveRight),
            (&keys.move_down, Command::MoveDown),
            (&keys.rotate, Command::Rotate),
            (&keys.hard_drop, Command::HardDrop),
            (&keys.pause, Command::Pause),
            (&keys.quit, Command::Quit),
        ];

        let mut bindings = Vec::new();
        for (names, command) in groups {
            for name in names {
                match Self::parse_key(name) {
                    Some(code) => bindings.push((code, command)),
                    None => tracing::warn!(key = %name, ?command, "ignoring unknown key binding"),
                }
            }
        }
        Self { bindings }
    }

    /// The command bound to a key press, if any
    pub fn command_for(&self, key: KeyEvent) -> Option<Command> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        let code = normalize_key(key.code);
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, command)| command)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
