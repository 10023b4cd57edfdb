// Discrete camera commands and their keyboard bindings

use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveForward,
    MoveBack,
    RotateLeft,
    RotateRight,
}

impl Command {
    /// W/S move, A/D turn. Anything else is not a camera command.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW => Some(Command::MoveForward),
            KeyCode::KeyS => Some(Command::MoveBack),
            KeyCode::KeyA => Some(Command::RotateLeft),
            KeyCode::KeyD => Some(Command::RotateRight),
            _ => None,
        }
    }
}
