/// Player input as the core sees it: held keys sampled every tick, plus
/// one-shot commands delivered as they happen.

/// Level-triggered: true for as long as the control is held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl InputState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn firing() -> Self {
        InputState {
            fire: true,
            ..Self::default()
        }
    }
}

/// Edge-triggered commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start a new game from the menu or the game-over screen.
    Start,
    TogglePause,
    ToggleMute,
    ReturnToMenu,
}
