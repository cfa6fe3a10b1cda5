/// HUD text, derived from the game on demand.

use crate::game::Game;

pub const LIFE_GLYPH: char = '♥';

/// Score as the HUD prints it: at least five digits.
pub fn pad_score(score: u32) -> String {
    format!("{score:05}")
}

pub fn pad_wave(wave: u32) -> String {
    format!("{wave:02}")
}

pub fn lives_glyphs(lives: u32) -> String {
    std::iter::repeat(LIFE_GLYPH).take(lives as usize).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    pub score: String,
    pub wave: String,
    pub lives: String,
    /// Labels of the active power-ups.
    pub power_ups: Vec<String>,
    /// The better of the stored high score and the running score.
    pub high_score: String,
}

impl Hud {
    pub fn from_game(game: &Game) -> Self {
        let power_ups = game
            .session()
            .map(|s| {
                s.power_ups
                    .active()
                    .filter_map(|id| game.theme().power_up(id))
                    .map(|p| p.label.clone())
                    .collect()
            })
            .unwrap_or_default();
        Hud {
            score: pad_score(game.score()),
            wave: pad_wave(game.wave()),
            lives: lives_glyphs(game.lives()),
            power_ups,
            high_score: pad_score(game.high_score().max(game.score())),
        }
    }
}
