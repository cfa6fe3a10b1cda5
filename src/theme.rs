/// Data tables that give the game its flavor: enemy roster, power-ups and
/// all the text that floats around.  The engine never hard-codes any of it,
/// so a different theme file reskins the whole game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// 24-bit colour, stored as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

/// Colour of the player's own effects (death burst).
pub const PLAYER_COLOR: Rgb = Rgb(0x39ff14);
/// Burst when a bomb hits an unshielded player.
pub const HIT_COLOR: Rgb = Rgb(0xff3131);
/// Burst when the shield swallows a bomb.
pub const SHIELD_COLOR: Rgb = Rgb(0x00d4ff);
/// Burst and label when a bonus target is caught.
pub const BONUS_COLOR: Rgb = Rgb(0xffff00);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyType {
    pub id: String,
    pub label: String,
    pub color: Rgb,
    pub hp: u32,
    pub score: u32,
    pub speed: f32,
    pub sprite: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpId {
    /// Shoot cooldown divided by the rapid-fire divisor.
    RapidFire,
    /// Enemy contact and bombs no longer cost lives.
    Shield,
    /// 5-way fan instead of the twin shot.
    Spread,
    /// Doubles every score award.
    Score2x,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpType {
    pub id: PowerUpId,
    pub label: String,
    pub color: Rgb,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Ordered weakest to strongest; the last entry is the boss tier.
    pub enemies: Vec<EnemyType>,
    pub power_ups: Vec<PowerUpType>,
    pub enemy_quotes: Vec<String>,
    pub boss_quote: String,
    pub death_reasons: Vec<String>,
    pub game_over_quotes: Vec<String>,
    pub flavor_texts: Vec<String>,
    /// Prefix for the floating label when a bonus target is caught.
    pub bonus_label: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn enemy(id: &str, label: &str, color: u32, hp: u32, score: u32, speed: f32) -> EnemyType {
    EnemyType {
        id: id.to_string(),
        label: label.to_string(),
        color: Rgb(color),
        hp,
        score,
        speed,
        sprite: id.to_string(),
    }
}

fn power_up(id: PowerUpId, label: &str, color: u32, duration_ms: u64) -> PowerUpType {
    PowerUpType {
        id,
        label: label.to_string(),
        color: Rgb(color),
        duration_ms,
    }
}

impl Default for Theme {
    /// The "cyber squadron" tables.
    fn default() -> Self {
        Theme {
            enemies: vec![
                enemy("bug", "BUG", 0xff3131, 1, 100, 1.0),
                enemy("vuln", "VULN", 0xffb300, 2, 200, 0.8),
                enemy("delay", "DELAY", 0x00d4ff, 2, 150, 0.6),
                enemy("zeroday", "0-DAY", 0xbf5fff, 3, 400, 1.2),
                enemy("deadlock", "DEADLOCK", 0x39ff14, 4, 500, 0.4),
            ],
            power_ups: vec![
                power_up(PowerUpId::RapidFire, "RAPID FIRE", 0xff3131, 5000),
                power_up(PowerUpId::Shield, "FIREWALL", 0x00d4ff, 6000),
                power_up(PowerUpId::Spread, "SPREAD SHOT", 0xbf5fff, 5000),
                power_up(PowerUpId::Score2x, "2X SCORE", 0xffb300, 8000),
            ],
            enemy_quotes: strings(&[
                "> segfault",
                "null ptr deref",
                "off-by-one!",
                "heap overflow",
                "race condition!",
                "CVE-2024-????",
                "CVSS: 9.8 CRIT",
                "RCE via POST",
                "SQL injection!",
                "auth bypass!",
                "ETA: TBD",
                "blocked on PM",
                "in review...",
                "dependency hell",
                "waiting for signoff",
            ]),
            boss_quote: "\"System compromised.\"".to_string(),
            death_reasons: strings(&[
                "KILLED BY CRITICAL BUG",
                "PWNED BY ZERO-DAY",
                "CRUSHED BY DEADLINE",
                "VICTIM OF MEMORY LEAK",
                "TERMINATED BY DELAY",
                "DESTROYED BY DEPENDENCY",
                "EXPLOITED BY CVE",
            ]),
            game_over_quotes: strings(&[
                "\"Have you tried turning it off and on again?\"",
                "\"It works on my machine.\" - dev, somewhere",
                "\"We'll fix it post-launch.\" - someone, always",
                "\"Ship it. Security is a feature request.\"",
                "\"The bug is actually a feature.\" - classic",
                "\"PM has entered the chat. Help is coming.\"",
            ]),
            flavor_texts: strings(&[
                "CLEAR THE THREATS - PM IS ON THE WAY",
                "BUGS INCOMING. PM RESPONSE: PENDING.",
                "CVE DETECTED. AWAITING REQUIREMENTS.",
                "DELAY.EXE HAS ENTERED THE NETWORK",
                "WARNING: SCOPE UNCHANGED. BUG COUNT: INF",
                "PM ETA: UNKNOWN. THREATS: VERY KNOWN.",
                "PATCH TUESDAY EVERY DAY IN THIS HOUSE",
                "ZERO-DAY? MORE LIKE ZERO-REPLY.",
            ]),
            bonus_label: "PM FOUND!".to_string(),
        }
    }
}

impl Theme {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let theme: Theme = serde_json::from_str(&text)?;
        theme.validate()?;
        Ok(theme)
    }

    /// Every table the engine picks from must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.enemies.is_empty() {
            return Err(GameError::Config("theme has no enemy types".to_string()));
        }
        if self.power_ups.is_empty() {
            return Err(GameError::Config("theme has no power-ups".to_string()));
        }
        if self.enemy_quotes.is_empty() {
            return Err(GameError::Config("theme has no enemy quotes".to_string()));
        }
        Ok(())
    }

    pub fn tier_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn boss_tier(&self) -> usize {
        self.enemies.len().saturating_sub(1)
    }

    pub fn enemy_type(&self, tier: usize) -> &EnemyType {
        &self.enemies[tier.min(self.boss_tier())]
    }

    pub fn power_up(&self, id: PowerUpId) -> Option<&PowerUpType> {
        self.power_ups.iter().find(|p| p.id == id)
    }
}
