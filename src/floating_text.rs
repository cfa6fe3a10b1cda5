/// Score callouts and labels that drift upward and fade.

use crate::theme::Rgb;

#[derive(Clone, Debug)]
pub struct FloatingText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub color: Rgb,
    pub life: u32,
    pub max_life: u32,
    /// Large style: lives longer and rises faster.
    pub big: bool,
}

impl FloatingText {
    pub fn new(text: impl Into<String>, x: f32, y: f32, color: Rgb, big: bool) -> Self {
        let life = if big { 90 } else { 70 };
        FloatingText {
            text: text.into(),
            x,
            y,
            vy: if big { -1.8 } else { -1.4 },
            color,
            life,
            max_life: life,
            big,
        }
    }

    pub fn update(&mut self) {
        self.y += self.vy;
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool {
        self.life == 0
    }

    pub fn alpha(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }
}

pub fn update_floats(floats: &mut Vec<FloatingText>) {
    floats.retain_mut(|f| {
        f.update();
        !f.is_dead()
    });
}
