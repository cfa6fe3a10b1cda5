/// Parallax backdrop: a pool of twinkling stars plus a stream of dark
/// building silhouettes sliding down the field.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::theme::Rgb;

const BUILDING_COLORS: [Rgb; 4] = [Rgb(0x0a1a0a), Rgb(0x0d1a2a), Rgb(0x1a0d1a), Rgb(0x1a1a0d)];
const INITIAL_BUILDINGS: usize = 10;
/// Buildings are pruned once this far below the bottom edge.
const PRUNE_MARGIN: f32 = 100.0;

#[derive(Clone, Debug)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub bright: f32,
}

#[derive(Clone, Debug)]
pub struct Building {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub speed: f32,
    pub color: Rgb,
}

#[derive(Clone, Debug)]
pub struct Background {
    pub stars: Vec<Star>,
    pub buildings: Vec<Building>,
    building_timer: u32,
    spawn_ticks: u32,
    width: f32,
    height: f32,
    top: f32,
}

impl Background {
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let mut bg = Background {
            stars: Vec::with_capacity(config.star_count),
            buildings: Vec::new(),
            building_timer: 0,
            spawn_ticks: config.building_spawn_ticks,
            width: config.width,
            height: config.height,
            top: config.hud_height,
        };
        for _ in 0..config.star_count {
            bg.stars.push(Star {
                x: rng.gen_range(0.0..bg.width),
                y: rng.gen_range(bg.top..bg.height),
                size: rng.gen_range(0.5..2.0),
                speed: rng.gen_range(0.3..1.2),
                bright: rng.gen_range(0.3..1.0),
            });
        }
        for _ in 0..INITIAL_BUILDINGS {
            bg.spawn_building(rng);
        }
        bg
    }

    fn spawn_building(&mut self, rng: &mut impl Rng) {
        let w = rng.gen_range(20..=60) as f32;
        self.buildings.push(Building {
            x: rng.gen_range(0.0..(self.width - w).max(1.0)),
            y: self.top - rng.gen_range(30..=90) as f32,
            w,
            h: rng.gen_range(30..=90) as f32,
            speed: rng.gen_range(0.4..0.9),
            color: *BUILDING_COLORS.choose(rng).unwrap_or(&BUILDING_COLORS[0]),
        });
    }

    /// Scroll both layers by `speed` times their own rate.
    pub fn update(&mut self, speed: f32, rng: &mut impl Rng) {
        for star in &mut self.stars {
            star.y += star.speed * speed;
            if star.y > self.height {
                star.y = self.top;
                star.x = rng.gen_range(0.0..self.width);
            }
        }

        let limit = self.height + PRUNE_MARGIN;
        self.buildings.retain_mut(|b| {
            b.y += b.speed * speed;
            b.y < limit
        });

        self.building_timer += 1;
        if self.building_timer > self.spawn_ticks {
            self.spawn_building(rng);
            self.building_timer = 0;
        }
    }
}
