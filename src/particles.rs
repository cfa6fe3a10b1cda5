/// Explosion particles: spawned in bursts, aged one tick at a time.

use std::f32::consts::PI;

use rand::Rng;

use crate::entities::Particle;
use crate::theme::Rgb;

pub const PARTICLE_LIFE: u32 = 30;
pub const PARTICLE_GRAVITY: f32 = 0.12;
const ANGLE_JITTER: f32 = 0.3;

/// Emit `count` particles at `(x, y)`, evenly spread around the circle with
/// a little angular jitter each.
pub fn spawn_explosion(
    particles: &mut Vec<Particle>,
    x: f32,
    y: f32,
    color: Rgb,
    count: usize,
    rng: &mut impl Rng,
) {
    particles.reserve(count);
    for i in 0..count {
        let angle = (2.0 * PI * i as f32) / count as f32 + rng.gen_range(-ANGLE_JITTER..ANGLE_JITTER);
        let speed = rng.gen_range(1.0..5.0);
        particles.push(Particle {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            size: rng.gen_range(2.0..6.0),
            color,
            life: PARTICLE_LIFE,
            max_life: PARTICLE_LIFE,
        });
    }
}

/// Move, apply gravity, age, and drop the dead ones.
pub fn update_particles(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| {
        p.x += p.vx;
        p.y += p.vy;
        p.vy += PARTICLE_GRAVITY;
        p.life = p.life.saturating_sub(1);
        p.life > 0
    });
}
