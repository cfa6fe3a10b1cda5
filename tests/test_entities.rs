mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use squadron_shooter::background::Background;
use squadron_shooter::config::GameConfig;
use squadron_shooter::entities::{MovementPattern, PowerUps};
use squadron_shooter::floating_text::{update_floats, FloatingText};
use squadron_shooter::geometry::{overlaps, Rect};
use squadron_shooter::highscore::HighScoreFile;
use squadron_shooter::hud::{lives_glyphs, pad_score, pad_wave};
use squadron_shooter::particles::{spawn_explosion, update_particles, PARTICLE_GRAVITY, PARTICLE_LIFE};
use squadron_shooter::theme::{PowerUpId, Rgb, Theme};
use squadron_shooter::wave::{boss_hp, build_wave, grid_size, has_boss, tier_for};

use common::{ms, seeded_rng};

// ── overlaps ──────────────────────────────────────────────────────────────────

#[test]
fn overlap_is_symmetric() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(overlaps(&a, &b));
    assert!(overlaps(&b, &a));
}

#[test]
fn separated_rects_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(30.0, 0.0, 10.0, 10.0);
    assert!(!overlaps(&a, &b));
    assert!(!overlaps(&b, &a));
}

#[test]
fn touching_edges_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let side = Rect::new(10.0, 0.0, 10.0, 10.0);
    let below = Rect::new(0.0, 10.0, 10.0, 10.0);
    assert!(!overlaps(&a, &side));
    assert!(!overlaps(&a, &below));
}

#[test]
fn zero_area_rect_never_overlaps() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let line = Rect::new(5.0, 0.0, 0.0, 10.0);
    assert!(!overlaps(&a, &line));
    assert!(!overlaps(&line, &a));
}

#[test]
fn contained_rect_overlaps() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    let inner = Rect::new(40.0, 40.0, 3.0, 12.0);
    assert!(overlaps(&outer, &inner));
}

// ── particles ─────────────────────────────────────────────────────────────────

#[test]
fn explosion_spawns_requested_count_at_full_life() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    spawn_explosion(&mut particles, 100.0, 50.0, Rgb(0xff0000), 12, &mut rng);
    assert_eq!(particles.len(), 12);
    for p in &particles {
        assert_eq!(p.life, PARTICLE_LIFE);
        assert_eq!(p.max_life, PARTICLE_LIFE);
        assert_eq!((p.x, p.y), (100.0, 50.0));
        assert!(p.size >= 2.0 && p.size < 6.0);
    }
}

#[test]
fn particles_all_die_after_their_lifetime() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    spawn_explosion(&mut particles, 0.0, 0.0, Rgb::WHITE, 12, &mut rng);
    for _ in 0..PARTICLE_LIFE - 1 {
        update_particles(&mut particles);
    }
    assert_eq!(particles.len(), 12);
    update_particles(&mut particles);
    assert!(particles.is_empty());
}

#[test]
fn particle_count_never_grows() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    spawn_explosion(&mut particles, 0.0, 0.0, Rgb::WHITE, 20, &mut rng);
    let mut last = particles.len();
    for _ in 0..40 {
        update_particles(&mut particles);
        assert!(particles.len() <= last);
        last = particles.len();
    }
}

#[test]
fn particle_falls_under_gravity() {
    let mut rng = seeded_rng();
    let mut particles = Vec::new();
    spawn_explosion(&mut particles, 0.0, 0.0, Rgb::WHITE, 1, &mut rng);
    let vy = particles[0].vy;
    update_particles(&mut particles);
    assert_relative_eq!(particles[0].vy, vy + PARTICLE_GRAVITY);
    assert_relative_eq!(particles[0].y, vy);
}

#[test]
fn updating_no_particles_is_fine() {
    let mut particles = Vec::new();
    update_particles(&mut particles);
    assert!(particles.is_empty());
}

// ── floating text ─────────────────────────────────────────────────────────────

#[test]
fn big_text_lives_ninety_ticks_and_rises() {
    let mut floats = vec![FloatingText::new("+100", 10.0, 200.0, Rgb::WHITE, true)];
    update_floats(&mut floats);
    assert_abs_diff_eq!(floats[0].y, 198.2, epsilon = 1e-4);
    for _ in 0..88 {
        update_floats(&mut floats);
    }
    assert_eq!(floats.len(), 1);
    update_floats(&mut floats);
    assert!(floats.is_empty());
}

#[test]
fn small_text_is_shorter_lived() {
    let text = FloatingText::new("hi", 0.0, 0.0, Rgb::WHITE, false);
    assert_eq!(text.life, 70);
    assert_relative_eq!(text.vy, -1.4);
    assert_relative_eq!(text.alpha(), 1.0);
}

// ── power-ups ─────────────────────────────────────────────────────────────────

#[test]
fn activating_twice_keeps_one_entry_with_later_expiry() {
    let mut p = PowerUps::default();
    p.activate(PowerUpId::Shield, ms(6000));
    p.activate(PowerUpId::Shield, ms(9000));
    assert_eq!(p.len(), 1);
    assert_eq!(p.expires_at(PowerUpId::Shield), Some(ms(9000)));
}

#[test]
fn score_multiplier_follows_score2x() {
    let mut p = PowerUps::default();
    assert_eq!(p.score_multiplier(), 1);
    p.activate(PowerUpId::Score2x, ms(8000));
    assert_eq!(p.score_multiplier(), 2);
    p.deactivate(PowerUpId::Score2x);
    assert_eq!(p.score_multiplier(), 1);
    assert!(p.is_empty());
}

#[test]
fn power_ups_are_independent() {
    let mut p = PowerUps::default();
    p.activate(PowerUpId::Spread, ms(5000));
    p.activate(PowerUpId::RapidFire, ms(5000));
    p.deactivate(PowerUpId::Spread);
    assert!(p.is_active(PowerUpId::RapidFire));
    assert!(!p.is_active(PowerUpId::Spread));
}

// ── build_wave ────────────────────────────────────────────────────────────────

#[test]
fn grid_grows_with_wave_number() {
    let (theme, cfg) = (Theme::default(), GameConfig::default());
    let mut rng = seeded_rng();
    let mut last = 0;
    for wave in 1..=10 {
        let regular = build_wave(wave, &theme, &cfg, &mut rng)
            .iter()
            .filter(|e| !e.is_boss)
            .count();
        let (rows, cols) = grid_size(wave);
        assert_eq!(regular, (rows * cols) as usize);
        assert!(regular >= last, "wave {wave} shrank");
        last = regular;
    }
}

#[test]
fn first_and_tenth_wave_grid_sizes() {
    assert_eq!(grid_size(1), (2, 4));
    assert_eq!(grid_size(10), (5, 6));
    assert_eq!(grid_size(25), grid_size(10));
}

#[test]
fn boss_on_every_fifth_wave() {
    let (theme, cfg) = (Theme::default(), GameConfig::default());
    let mut rng = seeded_rng();
    for wave in 1..=15 {
        let enemies = build_wave(wave, &theme, &cfg, &mut rng);
        let bosses: Vec<_> = enemies.iter().filter(|e| e.is_boss).collect();
        if wave % 5 == 0 {
            assert!(has_boss(wave));
            assert_eq!(bosses.len(), 1);
            assert_eq!(bosses[0].hp, 20 + 2 * wave);
            assert_eq!(bosses[0].pattern, MovementPattern::Boss);
            assert_eq!(bosses[0].tier, theme.boss_tier());
        } else {
            assert!(bosses.is_empty(), "unexpected boss in wave {wave}");
        }
    }
    assert_eq!(boss_hp(15), 50);
}

#[test]
fn wave_one_is_all_weakest_tier() {
    let (theme, cfg) = (Theme::default(), GameConfig::default());
    let enemies = build_wave(1, &theme, &cfg, &mut seeded_rng());
    assert_eq!(enemies.len(), 8);
    for e in &enemies {
        assert_eq!(e.tier, 0);
        assert_eq!(e.hp, 1);
        assert!(e.y < 0.0, "enemies enter from above the field");
        assert!(e.alive);
    }
}

#[test]
fn tier_is_clamped_to_the_table() {
    assert_eq!(tier_for(0, 1, 5), 0);
    assert_eq!(tier_for(4, 10, 5), 4);
    assert_eq!(tier_for(9, 50, 5), 4);
    assert_eq!(tier_for(3, 10, 2), 1);
}

#[test]
fn hp_and_bomb_cadence_scale_with_difficulty() {
    let (theme, cfg) = (Theme::default(), GameConfig::default());
    let enemies = build_wave(8, &theme, &cfg, &mut seeded_rng());
    for e in enemies.iter().filter(|e| !e.is_boss) {
        assert_eq!(e.hp, theme.enemy_type(e.tier).hp + 2);
        assert_eq!(e.max_hp, e.hp);
        assert_eq!(e.bomb_cooldown, 180);
        let speed = theme.enemy_type(e.tier).speed;
        assert_relative_eq!(e.vx.abs(), speed);
        assert_relative_eq!(e.vy, speed * 0.5);
    }
}

#[test]
fn bomb_cooldown_bottoms_out() {
    let (theme, cfg) = (Theme::default(), GameConfig::default());
    let enemies = build_wave(40, &theme, &cfg, &mut seeded_rng());
    assert!(enemies.iter().filter(|e| !e.is_boss).all(|e| e.bomb_cooldown == 150));
}

// ── background ────────────────────────────────────────────────────────────────

#[test]
fn background_starts_with_stars_and_buildings() {
    let cfg = GameConfig::default();
    let bg = Background::new(&cfg, &mut seeded_rng());
    assert_eq!(bg.stars.len(), cfg.star_count);
    assert_eq!(bg.buildings.len(), 10);
}

#[test]
fn stars_wrap_inside_the_field() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut bg = Background::new(&cfg, &mut rng);
    for _ in 0..2000 {
        bg.update(1.5, &mut rng);
    }
    assert_eq!(bg.stars.len(), cfg.star_count);
    for s in &bg.stars {
        assert!(s.y >= cfg.hud_height && s.y <= cfg.height, "star at {}", s.y);
        assert!(s.x >= 0.0 && s.x < cfg.width);
    }
}

#[test]
fn a_building_spawns_after_the_spawn_interval() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut bg = Background::new(&cfg, &mut rng);
    for _ in 0..cfg.building_spawn_ticks {
        bg.update(1.0, &mut rng);
    }
    assert_eq!(bg.buildings.len(), 10);
    bg.update(1.0, &mut rng);
    assert_eq!(bg.buildings.len(), 11);
}

#[test]
fn old_buildings_are_pruned() {
    let cfg = GameConfig::default();
    let mut rng = seeded_rng();
    let mut bg = Background::new(&cfg, &mut rng);
    for _ in 0..5000 {
        bg.update(2.0, &mut rng);
    }
    let limit = cfg.height + 100.0;
    assert!(bg.buildings.iter().all(|b| b.y < limit));
    assert!(bg.buildings.len() < 100);
}

// ── config / theme ────────────────────────────────────────────────────────────

#[test]
fn defaults_validate() {
    assert!(GameConfig::default().validate().is_ok());
    assert!(Theme::default().validate().is_ok());
}

#[test]
fn partial_config_file_keeps_other_defaults() {
    let path = std::env::temp_dir().join(format!("squadron_cfg_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "width": 600.0, "starting_lives": 5 }"#).unwrap();
    let cfg = GameConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(cfg.width, 600.0);
    assert_eq!(cfg.starting_lives, 5);
    assert_eq!(cfg.height, GameConfig::default().height);
}

#[test]
fn nonsense_config_is_rejected() {
    let cfg = GameConfig {
        drop_chance: 1.5,
        ..GameConfig::default()
    };
    assert!(cfg.validate().is_err());
    let narrow = GameConfig {
        width: 10.0,
        ..GameConfig::default()
    };
    assert!(narrow.validate().is_err());
}

#[test]
fn power_up_ids_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&PowerUpId::Score2x).unwrap(), "\"score2x\"");
    assert_eq!(serde_json::to_string(&PowerUpId::RapidFire).unwrap(), "\"rapidfire\"");
}

#[test]
fn theme_without_enemies_is_rejected() {
    let theme = Theme {
        enemies: Vec::new(),
        ..Theme::default()
    };
    assert!(theme.validate().is_err());
}

#[test]
fn rgb_channels() {
    let c = Rgb(0x12ab34);
    assert_eq!((c.r(), c.g(), c.b()), (0x12, 0xab, 0x34));
}

// ── hud text ──────────────────────────────────────────────────────────────────

#[test]
fn hud_padding() {
    assert_eq!(pad_score(42), "00042");
    assert_eq!(pad_score(123_456), "123456");
    assert_eq!(pad_wave(3), "03");
    assert_eq!(lives_glyphs(3), "♥♥♥");
    assert_eq!(lives_glyphs(0), "");
}

// ── high score file ───────────────────────────────────────────────────────────

fn temp_score_file(tag: &str) -> HighScoreFile {
    let path = std::env::temp_dir().join(format!("squadron_hs_{tag}_{}", std::process::id()));
    std::fs::remove_file(&path).ok();
    HighScoreFile::new(path)
}

#[test]
fn missing_high_score_file_reads_as_zero() {
    let file = temp_score_file("missing");
    assert_eq!(file.load(), 0);
}

#[test]
fn high_score_survives_a_save() {
    let file = temp_score_file("save");
    file.save(4200).unwrap();
    assert_eq!(file.load(), 4200);
    std::fs::remove_file(file.path()).ok();
}

#[test]
fn corrupt_high_score_reads_as_zero() {
    let file = temp_score_file("corrupt");
    std::fs::write(file.path(), "not a number").unwrap();
    assert_eq!(file.load(), 0);
    std::fs::remove_file(file.path()).ok();
}
