/// Rendering layer: all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game.  No game logic is performed; this module only scales play-field
/// coordinates down to terminal cells and translates state into terminal
/// commands.

use std::io::Write;
use std::time::Duration;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use squadron_shooter::entities::{GameStatus, Session};
use squadron_shooter::hud::{pad_score, Hud};
use squadron_shooter::theme::Rgb;
use squadron_shooter::Game;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::Green;
const C_BULLET: Color = Color::Cyan;
const C_BOMB: Color = Color::Magenta;
const C_BONUS: Color = Color::Yellow;
const C_STAR: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;
const C_POWERUP_ACTIVE: Color = Color::Yellow;

fn rgb(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

// ── Field → terminal mapping ─────────────────────────────────────────────────

/// Maps play-field pixels onto the cells inside the border.
struct Viewport {
    width: u16,
    height: u16,
    field_w: f32,
    field_h: f32,
    top: f32,
}

impl Viewport {
    fn new(game: &Game, width: u16, height: u16) -> Self {
        let cfg = game.config();
        Viewport {
            width,
            height,
            field_w: cfg.width,
            field_h: cfg.height,
            top: cfg.hud_height,
        }
    }

    fn cols(&self) -> f32 {
        self.width.saturating_sub(2).max(1) as f32
    }

    fn rows(&self) -> f32 {
        self.height.saturating_sub(4).max(1) as f32
    }

    /// Cell for a field point, or `None` if it is off the visible field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || x >= self.field_w || y < self.top || y >= self.field_h {
            return None;
        }
        let col = 1.0 + x / self.field_w * self.cols();
        let row = 2.0 + (y - self.top) / (self.field_h - self.top) * self.rows();
        Some((col as u16, row as u16))
    }
}

fn put<W: Write>(out: &mut W, at: Option<(u16, u16)>, color: Color, text: &str) -> std::io::Result<()> {
    if let Some((col, row)) = at {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(text))?;
    }
    Ok(())
}

fn centered<W: Write>(out: &mut W, width: u16, row: u16, color: Color, text: &str) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    put(out, Some((col, row)), color, text)
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, game: &Game, now: Duration, muted: bool) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport::new(game, width, height);
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, game, width, muted)?;

    match game.session() {
        Some(session) if matches!(game.status(), GameStatus::Play | GameStatus::Paused) => {
            draw_world(out, &view, game, session, now)?;
        }
        _ => {
            for star in &game.menu_background().stars {
                put(out, view.cell(star.x, star.y), C_STAR, ".")?;
            }
        }
    }

    match game.status() {
        GameStatus::Menu => draw_menu(out, game, width, height, now)?,
        GameStatus::Paused => centered(out, width, height / 2, Color::White, "[ PAUSED ]  P - Resume  Esc - Menu")?,
        GameStatus::LevelClear => draw_level_clear(out, game, width, height)?,
        GameStatus::GameOver => draw_game_over(out, game, width, height)?,
        GameStatus::Play => {}
    }

    draw_controls_hint(out, height)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, game: &Game, width: u16, muted: bool) -> std::io::Result<()> {
    let hud = Hud::from_game(game);

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("SCORE {}  HI {}", hud.score, hud.high_score)))?;

    let wave = format!("[ WAVE {} ]", hud.wave);
    centered(out, width, 0, Color::White, &wave)?;

    let mut tags = hud.power_ups.join(" ");
    if muted {
        tags.push_str(" MUTE");
    }
    let right = format!("{} {}", tags.trim(), hud.lives);
    let rx = width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
    out.queue(Print(tags.trim()))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(format!(" {}", hud.lives)))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_world<W: Write>(
    out: &mut W,
    view: &Viewport,
    game: &Game,
    s: &Session,
    now: Duration,
) -> std::io::Result<()> {
    let theme = game.theme();

    for star in &s.background.stars {
        put(out, view.cell(star.x, star.y), C_STAR, ".")?;
    }
    for p in &s.particles {
        put(out, view.cell(p.x, p.y), rgb(p.color), "·")?;
    }
    for e in s.enemies.iter().filter(|e| e.alive) {
        let kind = theme.enemy_type(e.tier);
        let color = if e.hit_flash % 2 == 1 { Color::White } else { rgb(kind.color) };
        let glyph = if e.is_boss { "«█»" } else { "«▼»" };
        put(out, view.cell(e.x, e.y), color, glyph)?;
        if e.quote_alpha > 0.3 {
            put(out, view.cell(e.x, e.y - 14.0), Color::DarkGrey, &e.quote)?;
        }
    }
    for b in &s.bombs {
        put(out, view.cell(b.x, b.y), C_BOMB, "↓")?;
    }
    for b in &s.bullets {
        put(out, view.cell(b.x, b.y), C_BULLET, "║")?;
    }
    for d in &s.drops {
        let color = theme.power_up(d.kind).map_or(Color::White, |p| rgb(p.color));
        put(out, view.cell(d.x, d.y), color, "◆")?;
    }
    for t in &s.bonus_targets {
        put(out, view.cell(t.x, t.y), C_BONUS, "☺")?;
    }

    // Blink while invincible.
    let p = &s.player;
    if p.invincible == 0 || (now.as_millis() / 100) % 2 == 0 {
        put(out, view.cell(p.x, p.y), C_PLAYER, "/▲\\")?;
    }

    for f in &s.floats {
        put(out, view.cell(f.x, f.y), rgb(f.color), &f.text)?;
    }
    Ok(())
}

// ── Screens ──────────────────────────────────────────────────────────────────

fn draw_menu<W: Write>(out: &mut W, game: &Game, width: u16, height: u16, now: Duration) -> std::io::Result<()> {
    let cy = height / 2;
    centered(out, width, cy.saturating_sub(6), Color::Cyan, "★  SQUADRON  SHOOTER  ★")?;
    if game.high_score() > 0 {
        let best = format!("Best Score: {}", pad_score(game.high_score()));
        centered(out, width, cy.saturating_sub(4), Color::Yellow, &best)?;
    }
    if let Some(flavor) = game.flavor_text(now) {
        centered(out, width, cy.saturating_sub(2), Color::Green, flavor)?;
    }

    for (i, p) in game.theme().power_ups.iter().enumerate() {
        let line = format!("◆ {}", p.label);
        centered(out, width, cy + 1 + i as u16, rgb(p.color), &line)?;
    }
    centered(out, width, cy + 6, Color::White, "SPACE - Start")?;
    Ok(())
}

fn draw_level_clear<W: Write>(out: &mut W, game: &Game, width: u16, height: u16) -> std::io::Result<()> {
    let cy = height / 2;
    let title = format!("WAVE {} COMPLETE", game.wave());
    centered(out, width, cy.saturating_sub(1), Color::Green, &title)?;
    if let Some(bonus) = game.level_clear_bonus() {
        centered(out, width, cy + 1, Color::Yellow, &format!("+{bonus} BONUS POINTS"))?;
    }
    Ok(())
}

fn draw_game_over<W: Write>(out: &mut W, game: &Game, width: u16, height: u16) -> std::io::Result<()> {
    let Some(info) = game.game_over_info() else {
        return Ok(());
    };
    let new_best = info.score >= info.high_score && info.score > 0;
    let score_line = format!("Final Score: {}", pad_score(info.score));
    let best_line = if new_best {
        format!("★ NEW BEST: {} ★", pad_score(info.high_score))
    } else {
        format!("Best Score:  {}", pad_score(info.high_score))
    };

    let lines: [(&str, Color); 3] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];
    let start = (height / 2).saturating_sub(5);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, width, start + i as u16, *color, msg)?;
    }
    let row = start + lines.len() as u16;
    centered(out, width, row, Color::Red, &info.reason)?;
    centered(out, width, row + 1, Color::Yellow, &score_line)?;
    centered(out, width, row + 2, if new_best { Color::Yellow } else { Color::DarkGrey }, &best_line)?;
    centered(out, width, row + 3, Color::DarkGrey, &info.quote)?;
    centered(out, width, row + 5, Color::White, "SPACE - Play Again  Q - Quit")?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←→↑↓ / WASD : Move   SPACE/Z : Shoot   P : Pause   M : Mute   Q : Quit"))?;
    Ok(())
}
