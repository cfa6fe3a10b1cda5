mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::filter::EnvFilter;

use squadron_shooter::audio::{Audio, AudioControl};
use squadron_shooter::highscore::HighScoreFile;
use squadron_shooter::{Command, Game, GameConfig, GameStatus, InputState, Theme};

#[derive(Parser, Debug)]
#[command(name = "squadron-shooter")]
#[command(about = "Wave-based arcade shoot-'em-up in the terminal")]
struct Args {
    /// JSON file overriding any of the gameplay tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with enemy, power-up and text tables
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Seed the game RNG for a repeatable run
    #[arg(long)]
    seed: Option<u64>,

    /// Start with audio muted
    #[arg(long)]
    mute: bool,

    /// Where the high score is kept (default: ~/.squadron_shooter_score)
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    /// Write logs here; the terminal itself is taken by the game
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈128 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn sample_input(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> InputState {
    use KeyCode::{Char, Down, Left, Right, Up};
    InputState {
        left: any_held(key_frame, &[Left, Char('a'), Char('A')], frame),
        right: any_held(key_frame, &[Right, Char('d'), Char('D')], frame),
        up: any_held(key_frame, &[Up, Char('w'), Char('W')], frame),
        down: any_held(key_frame, &[Down, Char('s'), Char('S')], frame),
        fire: any_held(key_frame, &[Char(' '), Char('z'), Char('Z')], frame),
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> (GameConfig, Theme) {
    let config = match &args.config {
        Some(path) => GameConfig::from_json_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "using default config");
            GameConfig::default()
        }),
        None => GameConfig::default(),
    };
    let theme = match &args.theme {
        Some(path) => Theme::from_json_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "using default theme");
            Theme::default()
        }),
        None => Theme::default(),
    };
    (config, theme)
}

/// The audio service plus whatever keeps its output alive.
struct AudioOutput {
    audio: Audio,
    #[cfg(feature = "streaming")]
    _device: Option<squadron_shooter::audio::AudioDevice>,
}

#[cfg(feature = "streaming")]
fn open_audio() -> AudioOutput {
    use squadron_shooter::audio::{AudioDevice, Mixer, DEFAULT_SAMPLE_RATE};

    let mixer = Mixer::new(DEFAULT_SAMPLE_RATE);
    match AudioDevice::open(mixer.clone()) {
        Ok(device) => AudioOutput {
            audio: Audio::new(mixer),
            _device: Some(device),
        },
        Err(e) => {
            tracing::warn!(error = %e, "audio unavailable, playing silent");
            AudioOutput {
                audio: Audio::disabled(),
                _device: None,
            }
        }
    }
}

#[cfg(not(feature = "streaming"))]
fn open_audio() -> AudioOutput {
    tracing::info!("built without audio output");
    AudioOutput {
        audio: Audio::disabled(),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and hand the result to the game as held
/// input.  Commands (start, pause, mute, menu) act on the press itself.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    game: &mut Game,
    audio: &mut Audio,
    scores: &HighScoreFile,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let frame_len = Duration::from_secs_f32(game.config().frame_ms / 1000.0);
    let start = Instant::now();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    audio.resume();
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Esc if game.status() == GameStatus::Menu => return Ok(()),
                        KeyCode::Esc => game.command(Command::ReturnToMenu, audio),
                        KeyCode::Char(' ') | KeyCode::Enter => game.command(Command::Start, audio),
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            game.command(Command::TogglePause, audio)
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => {
                            game.command(Command::ToggleMute, audio)
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let now = start.elapsed();
        let input = sample_input(&key_frame, frame);
        game.frame(now, &input, audio);
        audio.pump(now);

        if let Some(score) = game.take_new_high_score() {
            if let Err(e) = scores.save(score) {
                tracing::warn!(error = %e, "could not save high score");
            }
        }

        display::render(out, game, now, audio.is_muted())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_len {
            std::thread::sleep(frame_len - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> squadron_shooter::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let (config, theme) = load_config(&args);
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::with_rng(config, theme, rng);

    let scores = args
        .high_score_file
        .clone()
        .map(HighScoreFile::new)
        .unwrap_or_else(HighScoreFile::default_location);
    game.set_high_score(scores.load());

    let mut output = open_audio();
    if args.mute {
        output.audio.set_muted(true);
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut game, &mut output.audio, &scores, &rx);
    output.audio.teardown();

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result?;
    Ok(())
}
