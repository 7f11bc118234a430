mod animations;
mod config;
mod external;
pub mod generators;
mod render;

use std::io::{self, BufWriter, Write};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};

use animations::{Animation, Params};
use external::{ControlMsg, ControlSource};
use render::{Canvas, ColorMode, RenderMode};

#[derive(Parser)]
#[command(name = "trippix", about = "Terminal psychedelic pattern animator")]
struct Cli {
    /// Animation to play (use --list to see all)
    animation: Option<String>,

    /// Render mode (omit to use per-animation default)
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// List available animations and exit
    #[arg(short, long)]
    list: bool,

    /// Print an animation's default parameters and control schema as JSON
    #[arg(long, value_name = "NAME")]
    schema: Option<String>,

    /// Initial parameter overrides as a JSON object
    #[arg(short, long, value_name = "JSON")]
    params: Option<String>,

    /// Watch a file for JSON parameter patches
    #[arg(long, value_name = "PATH")]
    control: Option<std::path::PathBuf>,

    /// Read JSON parameter patches from stdin
    #[arg(long)]
    control_stdin: bool,

    /// Cycle through all animations (seconds per animation, 0 = disabled)
    #[arg(long)]
    cycle: Option<u32>,

    /// Hide the status bar for pure animation mode
    #[arg(long)]
    clean: bool,

    /// Start paused (space toggles)
    #[arg(long)]
    paused: bool,

    /// Print the config file path and a sample config, then exit
    #[arg(long)]
    show_config: bool,
}

/// Everything the loop needs, resolved from CLI > config > defaults.
struct Settings {
    explicit_render: Option<RenderMode>,
    color: ColorMode,
    fps: u32,
    cycle: u32,
    clean: bool,
    paused: bool,
    cli_params: Params,
    config: config::Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list {
        println!("Available animations:");
        for &(name, desc) in animations::ANIMATIONS {
            println!("  {:<20} {}", name, desc);
        }
        println!("\nRender modes: braille, half-block, ascii");
        println!("Color modes: mono, ansi16, ansi256, true-color");
        return Ok(());
    }

    if cli.show_config {
        match config::config_path() {
            Some(path) => println!("Config file: {}", path.display()),
            None => println!("Config file: <no config directory>"),
        }
        println!("\n{}", config::default_config_string());
        return Ok(());
    }

    if let Some(ref name) = cli.schema {
        let anim = animations::create(name, 80, 48, Params::new())?;
        let doc = serde_json::json!({
            "animation": anim.kind(),
            "defaults": anim.core().params.clone(),
            "schema": anim.schema(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let config = config::load_config();
    let cli_params = match cli.params.as_deref() {
        Some(json) => match serde_json::from_str::<Params>(json) {
            Ok(p) => p,
            Err(e) => bail!("invalid --params JSON: {e}"),
        },
        None => Params::new(),
    };

    let anim_name = cli
        .animation
        .clone()
        .or_else(|| config.animation.clone())
        .unwrap_or_else(|| "rotating_polygons".to_string());
    // Fail fast on an unknown name before touching the terminal
    if !animations::ANIMATIONS.iter().any(|&(n, _)| n == anim_name) {
        bail!("unknown animation type: {anim_name}");
    }

    let settings = Settings {
        explicit_render: cli.render.or(config.render.map(Into::into)),
        color: cli.color.or(config.color.map(Into::into)).unwrap_or(ColorMode::TrueColor),
        fps: cli.fps.or(config.fps).unwrap_or(30).clamp(1, 120),
        cycle: cli.cycle.or(config.cycle).unwrap_or(0),
        clean: cli.clean || config.clean.unwrap_or(false),
        paused: cli.paused || config.paused.unwrap_or(false),
        cli_params,
        config,
    };

    let control_rx = if cli.control_stdin {
        Some(external::spawn_reader(ControlSource::Stdin))
    } else {
        cli.control
            .clone()
            .map(|path| external::spawn_reader(ControlSource::File(path)))
    };

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, &settings, &anim_name, control_rx);

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

const RENDER_MODES: [RenderMode; 3] = [RenderMode::Braille, RenderMode::HalfBlock, RenderMode::Ascii];
const COLOR_MODES: [ColorMode; 4] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16, ColorMode::Mono];

/// Construction-time parameters for an animation: config-file overrides
/// for that name, then the --params overrides on top.
fn initial_params(settings: &Settings, name: &str) -> Params {
    let mut params = settings
        .config
        .params
        .get(name)
        .cloned()
        .unwrap_or_default();
    params.merge(settings.cli_params.clone());
    params
}

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    settings: &Settings,
    initial_anim: &str,
    control_rx: Option<Receiver<ControlMsg>>,
) -> Result<()> {
    let frame_dur = Duration::from_secs_f64(1.0 / settings.fps as f64);
    let (mut cols, mut rows) = terminal::size()?;

    let mut color_mode = settings.color;
    let mut hide_status = settings.clean;
    let mut anim_index = animations::ANIMATIONS
        .iter()
        .position(|&(n, _)| n == initial_anim)
        .unwrap_or(0);

    // Create once to learn the preferred render mode, then rebuild the
    // canvas at the real sub-cell dimensions for that mode.
    let display_rows = if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) };
    let temp = Canvas::new(cols as usize, display_rows, RenderMode::HalfBlock, color_mode);
    let mut anim = animations::create(initial_anim, temp.width, temp.height, initial_params(settings, initial_anim))?;
    let mut render_mode = settings.explicit_render.unwrap_or_else(|| anim.preferred_render());
    let mut canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
    anim = animations::create(initial_anim, canvas.width, canvas.height, initial_params(settings, initial_anim))?;
    if !settings.paused {
        anim.play();
    }

    let mut last_frame = Instant::now();
    let mut cycle_start = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut flash: Option<String> = None;

    let mut rebuild_canvas = false;
    // Set when the animation must be recreated (switch or rebuild);
    // carries the params to seed the new instance with.
    let mut switch_to: Option<(usize, Params)> = None;

    loop {
        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        rebuild_canvas = true;
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char(' ') => {
                        if anim.is_playing() {
                            anim.pause();
                        } else {
                            anim.play();
                        }
                    }
                    KeyCode::Char('x') => {
                        anim.reset(&mut canvas);
                    }
                    KeyCode::Char('i') => {
                        anim.reinitialize();
                    }
                    KeyCode::Right | KeyCode::Char('n') => {
                        let next = (anim_index + 1) % animations::ANIMATIONS.len();
                        switch_to = Some((next, initial_params(settings, animations::ANIMATIONS[next].0)));
                        cycle_start = Instant::now();
                    }
                    KeyCode::Left | KeyCode::Char('p') => {
                        let prev = if anim_index == 0 {
                            animations::ANIMATIONS.len() - 1
                        } else {
                            anim_index - 1
                        };
                        switch_to = Some((prev, initial_params(settings, animations::ANIMATIONS[prev].0)));
                        cycle_start = Instant::now();
                    }
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        let speed = (anim.core().params.number("speed", 1.0) * 1.25).min(5.0);
                        anim.update_params(Params::new().with("speed", speed));
                        flash = Some(format!("speed {:.2}", speed));
                    }
                    KeyCode::Char('-') => {
                        let speed = (anim.core().params.number("speed", 1.0) / 1.25).max(0.1);
                        anim.update_params(Params::new().with("speed", speed));
                        flash = Some(format!("speed {:.2}", speed));
                    }
                    // Cycle render mode
                    KeyCode::Char('r') => {
                        let idx = RENDER_MODES.iter().position(|&m| m == render_mode).unwrap_or(0);
                        render_mode = RENDER_MODES[(idx + 1) % RENDER_MODES.len()];
                        rebuild_canvas = true;
                    }
                    // Cycle color mode
                    KeyCode::Char('c') => {
                        let idx = COLOR_MODES.iter().position(|&m| m == color_mode).unwrap_or(0);
                        color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        rebuild_canvas = true;
                    }
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        rebuild_canvas = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Drain external control messages; they apply at the loop
        // boundary and are visible to this frame's render
        if let Some(ref rx) = control_rx {
            while let Ok(msg) = rx.try_recv() {
                if let Some(name) = msg.animation {
                    match animations::ANIMATIONS.iter().position(|&(n, _)| n == name) {
                        Some(idx) => {
                            let mut params = initial_params(settings, name.as_str());
                            params.merge(msg.params.clone());
                            switch_to = Some((idx, params));
                            cycle_start = Instant::now();
                            continue;
                        }
                        None => {
                            flash = Some(format!("unknown animation: {name}"));
                        }
                    }
                }
                if !msg.params.is_empty() {
                    anim.update_params(msg.params);
                }
            }
        }

        // Cycle animations
        if settings.cycle > 0 && cycle_start.elapsed() >= Duration::from_secs(settings.cycle as u64) {
            let next = (anim_index + 1) % animations::ANIMATIONS.len();
            switch_to = Some((next, initial_params(settings, animations::ANIMATIONS[next].0)));
            cycle_start = Instant::now();
        }

        // Apply a pending switch, keeping play state
        if let Some((idx, params)) = switch_to.take() {
            let was_playing = anim.is_playing();
            anim_index = idx;
            let name = animations::ANIMATIONS[idx].0;
            anim = animations::create(name, canvas.width, canvas.height, params)?;
            if was_playing {
                anim.play();
            }
            if settings.explicit_render.is_none() && anim.preferred_render() != render_mode {
                render_mode = anim.preferred_render();
                rebuild_canvas = true;
            }
        }

        // Rebuild canvas if mode changed or terminal resized
        if rebuild_canvas && cols >= 10 && rows >= 5 {
            let (settled_cols, settled_rows) = terminal::size()?;
            if settled_cols >= 10 && settled_rows >= 5 {
                cols = settled_cols;
                rows = settled_rows;
            }
            let display_rows = if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) };
            canvas = Canvas::new(cols as usize, display_rows, render_mode, color_mode);
            // Recreate at the new dimensions, carrying the live params
            let was_playing = anim.is_playing();
            let name = animations::ANIMATIONS[anim_index].0;
            anim = animations::create(name, canvas.width, canvas.height, anim.core().params.clone())?;
            if was_playing {
                anim.play();
            }
            write!(stdout, "\x1b[2J\x1b[H")?;
            stdout.flush()?;
            rebuild_canvas = false;
        }

        // Timing: frame delta in ms of animation time
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;

        // Update then render; render always runs, playing or paused
        anim.update(dt);
        anim.render(&mut canvas);
        let frame = canvas.render();

        // Skip the frame if the terminal changed size under us
        let (check_cols, check_rows) = terminal::size()?;
        if check_cols != cols || check_rows != rows {
            cols = check_cols;
            rows = check_rows;
            rebuild_canvas = true;
            std::thread::sleep(Duration::from_millis(50));
            continue;
        }

        stdout.write_all(b"\x1b[H")?;
        stdout.write_all(frame.as_bytes())?;

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
            flash = None;
        }
        if !hide_status {
            let state = if anim.is_playing() { "playing" } else { "paused" };
            let note = flash.as_deref().unwrap_or("[space] pause  [x] reset  [←/→] anim  [+/-] speed  [r] render  [c] color  [q] quit");
            let status = format!(
                " {} | {} | {:?} | {:?} | {:.0} fps | {} ",
                anim.kind(),
                state,
                render_mode,
                color_mode,
                actual_fps,
                note,
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
