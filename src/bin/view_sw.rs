//! First-person software viewer.
//!
//! ```bash
//! cargo run --release                                # built-in room
//! cargo run --release -- doom1.wad --map E1M1
//! ```

use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use clap::Parser;
use minifb::{KeyRepeat, MouseMode, Scale, Window, WindowOptions};

use sectorcast::{
    Config,
    engine::{Flow, Game},
    platform::{DirResources, Input, Key},
    renderer::Software,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// WAD file to load; the built-in room is used when omitted
    #[arg(value_name = "FILE")]
    wad: Option<PathBuf>,

    /// Map marker inside the WAD (`E1M1`, `MAP01`, ...); first map if omitted
    #[arg(long)]
    map: Option<String>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 320)]
    width: usize,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 240)]
    height: usize,

    /// Window scale: 1, 2, 4 or 8
    #[arg(long, default_value_t = 2)]
    scale: usize,

    /// Radians per pixel of mouse motion
    #[arg(long, default_value_t = 0.005)]
    sensitivity: f32,
}

/// minifb window seen through the engine's input trait.
struct WindowInput<'a> {
    win: &'a Window,
    mouse_dx: f32,
}

fn host_key(key: Key) -> minifb::Key {
    match key {
        Key::Escape => minifb::Key::Escape,
        Key::W => minifb::Key::W,
        Key::A => minifb::Key::A,
        Key::S => minifb::Key::S,
        Key::D => minifb::Key::D,
        Key::Up => minifb::Key::Up,
        Key::Down => minifb::Key::Down,
        Key::Left => minifb::Key::Left,
        Key::Right => minifb::Key::Right,
    }
}

impl Input for WindowInput<'_> {
    fn key_down(&self, key: Key) -> bool {
        self.win.is_key_down(host_key(key))
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.win.is_key_pressed(host_key(key), KeyRepeat::No)
    }

    fn mouse_delta_x(&self) -> f32 {
        self.mouse_dx
    }
}

fn window_scale(scale: usize) -> Scale {
    match scale {
        0 | 1 => Scale::X1,
        2 | 3 => Scale::X2,
        4..=7 => Scale::X4,
        _ => Scale::X8,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let cfg = Config {
        width: opts.width,
        height: opts.height,
        scale: opts.scale,
        mouse_sensitivity: opts.sensitivity,
        ..Config::default()
    };
    let (w, h) = (cfg.width, cfg.height);

    // ─────────── map ───────────
    let mut game = Game::sample(cfg.clone());
    if let Some(path) = &opts.wad {
        let dir = path.parent().map(PathBuf::from).unwrap_or_default();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("bad WAD path {}", path.display()))?;
        game.load_map(&DirResources::new(dir), name, opts.map.as_deref())
            .with_context(|| format!("loading {}", path.display()))?;
    }
    log::info!("map: {}", game.map().name());

    // ─────────── window ───────────
    let mut win = Window::new(
        "sectorcast",
        w,
        h,
        WindowOptions {
            scale: window_scale(cfg.scale),
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(60);

    let mut canvas = Software::new(w, h);
    let mut last_mouse_x = win.get_mouse_pos(MouseMode::Pass).map(|(x, _)| x);
    let mut last_frame = Instant::now();

    while win.is_open() {
        let now = Instant::now();
        let frame_time = (now - last_frame).as_secs_f32();
        last_frame = now;

        let mouse_x = win.get_mouse_pos(MouseMode::Pass).map(|(x, _)| x);
        let mouse_dx = match (last_mouse_x, mouse_x) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        };
        last_mouse_x = mouse_x;

        let input = WindowInput { win: &win, mouse_dx };
        if game.step(&input, &mut canvas, frame_time) == Flow::Quit {
            break;
        }

        canvas.end_frame(|buf, w, h| win.update_with_buffer(buf, w, h))?;
    }
    Ok(())
}
