use crate::config::Config;
use crate::driver::ShapeDriver;
use crate::gesture::{self, GestureStatus};
use crate::input::{FeedOptions, GestureEvent, LandmarkFeed};
use crate::raster::Rasterizer;
use crate::render::{make_renderer, Frame};
use crate::scene::ParticleScene;
use crate::shapes::ShapeKind;
use crate::terminal::TerminalSession;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

const KEYS_LINE: &str =
    "Keys: ←/→ shape | 0-5 pick | space timer | +/- scale | i HUD | q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    None,
    ToggleHud,
    Quit,
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let rng = match cfg.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let mut notice: Option<String> = None;
    let mut scene = ParticleScene::new(cfg.particles, ShapeKind::Fireworks, cfg.morph_speed, rng);
    if let Err(err) = scene.state.select_shape_named(&cfg.shape) {
        notice = Some(format!("Error: {err}; showing fireworks"));
    }

    let feed_opts = FeedOptions {
        source: cfg.gesture,
        file: cfg.gesture_file.clone(),
        fps: cfg.gesture_fps,
        looping: cfg.gesture_loop,
    };
    let mut feed = match LandmarkFeed::start(&feed_opts) {
        Ok(feed) => feed,
        Err(err) => {
            // Gesture input is optional: keep animating without it.
            log::error!("gesture input unavailable: {err:#}");
            notice = Some(format!("Error: gesture input unavailable: {err:#}"));
            None
        }
    };
    let gesture_label = feed.as_ref().map(|f| f.label()).unwrap_or("off");
    let mut status = if feed.is_some() {
        "Status: waiting for hand".to_string()
    } else {
        "Status: gesture input off".to_string()
    };

    let mut term = TerminalSession::enter()?;
    let mut renderer = make_renderer(cfg.renderer);
    let (cell_w, cell_h) = cfg.renderer.cell_pixels();

    let mut size = TerminalSession::size()?;
    let mut show_hud = true;
    let mut hud_rows = hud_rows_for_size(size, show_hud);
    let mut raster = Rasterizer::new(0, 0, cfg.brightness);
    resize_surface(&mut raster, size, cell_w, cell_h, hud_rows);

    let mut driver = ShapeDriver::new(cfg.switch, cfg.seconds_per_switch, Instant::now());
    let mut fps = FpsCounter::new();
    let mut last_tick_ms = 0.0f32;

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match handle_key(k.code, k.modifiers, &mut scene, &mut driver, now) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::ToggleHud => {
                            show_hud = !show_hud;
                            hud_rows = hud_rows_for_size(size, show_hud);
                            resize_surface(&mut raster, size, cell_w, cell_h, hud_rows);
                        }
                        KeyAction::None => {}
                    }
                }
                Event::Resize(c, r) => {
                    size = (c.max(1), r.max(1));
                    hud_rows = hud_rows_for_size(size, show_hud);
                    resize_surface(&mut raster, size, cell_w, cell_h, hud_rows);
                }
                _ => {}
            }
        }

        // Some terminals drop resize events.
        let (c, r) = crossterm::terminal::size()?;
        let sz = (c.max(1), r.max(1));
        if sz != size {
            size = sz;
            hud_rows = hud_rows_for_size(size, show_hud);
            resize_surface(&mut raster, size, cell_w, cell_h, hud_rows);
        }

        if let Some(feed) = feed.as_mut() {
            while let Some(ev) = feed.poll() {
                match ev {
                    GestureEvent::Frame(hand) => {
                        let update = gesture::map(hand.as_ref());
                        let applied = gesture::apply(&update, &mut scene.state);
                        if matches!(applied, GestureStatus::Hand { .. }) {
                            driver.touch(now);
                        }
                        status = applied.to_string();
                    }
                    GestureEvent::Fault(msg) => {
                        log::warn!("skipping landmark frame: {msg}");
                        status = format!("Status: bad landmark frame ({msg})");
                    }
                }
            }
        }

        driver.update(now, &mut scene.state);

        let tick_start = Instant::now();
        scene.tick();
        last_tick_ms = last_tick_ms * 0.9 + tick_start.elapsed().as_secs_f32() * 100.0;

        let hud = if show_hud {
            let state = &scene.state;
            let lines = [
                format!(
                    "Shape: {} | Scale: {:>4.2} | Mode: {:?} | Gesture: {} | Renderer: {} | Tick: {:>4.1}ms | FPS: {:>4.1}",
                    state.active_shape.label(),
                    state.scale_factor,
                    driver.mode(),
                    gesture_label,
                    renderer.name(),
                    last_tick_ms,
                    fps.fps(),
                ),
                status.clone(),
                notice.clone().unwrap_or_default(),
                KEYS_LINE.to_string(),
            ];
            let kept = lines.into_iter().filter(|l| !l.is_empty()).collect::<Vec<_>>();
            wrap_hud_lines(size.0 as usize, &kept).join("\n")
        } else {
            String::new()
        };

        let wanted = hud_rows_for_text(size.1, show_hud, &hud);
        if wanted != hud_rows {
            hud_rows = wanted;
            resize_surface(&mut raster, size, cell_w, cell_h, hud_rows);
        }
        let visual_rows = size.1.saturating_sub(hud_rows).max(1);
        let (w, h) = raster.size();
        let pixels = raster.draw(scene.positions(), scene.colors(), scene.state.rotation);

        let frame = Frame {
            term_cols: size.0,
            term_rows: size.1,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: pixels,
            hud: &hud,
            hud_rows,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, term.writer())?;
        fps.tick();

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn resize_surface(
    raster: &mut Rasterizer,
    size: (u16, u16),
    cell_w: usize,
    cell_h: usize,
    hud_rows: u16,
) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    raster.resize(cols as usize * cell_w, visual_rows as usize * cell_h);
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    scene: &mut ParticleScene,
    driver: &mut ShapeDriver,
    now: Instant,
) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    let state = &mut scene.state;
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return KeyAction::Quit,
        KeyCode::Left => driver.prev(now, state),
        KeyCode::Right => driver.next(now, state),
        KeyCode::Char(' ') => driver.toggle_mode(now),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => state.nudge_scale(0.1),
        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Down => state.nudge_scale(-0.1),
        KeyCode::Char('i') | KeyCode::Char('I') => return KeyAction::ToggleHud,
        KeyCode::Char(d @ '0'..='5') => {
            state.active_shape = match d {
                '0' => ShapeKind::Sphere,
                '1' => ShapeKind::Heart,
                '2' => ShapeKind::Flower,
                '3' => ShapeKind::Saturn,
                '4' => ShapeKind::MilkyWay,
                _ => ShapeKind::Fireworks,
            };
            driver.touch(now);
        }
        _ => {}
    }
    KeyAction::None
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud || size.1 <= 1 {
        return 0;
    }
    (size.1 - 1).min(4)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    (hud.lines().count() as u16).min(term_rows.saturating_sub(1))
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        let chars = line.chars().collect::<Vec<_>>();
        if chars.is_empty() {
            out.push(String::new());
            continue;
        }
        out.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
    }
    out
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
