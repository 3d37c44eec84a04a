use crate::config::GestureSource;
use crate::gesture::{HandLandmarks, LANDMARK_COUNT, Landmark};
use anyhow::{Context, anyhow};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::fmt;
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const QUEUE_CAPACITY: usize = 64;

/// One callback's worth of detector output.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Frame(Option<HandLandmarks>),
    /// The frame could not be turned into landmarks; the loop reports it and moves on.
    Fault(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameLine {
    Skip,
    NoHand,
    Hand(HandLandmarks),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LandmarkParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "landmark parse error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for LandmarkParseError {}

/// Parses one frame: blank or `-` for no hand, `#` comments, otherwise 21
/// whitespace-separated `x,y` or `x,y,z` tokens.
pub fn parse_frame_line(raw: &str, line: usize) -> Result<FrameLine, LandmarkParseError> {
    let text = raw.trim();
    if text.starts_with('#') {
        return Ok(FrameLine::Skip);
    }
    if text.is_empty() || text == "-" {
        return Ok(FrameLine::NoHand);
    }

    let err = |message: String| LandmarkParseError { line, message };

    let tokens = text.split_whitespace().collect::<Vec<_>>();
    if tokens.len() != LANDMARK_COUNT {
        return Err(err(format!(
            "expected {LANDMARK_COUNT} landmarks, got {}",
            tokens.len()
        )));
    }

    let mut points = [Landmark::default(); LANDMARK_COUNT];
    for (idx, (token, slot)) in tokens.iter().zip(points.iter_mut()).enumerate() {
        let coords = token
            .split(',')
            .map(|c| c.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| err(format!("landmark {idx}: {e}")))?;
        let (x, y, z) = match coords.as_slice() {
            [x, y] => (*x, *y, 0.0),
            [x, y, z] => (*x, *y, *z),
            _ => {
                return Err(err(format!(
                    "landmark {idx}: expected x,y or x,y,z, got {token:?}"
                )));
            }
        };
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Err(err(format!("landmark {idx}: non-finite coordinate")));
        }
        *slot = Landmark::new(x, y, z);
    }

    Ok(FrameLine::Hand(HandLandmarks(points)))
}

/// A simple hand pose used to synthesize landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    /// Middle-finger MCP position in normalized image coordinates.
    pub center: (f32, f32),
    /// Index, middle, ring, pinky.
    pub raised: [bool; 4],
    pub thumb_open: bool,
    /// 0..1, how far an open thumb reaches away from the index finger.
    pub thumb_spread: f32,
}

impl HandPose {
    pub fn with_fingers(count: u8, center: (f32, f32)) -> Self {
        let raised = std::array::from_fn(|i| (i as u8) < count.min(4));
        Self {
            center,
            raised,
            thumb_open: count >= 5,
            thumb_spread: 0.5,
        }
    }

    pub fn landmarks(&self) -> HandLandmarks {
        let (cx, cy) = self.center;
        let mut pts = [Landmark::default(); LANDMARK_COUNT];

        // Hand span (wrist to middle MCP) is 0.2.
        pts[0] = Landmark::new(cx, cy + 0.2, 0.0);

        // Finger bases, index to pinky.
        let mcps = [
            (cx - 0.05, cy),
            (cx, cy),
            (cx + 0.045, cy + 0.01),
            (cx + 0.085, cy + 0.03),
        ];
        for (f, &(mx, my)) in mcps.iter().enumerate() {
            let base = 5 + f * 4;
            let pip_y = my - 0.06;
            let tip_y = if self.raised[f] { pip_y - 0.07 } else { pip_y + 0.03 };
            pts[base] = Landmark::new(mx, my, 0.0);
            pts[base + 1] = Landmark::new(mx, pip_y, -0.01);
            pts[base + 2] = Landmark::new(mx, (pip_y + tip_y) * 0.5, -0.015);
            pts[base + 3] = Landmark::new(mx, tip_y, -0.02);
        }

        let (ix, iy) = mcps[0];
        let tip = if self.thumb_open {
            (ix - (0.12 + 0.1 * self.thumb_spread.clamp(0.0, 1.0)), iy + 0.02)
        } else {
            (ix + 0.01, iy + 0.05)
        };
        pts[1] = Landmark::new(cx - 0.07, cy + 0.15, 0.0);
        pts[2] = Landmark::new(cx - 0.1, cy + 0.1, -0.005);
        pts[3] = Landmark::new((pts[2].x + tip.0) * 0.5, (pts[2].y + tip.1) * 0.5, -0.01);
        pts[4] = Landmark::new(tip.0, tip.1, -0.015);

        HandLandmarks(pts)
    }
}

/// Synthetic detector output at time `t` seconds: a drifting hand that counts
/// from a fist up to an open palm, with a short gap where no hand is seen.
pub fn synthetic_frame(t: f32) -> Option<HandLandmarks> {
    const STEP_SECS: f32 = 4.0;
    const CYCLE: f32 = STEP_SECS * 6.0 + 1.5;

    let phase = t.rem_euclid(CYCLE);
    if phase >= STEP_SECS * 6.0 {
        return None;
    }

    let fingers = (phase / STEP_SECS).floor() as u8;
    let center = (
        0.5 + 0.25 * (0.3 * t).sin(),
        0.5 + 0.15 * (0.23 * t).sin(),
    );
    let mut pose = HandPose::with_fingers(fingers, center);
    pose.thumb_spread = 0.5 + 0.5 * (1.1 * t).sin();
    Some(pose.landmarks())
}

#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub source: GestureSource,
    pub file: Option<PathBuf>,
    pub fps: u32,
    pub looping: bool,
}

/// Background landmark producer feeding a lock-free queue that the render
/// loop drains once per tick.
pub struct LandmarkFeed {
    cons: ringbuf::HeapCons<GestureEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    join_on_drop: bool,
    label: &'static str,
}

impl LandmarkFeed {
    /// Returns `Ok(None)` for [`GestureSource::None`].
    pub fn start(opts: &FeedOptions) -> anyhow::Result<Option<Self>> {
        let period = Duration::from_secs_f32(1.0 / opts.fps.clamp(1, 240) as f32);
        match opts.source {
            GestureSource::None => Ok(None),
            GestureSource::Synthetic => {
                Ok(Some(Self::spawn("synthetic", true, move |prod, stop| {
                    synthetic_loop(prod, stop, period)
                })?))
            }
            GestureSource::Stdin => {
                if std::io::stdin().is_terminal() {
                    return Err(anyhow!(
                        "stdin is a terminal; pipe landmark frames into --gesture stdin"
                    ));
                }
                // A blocked stdin read cannot be interrupted, so this thread is detached.
                Ok(Some(Self::spawn("stdin", false, |prod, stop| {
                    stdin_loop(prod, stop)
                })?))
            }
            GestureSource::File => {
                let path = opts
                    .file
                    .as_deref()
                    .ok_or_else(|| anyhow!("--gesture file requires --gesture-file <path>"))?;
                let events = read_events(path)?;
                let looping = opts.looping;
                Ok(Some(Self::spawn("file", true, move |prod, stop| {
                    replay_loop(&events, prod, stop, period, looping)
                })?))
            }
        }
    }

    /// Runs a caller-supplied detector on its own thread. `body` should push
    /// events until `stop` is set; the feed joins it on drop.
    pub fn custom<F>(label: &'static str, body: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut ringbuf::HeapProd<GestureEvent>, &AtomicBool) + Send + 'static,
    {
        Self::spawn(label, true, body)
    }

    fn spawn<F>(label: &'static str, join_on_drop: bool, body: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&mut ringbuf::HeapProd<GestureEvent>, &AtomicBool) + Send + 'static,
    {
        let rb = HeapRb::<GestureEvent>::new(QUEUE_CAPACITY);
        let (mut prod, cons) = rb.split();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("landmarks-{label}"))
            .spawn(move || body(&mut prod, &stop_for_thread))
            .context("spawn landmark feed thread")?;

        log::info!("landmark feed started (source={label})");
        Ok(Self {
            cons,
            stop,
            handle: Some(handle),
            join_on_drop,
            label,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Pops the next pending event without blocking.
    pub fn poll(&mut self) -> Option<GestureEvent> {
        self.cons.try_pop()
    }

    /// True once the producer thread has returned (file replay done, stdin closed).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stops the producer and waits for it. Fails if the thread panicked.
    pub fn stop(mut self) -> anyhow::Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.stop.store(true, Ordering::Relaxed);
        let Some(h) = self.handle.take() else {
            return Ok(());
        };
        if !self.join_on_drop && !h.is_finished() {
            return Ok(());
        }
        h.join()
            .map_err(|_| anyhow!("landmark feed thread ({}) panicked", self.label))
    }
}

impl Drop for LandmarkFeed {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("{e}");
        }
    }
}

/// Parses a recording once; comment lines produce nothing.
fn read_events(path: &Path) -> anyhow::Result<Vec<GestureEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read landmark file {}", path.display()))?;
    Ok(text
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| line_event(raw, idx + 1))
        .collect())
}

fn push(prod: &mut ringbuf::HeapProd<GestureEvent>, ev: GestureEvent) {
    if prod.try_push(ev).is_err() {
        log::trace!("landmark queue full; dropping frame");
    }
}

fn line_event(raw: &str, line: usize) -> Option<GestureEvent> {
    match parse_frame_line(raw, line) {
        Ok(FrameLine::Skip) => None,
        Ok(FrameLine::NoHand) => Some(GestureEvent::Frame(None)),
        Ok(FrameLine::Hand(hand)) => Some(GestureEvent::Frame(Some(hand))),
        Err(e) => {
            log::warn!("{e}");
            Some(GestureEvent::Fault(e.to_string()))
        }
    }
}

fn synthetic_loop(prod: &mut ringbuf::HeapProd<GestureEvent>, stop: &AtomicBool, period: Duration) {
    let start = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let t = start.elapsed().as_secs_f32();
        push(prod, GestureEvent::Frame(synthetic_frame(t)));
        thread::sleep(period);
    }
}

fn stdin_loop(prod: &mut ringbuf::HeapProd<GestureEvent>, stop: &AtomicBool) {
    let stdin = std::io::stdin();
    for (idx, line) in stdin.lock().lines().enumerate() {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        match line {
            Ok(raw) => {
                if let Some(ev) = line_event(&raw, idx + 1) {
                    push(prod, ev);
                }
            }
            Err(e) => {
                push(prod, GestureEvent::Fault(format!("stdin read failed: {e}")));
                return;
            }
        }
    }
    log::info!("landmark stdin closed");
}

fn replay_loop(
    events: &[GestureEvent],
    prod: &mut ringbuf::HeapProd<GestureEvent>,
    stop: &AtomicBool,
    period: Duration,
    looping: bool,
) {
    if events.is_empty() {
        log::warn!("landmark file holds no frames; nothing to replay");
        return;
    }
    loop {
        for ev in events {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            push(prod, ev.clone());
            thread::sleep(period);
        }
        if !looping {
            log::info!("landmark file replay finished");
            return;
        }
    }
}
