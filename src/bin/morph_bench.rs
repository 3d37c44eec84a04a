use std::time::Instant;

use anyhow::{anyhow, Result};
use morph_cloud::gesture;
use morph_cloud::input::synthetic_frame;
use morph_cloud::raster::Rasterizer;
use morph_cloud::scene::ParticleScene;
use morph_cloud::shapes::ShapeKind;

#[derive(Debug, Clone, PartialEq)]
struct Args {
    particles: usize,
    ticks: usize,
    w: usize,
    h: usize,
    seed: u64,
    raster: bool,
    gestures: bool,
    max_ms: Option<f64>,
}

fn parse_args_from(argv: Vec<String>) -> Args {
    let mut args = Args {
        particles: 15_000,
        ticks: 240,
        w: 160,
        h: 88,
        seed: 7,
        raster: true,
        gestures: false,
        max_ms: None,
    };

    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--particles", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.particles = n.max(1);
                }
                i += 2;
            }
            ("--ticks", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.ticks = n.max(1);
                }
                i += 2;
            }
            ("--w", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.w = n.max(1);
                }
                i += 2;
            }
            ("--h", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.h = n.max(1);
                }
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--no-raster", _) => {
                args.raster = false;
                i += 1;
            }
            ("--gestures", _) => {
                args.gestures = true;
                i += 1;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = Some(v.max(0.1));
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }
    args
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timing {
    mean_ms: f64,
    p95_ms: f64,
    max_ms: f64,
}

fn summarize(samples: &mut [f64]) -> Timing {
    if samples.is_empty() {
        return Timing {
            mean_ms: 0.0,
            p95_ms: 0.0,
            max_ms: 0.0,
        };
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean_ms = samples.iter().sum::<f64>() / samples.len() as f64;
    let idx = ((samples.len() as f64 - 1.0) * 0.95).round() as usize;
    Timing {
        mean_ms,
        p95_ms: samples[idx.min(samples.len() - 1)],
        max_ms: samples[samples.len() - 1],
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = parse_args_from(std::env::args().skip(1).collect());
    println!(
        "morph_bench: particles={} ticks/shape={} surface={}x{} raster={} gestures={}",
        args.particles, args.ticks, args.w, args.h, args.raster, args.gestures
    );

    let mut scene = ParticleScene::with_seed(args.particles, ShapeKind::Fireworks, 0.05, args.seed);
    let mut raster = Rasterizer::new(args.w, args.h, 0.35);
    let mut worst = 0.0f64;

    for kind in ShapeKind::all() {
        scene.state.active_shape = kind;
        let mut samples = Vec::with_capacity(args.ticks);
        for step in 0..args.ticks {
            let start = Instant::now();
            if args.gestures {
                let hand = synthetic_frame(step as f32 / 30.0);
                let update = gesture::map(hand.as_ref());
                let shape = scene.state.active_shape;
                gesture::apply(&update, &mut scene.state);
                // Keep the shape under test; only scale, color and rotation follow the hand.
                scene.state.active_shape = shape;
            }
            scene.tick();
            if args.raster {
                let px = raster.draw(scene.positions(), scene.colors(), scene.state.rotation);
                std::hint::black_box(px);
            }
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        let t = summarize(&mut samples);
        worst = worst.max(t.p95_ms);
        println!(
            "  {:<10} mean {:>7.3}ms  p95 {:>7.3}ms  max {:>7.3}ms",
            kind.name(),
            t.mean_ms,
            t.p95_ms,
            t.max_ms
        );
    }

    if let Some(limit) = args.max_ms {
        if worst > limit {
            return Err(anyhow!("p95 tick time {worst:.3}ms exceeds --max-ms {limit:.3}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args_defaults_are_stable() {
        let args = parse_args_from(Vec::new());
        assert_eq!(args.particles, 15_000);
        assert_eq!(args.ticks, 240);
        assert!(args.raster);
        assert!(!args.gestures);
        assert_eq!(args.max_ms, None);
    }

    #[test]
    fn parse_args_clamps_ranges() {
        let args = parse_args_from(
            ["--particles", "0", "--ticks", "0", "--max-ms", "0", "--no-raster"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        assert_eq!(args.particles, 1);
        assert_eq!(args.ticks, 1);
        assert_eq!(args.max_ms, Some(0.1));
        assert!(!args.raster);
    }

    #[test]
    fn summarize_reports_mean_p95_and_max() {
        let mut samples = vec![4.0, 1.0, 3.0, 2.0];
        let t = summarize(&mut samples);
        assert!((t.mean_ms - 2.5).abs() < 1e-9);
        assert!((t.p95_ms - 4.0).abs() < 1e-9);
        assert!((t.max_ms - 4.0).abs() < 1e-9);
        assert_eq!(summarize(&mut []).max_ms, 0.0);
    }
}
