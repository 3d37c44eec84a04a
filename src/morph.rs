use crate::particles::ParticleParams;
use crate::shapes::{self, ShapeError, ShapeKind, START_SPHERE_RADIUS};
use glam::Vec3;

pub const DEFAULT_MORPH_SPEED: f32 = 0.05;
pub const SCALE_MIN: f32 = 0.5;
pub const SCALE_MAX: f32 = 3.0;

const FIREWORKS_JITTER: f32 = 0.1;
const SPIN_PER_TICK: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// The single mutable description of what the cloud should look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub active_shape: ShapeKind,
    pub scale_factor: f32,
    pub base_color: Vec3,
    pub rotation: Rotation,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(ShapeKind::Fireworks)
    }
}

impl AnimationState {
    pub fn new(active_shape: ShapeKind) -> Self {
        Self {
            active_shape,
            scale_factor: 1.0,
            base_color: Vec3::new(1.0, 0.5, 0.0),
            rotation: Rotation::default(),
        }
    }

    /// Selects a shape by name. Unknown names switch to Fireworks and report
    /// the error so the caller can surface it.
    pub fn select_shape_named(&mut self, name: &str) -> Result<(), ShapeError> {
        match name.parse::<ShapeKind>() {
            Ok(kind) => {
                self.active_shape = kind;
                Ok(())
            }
            Err(err) => {
                log::warn!("{err}; falling back to fireworks");
                self.active_shape = ShapeKind::Fireworks;
                Err(err)
            }
        }
    }

    pub fn nudge_scale(&mut self, delta: f32) {
        self.scale_factor = (self.scale_factor + delta).clamp(SCALE_MIN, SCALE_MAX);
    }
}

/// Per-particle target positions and colors, rebuilt from scratch every tick.
#[derive(Debug, Clone)]
pub struct TargetBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl TargetBuffer {
    pub fn new(n: usize) -> Self {
        Self {
            positions: vec![0.0; n * 3],
            colors: vec![0.0; n * 3],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn recompute(
        &mut self,
        state: &AnimationState,
        params: &[ParticleParams],
        rng: &mut fastrand::Rng,
    ) {
        let n = params.len();
        if self.positions.len() != n * 3 {
            self.positions.resize(n * 3, 0.0);
            self.colors.resize(n * 3, 0.0);
        }

        let shape = state.active_shape;
        let scale = state.scale_factor;
        for (i, p) in params.iter().enumerate() {
            let sample = shapes::sample(shape, scale, p, rng);
            let color = sample.color.unwrap_or(state.base_color);
            let idx = i * 3;
            self.positions[idx..idx + 3].copy_from_slice(&sample.position.to_array());
            self.colors[idx..idx + 3].copy_from_slice(&color.to_array());
        }
    }
}

/// Live particle buffers, smoothed toward the targets one tick at a time.
#[derive(Debug, Clone)]
pub struct MorphEngine {
    positions: Vec<f32>,
    colors: Vec<f32>,
    speed: f32,
}

impl MorphEngine {
    /// Starts the cloud as a white sphere so the first morph is visible.
    pub fn new(params: &[ParticleParams], speed: f32) -> Self {
        let mut positions = Vec::with_capacity(params.len() * 3);
        for p in params {
            positions.extend_from_slice(&shapes::sphere(START_SPHERE_RADIUS, p).to_array());
        }
        Self {
            colors: vec![1.0; positions.len()],
            positions,
            speed: clamp_speed(speed),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn step(&mut self, targets: &TargetBuffer, state: &mut AnimationState, rng: &mut fastrand::Rng) {
        let k = self.speed;
        for (pos, target) in self.positions.iter_mut().zip(targets.positions()) {
            *pos += (target - *pos) * k;
        }
        for (col, target) in self.colors.iter_mut().zip(targets.colors()) {
            *col += (target - *col) * k;
        }

        if state.active_shape == ShapeKind::Fireworks {
            for pos in &mut self.positions {
                *pos += (rng.f32() - 0.5) * FIREWORKS_JITTER;
            }
        }

        state.rotation.z += SPIN_PER_TICK;
    }
}

fn clamp_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return DEFAULT_MORPH_SPEED;
    }
    speed.clamp(1e-4, 0.999)
}
