use crate::particles::ParticleParams;
use glam::Vec3;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Radius used by the initial cloud before any target has been reached.
pub const START_SPHERE_RADIUS: f32 = 60.0;

const SPHERE_RADIUS: f32 = 25.0;
const FIREWORKS_RADIUS: f32 = 35.0;
const HEART_THICKNESS: f32 = 4.0;

const FLOWER_K: f32 = 2.5;
const FLOWER_BASE: f32 = 8.0;
const FLOWER_PETAL: f32 = 18.0;

const SATURN_PLANET: f32 = 10.0;
const SATURN_RING_INNER: f32 = 14.0;
const SATURN_RING_OUTER: f32 = 26.0;
const SATURN_RING_THICKNESS: f32 = 1.5;
const SATURN_TILT_DEG: f32 = 25.0;

const GALAXY_BULGE_SHARE: f32 = 0.15;
const GALAXY_BULGE_RADIUS: f32 = 6.0;
const GALAXY_ARM_A: f32 = 4.0;
const GALAXY_ARM_B: f32 = 0.2;
const GALAXY_EXTENT: f32 = 40.0;
const GALAXY_TILT_DEG: f32 = -60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Heart,
    Flower,
    Saturn,
    MilkyWay,
    Fireworks,
}

impl ShapeKind {
    /// Timer cycle order.
    pub const fn all() -> [Self; 6] {
        [
            Self::Fireworks,
            Self::Heart,
            Self::Flower,
            Self::Saturn,
            Self::MilkyWay,
            Self::Sphere,
        ]
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&k| k == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&k| k == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Heart => "heart",
            Self::Flower => "flower",
            Self::Saturn => "saturn",
            Self::MilkyWay => "milkyway",
            Self::Fireworks => "fireworks",
        }
    }

    /// Upper-case label for status text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sphere => "SPHERE",
            Self::Heart => "HEART",
            Self::Flower => "FLOWER",
            Self::Saturn => "SATURN",
            Self::MilkyWay => "MILKY WAY",
            Self::Fireworks => "FIREWORKS",
        }
    }

    /// Shapes that carry their own per-particle color.
    pub fn has_intrinsic_color(self) -> bool {
        matches!(self, Self::MilkyWay)
    }

    /// Parses `name`, substituting Fireworks for anything unrecognized.
    pub fn resolve(name: &str) -> Self {
        match name.parse::<Self>() {
            Ok(kind) => kind,
            Err(err) => {
                log::warn!("{err}; falling back to fireworks");
                Self::Fireworks
            }
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .trim()
            .to_ascii_lowercase()
            .replace(|c: char| c == ' ' || c == '-' || c == '_', "");
        match key.as_str() {
            "sphere" | "globe" => Ok(Self::Sphere),
            "heart" => Ok(Self::Heart),
            "flower" | "rose" => Ok(Self::Flower),
            "saturn" | "planet" => Ok(Self::Saturn),
            "milkyway" | "galaxy" => Ok(Self::MilkyWay),
            "fireworks" | "firework" => Ok(Self::Fireworks),
            _ => Err(ShapeError::InvalidShapeKind(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    InvalidShapeKind(String),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShapeKind(name) => write!(f, "invalid shape kind: {name:?}"),
        }
    }
}

impl std::error::Error for ShapeError {}

/// One sampler evaluation. `color` is `None` unless the shape defines its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSample {
    pub position: Vec3,
    pub color: Option<Vec3>,
}

impl ShapeSample {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            color: None,
        }
    }
}

/// Evaluates the sampler for `kind`. `rng` only feeds secondary texture
/// (galaxy bulge concentration, arm scatter and star tint).
pub fn sample(
    kind: ShapeKind,
    scale: f32,
    params: &ParticleParams,
    rng: &mut fastrand::Rng,
) -> ShapeSample {
    match kind {
        ShapeKind::Sphere => ShapeSample::at(sphere(SPHERE_RADIUS * scale * 0.8, params)),
        ShapeKind::Heart => ShapeSample::at(heart(scale, params)),
        ShapeKind::Flower => ShapeSample::at(flower(scale, params)),
        ShapeKind::Saturn => ShapeSample::at(saturn(scale, params)),
        ShapeKind::MilkyWay => milky_way(scale, params, rng),
        ShapeKind::Fireworks => ShapeSample::at(fireworks(scale, params)),
    }
}

/// Uniform-area point on a sphere of radius `r`.
pub fn sphere(r: f32, params: &ParticleParams) -> Vec3 {
    let theta = params.t;
    let phi = (2.0 * params.u - 1.0).clamp(-1.0, 1.0).acos();
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

pub fn heart(scale: f32, params: &ParticleParams) -> Vec3 {
    let s = scale * 0.8;
    let t = params.t;
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    Vec3::new(x * s, y * s, params.offset * HEART_THICKNESS * s)
}

pub fn flower(scale: f32, params: &ParticleParams) -> Vec3 {
    let s = scale * 0.8;
    let theta = params.t;
    let petal = (FLOWER_K * theta).cos().abs();
    let r_base = FLOWER_BASE * s;
    let r_petal = FLOWER_PETAL * s;
    let r = (r_base + r_petal * petal) * params.u.sqrt();
    // Dome: height grows with the square of normalized radius.
    let norm = r / (r_base + r_petal);
    Vec3::new(r * theta.cos(), r * theta.sin(), norm * norm * 10.0 * s * 0.5)
}

pub fn saturn(scale: f32, params: &ParticleParams) -> Vec3 {
    let s = scale * 0.8;
    if params.v < 0.5 {
        let theta = params.t;
        let phi = params.offset.clamp(-1.0, 1.0).acos();
        let r = SATURN_PLANET * s;
        return Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        );
    }

    let inner = SATURN_RING_INNER * s;
    let outer = SATURN_RING_OUTER * s;
    let radius = inner + params.u.sqrt() * (outer - inner);
    let px = radius * params.t.cos();
    let py = params.offset * SATURN_RING_THICKNESS;
    let pz = radius * params.t.sin();
    let (y, z) = rotate_x(py, pz, SATURN_TILT_DEG.to_radians());
    Vec3::new(px, y, z)
}

pub fn milky_way(scale: f32, params: &ParticleParams, rng: &mut fastrand::Rng) -> ShapeSample {
    let s = scale * 0.8;

    if params.u < GALAXY_BULGE_SHARE {
        let theta = params.t;
        let phi = (2.0 * (params.u / GALAXY_BULGE_SHARE) - 1.0)
            .clamp(-1.0, 1.0)
            .acos();
        let radius = GALAXY_BULGE_RADIUS * s * rng.f32().powf(0.3);
        let position = Vec3::new(
            radius * 0.6 * phi.sin() * theta.cos(),
            radius * 0.4 * phi.sin() * theta.sin(),
            radius * 0.4 * phi.cos(),
        );
        let color = Vec3::new(1.0, 0.9, 0.6 + rng.f32() * 0.4);
        return ShapeSample {
            position,
            color: Some(color),
        };
    }

    let arm = (params.v * 2.0).floor() * PI;
    let spiral = params.t * 2.0;
    let dist = GALAXY_ARM_A * s * (GALAXY_ARM_B * spiral).exp();
    let scatter = params.offset * dist * 0.15 + (rng.f32() - 0.5) * 2.0;
    let theta = spiral + arm + params.offset * 0.2;

    let raw_x = (dist + scatter) * theta.cos();
    let raw_y = (dist + scatter) * theta.sin();
    let raw_z = (rng.f32() - 0.5) * (1.0 + dist * 0.1) * s;
    let (y, z) = rotate_x(raw_y, raw_z, GALAXY_TILT_DEG.to_radians());

    let dn = (dist / (GALAXY_EXTENT * s)).min(1.0);
    let color = Vec3::new(
        0.2 + (1.0 - dn) * 0.3 + (rng.f32() - 0.5) * 0.1,
        0.1 + (1.0 - dn) * 0.4 + (rng.f32() - 0.5) * 0.1,
        0.6 + dn * 0.4 + (rng.f32() - 0.5) * 0.1,
    );

    ShapeSample {
        position: Vec3::new(raw_x, y, z),
        color: Some(color),
    }
}

pub fn fireworks(scale: f32, params: &ParticleParams) -> Vec3 {
    sphere(FIREWORKS_RADIUS * scale * 0.8, params)
}

#[inline]
fn rotate_x(y: f32, z: f32, angle: f32) -> (f32, f32) {
    let (sa, ca) = angle.sin_cos();
    (y * ca - z * sa, y * sa + z * ca)
}
