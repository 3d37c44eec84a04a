use std::f32::consts::TAU;

/// Per-particle random parameters shared by every shape sampler.
///
/// These are drawn once and never reassigned, so particle `i` keeps a consistent
/// relative place in every shape and morphs smoothly instead of reshuffling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    /// Angle in `[0, 2π)`.
    pub t: f32,
    /// Uniform in `[0, 1)`.
    pub u: f32,
    /// Uniform in `[0, 1)`.
    pub v: f32,
    /// `-1.0` or `+1.0`.
    pub sign: f32,
    /// Uniform in `[-1, 1)`.
    pub offset: f32,
}

impl ParticleParams {
    pub fn draw(rng: &mut fastrand::Rng) -> Self {
        Self {
            t: rng.f32() * TAU,
            u: rng.f32(),
            v: rng.f32(),
            sign: if rng.f32() > 0.5 { 1.0 } else { -1.0 },
            offset: (rng.f32() - 0.5) * 2.0,
        }
    }
}

/// Fixed-size, read-only table of [`ParticleParams`], indexed by particle.
#[derive(Debug, Clone)]
pub struct ParticleTable {
    params: Box<[ParticleParams]>,
}

impl ParticleTable {
    pub fn build(n: usize, rng: &mut fastrand::Rng) -> Self {
        let params = (0..n).map(|_| ParticleParams::draw(rng)).collect::<Vec<_>>();
        log::debug!("built particle table with {n} entries");
        Self {
            params: params.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> &[ParticleParams] {
        &self.params
    }

    pub fn get(&self, i: usize) -> Option<&ParticleParams> {
        self.params.get(i)
    }
}
