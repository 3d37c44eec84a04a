use crate::morph::{AnimationState, MorphEngine, TargetBuffer};
use crate::particles::ParticleTable;
use crate::shapes::ShapeKind;

/// Everything the animation needs for one cloud: the stable table, the
/// target and live buffers, the animation state and the RNG that feeds
/// secondary texture.
pub struct ParticleScene {
    table: ParticleTable,
    targets: TargetBuffer,
    morph: MorphEngine,
    pub state: AnimationState,
    rng: fastrand::Rng,
    ticks: u64,
}

impl ParticleScene {
    pub fn new(particles: usize, shape: ShapeKind, morph_speed: f32, mut rng: fastrand::Rng) -> Self {
        let table = ParticleTable::build(particles, &mut rng);
        let morph = MorphEngine::new(table.params(), morph_speed);
        let targets = TargetBuffer::new(table.len());
        log::info!(
            "scene ready: {} particles, shape={}, morph_speed={:.3}",
            table.len(),
            shape,
            morph.speed()
        );
        Self {
            table,
            targets,
            morph,
            state: AnimationState::new(shape),
            rng,
            ticks: 0,
        }
    }

    pub fn with_seed(particles: usize, shape: ShapeKind, morph_speed: f32, seed: u64) -> Self {
        Self::new(particles, shape, morph_speed, fastrand::Rng::with_seed(seed))
    }

    /// Recompute every target for the current state, then morph one step.
    pub fn tick(&mut self) {
        self.refresh_targets();
        self.morph.step(&self.targets, &mut self.state, &mut self.rng);
        self.ticks += 1;
    }

    pub fn refresh_targets(&mut self) {
        self.targets
            .recompute(&self.state, self.table.params(), &mut self.rng);
    }

    pub fn table(&self) -> &ParticleTable {
        &self.table
    }

    pub fn targets(&self) -> &TargetBuffer {
        &self.targets
    }

    pub fn positions(&self) -> &[f32] {
        self.morph.positions()
    }

    pub fn colors(&self) -> &[f32] {
        self.morph.colors()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
