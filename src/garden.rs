//! A collection of plants sharing one environment and one seeded generator.

use crate::blueprint::BlueprintLibrary;
use crate::error::BlueprintError;
use crate::growth::{Environment, GrowthReport};
use crate::plant::Plant;
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// Plants grown side by side from named blueprints.
///
/// All plants draw from the garden's single generator, so a garden built with
/// the same seed and driven the same way grows identically.
#[derive(Clone, Debug)]
pub struct Garden {
    library: BlueprintLibrary,
    plants: Vec<Plant>,
    environment: Environment,
    rng: StdRng,
}

impl Garden {
    pub fn new(library: BlueprintLibrary, seed: u64) -> Self {
        Self {
            library,
            plants: Vec::new(),
            environment: Environment::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A garden stocked with the built-in presets.
    pub fn with_presets(seed: u64) -> Self {
        Self::new(BlueprintLibrary::with_presets(), seed)
    }

    pub fn library(&self) -> &BlueprintLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut BlueprintLibrary {
        &mut self.library
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_sun_position(&mut self, sun_position: Vec3) {
        self.environment.sun_position = sun_position;
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Plants a `blueprint` at ground coordinates `(x, z)` and returns its index.
    pub fn plant(&mut self, blueprint: &str, x: f32, z: f32) -> Result<usize, BlueprintError> {
        let blueprint = self.library.preset(blueprint)?;
        self.plants
            .push(Plant::new(blueprint, Vec3::new(x, 0.0, z)));
        Ok(self.plants.len() - 1)
    }

    /// Removes the plant at `index`, shifting later ones down.
    pub fn remove(&mut self, index: usize) -> Option<Plant> {
        (index < self.plants.len()).then(|| self.plants.remove(index))
    }

    /// Advances every plant by one tick.
    pub fn update_all(&mut self) -> GrowthReport {
        let mut report = GrowthReport::default();
        for plant in &mut self.plants {
            report += plant.update(&self.environment, &mut self.rng);
        }
        debug!(
            plants = self.plants.len(),
            segments = report.segments,
            "garden updated"
        );
        report
    }
}
