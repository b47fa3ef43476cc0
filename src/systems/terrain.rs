use anyhow::Result;
use log::debug;

use crate::{
    engine::{System, SystemContext},
    noise_field::{Band, NoiseField, NoiseParams},
    rng::SystemRng,
    scenario::NoiseConfig,
    world::World,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainConfig {
    pub scale: f64,
    pub amplitude: f32,
    pub smooth: bool,
}

impl From<&NoiseConfig> for TerrainConfig {
    fn from(config: &NoiseConfig) -> Self {
        Self {
            scale: config.scale,
            amplitude: config.amplitude,
            smooth: config.smooth,
        }
    }
}

/// Samples the elevation field and runs the single smoothing pass.
pub struct TerrainSystem {
    config: TerrainConfig,
}

impl TerrainSystem {
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    fn params(&self, seed: u64) -> NoiseParams {
        NoiseParams {
            scale: self.config.scale,
            amplitude: self.config.amplitude,
            // Perlin seeds are 32-bit; fold the high half in.
            seed: (seed ^ (seed >> 32)) as u32,
        }
    }
}

impl System for TerrainSystem {
    fn name(&self) -> &str {
        "terrain"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let layout = world.layout();
        let mut field = NoiseField::generate(layout.width, layout.height, self.params(ctx.seed))
            .with_wrap(layout.wrap);
        if self.config.smooth {
            field = field.smooth();
        }
        debug!(
            "terrain for '{}': {} water, {} land, {} hill, {} mountain",
            ctx.map_name,
            field.count(Band::Water),
            field.count(Band::Land),
            field.count(Band::Hill),
            field.count(Band::Mountain)
        );
        world.field = Some(field);
        world.cells.clear();
        Ok(())
    }
}
