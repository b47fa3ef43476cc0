use std::time::Instant;

use anyhow::Result;
use log::{debug, info};

use crate::{
    classifier::TileClassifier,
    hex::HexLayout,
    rng::{RngManager, SystemRng},
    scenario::Scenario,
    systems::{ClassificationSystem, ResourceSystem, TerrainConfig, TerrainSystem},
    tiles::TileTable,
    world::World,
};

pub struct EngineSettings {
    pub map_name: String,
    /// Fixed seed; each generation draws a fresh one when `None`.
    pub seed: Option<u64>,
    pub layout: HexLayout,
    pub chunk_size: u32,
    pub tiles: TileTable,
}

impl EngineSettings {
    pub fn from_scenario(scenario: &Scenario) -> Result<Self> {
        scenario.validate()?;
        Ok(Self {
            map_name: scenario.name.clone(),
            seed: scenario.seed,
            layout: HexLayout::new(scenario.map.width, scenario.map.height, scenario.map.wrap),
            chunk_size: scenario.map.chunk_size,
            tiles: scenario.tile_table()?,
        })
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    /// Terrain, classification and resource placement, wired from a validated scenario.
    pub fn standard(scenario: &Scenario) -> Result<Self> {
        let settings = EngineSettings::from_scenario(scenario)?;
        let classifier =
            TileClassifier::new(settings.tiles.clone(), scenario.classification.jitter);
        let rules = scenario.rule_engine(&settings.tiles)?;
        Ok(Self::new(settings)
            .with_system(TerrainSystem::new(TerrainConfig::from(&scenario.noise)))
            .with_system(ClassificationSystem::new(classifier))
            .with_system(ResourceSystem::new(rules)))
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            systems: self.systems,
            settings: self.settings,
        }
    }
}

pub struct Engine {
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs every system once over a fresh world. Nothing carries over between calls.
    pub fn generate(&mut self) -> Result<World> {
        self.generate_with_hook(|_| {})
    }

    pub fn generate_with_seed(&mut self, seed: u64) -> Result<World> {
        self.run(seed, |_| {})
    }

    /// Like [`Engine::generate`], calling `hook` after each system in pipeline order.
    pub fn generate_with_hook<F>(&mut self, hook: F) -> Result<World>
    where
        F: FnMut(&StageReport),
    {
        let seed = match self.settings.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!("no seed configured for '{}', drew {seed}", self.settings.map_name);
                seed
            }
        };
        self.run(seed, hook)
    }

    fn run<F>(&mut self, seed: u64, mut hook: F) -> Result<World>
    where
        F: FnMut(&StageReport),
    {
        let started = Instant::now();
        let mut world = World::new(
            seed,
            self.settings.layout,
            self.settings.chunk_size,
            self.settings.tiles.clone(),
        );
        let mut rng = RngManager::new(seed);
        for system in &mut self.systems {
            let ctx = SystemContext {
                seed,
                map_name: &self.settings.map_name,
            };
            let start = Instant::now();
            let mut rng_stream = rng.stream(system.name());
            system.run(&ctx, &mut world, &mut rng_stream)?;
            let report = StageReport {
                name: system.name().to_string(),
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            };
            debug!("{} finished in {:.2} ms", report.name, report.duration_ms);
            hook(&report);
        }
        info!(
            "generated '{}' ({}x{}, seed {seed}) in {:.1} ms",
            self.settings.map_name,
            self.settings.layout.width,
            self.settings.layout.height,
            started.elapsed().as_secs_f64() * 1_000.0
        );
        Ok(world)
    }
}

#[derive(Clone, Debug)]
pub struct StageReport {
    pub name: String,
    pub duration_ms: f64,
}

pub struct SystemContext<'a> {
    pub seed: u64,
    pub map_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(&mut self, ctx: &SystemContext, world: &mut World, rng: &mut SystemRng<'_>)
        -> Result<()>;
}
