pub mod classifier;
pub mod engine;
pub mod export;
pub mod hex;
pub mod noise_field;
pub mod rng;
pub mod rules;
pub mod scenario;
pub mod systems;
pub mod tiles;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings, StageReport};
pub use scenario::{Scenario, ScenarioError, ScenarioLoader};
pub use world::{Cell, World};
