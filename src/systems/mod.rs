mod classification;
mod resources;
mod terrain;

pub use classification::ClassificationSystem;
pub use resources::ResourceSystem;
pub use terrain::{TerrainConfig, TerrainSystem};
