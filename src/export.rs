//! JSON hand-off of a generated map to rendering and tooling layers

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{rules::RuleEngine, tiles::Feature, world::World};

#[derive(Debug, Serialize, Deserialize)]
pub struct CellExport {
    pub offset: [i32; 2],
    pub axial: [i32; 2],
    pub cube: [i32; 3],
    pub chunk: [u32; 2],
    pub height: f32,
    pub kind: String,
    pub feature: Feature,
    pub latitude: f32,
    pub longitude: f32,
    pub resource: Option<String>,
    pub improvement: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapExport {
    pub map: String,
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub chunk_size: u32,
    pub wrap: bool,
    pub cells: Vec<CellExport>,
}

impl MapExport {
    pub fn from_world(map: &str, world: &World, rules: &RuleEngine) -> Self {
        let tiles = world.tiles();
        let cells = world
            .cells()
            .iter()
            .map(|cell| {
                let cube = cell.cube();
                let axial = cell.axial();
                CellExport {
                    offset: [cell.position.col, cell.position.row],
                    axial: [axial.q, axial.r],
                    cube: [cube.x(), cube.y(), cube.z()],
                    chunk: [cell.chunk.x, cell.chunk.y],
                    height: cell.height(),
                    kind: tiles.name_of(cell.kind).to_string(),
                    feature: cell.feature,
                    latitude: cell.latitude,
                    longitude: cell.longitude,
                    resource: cell.resource.map(|id| rules.resource(id).name.clone()),
                    improvement: cell.improvement.map(|id| rules.improvement(id).name.clone()),
                }
            })
            .collect();
        Self {
            map: map.to_string(),
            seed: world.seed(),
            generated_at: Utc::now(),
            width: world.width(),
            height: world.height(),
            chunk_size: world.chunk_size(),
            wrap: world.layout().wrap,
            cells,
        }
    }
}

pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Writes `<output_dir>/<map>/seed_<seed>.json` and returns its path.
    pub fn write(&self, map: &str, world: &World, rules: &RuleEngine) -> Result<PathBuf> {
        let dir = self.output_dir.join(map);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
        let path = dir.join(format!("seed_{}.json", world.seed()));
        let export = MapExport::from_world(map, world, rules);
        let json = serde_json::to_string_pretty(&export)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<MapExport> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read export {}", path.display()))?;
        Ok(serde_json::from_str(&data)?)
    }
}
