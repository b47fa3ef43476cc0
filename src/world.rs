use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    hex::{AxialCoord, CubeCoord, HexLayout, OffsetCoord},
    noise_field::{Band, NoiseField},
    rules::{ImprovementId, Placeable, ResourceId, RuleEngine},
    tiles::{Feature, TileKindId, TileTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub position: OffsetCoord,
    pub band: Band,
    pub kind: TileKindId,
    pub feature: Feature,
    pub latitude: f32,
    pub longitude: f32,
    pub chunk: ChunkPos,
    pub resource: Option<ResourceId>,
    pub improvement: Option<ImprovementId>,
}

impl Cell {
    pub fn height(&self) -> f32 {
        self.band.level()
    }

    pub fn cube(&self) -> CubeCoord {
        self.position.to_cube()
    }

    pub fn axial(&self) -> AxialCoord {
        self.position.to_axial()
    }

    pub fn offset(&self) -> OffsetCoord {
        self.position
    }
}

impl Placeable for Cell {
    fn kind(&self) -> TileKindId {
        self.kind
    }

    fn feature(&self) -> Feature {
        self.feature
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no improvement named '{0}'")]
    UnknownImprovement(String),
    #[error("({col}, {row}) is not on the map")]
    OffMap { col: i32, row: i32 },
    #[error("'{name}' cannot be built on ({col}, {row})")]
    RuleRejected { name: String, col: i32, row: i32 },
}

/// A generated map: classified cells plus the tile table that names their kinds.
pub struct World {
    seed: u64,
    layout: HexLayout,
    chunk_size: u32,
    tiles: TileTable,
    pub(crate) field: Option<NoiseField>,
    pub(crate) cells: Vec<Cell>,
}

impl World {
    pub(crate) fn new(
        seed: u64,
        layout: HexLayout,
        chunk_size: u32,
        tiles: TileTable,
    ) -> Self {
        Self {
            seed,
            layout,
            chunk_size,
            tiles,
            field: None,
            cells: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn tiles(&self) -> &TileTable {
        &self.tiles
    }

    /// The elevation field the cells were classified from.
    pub fn field(&self) -> Option<&NoiseField> {
        self.field.as_ref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, position: OffsetCoord) -> Option<&Cell> {
        self.layout
            .index_of(position)
            .and_then(|index| self.cells.get(index))
    }

    pub fn cell_mut(&mut self, position: OffsetCoord) -> Option<&mut Cell> {
        self.layout
            .index_of(position)
            .and_then(|index| self.cells.get_mut(index))
    }

    /// Neighbouring cells in direction order; `None` past the map edge.
    pub fn neighbors(&self, position: OffsetCoord) -> [Option<&Cell>; 6] {
        self.layout
            .neighbors(position)
            .map(|n| n.and_then(|coord| self.cell(coord)))
    }

    pub fn chunk_of(&self, position: OffsetCoord) -> ChunkPos {
        ChunkPos {
            x: position.col as u32 / self.chunk_size,
            y: position.row as u32 / self.chunk_size,
        }
    }

    pub fn chunk_counts(&self) -> (u32, u32) {
        (
            self.width() / self.chunk_size,
            self.height() / self.chunk_size,
        )
    }

    pub fn chunk_cells(&self, chunk: ChunkPos) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(move |cell| cell.chunk == chunk)
    }

    pub fn count_kind(&self, kind: TileKindId) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }

    pub fn count_resource(&self, resource: ResourceId) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.resource == Some(resource))
            .count()
    }

    /// Builds the named improvement if its rule accepts the cell, replacing any existing one.
    pub fn try_add_improvement(
        &mut self,
        rules: &RuleEngine,
        position: OffsetCoord,
        name: &str,
    ) -> Result<ImprovementId, PlacementError> {
        let id = rules
            .improvement_id(name)
            .ok_or_else(|| PlacementError::UnknownImprovement(name.to_string()))?;
        let index = self
            .layout
            .index_of(position)
            .ok_or(PlacementError::OffMap {
                col: position.col,
                row: position.row,
            })?;
        if !rules.can_improve(&self.cells[index], id) {
            return Err(PlacementError::RuleRejected {
                name: name.to_string(),
                col: position.col,
                row: position.row,
            });
        }
        self.cells[index].improvement = Some(id);
        Ok(id)
    }

    pub fn remove_improvement(&mut self, position: OffsetCoord) -> Option<ImprovementId> {
        self.cell_mut(position)
            .and_then(|cell| cell.improvement.take())
    }
}
