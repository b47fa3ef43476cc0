use anyhow::{anyhow, Result};

use crate::{
    classifier::TileClassifier,
    engine::{System, SystemContext},
    hex::OffsetCoord,
    rng::SystemRng,
    world::{Cell, World},
};

/// Turns the elevation field into classified cells, row by row.
pub struct ClassificationSystem {
    classifier: TileClassifier,
}

impl ClassificationSystem {
    pub fn new(classifier: TileClassifier) -> Self {
        Self { classifier }
    }
}

impl System for ClassificationSystem {
    fn name(&self) -> &str {
        "classification"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let field = world
            .field
            .as_ref()
            .ok_or_else(|| anyhow!("classification needs the terrain system to run first"))?;
        let mut cells = Vec::with_capacity(field.width() as usize * field.height() as usize);
        for y in 0..field.height() {
            for x in 0..field.width() {
                let result = self.classifier.classify(x, y, field, rng);
                let position = OffsetCoord::new(x as i32, y as i32);
                cells.push(Cell {
                    position,
                    band: field.band(x, y),
                    kind: result.kind,
                    feature: result.feature,
                    latitude: result.latitude,
                    longitude: result.longitude,
                    chunk: world.chunk_of(position),
                    resource: None,
                    improvement: None,
                });
            }
        }
        world.cells = cells;
        Ok(())
    }
}
