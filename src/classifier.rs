//! Tile classification - elevation band and latitude to terrain kind and feature

use log::warn;
use rand::Rng;

use crate::noise_field::NoiseField;
use crate::tiles::{Feature, Special, TileKindId, TileTable};

pub const DEFAULT_JITTER: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: TileKindId,
    pub feature: Feature,
    pub latitude: f32,
    pub longitude: f32,
}

pub struct TileClassifier {
    table: TileTable,
    jitter: f32,
}

impl TileClassifier {
    pub fn new(table: TileTable, jitter: f32) -> Self {
        Self { table, jitter }
    }

    pub fn table(&self) -> &TileTable {
        &self.table
    }

    /// Edge cells are forced flat. The first and last rows are always edges;
    /// the first and last columns only when the field does not wrap.
    pub fn classify<R: Rng>(
        &self,
        x: u32,
        y: u32,
        field: &NoiseField,
        rng: &mut R,
    ) -> Classification {
        let (width, height) = (field.width(), field.height());
        let latitude = self.jittered(axis_position(y, height), rng);
        let longitude = self.jittered(axis_position(x, width), rng);
        let band = field.band(x, y);

        let mut feature = Feature::from_band(band);
        let column_edge = !field.wraps() && (x == 0 || x + 1 == width);
        if column_edge || y == 0 || y + 1 == height {
            feature = Feature::Flat;
        }

        let kind = if band.is_water() {
            let coastal = field.moore_neighbors(x, y).any(|b| !b.is_water());
            let special = if coastal {
                Special::Shore
            } else {
                Special::Ocean
            };
            self.table.special(special).unwrap_or_else(|| {
                warn!("no {special:?} kind authored; ({x}, {y}) uses the fallback kind");
                self.table.fallback()
            })
        } else {
            let mountain = match feature {
                Feature::Mountain => self.table.special(Special::Mountain),
                _ => None,
            };
            mountain
                .or_else(|| self.table.by_latitude(latitude))
                .unwrap_or_else(|| {
                    warn!(
                        "no tile kind covers latitude {latitude:.3} at ({x}, {y}); using {}",
                        self.table.name_of(self.table.fallback())
                    );
                    self.table.fallback()
                })
        };

        Classification {
            kind,
            feature,
            latitude,
            longitude,
        }
    }

    fn jittered<R: Rng>(&self, value: f32, rng: &mut R) -> f32 {
        if self.jitter <= 0.0 {
            return value.clamp(0.0, 1.0);
        }
        let factor = rng.gen_range(1.0 - self.jitter..=1.0 + self.jitter);
        (value * factor).clamp(0.0, 1.0)
    }
}

/// Distance from the middle of an axis, normalised so the middle is 0 and the ends are 1.
fn axis_position(index: u32, extent: u32) -> f32 {
    let half = extent as f32 / 2.0;
    ((half - index as f32).abs() / half).clamp(0.0, 1.0)
}
