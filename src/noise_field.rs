//! Elevation field - seeded gradient noise quantized into terrain bands

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

pub const WATER_THRESHOLD: f32 = 0.5;
pub const HILL_THRESHOLD: f32 = 1.0;
pub const MOUNTAIN_THRESHOLD: f32 = 1.15;

/// Continuous samples are stretched to `[0, DEFAULT_AMPLITUDE]` before quantizing.
pub const DEFAULT_AMPLITUDE: f32 = 1.4;

/// Neighbour count below which an interior cell counts as isolated during
/// smoothing. Cells on a clamped edge scale it to the neighbours they have.
const ISOLATION_LIMIT: usize = 3;

// Re-samples during smoothing are taken half a lattice step away so they do
// not repeat the first draw for that cell.
const RESAMPLE_OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Water,
    Land,
    Hill,
    Mountain,
}

impl Band {
    pub fn level(self) -> f32 {
        match self {
            Band::Water => 0.0,
            Band::Land => 0.5,
            Band::Hill => 0.8,
            Band::Mountain => 1.0,
        }
    }

    /// Maps a continuous sample (or an existing level) onto a band.
    pub fn from_value(value: f32) -> Band {
        // Levels map to themselves so quantizing twice is a no-op.
        for band in [Band::Water, Band::Land, Band::Hill, Band::Mountain] {
            if value == band.level() {
                return band;
            }
        }
        if value < WATER_THRESHOLD {
            Band::Water
        } else if value <= HILL_THRESHOLD {
            Band::Land
        } else if value < MOUNTAIN_THRESHOLD {
            Band::Hill
        } else {
            Band::Mountain
        }
    }

    pub fn is_water(self) -> bool {
        self == Band::Water
    }
}

pub fn quantize(value: f32) -> f32 {
    Band::from_value(value).level()
}

/// Parameters the field is sampled with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub scale: f64,
    pub amplitude: f32,
    pub seed: u32,
}

impl NoiseParams {
    pub fn new(scale: f64, seed: u32) -> Self {
        Self {
            scale,
            amplitude: DEFAULT_AMPLITUDE,
            seed,
        }
    }
}

pub struct NoiseField {
    width: u32,
    height: u32,
    wrap: bool,
    params: NoiseParams,
    perlin: Perlin,
    bands: Vec<Band>,
}

impl NoiseField {
    pub fn generate(width: u32, height: u32, params: NoiseParams) -> Self {
        let perlin = Perlin::new(params.seed);
        let mut bands = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let value = sample(&perlin, &params, x as f64, y as f64);
                bands.push(Band::from_value(value));
            }
        }
        Self {
            width,
            height,
            wrap: false,
            params,
            perlin,
            bands,
        }
    }

    /// Builds a field from already-quantized levels, row-major.
    pub fn from_levels(width: u32, height: u32, params: NoiseParams, levels: &[f32]) -> Self {
        assert_eq!(
            levels.len(),
            width as usize * height as usize,
            "level count must match field size"
        );
        Self {
            width,
            height,
            wrap: false,
            params,
            perlin: Perlin::new(params.seed),
            bands: levels.iter().map(|v| Band::from_value(*v)).collect(),
        }
    }

    /// Lets the 8-neighbourhood wrap across the left/right edges.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    pub fn params(&self) -> NoiseParams {
        self.params
    }

    /// Panics when `(x, y)` lies outside the field; the size is fixed at generation.
    pub fn band(&self, x: u32, y: u32) -> Band {
        assert!(
            x < self.width && y < self.height,
            "field sample ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        self.bands[(y * self.width + x) as usize]
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.band(x, y).level()
    }

    pub fn try_band(&self, x: i64, y: i64) -> Option<Band> {
        let (x, y) = self.resolve(x, y)?;
        Some(self.bands[(y * self.width + x) as usize])
    }

    /// In-bounds cells of the 8-neighbourhood around `(x, y)`.
    ///
    /// Rows never wrap. Columns wrap only when the field wraps; otherwise
    /// cells past the edge are simply absent.
    pub fn moore_neighbors(&self, x: u32, y: u32) -> impl Iterator<Item = Band> + '_ {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.try_band(x as i64 + dx, y as i64 + dy))
    }

    /// One cleanup pass: isolated water turns to land and isolated land to water.
    ///
    /// Reads only from `self`, so the result does not depend on visit order.
    /// A cell with fewer than eight neighbours on the map needs proportionally
    /// fewer like neighbours (rounded up) to keep its band, so a corner cell is
    /// only isolated when at most one of its three neighbours matches it.
    pub fn smooth(&self) -> NoiseField {
        let mut bands = Vec::with_capacity(self.bands.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let band = self.band(x, y);
                let present = self.moore_neighbors(x, y).count();
                let water_neighbors = self.moore_neighbors(x, y).filter(|b| b.is_water()).count();
                let land_neighbors = present - water_neighbors;
                let limit = isolation_limit(present);
                let next = if band.is_water() && water_neighbors < limit {
                    let resampled = sample(
                        &self.perlin,
                        &self.params,
                        x as f64 + RESAMPLE_OFFSET,
                        y as f64 + RESAMPLE_OFFSET,
                    );
                    Band::from_value(resampled.max(WATER_THRESHOLD))
                } else if !band.is_water() && land_neighbors < limit {
                    Band::Water
                } else {
                    band
                };
                bands.push(next);
            }
        }
        NoiseField {
            width: self.width,
            height: self.height,
            wrap: self.wrap,
            params: self.params,
            perlin: self.perlin.clone(),
            bands,
        }
    }

    pub fn count(&self, band: Band) -> usize {
        self.bands.iter().filter(|b| **b == band).count()
    }

    fn resolve(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        if y < 0 || y >= self.height as i64 {
            return None;
        }
        let x = if self.wrap {
            x.rem_euclid(self.width as i64)
        } else if x < 0 || x >= self.width as i64 {
            return None;
        } else {
            x
        };
        Some((x as u32, y as u32))
    }
}

fn isolation_limit(present: usize) -> usize {
    (ISOLATION_LIMIT * present + 7) / 8
}

fn sample(perlin: &Perlin, params: &NoiseParams, x: f64, y: f64) -> f32 {
    let raw = perlin.get([x * params.scale, y * params.scale]) as f32;
    ((raw.clamp(-1.0, 1.0) + 1.0) * 0.5) * params.amplitude
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NoiseParams {
        NoiseParams::new(0.1, 7)
    }

    #[test]
    fn quantize_thresholds() {
        assert_eq!(quantize(0.42), 0.0);
        assert_eq!(quantize(0.95), 0.5);
        assert_eq!(quantize(1.05), 0.8);
        assert_eq!(quantize(1.2), 1.0);
        assert_eq!(quantize(0.5), 0.5);
        assert_eq!(quantize(1.15), 1.0);
    }

    #[test]
    fn exact_level_one_is_mountain() {
        // 1.0 is both the top of the land threshold and the mountain level;
        // the level wins so quantizing stays idempotent.
        assert_eq!(Band::from_value(1.0), Band::Mountain);
        assert_eq!(quantize(1.0), 1.0);
        assert_eq!(Band::from_value(0.999), Band::Land);
        assert_eq!(Band::from_value(1.001), Band::Hill);
        assert_eq!(Band::from_value(0.8), Band::Hill);
    }

    #[test]
    fn quantize_is_idempotent() {
        let mut v = -0.5_f32;
        while v < 2.0 {
            let once = quantize(v);
            assert_eq!(quantize(once), once, "quantize not idempotent at {v}");
            v += 0.01;
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = NoiseField::generate(16, 12, params());
        let b = NoiseField::generate(16, 12, params());
        for y in 0..12 {
            for x in 0..16 {
                assert_eq!(a.get(x, y), b.get(x, y));
            }
        }
    }

    #[test]
    fn generated_values_are_levels() {
        let field = NoiseField::generate(20, 20, params());
        for y in 0..20 {
            for x in 0..20 {
                let v = field.get(x, y);
                assert!([0.0, 0.5, 0.8, 1.0].contains(&v));
            }
        }
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_sample_panics() {
        let field = NoiseField::generate(4, 4, params());
        field.get(4, 0);
    }

    #[test]
    fn lone_water_becomes_land() {
        let mut levels = vec![0.5; 25];
        levels[12] = 0.0;
        let field = NoiseField::from_levels(5, 5, params(), &levels);
        let smoothed = field.smooth();
        assert!(!smoothed.band(2, 2).is_water());
        assert_eq!(smoothed.count(Band::Water), 0);
    }

    #[test]
    fn lone_land_becomes_water() {
        let mut levels = vec![0.0; 9];
        levels[4] = 0.8;
        let field = NoiseField::from_levels(3, 3, params(), &levels);
        let smoothed = field.smooth();
        assert_eq!(smoothed.band(1, 1), Band::Water);
    }

    #[test]
    fn smoothing_is_a_single_pass_over_the_input() {
        // Two adjacent water cells each see one water neighbour; both flip.
        #[rustfmt::skip]
        let levels = [
            0.5, 0.5, 0.5, 0.5, 0.5, 0.5,
            0.5, 0.5, 0.0, 0.0, 0.5, 0.5,
            0.5, 0.5, 0.5, 0.5, 0.5, 0.5,
            0.5, 0.5, 0.5, 0.5, 0.5, 0.5,
        ];
        let field = NoiseField::from_levels(6, 4, params(), &levels);
        let smoothed = field.smooth();
        assert_eq!(smoothed.count(Band::Water), 0);
    }

    #[test]
    fn corner_land_with_two_land_neighbours_survives() {
        let mut levels = vec![0.5; 16];
        levels[5] = 0.0;
        let field = NoiseField::from_levels(4, 4, params(), &levels);
        assert_eq!(field.smooth().band(0, 0), Band::Land);
    }

    #[test]
    fn edge_water_with_two_water_neighbours_survives() {
        #[rustfmt::skip]
        let levels = [
            0.5, 0.0, 0.0, 0.0, 0.5,
            0.5, 0.5, 0.5, 0.5, 0.5,
            0.5, 0.5, 0.5, 0.5, 0.5,
        ];
        let field = NoiseField::from_levels(5, 3, params(), &levels);
        assert_eq!(field.smooth().band(2, 0), Band::Water);
    }

    #[test]
    fn isolation_limit_scales_with_present_neighbours() {
        assert_eq!(isolation_limit(8), 3);
        assert_eq!(isolation_limit(5), 2);
        assert_eq!(isolation_limit(3), 2);
        assert_eq!(isolation_limit(0), 0);
    }

    #[test]
    fn solid_regions_survive_smoothing() {
        let field = NoiseField::from_levels(3, 3, params(), &[0.0; 9]);
        assert_eq!(field.smooth().count(Band::Water), 9);
        let field = NoiseField::from_levels(3, 3, params(), &[1.0; 9]);
        assert_eq!(field.smooth().count(Band::Mountain), 9);
    }

    #[test]
    fn wrapping_field_counts_across_columns() {
        let field = NoiseField::from_levels(4, 1, params(), &[0.0; 4]);
        assert_eq!(field.moore_neighbors(0, 0).count(), 1);
        let wrapped = field.with_wrap(true);
        assert_eq!(wrapped.moore_neighbors(0, 0).count(), 2);
    }
}
