use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    classifier::DEFAULT_JITTER,
    noise_field::DEFAULT_AMPLITUDE,
    rules::{Improvement, Resource, Rule, RuleEngine},
    tiles::{Feature, Special, TileKind, TileTable},
};

fn default_chunk_size() -> u32 {
    8
}

fn default_scale() -> f64 {
    0.08
}

fn default_amplitude() -> f32 {
    DEFAULT_AMPLITUDE
}

fn default_smooth() -> bool {
    true
}

fn default_jitter() -> f32 {
    DEFAULT_JITTER
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("map size must be positive, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("chunk size {chunk_size} does not evenly divide map size {width}x{height}")]
    ChunkMismatch {
        width: u32,
        height: u32,
        chunk_size: u32,
    },
    #[error("noise scale must be a positive number, got {0}")]
    InvalidScale(f64),
    #[error("noise amplitude must be a positive number, got {0}")]
    InvalidAmplitude(f32),
    #[error("latitude jitter must lie in [0, 1], got {0}")]
    InvalidJitter(f32),
    #[error("no latitude-banded tile kinds defined")]
    EmptyBands,
    #[error("tile kind '{name}' has an invalid latitude band [{bottom}, {top}]")]
    InvalidBand { name: String, bottom: f32, top: f32 },
    #[error("latitude bands leave [{from}, {to}] uncovered")]
    BandGap { from: f32, to: f32 },
    #[error("tile kind '{0}' sets more than one of is_ocean/is_shore/is_mountain")]
    ConflictingFlags(String),
    #[error("more than one tile kind is marked {0:?}")]
    DuplicateSpecial(Special),
    #[error("no tile kind is marked {0:?}")]
    MissingSpecial(Special),
    #[error("'{0}' is defined more than once")]
    DuplicateName(String),
    #[error("'{owner}' references unknown tile kind '{kind}'")]
    UnknownKind { owner: String, kind: String },
    #[error("fallback tile kind '{0}' is not defined")]
    UnknownFallback(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Fixed seed for reproducible maps; a fresh one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    pub map: MapConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    pub tiles: Vec<TileConfig>,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
    #[serde(default)]
    pub improvements: Vec<ImprovementConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    #[serde(default)]
    pub wrap: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_smooth")]
    pub smooth: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            amplitude: default_amplitude(),
            smooth: default_smooth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            jitter: default_jitter(),
            fallback: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    pub name: String,
    #[serde(default)]
    pub bottom_lat: f32,
    #[serde(default)]
    pub top_lat: f32,
    #[serde(default)]
    pub is_ocean: bool,
    #[serde(default)]
    pub is_shore: bool,
    #[serde(default)]
    pub is_mountain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub rarity: i32,
    pub rule: RuleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementConfig {
    pub name: String,
    pub rule: RuleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario = Scenario::from_yaml(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl TileConfig {
    fn special(&self) -> Result<Option<Special>, ScenarioError> {
        let flags = [
            (self.is_ocean, Special::Ocean),
            (self.is_shore, Special::Shore),
            (self.is_mountain, Special::Mountain),
        ];
        let mut set = flags.iter().filter(|(on, _)| *on).map(|(_, s)| *s);
        let special = set.next();
        if set.next().is_some() {
            return Err(ScenarioError::ConflictingFlags(self.name.clone()));
        }
        Ok(special)
    }
}

impl RuleConfig {
    fn resolve(&self, owner: &str, table: &TileTable) -> Result<Rule, ScenarioError> {
        let kinds = self
            .kinds
            .iter()
            .map(|kind| {
                table.id_of(kind).ok_or_else(|| ScenarioError::UnknownKind {
                    owner: owner.to_string(),
                    kind: kind.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Rule::new(kinds, self.features.clone()))
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rejects configurations generation cannot honour. Runs before any generation.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let map = &self.map;
        if map.width == 0 || map.height == 0 {
            return Err(ScenarioError::ZeroSize {
                width: map.width,
                height: map.height,
            });
        }
        if map.chunk_size == 0 || map.width % map.chunk_size != 0 || map.height % map.chunk_size != 0
        {
            return Err(ScenarioError::ChunkMismatch {
                width: map.width,
                height: map.height,
                chunk_size: map.chunk_size,
            });
        }
        if !self.noise.scale.is_finite() || self.noise.scale <= 0.0 {
            return Err(ScenarioError::InvalidScale(self.noise.scale));
        }
        if !self.noise.amplitude.is_finite() || self.noise.amplitude <= 0.0 {
            return Err(ScenarioError::InvalidAmplitude(self.noise.amplitude));
        }
        let jitter = self.classification.jitter;
        if !(0.0..=1.0).contains(&jitter) {
            return Err(ScenarioError::InvalidJitter(jitter));
        }

        let table = self.tile_table()?;
        check_band_coverage(&table)?;

        let mut names = HashSet::new();
        for resource in &self.resources {
            if !names.insert(resource.name.as_str()) {
                return Err(ScenarioError::DuplicateName(resource.name.clone()));
            }
            resource.rule.resolve(&resource.name, &table)?;
        }
        let mut names = HashSet::new();
        for improvement in &self.improvements {
            if !names.insert(improvement.name.as_str()) {
                return Err(ScenarioError::DuplicateName(improvement.name.clone()));
            }
            improvement.rule.resolve(&improvement.name, &table)?;
        }
        Ok(())
    }

    pub fn tile_table(&self) -> Result<TileTable, ScenarioError> {
        let mut names = HashSet::new();
        let mut kinds = Vec::with_capacity(self.tiles.len());
        let mut specials = HashSet::new();
        for tile in &self.tiles {
            if !names.insert(tile.name.as_str()) {
                return Err(ScenarioError::DuplicateName(tile.name.clone()));
            }
            let kind = match tile.special()? {
                Some(special) => {
                    if !specials.insert(special) {
                        return Err(ScenarioError::DuplicateSpecial(special));
                    }
                    TileKind::special(&tile.name, special)
                }
                None => {
                    let (bottom, top) = (tile.bottom_lat, tile.top_lat);
                    if !(0.0..=1.0).contains(&bottom) || !(0.0..=1.0).contains(&top) || bottom > top
                    {
                        return Err(ScenarioError::InvalidBand {
                            name: tile.name.clone(),
                            bottom,
                            top,
                        });
                    }
                    TileKind::banded(&tile.name, bottom, top)
                }
            };
            kinds.push(kind);
        }
        for special in [Special::Ocean, Special::Shore] {
            if !specials.contains(&special) {
                return Err(ScenarioError::MissingSpecial(special));
            }
        }
        if !kinds.iter().any(|k| k.special.is_none()) {
            return Err(ScenarioError::EmptyBands);
        }

        let fallback = self.classification.fallback.as_deref();
        TileTable::new(kinds, fallback)
            .ok_or_else(|| ScenarioError::UnknownFallback(fallback.unwrap_or_default().to_string()))
    }

    pub fn rule_engine(&self, table: &TileTable) -> Result<RuleEngine, ScenarioError> {
        let resources = self
            .resources
            .iter()
            .map(|r| {
                Ok(Resource {
                    name: r.name.clone(),
                    rarity: r.rarity,
                    rule: r.rule.resolve(&r.name, table)?,
                })
            })
            .collect::<Result<Vec<_>, ScenarioError>>()?;
        let improvements = self
            .improvements
            .iter()
            .map(|i| {
                Ok(Improvement {
                    name: i.name.clone(),
                    rule: i.rule.resolve(&i.name, table)?,
                })
            })
            .collect::<Result<Vec<_>, ScenarioError>>()?;
        Ok(RuleEngine::new(resources, improvements))
    }
}

/// Banded kinds, taken together, must cover all of [0, 1].
fn check_band_coverage(table: &TileTable) -> Result<(), ScenarioError> {
    let mut bands: Vec<(f32, f32)> = table
        .iter()
        .filter(|(_, kind)| kind.special.is_none())
        .map(|(_, kind)| (kind.bottom_lat, kind.top_lat))
        .collect();
    if bands.is_empty() {
        return Err(ScenarioError::EmptyBands);
    }
    bands.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut covered = 0.0_f32;
    for (bottom, top) in bands {
        if bottom > covered {
            return Err(ScenarioError::BandGap {
                from: covered,
                to: bottom,
            });
        }
        covered = covered.max(top);
    }
    if covered < 1.0 {
        return Err(ScenarioError::BandGap {
            from: covered,
            to: 1.0,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
name: test_map
seed: 9
map:
  width: 16
  height: 8
  chunk_size: 8
tiles:
  - name: Ocean
    is_ocean: true
  - name: Shore
    is_shore: true
  - name: Grass
    bottom_lat: 0.0
    top_lat: 0.5
  - name: Snow
    bottom_lat: 0.5
    top_lat: 1.0
resources:
  - name: Wheat
    rarity: 4
    rule:
      kinds: [Grass]
      features: [flat]
improvements:
  - name: Farm
    rule:
      kinds: [Grass, Snow]
      features: [flat, hill]
"#;

    fn base() -> Scenario {
        Scenario::from_yaml(BASE).unwrap()
    }

    #[test]
    fn parses_with_defaults() {
        let scenario = base();
        assert_eq!(scenario.seed, Some(9));
        assert_eq!(scenario.noise.scale, 0.08);
        assert!(scenario.noise.smooth);
        assert_eq!(scenario.classification.jitter, DEFAULT_JITTER);
        assert_eq!(scenario.logging.level, "info");
        assert!(!scenario.map.wrap);
        scenario.validate().unwrap();
    }

    #[test]
    fn yaml_round_trip() {
        let scenario = base();
        let text = scenario.to_yaml().unwrap();
        let again = Scenario::from_yaml(&text).unwrap();
        assert_eq!(again.name, scenario.name);
        assert_eq!(again.tiles.len(), 4);
    }

    #[test]
    fn chunk_size_must_divide_map() {
        let mut scenario = base();
        scenario.map.chunk_size = 5;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::ChunkMismatch { .. })
        ));
        scenario.map.chunk_size = 0;
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut scenario = base();
        scenario.map.height = 0;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::ZeroSize { .. })
        ));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let mut scenario = base();
        scenario.noise.scale = 0.0;
        assert_eq!(scenario.validate(), Err(ScenarioError::InvalidScale(0.0)));
        scenario.noise.scale = f64::NAN;
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn band_gap_is_rejected() {
        let mut scenario = base();
        scenario.tiles[3].bottom_lat = 0.6;
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::BandGap { from: 0.5, to: 0.6 })
        );
        scenario.tiles[3].bottom_lat = 0.5;
        scenario.tiles[3].top_lat = 0.9;
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::BandGap { from: 0.9, to: 1.0 })
        );
    }

    #[test]
    fn banded_table_must_not_be_empty() {
        let mut scenario = base();
        scenario.tiles.truncate(2);
        assert_eq!(scenario.validate(), Err(ScenarioError::EmptyBands));
    }

    #[test]
    fn special_flags_are_exclusive() {
        let mut scenario = base();
        scenario.tiles[0].is_shore = true;
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::ConflictingFlags("Ocean".into()))
        );
    }

    #[test]
    fn ocean_and_shore_are_required() {
        let mut scenario = base();
        scenario.tiles.remove(1);
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::MissingSpecial(Special::Shore))
        );
    }

    #[test]
    fn rules_must_reference_known_kinds() {
        let mut scenario = base();
        scenario.resources[0].rule.kinds.push("Jungle".into());
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::UnknownKind {
                owner: "Wheat".into(),
                kind: "Jungle".into()
            })
        );
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        let mut scenario = base();
        scenario.classification.fallback = Some("Lava".into());
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::UnknownFallback("Lava".into()))
        );
    }

    #[test]
    fn builds_rule_engine() {
        let scenario = base();
        let table = scenario.tile_table().unwrap();
        let engine = scenario.rule_engine(&table).unwrap();
        let wheat = engine.resource(engine.resource_id("Wheat").unwrap());
        assert_eq!(wheat.rule.possible_kinds, vec![table.id_of("Grass").unwrap()]);
        assert_eq!(engine.improvements().len(), 1);
    }
}
