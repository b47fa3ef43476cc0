//! Terrain kinds and features

use serde::{Deserialize, Serialize};

use crate::noise_field::Band;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKindId(pub(crate) usize);

impl TileKindId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Flat,
    Hill,
    Mountain,
}

impl Feature {
    pub fn from_band(band: Band) -> Feature {
        match band {
            Band::Hill => Feature::Hill,
            Band::Mountain => Feature::Mountain,
            Band::Water | Band::Land => Feature::Flat,
        }
    }
}

/// The special role a kind plays outside the latitude bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    Ocean,
    Shore,
    Mountain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileKind {
    pub name: String,
    pub bottom_lat: f32,
    pub top_lat: f32,
    pub special: Option<Special>,
}

impl TileKind {
    pub fn banded(name: impl Into<String>, bottom_lat: f32, top_lat: f32) -> Self {
        Self {
            name: name.into(),
            bottom_lat,
            top_lat,
            special: None,
        }
    }

    pub fn special(name: impl Into<String>, special: Special) -> Self {
        Self {
            name: name.into(),
            bottom_lat: 0.0,
            top_lat: 0.0,
            special: Some(special),
        }
    }

    pub fn contains_latitude(&self, latitude: f32) -> bool {
        self.special.is_none() && latitude >= self.bottom_lat && latitude <= self.top_lat
    }
}

/// Indexed table of terrain kinds with a designated fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileTable {
    kinds: Vec<TileKind>,
    fallback: TileKindId,
}

impl TileTable {
    /// The fallback is the named kind, or the first banded kind when `None`.
    ///
    /// Returns `None` if the table has no usable fallback.
    pub fn new(kinds: Vec<TileKind>, fallback: Option<&str>) -> Option<Self> {
        let index = match fallback {
            Some(name) => kinds.iter().position(|k| k.name == name)?,
            None => kinds.iter().position(|k| k.special.is_none())?,
        };
        Some(Self {
            kinds,
            fallback: TileKindId(index),
        })
    }

    pub fn get(&self, id: TileKindId) -> &TileKind {
        &self.kinds[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKindId, &TileKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| (TileKindId(index), kind))
    }

    pub fn id_of(&self, name: &str) -> Option<TileKindId> {
        self.kinds.iter().position(|k| k.name == name).map(TileKindId)
    }

    pub fn name_of(&self, id: TileKindId) -> &str {
        &self.get(id).name
    }

    pub fn fallback(&self) -> TileKindId {
        self.fallback
    }

    pub fn special(&self, special: Special) -> Option<TileKindId> {
        self.kinds
            .iter()
            .position(|k| k.special == Some(special))
            .map(TileKindId)
    }

    /// First banded kind whose latitude band contains `latitude`.
    pub fn by_latitude(&self, latitude: f32) -> Option<TileKindId> {
        self.kinds
            .iter()
            .position(|k| k.contains_latitude(latitude))
            .map(TileKindId)
    }
}
