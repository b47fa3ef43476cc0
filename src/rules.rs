//! Placement rules for resources and improvements

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tiles::{Feature, TileKindId};

/// Kinds and features a placeable entity accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub possible_kinds: Vec<TileKindId>,
    pub possible_features: Vec<Feature>,
}

impl Rule {
    pub fn new(possible_kinds: Vec<TileKindId>, possible_features: Vec<Feature>) -> Self {
        Self {
            possible_kinds,
            possible_features,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImprovementId(pub(crate) usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// One in `rarity` eligible cells receives the resource; `<= 0` never.
    pub rarity: i32,
    pub rule: Rule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    pub name: String,
    pub rule: Rule,
}

/// Kind and feature of a cell, as far as rules are concerned.
pub trait Placeable {
    fn kind(&self) -> TileKindId;
    fn feature(&self) -> Feature;
}

impl Placeable for (TileKindId, Feature) {
    fn kind(&self) -> TileKindId {
        self.0
    }

    fn feature(&self) -> Feature {
        self.1
    }
}

pub struct RuleEngine {
    resources: Vec<Resource>,
    improvements: Vec<Improvement>,
}

impl RuleEngine {
    pub fn new(resources: Vec<Resource>, improvements: Vec<Improvement>) -> Self {
        Self {
            resources,
            improvements,
        }
    }

    /// True iff the cell's kind and its feature are both listed by the rule.
    /// An empty list on either side never matches.
    pub fn test(cell: &impl Placeable, rule: &Rule) -> bool {
        if rule.possible_kinds.is_empty() || rule.possible_features.is_empty() {
            return false;
        }
        let kind = cell.kind();
        let feature = cell.feature();
        rule.possible_kinds.iter().any(|k| *k == kind)
            && rule.possible_features.iter().any(|f| *f == feature)
    }

    pub fn roll_rarity<R: Rng>(rarity: i32, rng: &mut R) -> bool {
        if rarity <= 0 {
            return false;
        }
        rng.gen_range(0..rarity) == 0
    }

    /// First resource, in declared order, that the cell accepts and whose roll succeeds.
    pub fn pick_resource<R: Rng>(&self, cell: &impl Placeable, rng: &mut R) -> Option<ResourceId> {
        self.resources.iter().enumerate().find_map(|(index, resource)| {
            (Self::test(cell, &resource.rule) && Self::roll_rarity(resource.rarity, rng))
                .then_some(ResourceId(index))
        })
    }

    pub fn can_improve(&self, cell: &impl Placeable, id: ImprovementId) -> bool {
        self.improvements
            .get(id.0)
            .map(|improvement| Self::test(cell, &improvement.rule))
            .unwrap_or(false)
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn improvement(&self, id: ImprovementId) -> &Improvement {
        &self.improvements[id.0]
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn improvements(&self) -> &[Improvement] {
        &self.improvements
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resources
            .iter()
            .position(|r| r.name == name)
            .map(ResourceId)
    }

    pub fn improvement_id(&self, name: &str) -> Option<ImprovementId> {
        self.improvements
            .iter()
            .position(|i| i.name == name)
            .map(ImprovementId)
    }
}
