use anyhow::Result;
use log::debug;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    rules::RuleEngine,
    world::World,
};

/// Rolls resources onto classified cells.
pub struct ResourceSystem {
    rules: RuleEngine,
}

impl ResourceSystem {
    pub fn new(rules: RuleEngine) -> Self {
        Self { rules }
    }
}

impl System for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let mut placed = 0;
        for cell in &mut world.cells {
            cell.resource = self.rules.pick_resource(&*cell, rng);
            if cell.resource.is_some() {
                placed += 1;
            }
        }
        debug!("placed {placed} resources over {} cells", world.cells.len());
        Ok(())
    }
}
