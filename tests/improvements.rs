use civgrid::{
    engine::EngineBuilder,
    hex::OffsetCoord,
    scenario::ScenarioLoader,
    tiles::Feature,
    world::PlacementError,
};

#[test]
fn improvements_follow_their_rules() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader.load("scenarios/earthlike.yaml").unwrap();
    let mut world = EngineBuilder::standard(&scenario)
        .unwrap()
        .build()
        .generate()
        .unwrap();
    let rules = scenario.rule_engine(world.tiles()).unwrap();
    let farm = rules.improvement_id("Farm").unwrap();

    let farmland = world
        .cells()
        .iter()
        .find(|cell| rules.can_improve(*cell, farm))
        .map(|cell| cell.position)
        .expect("map has farmland");
    assert_eq!(world.try_add_improvement(&rules, farmland, "Farm"), Ok(farm));
    assert_eq!(world.cell(farmland).unwrap().improvement, Some(farm));

    assert_eq!(world.remove_improvement(farmland), Some(farm));
    assert_eq!(world.cell(farmland).unwrap().improvement, None);
    assert_eq!(world.remove_improvement(farmland), None);
}

#[test]
fn rejected_improvements_leave_the_cell_untouched() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader.load("scenarios/earthlike.yaml").unwrap();
    let mut world = EngineBuilder::standard(&scenario)
        .unwrap()
        .build()
        .generate()
        .unwrap();
    let rules = scenario.rule_engine(world.tiles()).unwrap();

    // Edge cells are always flat, so a mine never fits there.
    let edge = OffsetCoord::new(0, 5);
    assert_eq!(world.cell(edge).unwrap().feature, Feature::Flat);
    assert_eq!(
        world.try_add_improvement(&rules, edge, "Mine"),
        Err(PlacementError::RuleRejected {
            name: "Mine".into(),
            col: 0,
            row: 5
        })
    );
    assert_eq!(world.cell(edge).unwrap().improvement, None);

    assert_eq!(
        world.try_add_improvement(&rules, edge, "Castle"),
        Err(PlacementError::UnknownImprovement("Castle".into()))
    );
    assert_eq!(
        world.try_add_improvement(&rules, OffsetCoord::new(-1, 0), "Farm"),
        Err(PlacementError::OffMap { col: -1, row: 0 })
    );
}
