use civgrid::{engine::EngineBuilder, scenario::ScenarioLoader};

#[test]
fn engine_runs_hook_after_each_stage_in_order() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader
        .load("scenarios/earthlike.yaml")
        .expect("scenario should load");
    let mut engine = EngineBuilder::standard(&scenario)
        .expect("engine builds")
        .build();

    let mut stages = Vec::new();
    engine
        .generate_with_hook(|report| stages.push(report.name.clone()))
        .expect("generation succeeds");

    assert_eq!(stages, vec!["terrain", "classification", "resources"]);
}

#[test]
fn regeneration_reruns_every_stage() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    let scenario = loader.load("scenarios/earthlike.yaml").unwrap();
    let mut engine = EngineBuilder::standard(&scenario).unwrap().build();

    let mut runs = 0;
    for _ in 0..3 {
        engine.generate_with_hook(|_| runs += 1).unwrap();
    }
    assert_eq!(runs, 9);
}
