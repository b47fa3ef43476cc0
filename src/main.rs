use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use civgrid::{engine::EngineBuilder, export::ExportWriter, scenario::ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Hex world map generator")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/earthlike.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override map width (must stay divisible by the chunk size)
    #[arg(long)]
    width: Option<u32>,

    /// Override map height (must stay divisible by the chunk size)
    #[arg(long)]
    height: Option<u32>,

    /// Directory for JSON exports; nothing is written when omitted
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" (defaults to the scenario's logging.level)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = Some(seed);
    }
    if let Some(width) = cli.width {
        scenario.map.width = width;
    }
    if let Some(height) = cli.height {
        scenario.map.height = height;
    }

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| scenario.logging.level.clone());
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut engine = EngineBuilder::standard(&scenario)?.build();
    let world = engine.generate()?;
    let rules = scenario.rule_engine(world.tiles())?;

    println!(
        "Map '{}' generated: {}x{} cells, seed {}",
        scenario.name,
        world.width(),
        world.height(),
        world.seed()
    );
    for (id, kind) in world.tiles().iter() {
        println!("  {:<12} {}", kind.name, world.count_kind(id));
    }
    for resource in rules.resources() {
        if let Some(id) = rules.resource_id(&resource.name) {
            println!("  {:<12} {} placed", resource.name, world.count_resource(id));
        }
    }

    if let Some(dir) = cli.output_dir {
        let path = ExportWriter::new(dir).write(&scenario.name, &world, &rules)?;
        println!("Exported to {}", path.display());
    }
    Ok(())
}
