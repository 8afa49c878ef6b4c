use anyhow::{bail, Context};
use gpensemble::config::ConfigManager;
use gpensemble::data::load_csv;
use gpensemble::engines::generation::{EnsembleProblem, EvolutionEngine, LogProgressCallback};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .context("usage: gpensemble <config.toml>")?;
    let manager = ConfigManager::new();
    manager.load_from_file(&config_path)?;
    let config = manager.get();

    let Some(train_path) = config.dataset.train_path.as_ref() else {
        bail!("dataset.train_path is not set in {}", config_path);
    };
    let train = load_csv(train_path, &config.dataset.label_columns)?;

    let mut rng = match config.ensemble.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let learner = config.classifier.learner();
    let problem = EnsembleProblem::build(
        &train,
        config.ensemble.clone(),
        learner.as_ref(),
        config.evolution.metric,
        &mut rng,
    )?;

    let engine_seed = config.ensemble.random_seed.map(|s| s.wrapping_add(1));
    let mut engine = EvolutionEngine::new(config.evolution.clone(), problem, engine_seed);
    let outcome = engine.run(LogProgressCallback::new(config.evolution.generations))?;

    if let Some(test_path) = config.dataset.test_path.as_ref() {
        let test = load_csv(test_path, &config.dataset.label_columns)?;
        let ensemble = engine.problem().ensemble(outcome.best.clone())?;
        let mut report: Vec<(String, f64)> = ensemble.score(&test)?.into_iter().collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in report {
            log::info!("test {}: {:.4}", name, value);
        }
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
