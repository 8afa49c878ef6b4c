use gpensemble::config::{EnsembleConfig, EvolutionConfig};
use gpensemble::engines::generation::{ChannelProgressCallback, LogProgressCallback, ProgressMessage};
use gpensemble::{EnsembleProblem, EvolutionEngine, EvolutionOutcome, KnnLearner, MultiLabelDataset, QualityMetric};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc;

/// Two features in [0, 1); labels are simple regions of the unit square.
fn synthetic_dataset(seed: u64, rows: usize) -> MultiLabelDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(rows);
    let mut labels = Vec::with_capacity(rows);
    for _ in 0..rows {
        let x: f64 = rng.gen();
        let y: f64 = rng.gen();
        features.push(vec![x, y]);
        labels.push(vec![x > 0.5, y > 0.5, x + y > 1.0, x < 0.2]);
    }
    MultiLabelDataset::from_rows(features, labels).unwrap()
}

fn ensemble_config() -> EnsembleConfig {
    EnsembleConfig {
        pool_size: 6,
        sample_ratio: 0.7,
        label_subset_size: Some(3),
        max_depth: 3,
        max_children: 2,
        n_max: Some(4),
        random_seed: Some(5),
        ..EnsembleConfig::default()
    }
}

fn evolution_config() -> EvolutionConfig {
    EvolutionConfig {
        population_size: 12,
        generations: 5,
        offspring_per_generation: 6,
        metric: QualityMetric::ExampleFMeasure,
        ..EvolutionConfig::default()
    }
}

fn run(seed: u64) -> (EvolutionEngine, EvolutionOutcome) {
    let train = synthetic_dataset(3, 60);
    let config = evolution_config();
    let mut rng = StdRng::seed_from_u64(seed);
    let problem = EnsembleProblem::build(
        &train,
        ensemble_config(),
        &KnnLearner::new(3),
        config.metric,
        &mut rng,
    )
    .unwrap();

    let mut engine = EvolutionEngine::new(config.clone(), problem, Some(seed));
    let outcome = engine.run(LogProgressCallback::new(config.generations)).unwrap();
    (engine, outcome)
}

#[test]
fn test_problem_exposes_bound_parameters() {
    let train = synthetic_dataset(3, 40);
    let problem = EnsembleProblem::build(
        &train,
        ensemble_config(),
        &KnnLearner::new(3),
        QualityMetric::HammingAccuracy,
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();

    assert_eq!(problem.max_depth(), 3);
    assert_eq!(problem.max_children(), 2);
    assert_eq!(problem.n_max(), 4);
    assert_eq!(problem.pool_size(), 6);
    assert_eq!(problem.pool().len(), 6);
    assert!((problem.sample_ratio() - 0.7).abs() < 1e-12);
}

#[test]
fn test_evolution_produces_valid_best_tree() {
    let (engine, outcome) = run(17);
    let problem = engine.problem();

    outcome.best.validate(problem.bounds()).unwrap();
    assert!((0.0..=1.0).contains(&outcome.best_fitness));
    assert_eq!(outcome.history.len(), 5);

    // replace-worst never loses the best individual
    for pair in outcome.history.windows(2) {
        assert!(pair[1].best_fitness >= pair[0].best_fitness);
    }
    let last = outcome.history.last().unwrap();
    assert_eq!(last.best_fitness, outcome.best_fitness);
    assert!(last.mean_fitness <= last.best_fitness + 1e-12);

    let rescored = problem.evaluate(&outcome.best).unwrap();
    assert!((rescored - outcome.best_fitness).abs() < 1e-12);
}

#[test]
fn test_evolution_is_reproducible() {
    let (_, first) = run(23);
    let (_, second) = run(23);

    assert_eq!(first.best, second.best);
    assert_eq!(first.best_fitness, second.best_fitness);
    let curve = |o: &EvolutionOutcome| o.history.iter().map(|s| s.best_fitness).collect::<Vec<_>>();
    assert_eq!(curve(&first), curve(&second));
}

#[test]
fn test_best_ensemble_scores_held_out_data() {
    let (engine, outcome) = run(29);
    let problem = engine.problem();
    let test = synthetic_dataset(99, 25);

    let ensemble = problem.ensemble(outcome.best.clone()).unwrap();
    let scores = ensemble.score(&test).unwrap();
    for metric in QualityMetric::ALL {
        let value = scores[metric.name()];
        assert!((0.0..=1.0).contains(&value), "{} = {}", metric.name(), value);
    }
    for instance in test.instances().unwrap() {
        assert_eq!(ensemble.predict(&instance).unwrap().len(), 4);
    }
}

#[test]
fn test_channel_callback_reports_every_generation() {
    let train = synthetic_dataset(4, 30);
    let config = EvolutionConfig {
        generations: 3,
        ..evolution_config()
    };
    let problem = EnsembleProblem::build(
        &train,
        ensemble_config(),
        &KnnLearner::new(1),
        config.metric,
        &mut StdRng::seed_from_u64(2),
    )
    .unwrap();

    let (sender, receiver) = mpsc::channel();
    let mut engine = EvolutionEngine::new(config, problem, Some(2));
    engine.run(ChannelProgressCallback::new(sender)).unwrap();

    let messages: Vec<ProgressMessage> = receiver.try_iter().collect();
    assert_eq!(messages.len(), 6);
    let completed: Vec<usize> = messages
        .iter()
        .filter_map(|m| match m {
            ProgressMessage::GenerationComplete(stats) => Some(stats.generation),
            ProgressMessage::GenerationStart(_) => None,
        })
        .collect();
    assert_eq!(completed, vec![0, 1, 2]);
}

#[test]
fn test_invalid_evolution_config_is_rejected() {
    let train = synthetic_dataset(5, 20);
    let problem = EnsembleProblem::build(
        &train,
        ensemble_config(),
        &KnnLearner::new(3),
        QualityMetric::ExampleFMeasure,
        &mut StdRng::seed_from_u64(3),
    )
    .unwrap();
    let config = EvolutionConfig {
        population_size: 1,
        ..evolution_config()
    };
    let mut engine = EvolutionEngine::new(config, problem, Some(3));
    assert!(engine.run(LogProgressCallback::new(1)).is_err());
}
