pub mod tree;
pub mod initializer;
pub mod operators;
pub mod problem;
pub mod evolution_engine;
pub mod progress;

pub use tree::{AggregationOp, GenotypeTree, Node, TreeBounds};
pub use initializer::{create_random, initialize_population};
pub use operators::{apply_mutation, crossover, mutate, tournament_selection, MutationAction};
pub use problem::EnsembleProblem;
pub use evolution_engine::{EvolutionEngine, EvolutionOutcome, GenerationStats, ProgressCallback};
pub use progress::{ChannelProgressCallback, LogProgressCallback, ProgressMessage};
