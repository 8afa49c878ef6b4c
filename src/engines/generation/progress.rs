use super::evolution_engine::{GenerationStats, ProgressCallback};
use std::sync::mpsc::Sender;

/// Reports progress through the `log` facade
pub struct LogProgressCallback {
    total_generations: usize,
}

impl LogProgressCallback {
    pub fn new(total_generations: usize) -> Self {
        Self { total_generations }
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {}/{} starting", generation + 1, self.total_generations);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        log::info!(
            "Generation {}/{} complete. Best: {:.4}, mean: {:.4}, replaced: {}",
            stats.generation + 1,
            self.total_generations,
            stats.best_fitness,
            stats.mean_fitness,
            stats.replacements
        );
    }
}

pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete(GenerationStats),
}

/// Forwards progress to another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(stats.clone()));
    }
}
