use super::traits::ConfigSection;
use crate::classifiers::{KnnLearner, LabelPriorLearner, MultiLabelLearner};
use crate::error::EnsembleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassifierKind {
    Knn { k: usize },
    LabelPrior,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Knn { k: 5 },
        }
    }
}

impl ClassifierConfig {
    /// Learner used to train every pool slot
    pub fn learner(&self) -> Box<dyn MultiLabelLearner> {
        match self.kind {
            ClassifierKind::Knn { k } => Box::new(KnnLearner::new(k)),
            ClassifierKind::LabelPrior => Box::new(LabelPriorLearner),
        }
    }
}

impl ConfigSection for ClassifierConfig {
    fn section_name() -> &'static str {
        "classifier"
    }

    fn validate(&self) -> Result<(), EnsembleError> {
        if let ClassifierKind::Knn { k: 0 } = self.kind {
            return Err(EnsembleError::Configuration(
                "k must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}
