use std::sync::Arc;
use std::time::{Instant, SystemTime};

use ai_info_core::Classifier;

use crate::config::QuizConfig;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    db: Option<Arc<Database>>,
    classifier: Arc<Classifier>,
    quiz: QuizConfig,
}

impl AppState {
    pub fn new(db: Option<Arc<Database>>, classifier: Arc<Classifier>, quiz: QuizConfig) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            db,
            classifier,
            quiz,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn db(&self) -> Option<Arc<Database>> {
        self.db.clone()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn quiz(&self) -> QuizConfig {
        self.quiz
    }
}
