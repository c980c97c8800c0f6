// File: src/classifier/mod.rs
//
// Online-trainable spam classifier. Predictions read an immutable model
// snapshot behind an Arc swap; training rebuilds the snapshot from the full
// durable corpus and swaps it in, so readers never see a half-trained model.

pub mod features;
pub mod model;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use chatwarden_common::models::classifier::{LabeledSample, SpamVerdict};
use chatwarden_common::traits::SpamCorpusRepository;

use crate::config::ClassifierConfig;
use crate::text::normalize;
use crate::Error;
use features::{tokenize, Vectorizer};
use model::LogisticRegression;

/// One fully-trained model. Swapped wholesale, never mutated.
pub struct ModelSnapshot {
    pub trained_at: DateTime<Utc>,
    pub sample_count: usize,
    vectorizer: Vectorizer,
    model: LogisticRegression,
}

impl ModelSnapshot {
    pub fn predict(&self, raw_text: &str, spam_threshold: f32) -> SpamVerdict {
        let tokens = tokenize(&normalize(raw_text));
        let vector = self.vectorizer.transform(&tokens);
        if vector.is_empty() {
            return SpamVerdict::clean();
        }
        let score = self.model.predict_proba(&vector);
        SpamVerdict {
            is_spam: score >= spam_threshold,
            score,
        }
    }
}

pub struct SpamClassifier {
    corpus_repo: Arc<dyn SpamCorpusRepository>,
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
    stale: AtomicBool,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    config: ClassifierConfig,
}

impl SpamClassifier {
    pub fn new(corpus_repo: Arc<dyn SpamCorpusRepository>, config: ClassifierConfig) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        Self {
            corpus_repo,
            snapshot: RwLock::new(None),
            stale: AtomicBool::new(true),
            ready_tx,
            ready_rx,
            config,
        }
    }

    /// Classify one message. Never fails: before the first training
    /// completes this waits up to `ready_wait` for a model, then falls back
    /// to a clean verdict.
    pub async fn predict(&self, raw_text: &str) -> SpamVerdict {
        if let Some(snapshot) = self.current_snapshot() {
            return snapshot.predict(raw_text, self.config.spam_threshold);
        }

        let mut ready = self.ready_rx.clone();
        let waited =
            tokio::time::timeout(self.config.ready_wait, ready.wait_for(|trained| *trained)).await;
        match waited {
            Ok(Ok(_)) => {}
            _ => {
                debug!("classifier not trained yet, returning clean verdict");
                return SpamVerdict::clean();
            }
        }

        match self.current_snapshot() {
            Some(snapshot) => snapshot.predict(raw_text, self.config.spam_threshold),
            None => SpamVerdict::clean(),
        }
    }

    /// Append a labeled text to the durable corpus and mark the model stale
    /// so the next training cycle picks it up.
    pub async fn add_labeled_example(&self, text: &str, is_spam: bool) -> Result<(), Error> {
        let sample = LabeledSample::new(text, is_spam);
        self.corpus_repo.append(&sample).await?;
        self.stale.store(true, Ordering::SeqCst);
        debug!(is_spam, "labeled sample appended to corpus");
        Ok(())
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Rebuild the model from the full corpus if anything changed since the
    /// last run. Returns whether a new snapshot was installed.
    pub async fn train(&self) -> Result<bool, Error> {
        if !self.is_stale() {
            return Ok(false);
        }

        let samples = self.corpus_repo.load_all().await?;
        let spam_count = samples.iter().filter(|s| s.is_spam).count();
        let ham_count = samples.len() - spam_count;
        if samples.len() < self.config.min_samples || spam_count == 0 || ham_count == 0 {
            warn!(
                total = samples.len(),
                spam_count, ham_count, "corpus too small or one-sided, skipping training"
            );
            return Ok(false);
        }

        let documents: Vec<Vec<String>> = samples
            .iter()
            .map(|s| tokenize(&normalize(&s.text)))
            .collect();
        let vectorizer = Vectorizer::fit(&documents);
        let training: Vec<(Vec<(usize, f32)>, bool)> = documents
            .iter()
            .zip(samples.iter())
            .map(|(tokens, sample)| (vectorizer.transform(tokens), sample.is_spam))
            .collect();

        let model = LogisticRegression::train(
            &training,
            vectorizer.dimension(),
            self.config.epochs,
            self.config.learning_rate,
            self.config.l2_penalty,
        );

        let snapshot = Arc::new(ModelSnapshot {
            trained_at: Utc::now(),
            sample_count: samples.len(),
            vectorizer,
            model,
        });

        *self.snapshot.write() = Some(snapshot);
        self.stale.store(false, Ordering::SeqCst);
        self.ready_tx.send_replace(true);
        info!(
            samples = samples.len(),
            spam = spam_count,
            ham = ham_count,
            "classifier retrained"
        );
        Ok(true)
    }

    fn current_snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.snapshot.read().clone()
    }
}
