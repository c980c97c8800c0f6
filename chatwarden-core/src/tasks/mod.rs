// File: src/tasks/mod.rs

pub mod captcha_sweep;
pub mod classifier_training;
pub mod reputation_refresh;
pub mod violation_prune;

pub use captcha_sweep::spawn_captcha_sweep_task;
pub use classifier_training::spawn_classifier_training_task;
pub use reputation_refresh::spawn_reputation_refresh_task;
pub use violation_prune::spawn_violation_prune_task;
