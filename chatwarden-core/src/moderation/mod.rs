// File: src/moderation/mod.rs

pub mod pipeline;

pub use pipeline::ModerationPipeline;
