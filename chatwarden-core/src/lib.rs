// src/lib.rs

pub mod classifier;
pub mod config;
pub mod db;
pub mod eventbus;
pub mod http;
pub mod mimicry;
pub mod moderation;
pub mod repositories;
pub mod services;
pub mod tasks;
pub mod test_utils;
pub mod text;

pub use chatwarden_common::error::Error;
pub use db::Database;
pub use http::{DefaultHttpClient, HttpClient};
