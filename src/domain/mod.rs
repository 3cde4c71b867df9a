// Domain layer: records, wire frames and the turn pipeline
// Framework-agnostic apart from tokio channels

pub mod models;
pub mod services;
