// Domain types and the turn pipeline
pub mod domain;
pub mod answer;

pub mod shared;
pub mod config;

// Storage and HTTP edges
pub mod infrastructure;
pub mod handlers;
