pub mod classifier;
pub mod config;
pub mod errors;
pub mod ingestor;
pub mod logo;
pub mod models;
pub mod playlist;
pub mod services;
pub mod utils;
