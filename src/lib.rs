pub mod config;
pub mod db;
pub mod game;
pub mod prom_metrics;
pub mod score;
pub mod server;
