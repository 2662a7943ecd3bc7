pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod executor;
pub mod metadata;
pub mod planner;
pub mod registry;
pub mod repo;
pub mod services;
pub mod types;
pub mod utils;
