pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod stores;
pub mod utils;
pub mod views;
pub mod wizard;
