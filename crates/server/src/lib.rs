pub mod app;
pub mod auth;
pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod logging;
pub mod repository;
pub mod rpc;
pub mod validation;
