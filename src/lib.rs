pub mod adapter;
pub mod backend;
pub mod cli;
pub mod daemon;
pub mod errors;
pub mod extract;
pub mod models;
pub mod scoring;
pub mod server;
