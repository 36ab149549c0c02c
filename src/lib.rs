pub mod app;
pub mod cli;
pub mod config;
pub mod ordering;
pub mod pagination;
pub mod query;
pub mod render;
pub mod rpc;
pub mod server;
pub mod utils;

#[cfg(test)]
mod tests;
