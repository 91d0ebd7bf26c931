pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod events;
pub mod filter;
pub mod host;
pub mod load;
pub mod output;
pub mod page;
pub mod utils;

#[cfg(test)]
mod tests;
