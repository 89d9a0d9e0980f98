pub mod completions;
pub mod config;
pub mod contingency;
pub mod map;
pub mod scenarios;
pub mod shell;
pub mod solve;
