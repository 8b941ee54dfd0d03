// Library surface for the binary and for headless/integration tests.
pub mod achievements;
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod error;
pub mod game;
pub mod rank;
pub mod romaji;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod summary;
pub mod trace_init;
pub mod ui;
pub mod util;
