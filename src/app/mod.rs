#[cfg(feature = "cli")]
pub mod commands;
pub mod render;
pub mod views;
