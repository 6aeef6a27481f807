// src/handlers/mod.rs
pub mod history;
pub mod status;
pub mod story;
pub mod ui;
