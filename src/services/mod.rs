// src/services/mod.rs
pub mod loader;
pub mod returns;
pub mod regime;
pub mod correlation;
pub mod aggregator;
pub mod export;
pub mod pipeline;
