//! The adaptive station search and the fusion of its results.

pub mod accumulator;
pub mod fusion;
pub mod geometry;
pub mod mode_classifier;
pub mod orchestrator;
pub mod region_query;
pub mod selection;
pub mod state;
