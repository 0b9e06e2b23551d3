//! Algorithmic subsystems of the study pipeline

pub mod association;
pub mod correction;
pub mod matching;
