//! Raid screenshot analysis.
//!
//! Reads the raid screen of a screenshot (countdown timers, level, gym,
//! boss and EX status) into a [`raid::Raid`] record that a group of players
//! can then join.

pub mod config;
pub mod data;
pub mod geometry;
pub mod logging;
pub mod ocr;
pub mod paths;
pub mod raid;
pub mod screenshot;
pub mod similarity;
pub mod vision;
