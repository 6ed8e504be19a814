//! Atwood machine demo: two masses over a pulley, a rider plate on one
//! side, and a back-computed estimate of g when the falling weight reaches
//! the floor.

pub mod chart;
pub mod config;
pub mod hud;
pub mod input;
pub mod physics;
pub mod scene;
