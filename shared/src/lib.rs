//! Billiards table physics shared by the table server and the headless runner.

pub mod ball;
pub mod collision;
pub mod config;
pub mod protocol;
pub mod session;
pub mod shot;
pub mod simulation;
pub mod table;
pub mod vec3;
