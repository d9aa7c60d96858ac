/// Chase simulation core: guard route scanning, sub-tile movement and the
/// per-tick world step, with a thin terminal front end on top.

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
pub mod ui;
