pub mod event;
pub mod level;
pub mod runner;
pub mod scheduler;
pub mod step;
pub mod world;
