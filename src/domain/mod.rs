pub mod ai;
pub mod anim;
pub mod entity;
pub mod gold;
pub mod grid;
pub mod hole;
pub mod physics;
pub mod tile;
