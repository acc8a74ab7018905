//! Flagrun gameplay: collision, the player and its enemies, levels, and the
//! session that steps them at a fixed rate.

pub mod collision;
pub mod config;
pub mod enemy;
pub mod flag;
pub mod level;
pub mod player;
pub mod render;
pub mod replay;
pub mod session;
pub mod slime;
