pub mod animation;
pub mod input;
pub mod scheduler;
pub mod time;
