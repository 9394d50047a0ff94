pub mod critique;
pub mod media;
pub mod ranking;
pub mod roster;
pub mod session;
pub mod submission;
pub mod video;
