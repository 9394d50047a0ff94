pub mod critique;
pub mod results;
pub mod session;
