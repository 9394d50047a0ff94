pub mod blob;
pub mod critique;
pub mod home;
pub mod json_error;
pub mod results;
pub mod system;
