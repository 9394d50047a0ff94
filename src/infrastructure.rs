pub mod credential;
pub mod genai;
pub mod imaging;
pub mod utils;
