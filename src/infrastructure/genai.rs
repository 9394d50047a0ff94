pub mod gemini;
pub mod prompts;
