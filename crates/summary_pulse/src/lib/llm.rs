pub mod gateway;
pub mod openrouter;
pub mod prompt;
