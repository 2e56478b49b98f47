pub mod engine;
pub mod frontend;
