pub mod error;
pub mod interpreter;
pub mod presenter;
