pub mod describe;
pub mod error;
