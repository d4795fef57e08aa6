pub mod client;
pub mod common;
