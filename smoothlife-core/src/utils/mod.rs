pub mod benchmark;
pub mod buffer;
