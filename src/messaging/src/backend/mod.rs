pub mod memory;
pub mod stdout;
