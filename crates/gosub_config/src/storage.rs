pub use memory::*;

mod memory;
