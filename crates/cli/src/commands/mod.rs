pub mod export;
pub mod rename;

pub use export::*;
pub use rename::*;
