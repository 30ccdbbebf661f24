pub mod frontier;
pub mod walker;

pub use walker::Walker;
