pub mod error;
pub mod network;

pub use error::{Error, Result};
pub use network::{ResNet2d, ResNet2dConfig};

#[cfg(test)]
mod tests;
