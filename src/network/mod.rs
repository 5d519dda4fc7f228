pub mod block;
pub mod dilation;
pub mod model;
pub mod shortcut;

pub use block::{Block, BlockKind, BlockSpec, PreActResBlock2d, ResBlock2d};
pub use dilation::dilation_for_block;
pub use model::{make_layer, ResNet2d, ResNet2dConfig};
pub use shortcut::Shortcut;

/// Default channel width of the residual stack.
pub const DEFAULT_PLANES: usize = 64;

/// Default square kernel size for the stem and block convolutions.
pub const DEFAULT_KERNEL_SIZE: usize = 5;

/// Default length of the cyclic dilation schedule.
pub const DEFAULT_DILATION_CYCLE: usize = 5;
