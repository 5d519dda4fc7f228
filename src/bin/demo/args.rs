use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "pairnet demo")]
#[command(version = "1.0.0")]
pub struct Args {
    /// Channels of the incoming pairwise feature grid.
    #[arg(long, default_value_t = 20)]
    pub in_channels: usize,

    /// Number of residual blocks in the stack.
    #[arg(long, default_value_t = 25)]
    pub num_blocks: usize,

    /// Working channel width (must be a power of two).
    #[arg(long, default_value_t = 64)]
    pub planes: usize,

    /// Square kernel size (must be odd).
    #[arg(long, default_value_t = 5)]
    pub kernel_size: usize,

    /// Length of the cyclic dilation schedule (0 disables dilation).
    #[arg(long, default_value_t = 5)]
    pub dilation_cycle: usize,

    /// Use the pre-activation block variant instead of the standard one.
    #[arg(long, default_value_t = false)]
    pub pre_activation: bool,

    /// Spatial extent of the synthetic input grid.
    #[arg(long, default_value_t = 64)]
    pub grid_size: usize,

    /// Batch size of the synthetic input.
    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Optional safetensors file to load parameters from.
    #[arg(long)]
    pub weights: Option<PathBuf>,
}
