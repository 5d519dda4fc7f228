use candle_core::Tensor;
use candle_nn::{
    batch_norm, conv2d_no_bias, BatchNorm, BatchNormConfig, Conv2d, Conv2dConfig, Module, ModuleT,
    VarBuilder,
};

use super::block::{Block, BlockKind, BlockSpec, PreActResBlock2d, ResBlock2d};
use super::dilation::dilation_for_block;
use super::{DEFAULT_DILATION_CYCLE, DEFAULT_KERNEL_SIZE, DEFAULT_PLANES};
use crate::error::{Error, Result};

/// Assembly parameters for a full network.
#[derive(Debug, Clone)]
pub struct ResNet2dConfig {
    /// Channels of the incoming feature grid.
    pub in_channels: usize,
    /// Residual block variant used throughout the stack.
    pub block: BlockKind,
    /// Number of residual blocks.
    pub num_blocks: usize,
    /// Working channel width. Must be a power of two.
    pub planes: usize,
    /// Square kernel size for the stem and every block. Must be odd.
    pub kernel_size: usize,
    /// Length of the cyclic dilation schedule. 0 disables dilation.
    pub dilation_cycle: usize,
}

impl ResNet2dConfig {
    /// Config with the default width, kernel size and dilation schedule.
    pub fn new(in_channels: usize, block: BlockKind, num_blocks: usize) -> Self {
        Self {
            in_channels,
            block,
            num_blocks,
            planes: DEFAULT_PLANES,
            kernel_size: DEFAULT_KERNEL_SIZE,
            dilation_cycle: DEFAULT_DILATION_CYCLE,
        }
    }
}

/// Dilated residual network over pairwise feature grids.
///
/// A stem convolution lifts the input to `planes` channels, then a stack of
/// residual blocks cycles dilation through powers of two, widening the
/// receptive field at fixed spatial resolution. The assembled network is
/// immutable and inference-only; training its parameters happens elsewhere.
pub struct ResNet2d {
    conv1: Conv2d,
    bn1: BatchNorm,
    blocks: Vec<Block>,
    planes: usize,
}

impl ResNet2d {
    pub fn new(config: &ResNet2dConfig, vs: &VarBuilder) -> Result<Self> {
        // Power-of-two widths for faster computation on the GPU backend.
        if config.planes == 0 || config.planes & (config.planes - 1) != 0 {
            return Err(Error::Configuration(format!(
                "planes must be a power of two, got {}",
                config.planes
            )));
        }
        if config.kernel_size == 0 || config.kernel_size % 2 == 0 {
            return Err(Error::Configuration(format!(
                "kernel size must be odd, got {}",
                config.kernel_size
            )));
        }

        let stem_cfg = Conv2dConfig {
            padding: config.kernel_size / 2,
            ..Default::default()
        };
        let conv1 = conv2d_no_bias(
            config.in_channels,
            config.planes,
            config.kernel_size,
            stem_cfg,
            vs.pp("conv1"),
        )?;
        let bn1 = batch_norm(config.planes, BatchNormConfig::default(), vs.pp("bn1"))?;

        let blocks = make_layer(
            config.block,
            config.planes,
            config.num_blocks,
            1,
            config.kernel_size,
            config.dilation_cycle,
            &vs.pp("layer0"),
        )?;

        Ok(Self {
            conv1,
            bn1,
            blocks,
            planes: config.planes,
        })
    }

    /// Channel width of the network's output.
    pub fn planes(&self) -> usize {
        self.planes
    }

    /// Runs the stem and the residual stack over a `(batch, channel, row,
    /// col)` grid. Spatial extents are preserved.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let out = self.conv1.forward(xs)?;
        let mut out = self.bn1.forward_t(&out, train)?.relu()?;
        for block in &self.blocks {
            out = block.forward_t(&out, train)?;
        }
        Ok(out)
    }
}

/// Assembles `num_blocks` residual blocks of equal width.
///
/// Every block keeps `in_planes == planes` and the given stride; dilation
/// follows the cyclic schedule over the block's 0-based index. Blocks compose
/// strictly sequentially: block i's output feeds block i+1's input.
#[allow(clippy::too_many_arguments)]
pub fn make_layer(
    kind: BlockKind,
    planes: usize,
    num_blocks: usize,
    stride: usize,
    kernel_size: usize,
    dilation_cycle: usize,
    vs: &VarBuilder,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::with_capacity(num_blocks);
    for i in 0..num_blocks {
        let spec = BlockSpec {
            in_planes: planes,
            planes,
            kernel_size,
            dilation: dilation_for_block(i, dilation_cycle),
            stride,
        };
        let vs = vs.pp(i);
        let block = match kind {
            BlockKind::Standard => Block::Standard(ResBlock2d::new(spec, None, &vs)?),
            BlockKind::PreActivation => Block::PreActivation(PreActResBlock2d::new(spec, &vs)?),
        };
        blocks.push(block);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_rejects_non_power_of_two_planes() {
        let vs = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let mut config = ResNet2dConfig::new(20, BlockKind::Standard, 3);
        config.planes = 48;

        let result = ResNet2d::new(&config, &vs);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_accepts_power_of_two_planes() {
        let vs = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let mut config = ResNet2dConfig::new(20, BlockKind::Standard, 3);
        config.planes = 64;

        assert!(ResNet2d::new(&config, &vs).is_ok());
    }

    #[test]
    fn test_rejects_even_kernel_size() {
        let vs = VarBuilder::zeros(DType::F32, &Device::Cpu);
        let mut config = ResNet2dConfig::new(20, BlockKind::Standard, 3);
        config.kernel_size = 4;

        let result = ResNet2d::new(&config, &vs);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_default_config_widths() {
        let config = ResNet2dConfig::new(20, BlockKind::Standard, 25);
        assert_eq!(config.planes, 64);
        assert_eq!(config.kernel_size, 5);
        assert_eq!(config.dilation_cycle, 5);
    }
}
