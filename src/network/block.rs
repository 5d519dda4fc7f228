use candle_core::Tensor;
use candle_nn::{
    batch_norm, conv2d_no_bias, BatchNorm, BatchNormConfig, Conv2d, Conv2dConfig, FuncT, Module,
    ModuleT, VarBuilder,
};

use super::shortcut::Shortcut;
use crate::error::{Error, Result};

/// Which residual block variant a stack is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// conv-norm-relu twice, shortcut added before a trailing activation.
    Standard,
    /// norm-relu-conv twice, raw identity residual, no trailing activation.
    PreActivation,
}

/// Construction parameters for a single residual block.
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub in_planes: usize,
    pub planes: usize,
    pub kernel_size: usize,
    pub dilation: usize,
    pub stride: usize,
}

impl BlockSpec {
    /// Padding that keeps the spatial size fixed at stride 1. Only exact for
    /// odd kernels; the network constructor enforces oddness.
    fn padding(&self) -> usize {
        (self.kernel_size - 1) * self.dilation / 2
    }
}

/// Standard residual block: two dilated conv+norm stages plus a shortcut.
///
/// Output channel count is `spec.planes`; spatial size is preserved at
/// stride 1 by the padding invariant.
pub struct ResBlock2d {
    conv1: Conv2d,
    bn1: BatchNorm,
    conv2: Conv2d,
    bn2: BatchNorm,
    shortcut: Shortcut,
}

impl ResBlock2d {
    pub fn new(
        spec: BlockSpec,
        custom_shortcut: Option<FuncT<'static>>,
        vs: &VarBuilder,
    ) -> Result<Self> {
        let padding = spec.padding();
        let cfg1 = Conv2dConfig {
            padding,
            stride: spec.stride,
            dilation: spec.dilation,
            ..Default::default()
        };
        let cfg2 = Conv2dConfig {
            padding,
            dilation: spec.dilation,
            ..Default::default()
        };

        let conv1 = conv2d_no_bias(
            spec.in_planes,
            spec.planes,
            spec.kernel_size,
            cfg1,
            vs.pp("conv1"),
        )?;
        let bn1 = batch_norm(spec.planes, BatchNormConfig::default(), vs.pp("bn1"))?;
        let conv2 = conv2d_no_bias(
            spec.planes,
            spec.planes,
            spec.kernel_size,
            cfg2,
            vs.pp("conv2"),
        )?;
        let bn2 = batch_norm(spec.planes, BatchNormConfig::default(), vs.pp("bn2"))?;
        let shortcut = Shortcut::resolve(
            spec.in_planes,
            spec.planes,
            spec.stride,
            custom_shortcut,
            &vs.pp("shortcut"),
        )?;

        Ok(Self {
            conv1,
            bn1,
            conv2,
            bn2,
            shortcut,
        })
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let out = self.conv1.forward(xs)?;
        let out = self.bn1.forward_t(&out, train)?.relu()?;
        let out = self.conv2.forward(&out)?;
        let out = self.bn2.forward_t(&out, train)?;
        let out = (out + self.shortcut.forward_t(xs, train)?)?;
        Ok(out.relu()?)
    }
}

/// Pre-activation residual block.
///
/// Normalization and activation precede each convolution, the residual is the
/// raw input, and there is no trailing activation after the sum. Strides and
/// custom shortcuts are not supported: both convolutions run at stride 1 and
/// the caller must keep `in_planes == planes`.
pub struct PreActResBlock2d {
    bn1: BatchNorm,
    conv1: Conv2d,
    bn2: BatchNorm,
    conv2: Conv2d,
}

impl PreActResBlock2d {
    pub fn new(spec: BlockSpec, vs: &VarBuilder) -> Result<Self> {
        let cfg = Conv2dConfig {
            padding: spec.padding(),
            dilation: spec.dilation,
            ..Default::default()
        };

        let bn1 = batch_norm(spec.in_planes, BatchNormConfig::default(), vs.pp("bn1"))?;
        let conv1 = conv2d_no_bias(
            spec.in_planes,
            spec.planes,
            spec.kernel_size,
            cfg,
            vs.pp("conv1"),
        )?;
        let bn2 = batch_norm(spec.planes, BatchNormConfig::default(), vs.pp("bn2"))?;
        let conv2 = conv2d_no_bias(
            spec.planes,
            spec.planes,
            spec.kernel_size,
            cfg,
            vs.pp("conv2"),
        )?;

        Ok(Self {
            bn1,
            conv1,
            bn2,
            conv2,
        })
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let out = self.bn1.forward_t(xs, train)?.relu()?;
        let out = self.conv1.forward(&out)?;
        let out = self.bn2.forward_t(&out, train)?.relu()?;
        let out = self.conv2.forward(&out)?;
        if out.dims() != xs.dims() {
            return Err(Error::ShapeMismatch {
                what: "pre-activation residual add",
                got: out.dim(1)?,
                expected: xs.dim(1)?,
            });
        }
        Ok((out + xs)?)
    }
}

/// A stack member, tagged by variant.
pub enum Block {
    Standard(ResBlock2d),
    PreActivation(PreActResBlock2d),
}

impl Block {
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        match self {
            Self::Standard(block) => block.forward_t(xs, train),
            Self::PreActivation(block) => block.forward_t(xs, train),
        }
    }
}
