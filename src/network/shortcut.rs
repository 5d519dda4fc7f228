use candle_core::Tensor;
use candle_nn::{
    batch_norm, conv2d_no_bias, BatchNorm, BatchNormConfig, Conv2d, Conv2dConfig, FuncT, Module,
    ModuleT, VarBuilder,
};

use crate::error::{Error, Result};

/// The path added back onto a residual block's main branch.
///
/// Resolved once at block construction and immutable afterwards.
pub enum Shortcut {
    /// Identity that appends zero-filled channels up to the block's width.
    ZeroPad { planes: usize },
    /// Strided 1x1 projection with its own normalization parameters.
    Projection { conv: Conv2d, norm: BatchNorm },
    /// Caller-supplied transform, used verbatim. Shape compatibility is the
    /// caller's responsibility.
    Custom(FuncT<'static>),
}

impl Shortcut {
    /// Selects the shortcut path for a block.
    ///
    /// A supplied `custom` transform always wins. Otherwise stride-1 blocks
    /// get the zero-pad identity, and strided blocks get a trainable 1x1
    /// projection registered under `vs`.
    pub fn resolve(
        in_planes: usize,
        planes: usize,
        stride: usize,
        custom: Option<FuncT<'static>>,
        vs: &VarBuilder,
    ) -> Result<Self> {
        if let Some(custom) = custom {
            return Ok(Self::Custom(custom));
        }

        if stride == 1 {
            return Ok(Self::ZeroPad { planes });
        }

        let cfg = Conv2dConfig {
            stride,
            ..Default::default()
        };
        let conv = conv2d_no_bias(in_planes, planes, 1, cfg, vs.pp("0"))?;
        let norm = batch_norm(planes, BatchNormConfig::default(), vs.pp("1"))?;
        Ok(Self::Projection { conv, norm })
    }

    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        match self {
            Self::ZeroPad { planes } => {
                let (batch, channels, height, width) = xs.dims4()?;
                if *planes < channels {
                    return Err(Error::ShapeMismatch {
                        what: "zero-pad shortcut",
                        got: channels,
                        expected: *planes,
                    });
                }
                if *planes == channels {
                    return Ok(xs.clone());
                }
                let zeros = Tensor::zeros(
                    (batch, planes - channels, height, width),
                    xs.dtype(),
                    xs.device(),
                )?;
                Ok(Tensor::cat(&[xs, &zeros], 1)?)
            }
            Self::Projection { conv, norm } => {
                let out = conv.forward(xs)?;
                Ok(norm.forward_t(&out, train)?)
            }
            Self::Custom(transform) => Ok(transform.forward_t(xs, train)?),
        }
    }
}
