mod args;
mod device;

use args::Args;
use candle_core::{DType, Tensor};
use candle_nn::{VarBuilder, VarMap};
use clap::Parser;
use log::LevelFilter;
use pairnet::network::{BlockKind, ResNet2d, ResNet2dConfig};
use simplelog::{Config, SimpleLogger};
use std::error::Error;
use std::time::Instant;

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let device = device::get_device()?;
    if device.is_cuda() {
        log::info!("Using CUDA");
    } else if device.is_metal() {
        log::info!("Using Metal");
    } else {
        log::info!("Using CPU");
    }

    let config = ResNet2dConfig {
        in_channels: args.in_channels,
        block: if args.pre_activation {
            BlockKind::PreActivation
        } else {
            BlockKind::Standard
        },
        num_blocks: args.num_blocks,
        planes: args.planes,
        kernel_size: args.kernel_size,
        dilation_cycle: args.dilation_cycle,
    };

    log::info!(
        "Building network: {} blocks, {} planes, kernel {}, dilation cycle {}",
        config.num_blocks,
        config.planes,
        config.kernel_size,
        config.dilation_cycle
    );
    let mut varmap = VarMap::new();
    let vs = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let network = ResNet2d::new(&config, &vs)?;

    if let Some(weights) = &args.weights {
        log::info!("Loading weights from {}", weights.display());
        varmap.load(weights)?;
    }

    let input = Tensor::randn(
        0f32,
        1f32,
        (
            args.batch_size,
            args.in_channels,
            args.grid_size,
            args.grid_size,
        ),
        &device,
    )?;

    let start = Instant::now();
    let output = network.forward_t(&input, false)?;
    log::info!(
        "Forward pass: {:?} -> {:?} in {:?}",
        input.dims(),
        output.dims(),
        start.elapsed()
    );

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();
    SimpleLogger::init(LevelFilter::Info, Config::default())?;

    Ok(args)
}
