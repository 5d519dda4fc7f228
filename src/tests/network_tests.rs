use candle_core::{DType, Device, Result, Tensor};
use candle_nn::{VarBuilder, VarMap};
use rand::Rng;

use crate::network::{BlockKind, ResNet2d, ResNet2dConfig};

/// Creates a random pairwise feature grid with values in [-1, 1).
fn create_random_grid(channels: usize, size: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..channels * size * size)
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect()
}

fn small_config(block: BlockKind) -> ResNet2dConfig {
    let mut config = ResNet2dConfig::new(12, block, 6);
    config.planes = 32;
    config
}

#[test]
fn test_standard_network_preserves_spatial_shape() -> Result<()> {
    let varmap = VarMap::new();
    let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let network = ResNet2d::new(&small_config(BlockKind::Standard), &vs).unwrap();

    // Six blocks with a cycle of five walk the dilations 1,2,4,8,16,1.
    let grid = create_random_grid(12, 16);
    let input = Tensor::from_vec(grid, (1, 12, 16, 16), &Device::Cpu)?;
    let output = network.forward_t(&input, false).unwrap();

    assert_eq!(output.dims(), &[1, 32, 16, 16]);
    Ok(())
}

#[test]
fn test_pre_activation_network_preserves_spatial_shape() -> Result<()> {
    let varmap = VarMap::new();
    let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let network = ResNet2d::new(&small_config(BlockKind::PreActivation), &vs).unwrap();

    let grid = create_random_grid(12, 16);
    let input = Tensor::from_vec(grid, (1, 12, 16, 16), &Device::Cpu)?;
    let output = network.forward_t(&input, false).unwrap();

    assert_eq!(output.dims(), &[1, 32, 16, 16]);
    Ok(())
}

#[test]
fn test_output_width_matches_planes() -> Result<()> {
    let varmap = VarMap::new();
    let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);

    let mut config = ResNet2dConfig::new(8, BlockKind::Standard, 2);
    config.planes = 16;
    let network = ResNet2d::new(&config, &vs).unwrap();
    assert_eq!(network.planes(), 16);

    let input = Tensor::randn(0f32, 1f32, (2, 8, 10, 10), &Device::Cpu)?;
    let output = network.forward_t(&input, false).unwrap();
    assert_eq!(output.dims(), &[2, 16, 10, 10]);
    Ok(())
}

#[test]
fn test_zero_weights_and_zero_input_propagate_zero() -> Result<()> {
    let vs = VarBuilder::zeros(DType::F32, &Device::Cpu);
    let network = ResNet2d::new(&small_config(BlockKind::Standard), &vs).unwrap();

    let input = Tensor::zeros((1, 12, 16, 16), DType::F32, &Device::Cpu)?;
    let output = network.forward_t(&input, false).unwrap();

    let total = output.abs()?.sum_all()?.to_scalar::<f32>()?;
    assert_eq!(total, 0.0);
    Ok(())
}

#[test]
fn test_forward_is_deterministic() -> Result<()> {
    let varmap = VarMap::new();
    let vs = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let network = ResNet2d::new(&small_config(BlockKind::Standard), &vs).unwrap();

    let grid = create_random_grid(12, 16);
    let input = Tensor::from_vec(grid, (1, 12, 16, 16), &Device::Cpu)?;

    let first = network.forward_t(&input, false).unwrap();
    let second = network.forward_t(&input, false).unwrap();

    let diff = (&first - &second)?.abs()?.sum_all()?.to_scalar::<f32>()?;
    assert_eq!(diff, 0.0);
    Ok(())
}
