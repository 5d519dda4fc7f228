use candle_core::Device;
use std::error::Error;

/// Picks the best available device, falling back to the CPU.
pub fn get_device() -> Result<Device, Box<dyn Error>> {
    #[cfg(feature = "cuda")]
    {
        let device = Device::cuda_if_available(0)?;
        if device.is_cuda() {
            return Ok(device);
        }
    }
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if device.is_metal() {
                return Ok(device);
            }
        }
    }
    Ok(Device::Cpu)
}
