//! Tensor operations for LTN.
//!
//! This module provides the axis algebra behind every combinator: aligning
//! groundings over the union of their variables.

mod broadcast;

pub use broadcast::{cross_grounding_values, dims0_of, Crossed};

use candle_core::Device;

/// Pick a compute device: Metal or CUDA when compiled in and available, otherwise CPU.
pub fn default_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
    }
    Device::Cpu
}
