//! Backend selected by the crate features. `wgpu` takes precedence over `ndarray`.

#[cfg(feature = "wgpu")]
mod selected {
    use burn::backend::wgpu::{Wgpu, WgpuDevice};

    pub type Backend = Wgpu<f32, i32>;

    pub fn device() -> WgpuDevice {
        WgpuDevice::default()
    }
}

#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
mod selected {
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    pub type Backend = NdArray<f32>;

    pub fn device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

pub use selected::{device, Backend};

/// Backend used for training.
pub type TrainingBackend = burn::backend::Autodiff<Backend>;
