// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to generate sky-model visibilities.

mod cpu;
mod error;
#[cfg(feature = "cuda")]
mod gpu;
#[cfg(test)]
mod tests;

pub use cpu::SkyModellerCpu;
pub use error::ModelError;
#[cfg(feature = "cuda")]
pub use gpu::SkyModellerGpu;

use log::debug;
use marlu::c32;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    baselines::BaselineSamples,
    constants::{DEFAULT_SAMPLES_PER_TASK, DEFAULT_THREADS_PER_BLOCK, VEL_C},
    sky::SkyModel,
};

// Visibilities are handed to the GPU code as interleaved (real, imag) floats.
static_assertions::assert_eq_size!(c32, [f32; 2]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum ModelDevice {
    /// The CPU is used for modelling, with as many threads as rayon is
    /// allowed.
    #[strum(serialize = "cpu")]
    Cpu,

    /// A CUDA-capable device is used for modelling. This is only available if
    /// the "cuda" feature was enabled at compile time.
    #[strum(serialize = "gpu")]
    Gpu,
}

impl ModelDevice {
    /// Visibilities are always accumulated in single precision.
    pub fn get_precision(self) -> &'static str {
        "single"
    }

    /// Get a formatted string with information on the device used for
    /// modelling.
    pub fn get_device_info(self) -> Result<String, ModelError> {
        match self {
            ModelDevice::Cpu => Ok(get_cpu_info()),

            #[cfg(feature = "cuda")]
            ModelDevice::Gpu => {
                let (device_info, driver_info) = crate::gpu::get_device_info()?;
                Ok(format!(
                    "{} (capability {}, {} MiB), CUDA driver {}, runtime {}",
                    device_info.name,
                    device_info.capability,
                    device_info.total_global_mem,
                    driver_info.driver_version,
                    driver_info.runtime_version
                ))
            }

            #[cfg(not(feature = "cuda"))]
            ModelDevice::Gpu => Err(ModelError::NoGpuCompiled),
        }
    }
}

/// Get a formatted string with information on the CPU.
fn get_cpu_info() -> String {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        // Non-exhaustive but perhaps most-interesting CPU features.
        let avx = std::arch::is_x86_feature_detected!("avx");
        let avx2 = std::arch::is_x86_feature_detected!("avx2");
        let avx512 = std::arch::is_x86_feature_detected!("avx512f");

        match (avx512, avx2, avx) {
            (true, _, _) => format!("{} CPU (AVX512 available)", std::env::consts::ARCH),
            (false, true, _) => format!("{} CPU (AVX2 available)", std::env::consts::ARCH),
            (false, false, true) => format!("{} CPU (AVX available)", std::env::consts::ARCH),
            (false, false, false) => format!("{} CPU (AVX unavailable!)", std::env::consts::ARCH),
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    format!("{} CPU", std::env::consts::ARCH)
}

/// How the `n` direction cosine enters the phase of each source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseConvention {
    /// Use `w(n - 1)`, so that a source at the phase centre has zero phase on
    /// every baseline.
    #[default]
    PhaseTracking,

    /// Use `wn`.
    Absolute,
}

impl PhaseConvention {
    /// The amount subtracted from `n` before it is multiplied by `w`.
    pub(crate) fn n_offset(self) -> f32 {
        match self {
            PhaseConvention::PhaseTracking => 1.0,
            PhaseConvention::Absolute => 0.0,
        }
    }
}

/// Parameters that affect the values of the modelled visibilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    /// The frequency to model at \[Hz\]. Baseline coordinates are divided by
    /// the corresponding wavelength, and power-law sources are scaled to this
    /// frequency.
    pub freq_hz: f64,

    pub phase_convention: PhaseConvention,
}

impl ModelParams {
    pub fn new(freq_hz: f64) -> ModelParams {
        ModelParams {
            freq_hz,
            phase_convention: PhaseConvention::default(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.freq_hz.is_finite() && self.freq_hz > 0.0 {
            Ok(())
        } else {
            Err(ModelError::InvalidFrequency(self.freq_hz))
        }
    }

    /// The factor that converts baseline coordinates in metres into
    /// wavelengths.
    pub(crate) fn uvw_scale(&self) -> f32 {
        (self.freq_hz / VEL_C) as f32
    }
}

/// Parameters that affect how modelling work is partitioned. None of these
/// change the modelled visibilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// The number of contiguous baseline samples handled by one unit of
    /// parallel work (a rayon task on the CPU, a thread on the GPU).
    pub samples_per_task: usize,

    /// The number of threads in each GPU block. Not used on the CPU.
    pub threads_per_block: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            samples_per_task: DEFAULT_SAMPLES_PER_TASK,
            threads_per_block: DEFAULT_THREADS_PER_BLOCK,
        }
    }
}

impl ExecutionConfig {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.samples_per_task == 0 {
            return Err(ModelError::InvalidExecution {
                name: "samples_per_task",
            });
        }
        if self.threads_per_block == 0 {
            return Err(ModelError::InvalidExecution {
                name: "threads_per_block",
            });
        }
        Ok(())
    }
}

/// An object that simulates sky-model visibilities.
pub trait SkyModeller {
    /// Generate visibilities for each of the baseline samples and write them
    /// into `vis`, which must have the same length as `baselines`. *The
    /// existing contents of `vis` are overwritten.* The visibility of each
    /// sample is the sum over all sources, in source order.
    ///
    /// # Errors
    ///
    /// This function will return an error if `vis` has the wrong length or if
    /// there was a GPU error (if using GPU functionality). `vis` is not
    /// written to if an error occurs.
    fn model(&self, baselines: &BaselineSamples, vis: &mut [c32]) -> Result<(), ModelError>;

    /// Like [`SkyModeller::model`], but allocate and return the visibilities.
    ///
    /// # Errors
    ///
    /// This function will return an error if there was a GPU error (if using
    /// GPU functionality).
    fn model_new(&self, baselines: &BaselineSamples) -> Result<Vec<c32>, ModelError> {
        let mut vis = vec![c32::default(); baselines.len()];
        self.model(baselines, &mut vis)?;
        Ok(vis)
    }

    /// The number of sky-model sources being modelled.
    fn num_sources(&self) -> usize;
}

/// Create a [`SkyModeller`] trait object that generates sky-model visibilities
/// on the CPU or a CUDA-compatible GPU, depending on `device`.
///
/// # Errors
///
/// This function will return an error if the parameters are invalid, if a GPU
/// was requested but "cuda" wasn't compiled in, or if GPU mallocs and copies
/// can't be executed.
pub fn new_sky_modeller<'a>(
    device: ModelDevice,
    sky_model: &'a SkyModel,
    params: ModelParams,
    exec: ExecutionConfig,
) -> Result<Box<dyn SkyModeller + 'a>, ModelError> {
    let device_info = device.get_device_info()?;
    debug!(
        "Modelling {} sources at {} MHz on {device_info} ({} precision)",
        sky_model.len(),
        params.freq_hz / 1e6,
        device.get_precision()
    );
    debug!(
        "Phase convention: {:?}, samples per task: {}",
        params.phase_convention, exec.samples_per_task
    );

    match device {
        ModelDevice::Cpu => Ok(Box::new(SkyModellerCpu::new(sky_model, params, exec)?)),

        #[cfg(feature = "cuda")]
        ModelDevice::Gpu => Ok(Box::new(SkyModellerGpu::new(sky_model, params, exec)?)),

        #[cfg(not(feature = "cuda"))]
        ModelDevice::Gpu => Err(ModelError::NoGpuCompiled),
    }
}

/// Both backends refuse to write to an output buffer that doesn't match the
/// baseline samples.
fn check_output_len(baselines: &BaselineSamples, vis: &[c32]) -> Result<(), ModelError> {
    if baselines.len() == vis.len() {
        Ok(())
    } else {
        Err(ModelError::OutputLength {
            expected: baselines.len(),
            got: vis.len(),
        })
    }
}
