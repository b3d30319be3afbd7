// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to generate sky-model visibilities with CUDA.

use marlu::c32;

use super::{check_output_len, ExecutionConfig, ModelError, ModelParams, SkyModeller};
use crate::{
    baselines::BaselineSamples,
    gpu::{self, gpu_kernel_call, DevicePointer, GpuError},
    sky::SkyModel,
};

/// Sky-model sources live on the device for the life of this struct; baseline
/// samples and visibilities are copied to and from the device for each call
/// to [`SkyModeller::model`].
pub struct SkyModellerGpu {
    num_sources: i32,
    d_ls: DevicePointer<f32>,
    d_ms: DevicePointer<f32>,
    d_ns: DevicePointer<f32>,
    /// Flux densities at the modelling frequency \[Jy\].
    d_fluxes: DevicePointer<f32>,

    uvw_scale: f32,
    n_offset: f32,
    samples_per_task: usize,
    threads_per_block: u32,
}

/// No supported CUDA device accepts larger blocks.
const MAX_THREADS_PER_BLOCK: u32 = 1024;

impl SkyModellerGpu {
    /// Copy the sky model to the device.
    ///
    /// # Errors
    ///
    /// This function will return an error if `params` or `exec` are invalid,
    /// or if device mallocs and copies fail.
    pub fn new(
        sky_model: &SkyModel,
        params: ModelParams,
        exec: ExecutionConfig,
    ) -> Result<SkyModellerGpu, ModelError> {
        params.validate()?;
        exec.validate()?;

        let fluxes = sky_model.fluxes_at(params.freq_hz);
        Ok(SkyModellerGpu {
            num_sources: to_c_int(sky_model.len(), "number of sources")?,
            d_ls: DevicePointer::copy_to_device(&sky_model.ls)?,
            d_ms: DevicePointer::copy_to_device(&sky_model.ms)?,
            d_ns: DevicePointer::copy_to_device(&sky_model.ns)?,
            d_fluxes: DevicePointer::copy_to_device(&fluxes)?,
            uvw_scale: params.uvw_scale(),
            n_offset: params.phase_convention.n_offset(),
            samples_per_task: exec.samples_per_task,
            threads_per_block: exec.threads_per_block,
        })
    }
}

impl SkyModeller for SkyModellerGpu {
    fn model(&self, baselines: &BaselineSamples, vis: &mut [c32]) -> Result<(), ModelError> {
        check_output_len(baselines, vis)?;
        if vis.is_empty() {
            return Ok(());
        }

        let num_samples = to_c_int(baselines.len(), "number of baseline samples")?;
        // Neither of these changes the results, only how the samples are
        // spread over threads.
        let samples_per_thread = to_c_int(
            self.samples_per_task.min(baselines.len()),
            "samples per task",
        )?;
        let threads_per_block = to_c_int(
            self.threads_per_block.min(MAX_THREADS_PER_BLOCK) as usize,
            "threads per block",
        )?;

        let d_us = DevicePointer::copy_to_device(&baselines.us)?;
        let d_vs = DevicePointer::copy_to_device(&baselines.vs)?;
        let d_ws = DevicePointer::copy_to_device(&baselines.ws)?;
        let mut d_vis: DevicePointer<c32> = DevicePointer::malloc(std::mem::size_of_val(vis))?;

        let sources = gpu::Sources {
            num_sources: self.num_sources,
            ls: self.d_ls.get(),
            ms: self.d_ms.get(),
            ns: self.d_ns.get(),
            fluxes: self.d_fluxes.get(),
        };
        let baselines = gpu::Baselines {
            num_samples,
            us: d_us.get(),
            vs: d_vs.get(),
            ws: d_ws.get(),
        };
        gpu_kernel_call!(
            gpu::model_visibilities,
            &sources,
            &baselines,
            self.uvw_scale,
            self.n_offset,
            samples_per_thread,
            threads_per_block,
            d_vis.get_mut().cast(),
        )?;

        d_vis.copy_from_device(vis)?;
        Ok(())
    }

    fn num_sources(&self) -> usize {
        self.num_sources as usize
    }
}

/// Counts are passed to the CUDA code as `int`s.
#[track_caller]
fn to_c_int(n: usize, what: &str) -> Result<i32, GpuError> {
    n.try_into().map_err(|_| {
        let location = std::panic::Location::caller();
        GpuError::Generic {
            msg: format!("The {what} ({n}) is too large for the CUDA code").into(),
            file: location.file(),
            line: location.line(),
        }
    })
}
