// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to generate sky-model visibilities on the CPU.

use marlu::c32;
use rayon::prelude::*;

use super::{
    check_output_len, ExecutionConfig, ModelError, ModelParams, PhaseConvention, SkyModeller,
};
use crate::{baselines::BaselineSamples, constants::PI_F32, sky::SkyModel};

pub struct SkyModellerCpu<'a> {
    sky_model: &'a SkyModel,

    /// The flux densities of each source at the modelling frequency \[Jy\].
    fluxes: Vec<f32>,

    /// Multiply baseline coordinates \[metres\] by this to get wavelengths.
    uvw_scale: f32,

    phase_convention: PhaseConvention,

    samples_per_task: usize,
}

impl<'a> SkyModellerCpu<'a> {
    /// # Errors
    ///
    /// This function will return an error if `params` or `exec` are invalid.
    pub fn new(
        sky_model: &'a SkyModel,
        params: ModelParams,
        exec: ExecutionConfig,
    ) -> Result<SkyModellerCpu<'a>, ModelError> {
        params.validate()?;
        exec.validate()?;

        Ok(SkyModellerCpu {
            sky_model,
            fluxes: sky_model.fluxes_at(params.freq_hz),
            uvw_scale: params.uvw_scale(),
            phase_convention: params.phase_convention,
            samples_per_task: exec.samples_per_task,
        })
    }
}

impl SkyModeller for SkyModellerCpu<'_> {
    fn model(&self, baselines: &BaselineSamples, vis: &mut [c32]) -> Result<(), ModelError> {
        check_output_len(baselines, vis)?;

        let scale = self.uvw_scale;
        let n_offset = self.phase_convention.n_offset();
        let chunk_size = self.samples_per_task;

        // Each rayon task owns a contiguous chunk of the output; within a
        // chunk, each sample is a serial sum over sources.
        vis.par_chunks_mut(chunk_size)
            .zip(baselines.us.par_chunks(chunk_size))
            .zip(baselines.vs.par_chunks(chunk_size))
            .zip(baselines.ws.par_chunks(chunk_size))
            .for_each(|(((vis, us), vs), ws)| {
                vis.iter_mut()
                    .zip(us)
                    .zip(vs)
                    .zip(ws)
                    .for_each(|(((vis, &u), &v), &w)| {
                        *vis = self.accumulate(u * scale, v * scale, w * scale, n_offset);
                    });
            });

        Ok(())
    }

    fn num_sources(&self) -> usize {
        self.sky_model.len()
    }
}

impl SkyModellerCpu<'_> {
    /// Sum `flux * exp(-2πi (ul + vm + w(n - n_offset)))` over all sources,
    /// in source order. `u`, `v` and `w` are in wavelengths.
    #[inline]
    fn accumulate(&self, u: f32, v: f32, w: f32, n_offset: f32) -> c32 {
        let mut re = 0.0;
        let mut im = 0.0;
        self.sky_model
            .ls
            .iter()
            .zip(self.sky_model.ms.iter())
            .zip(self.sky_model.ns.iter())
            .zip(self.fluxes.iter())
            .for_each(|(((&l, &m), &n), &flux)| {
                let phase = u * l + v * m + w * (n - n_offset);
                let (sin, cos) = (-2.0 * PI_F32 * phase).sin_cos();
                re += flux * cos;
                im += flux * sin;
            });
        c32::new(re, im)
    }
}
