// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Direct-summation ("DFT") simulation of radio-interferometric visibilities from
point-source sky models.

Every baseline sample gets the sum over all sky-model sources of
`flux * exp(-2πi (ul + vm + w(n-1)))`, computed in single precision on the CPU
(with `rayon`) or on a CUDA device (with the "cuda" feature).
 */

pub mod baselines;
pub mod config;
pub mod constants;
mod error;
#[cfg(feature = "cuda")]
pub(crate) mod gpu;
pub mod model;
pub mod sky;

// Re-exports.
pub use baselines::{BaselineError, BaselineSamples};
pub use config::{ConfigError, SimArgs, SimConfig};
pub use error::VisSimError;
#[cfg(feature = "cuda")]
pub use gpu::GpuError;
pub use model::{
    new_sky_modeller, ExecutionConfig, ModelDevice, ModelError, ModelParams, PhaseConvention,
    SkyModeller, SkyModellerCpu,
};
#[cfg(feature = "cuda")]
pub use model::SkyModellerGpu;
pub use sky::{PointSource, SkyModel, SkyModelError, SourcePosition};

// External re-exports.
pub use marlu::{c32, RADec, XyzGeodetic, UVW};

/// Simulate visibilities for every baseline sample in `baselines`, returning
/// one complex value per sample (in the same order).
///
/// This is a convenience around [`new_sky_modeller`] and
/// [`SkyModeller::model_new`]; if the same sky model is used for many sets of
/// baselines, create a modeller once and re-use it.
///
/// # Errors
///
/// This function will return an error if the parameters are invalid, if the
/// requested device isn't available, or if there was a GPU error.
pub fn simulate_visibilities(
    device: ModelDevice,
    sky_model: &SkyModel,
    baselines: &BaselineSamples,
    params: ModelParams,
    exec: ExecutionConfig,
) -> Result<Vec<c32>, VisSimError> {
    let modeller = new_sky_modeller(device, sky_model, params, exec)?;
    let vis = modeller.model_new(baselines)?;
    Ok(vis)
}

/// Like [`simulate_visibilities`], but write into the caller's buffer. `vis`
/// must have the same length as `baselines`; its contents are overwritten.
///
/// # Errors
///
/// As for [`simulate_visibilities`], and additionally if `vis` has the wrong
/// length.
pub fn simulate_visibilities_into(
    device: ModelDevice,
    sky_model: &SkyModel,
    baselines: &BaselineSamples,
    params: ModelParams,
    exec: ExecutionConfig,
    vis: &mut [c32],
) -> Result<(), VisSimError> {
    let modeller = new_sky_modeller(device, sky_model, params, exec)?;
    modeller.model(baselines, vis)?;
    Ok(())
}
