// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point-source sky models.
//!
//! A [`SkyModel`] is kept as a structure of arrays; each of its arrays has one
//! element per source, and the source order is the order in which the
//! accumulation kernels sum.

#[cfg(test)]
mod tests;

use marlu::{RADec, LMN};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_REF_FREQ_HZ;

/// Where a point source is on the sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePosition {
    /// Equatorial coordinates \[degrees\]. These are converted to direction
    /// cosines relative to a phase centre.
    RaDec { ra: f64, dec: f64 },

    /// Direction cosines that are already relative to the phase centre.
    Lmn { l: f64, m: f64, n: f64 },
}

/// A single sky-model point source with a power-law flux density (Stokes I
/// only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    pub pos: SourcePosition,

    /// The flux density at `ref_freq` \[Jy\].
    pub flux_density: f64,

    /// Spectral index (alpha). Zero means a flat spectrum.
    #[serde(default)]
    pub spectral_index: f64,

    /// The frequency at which `flux_density` applies \[Hz\].
    #[serde(default = "default_ref_freq")]
    pub ref_freq: f64,
}

fn default_ref_freq() -> f64 {
    DEFAULT_REF_FREQ_HZ
}

impl PointSource {
    /// A flat-spectrum point source.
    pub fn new(pos: SourcePosition, flux_density: f64) -> PointSource {
        PointSource {
            pos,
            flux_density,
            spectral_index: 0.0,
            ref_freq: DEFAULT_REF_FREQ_HZ,
        }
    }
}

#[derive(Error, Debug)]
pub enum SkyModelError {
    #[error("Sky-model array '{name}' has {got} elements, but {expected} were expected")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Sky-model point sources ready for visibility accumulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkyModel {
    pub(crate) ls: Vec<f32>,
    pub(crate) ms: Vec<f32>,
    pub(crate) ns: Vec<f32>,
    /// Flux densities at `ref_freqs` \[Jy\].
    pub(crate) fluxes: Vec<f32>,
    pub(crate) spectral_indices: Vec<f32>,
    /// \[Hz\]
    pub(crate) ref_freqs: Vec<f64>,
}

impl SkyModel {
    /// Create a flat-spectrum sky model from direction cosines and flux
    /// densities \[Jy\]. All of the arrays must have the same length.
    pub fn new(
        ls: Vec<f32>,
        ms: Vec<f32>,
        ns: Vec<f32>,
        fluxes: Vec<f32>,
    ) -> Result<SkyModel, SkyModelError> {
        let expected = ls.len();
        check_len("ms", expected, ms.len())?;
        check_len("ns", expected, ns.len())?;
        check_len("fluxes", expected, fluxes.len())?;

        Ok(SkyModel {
            spectral_indices: vec![0.0; expected],
            ref_freqs: vec![DEFAULT_REF_FREQ_HZ; expected],
            ls,
            ms,
            ns,
            fluxes,
        })
    }

    /// Give each source a power-law spectrum; `spectral_indices` and
    /// `ref_freqs` \[Hz\] must have one element per source.
    pub fn with_spectra(
        mut self,
        spectral_indices: Vec<f32>,
        ref_freqs: Vec<f64>,
    ) -> Result<SkyModel, SkyModelError> {
        check_len("spectral_indices", self.len(), spectral_indices.len())?;
        check_len("ref_freqs", self.len(), ref_freqs.len())?;
        self.spectral_indices = spectral_indices;
        self.ref_freqs = ref_freqs;
        Ok(self)
    }

    /// Convert point sources into a sky model. Sources with RA/Dec positions
    /// are converted to direction cosines relative to `phase_centre` in double
    /// precision before being demoted.
    pub fn from_point_sources(sources: &[PointSource], phase_centre: RADec) -> SkyModel {
        let mut sky_model = SkyModel {
            ls: Vec::with_capacity(sources.len()),
            ms: Vec::with_capacity(sources.len()),
            ns: Vec::with_capacity(sources.len()),
            fluxes: Vec::with_capacity(sources.len()),
            spectral_indices: Vec::with_capacity(sources.len()),
            ref_freqs: Vec::with_capacity(sources.len()),
        };

        for source in sources {
            let LMN { l, m, n } = match source.pos {
                SourcePosition::RaDec { ra, dec } => {
                    RADec::from_degrees(ra, dec).to_lmn(phase_centre)
                }
                SourcePosition::Lmn { l, m, n } => LMN { l, m, n },
            };
            sky_model.ls.push(l as f32);
            sky_model.ms.push(m as f32);
            sky_model.ns.push(n as f32);
            sky_model.fluxes.push(source.flux_density as f32);
            sky_model.spectral_indices.push(source.spectral_index as f32);
            sky_model.ref_freqs.push(source.ref_freq);
        }

        sky_model
    }

    /// The number of sources.
    pub fn len(&self) -> usize {
        self.ls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ls.is_empty()
    }

    pub fn ls(&self) -> &[f32] {
        &self.ls
    }

    pub fn ms(&self) -> &[f32] {
        &self.ms
    }

    pub fn ns(&self) -> &[f32] {
        &self.ns
    }

    /// Flux densities at each source's reference frequency \[Jy\].
    pub fn fluxes(&self) -> &[f32] {
        &self.fluxes
    }

    /// Get the flux densities of all sources at `freq_hz`. Flat-spectrum
    /// sources are returned untouched.
    pub(crate) fn fluxes_at(&self, freq_hz: f64) -> Vec<f32> {
        self.fluxes
            .iter()
            .zip(self.spectral_indices.iter())
            .zip(self.ref_freqs.iter())
            .map(|((&flux, &si), &ref_freq)| {
                if si == 0.0 {
                    flux
                } else {
                    let ratio = freq_hz / ref_freq;
                    (f64::from(flux) * ratio.powf(f64::from(si))) as f32
                }
            })
            .collect()
    }
}

fn check_len(name: &'static str, expected: usize, got: usize) -> Result<(), SkyModelError> {
    if expected == got {
        Ok(())
    } else {
        Err(SkyModelError::LengthMismatch {
            name,
            expected,
            got,
        })
    }
}
