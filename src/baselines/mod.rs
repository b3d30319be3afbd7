// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Baseline samples: the (u, v, w) coordinates at which visibilities are
//! evaluated.


use marlu::{pos::xyz::xyzs_to_cross_uvws, RADec, XyzGeodetic, UVW};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("Baseline coordinate array '{name}' has {got} elements, but {expected} were expected")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Baseline (u, v, w) coordinates \[metres\], kept as a structure of arrays.
/// Each sample is one baseline at one time and frequency; an output
/// visibility is produced for each of them, in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineSamples {
    pub(crate) us: Vec<f32>,
    pub(crate) vs: Vec<f32>,
    pub(crate) ws: Vec<f32>,
}

impl BaselineSamples {
    /// All of the arrays must have the same length.
    pub fn new(us: Vec<f32>, vs: Vec<f32>, ws: Vec<f32>) -> Result<Self, BaselineError> {
        let expected = us.len();
        check_len("vs", expected, vs.len())?;
        check_len("ws", expected, ws.len())?;
        Ok(Self { us, vs, ws })
    }

    /// Demote double-precision [`UVW`]s \[metres\].
    pub fn from_uvws(uvws: &[UVW]) -> Self {
        let mut us = Vec::with_capacity(uvws.len());
        let mut vs = Vec::with_capacity(uvws.len());
        let mut ws = Vec::with_capacity(uvws.len());
        for &UVW { u, v, w } in uvws {
            us.push(u as f32);
            vs.push(v as f32);
            ws.push(w as f32);
        }
        Self { us, vs, ws }
    }

    /// Get the cross-correlation baselines formed by the tiles at
    /// `tile_xyzs`, as seen from the array when the local sidereal time is
    /// `lst_rad` and the array is phased towards `phase_centre`. Baselines are
    /// ordered by tile pairs (0, 1), (0, 2), ..., (1, 2), ...
    pub fn from_tile_xyzs(tile_xyzs: &[XyzGeodetic], phase_centre: RADec, lst_rad: f64) -> Self {
        let uvws = xyzs_to_cross_uvws(tile_xyzs, phase_centre.to_hadec(lst_rad));
        Self::from_uvws(&uvws)
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.us.is_empty()
    }

    pub fn us(&self) -> &[f32] {
        &self.us
    }

    pub fn vs(&self) -> &[f32] {
        &self.vs
    }

    pub fn ws(&self) -> &[f32] {
        &self.ws
    }
}

fn check_len(name: &'static str, expected: usize, got: usize) -> Result<(), BaselineError> {
    if expected == got {
        Ok(())
    } else {
        Err(BaselineError::LengthMismatch {
            name,
            expected,
            got,
        })
    }
}
