// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all sky-model-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("The visibility buffer has {got} elements, but there are {expected} baseline samples")]
    OutputLength { expected: usize, got: usize },

    #[error("The modelling frequency must be positive and finite; got {0} Hz")]
    InvalidFrequency(f64),

    #[error("Execution parameter '{name}' must be at least 1")]
    InvalidExecution { name: &'static str },

    #[error("Requested GPU processing, but the 'cuda' feature was not enabled when vis_sim was compiled.")]
    NoGpuCompiled,

    #[cfg(feature = "cuda")]
    #[error(transparent)]
    Gpu(#[from] crate::gpu::GpuError),
}
