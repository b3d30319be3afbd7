// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

Visibilities are accumulated in single precision, but anything done once per
source or once per baseline before the accumulation (coordinate conversions,
flux-density scaling) is done in double precision and then demoted.
 */

pub use marlu::constants::VEL_C;

/// π as used by the accumulation kernels. This is the nearest `f32` to π, and
/// the same literal appears in the CUDA code.
#[allow(clippy::excessive_precision, clippy::approx_constant)]
pub const PI_F32: f32 = 3.14159274101257;

/// The number of contiguous baseline samples handled by one parallel unit of
/// work, unless told otherwise.
pub const DEFAULT_SAMPLES_PER_TASK: usize = 64;

/// The GPU block size, unless told otherwise.
pub const DEFAULT_THREADS_PER_BLOCK: u32 = 128;

/// The reference frequency of a source's flux density if it isn't specified
/// \[Hz\].
pub const DEFAULT_REF_FREQ_HZ: f64 = 150e6;
