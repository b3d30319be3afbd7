// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Utilities for CUDA devices.

include!("utils_bindings.rs");

use std::{ffi::CStr, os::raw::c_char, panic::Location};

use super::GpuError;

#[derive(Debug, Clone)]
pub(crate) struct GpuDriverInfo {
    /// Formatted CUDA driver version, e.g. "11.7".
    pub(crate) driver_version: Box<str>,
    /// Formatted CUDA runtime version, e.g. "11.7".
    pub(crate) runtime_version: Box<str>,
}

#[derive(Debug, Clone)]
pub(crate) struct GpuDeviceInfo {
    pub(crate) name: Box<str>,
    pub(crate) capability: Box<str>,
    /// \[MebiBytes (MiB)\]
    pub(crate) total_global_mem: usize,
}

/// CUDA encodes versions as 1000 * major + 10 * minor.
fn format_cuda_version(version: i32) -> String {
    format!("{}.{}", version / 1000, (version / 10) % 100)
}

/// Get CUDA device and driver information. At present, this function only
/// returns information on "device 0".
#[track_caller]
pub(crate) fn get_device_info() -> Result<(GpuDeviceInfo, GpuDriverInfo), GpuError> {
    // TODO: Allow the device to be selected once multi-GPU machines are
    // supported.
    let device = 0;
    let mut name: [c_char; 256] = [0; 256];
    let mut device_major = 0;
    let mut device_minor = 0;
    let mut total_global_mem = 0;
    let mut driver_version = 0;
    let mut runtime_version = 0;

    unsafe {
        let error_message_ptr = get_gpu_device_info(
            device,
            name.as_mut_ptr(),
            &mut device_major,
            &mut device_minor,
            &mut total_global_mem,
            &mut driver_version,
            &mut runtime_version,
        );
        if !error_message_ptr.is_null() {
            // Get the CUDA error message behind the pointer.
            let error_message = CStr::from_ptr(error_message_ptr)
                .to_str()
                .unwrap_or("<cannot read CUDA error string>");
            let location = Location::caller();
            return Err(GpuError::Generic {
                msg: error_message.into(),
                file: location.file(),
                line: location.line(),
            });
        }
    }

    // The CUDA code always null-terminates the name.
    let name = unsafe { CStr::from_ptr(name.as_ptr()) };
    let device_info = GpuDeviceInfo {
        name: name.to_string_lossy().into(),
        capability: format!("{device_major}.{device_minor}").into_boxed_str(),
        total_global_mem: total_global_mem / 1048576,
    };

    Ok((
        device_info,
        GpuDriverInfo {
            driver_version: format_cuda_version(driver_version).into_boxed_str(),
            runtime_version: format_cuda_version(runtime_version).into_boxed_str(),
        },
    ))
}
