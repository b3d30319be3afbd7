// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CUDA code to be used by vis_sim.
//!
//! Every CUDA runtime failure is turned into a [`GpuError`] that records the
//! Rust file and line that made the call, along with CUDA's description.

#![allow(non_snake_case)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::excessive_precision)]

mod utils;

use std::{ffi::CStr, panic::Location, ptr::null_mut};

use cuda_runtime_sys::{
    cudaDeviceSynchronize, cudaError::cudaSuccess, cudaFree, cudaGetErrorString,
    cudaGetLastError, cudaMalloc, cudaMemcpy,
    cudaMemcpyKind::{cudaMemcpyDeviceToHost, cudaMemcpyHostToDevice},
};
use thiserror::Error;

pub(crate) use utils::get_device_info;

include!("model_bindings.rs");

// The kernel and the CPU code must agree on pi.
static_assertions::const_assert_eq!(VIS_SIM_PI_F, crate::constants::PI_F32);

/// Call a function from the CUDA code that returns a null pointer on success
/// and a pointer to an error string on failure. The error is returned with
/// the file and line of the caller.
macro_rules! gpu_kernel_call {
    ($gpu_fn:path, $($args:expr),* $(,)?) => {{
        #[allow(unused_unsafe)]
        unsafe {
            let error_message_ptr = $gpu_fn($($args),*);
            if error_message_ptr.is_null() {
                Ok(())
            } else {
                // Get the GPU error message behind the pointer.
                let error_message = std::ffi::CStr::from_ptr(error_message_ptr)
                    .to_str()
                    .unwrap_or("<cannot read CUDA error string>");
                let our_error_message = format!("{}: {error_message}", stringify!($gpu_fn));
                Err(GpuError::Kernel {
                    msg: our_error_message.into(),
                    file: file!(),
                    line: line!(),
                })
            }
        }
    }};
}
pub(crate) use gpu_kernel_call;

#[derive(Clone, Copy)]
enum GpuCall {
    Malloc,
    CopyToDevice,
    CopyFromDevice,
}

impl GpuCall {
    fn into_error(self, msg: &str, location: &'static Location<'static>) -> GpuError {
        let msg = msg.into();
        let file = location.file();
        let line = location.line();
        match self {
            GpuCall::Malloc => GpuError::Malloc { msg, file, line },
            GpuCall::CopyToDevice => GpuError::CopyToDevice { msg, file, line },
            GpuCall::CopyFromDevice => GpuError::CopyFromDevice { msg, file, line },
        }
    }
}

/// Run [`cudaGetLastError`] and, in debug mode, [`cudaDeviceSynchronize`]. If
/// either of these calls return an error, it is converted to a Rust error and
/// returned from this function. The single argument describes what the
/// just-performed operation was and makes the returned error a helpful one.
///
/// # Safety
///
/// This function interfaces directly with the CUDA API. Rust errors attempt
/// to catch problems but there are no guarantees.
#[track_caller]
unsafe fn check_for_errors(gpu_call: GpuCall) -> Result<(), GpuError> {
    // Only do a device sync if we're in debug mode, for performance.
    let debug_mode = matches!(std::env::var("DEBUG").as_deref(), Ok("true"));
    if debug_mode {
        let code = cudaDeviceSynchronize();
        if code != cudaSuccess {
            let msg = CStr::from_ptr(cudaGetErrorString(code))
                .to_str()
                .unwrap_or("<cannot read CUDA error string>");
            return Err(gpu_call.into_error(msg, Location::caller()));
        }
    }

    let code = cudaGetLastError();
    if code != cudaSuccess {
        let msg = CStr::from_ptr(cudaGetErrorString(code))
            .to_str()
            .unwrap_or("<cannot read CUDA error string>");
        return Err(gpu_call.into_error(msg, Location::caller()));
    }

    Ok(())
}

/// A Rust-managed pointer to CUDA device memory. When this is dropped,
/// [`cudaFree`] is called on the pointer.
#[derive(Debug)]
pub(crate) struct DevicePointer<T> {
    pub(crate) ptr: *mut T,

    /// The number of bytes allocated against `ptr`.
    size: usize,
}

impl<T> Drop for DevicePointer<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe {
                cudaFree(self.ptr.cast());
            }
        }
    }
}

impl<T> DevicePointer<T> {
    /// Get a const pointer to the device memory.
    pub(crate) fn get(&self) -> *const T {
        self.ptr as *const T
    }

    /// Get a mutable pointer to the device memory.
    pub(crate) fn get_mut(&mut self) -> *mut T {
        self.ptr
    }

    /// Allocate a number of bytes on the device.
    #[track_caller]
    pub(crate) fn malloc(size: usize) -> Result<DevicePointer<T>, GpuError> {
        if size == 0 {
            Ok(Self::default())
        } else {
            let mut d_ptr = std::ptr::null_mut();
            unsafe {
                cudaMalloc(&mut d_ptr, size);
                check_for_errors(GpuCall::Malloc)?;
            }
            Ok(Self {
                ptr: d_ptr.cast(),
                size,
            })
        }
    }

    /// Copy a slice of data to the device. Any type is allowed, and the
    /// returned pointer is to the device memory.
    #[track_caller]
    pub(crate) fn copy_to_device(v: &[T]) -> Result<DevicePointer<T>, GpuError> {
        let size = std::mem::size_of_val(v);
        unsafe {
            let mut d_ptr = Self::malloc(size)?;
            if size > 0 {
                cudaMemcpy(
                    d_ptr.get_mut().cast(),
                    v.as_ptr().cast(),
                    size,
                    cudaMemcpyHostToDevice,
                );
                check_for_errors(GpuCall::CopyToDevice)?;
            }
            Ok(d_ptr)
        }
    }

    /// Copy a slice of data from the device. There must be an equal number of
    /// bytes in the `DevicePointer` and `v`. The contents of `v` are
    /// overwritten.
    #[track_caller]
    pub(crate) fn copy_from_device(&self, v: &mut [T]) -> Result<(), GpuError> {
        let location = Location::caller();
        if self.ptr.is_null() {
            return Err(GpuCall::CopyFromDevice
                .into_error("Attempted to copy data from a null device pointer", location));
        }

        let size = std::mem::size_of_val(v);
        if size != self.size {
            return Err(GpuCall::CopyFromDevice.into_error(
                &format!(
                    "Device buffer size {} is not equal to provided buffer size {size} (length {})",
                    self.size,
                    v.len()
                ),
                location,
            ));
        }

        unsafe {
            cudaMemcpy(
                v.as_mut_ptr().cast(),
                self.ptr.cast(),
                size,
                cudaMemcpyDeviceToHost,
            );
            check_for_errors(GpuCall::CopyFromDevice)
        }
    }
}

impl<T> Default for DevicePointer<T> {
    fn default() -> Self {
        Self {
            ptr: null_mut(),
            size: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("{file}:{line}: cudaMemcpy to device failed: {msg}")]
    CopyToDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: cudaMemcpy from device failed: {msg}")]
    CopyFromDevice {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: cudaMalloc error: {msg}")]
    Malloc {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: CUDA kernel error: {msg}")]
    Kernel {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },

    #[error("{file}:{line}: {msg}")]
    Generic {
        msg: Box<str>,
        file: &'static str,
        line: u32,
    },
}
