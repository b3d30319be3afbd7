// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests on generating sky-model visibilities.


use approx::{abs_diff_eq, assert_abs_diff_eq};
use marlu::c64;

use super::*;

/// Baseline samples \[metres\] that are deterministic but irregular, so that
/// no two samples share a phase.
fn get_baselines(num_samples: usize) -> BaselineSamples {
    let us = (0..num_samples)
        .map(|i| 120.0 * (i as f32 * 0.37).sin())
        .collect();
    let vs = (0..num_samples)
        .map(|i| 95.0 * (i as f32 * 0.61 + 0.2).cos())
        .collect();
    let ws = (0..num_samples)
        .map(|i| 8.0 * (i as f32 * 1.13).sin())
        .collect();
    BaselineSamples::new(us, vs, ws).unwrap()
}

fn get_sky_model() -> SkyModel {
    let ls = vec![0.0, 0.1, -0.05, 0.02];
    let ms = vec![0.0, 0.2, 0.03, -0.15];
    let ns = ls
        .iter()
        .zip(ms.iter())
        .map(|(&l, &m): (&f32, &f32)| (1.0 - l * l - m * m).sqrt())
        .collect();
    let fluxes = vec![1.0, 2.5, 0.3, 4.0];
    SkyModel::new(ls, ms, ns, fluxes).unwrap()
}

/// A slow double-precision evaluation of the visibility sum.
fn model_reference(
    sky_model: &SkyModel,
    baselines: &BaselineSamples,
    params: ModelParams,
) -> Vec<c64> {
    let scale = params.freq_hz / VEL_C;
    let n_offset = f64::from(params.phase_convention.n_offset());
    let fluxes = sky_model.fluxes_at(params.freq_hz);
    (0..baselines.len())
        .map(|i_sample| {
            let u = f64::from(baselines.us[i_sample]) * scale;
            let v = f64::from(baselines.vs[i_sample]) * scale;
            let w = f64::from(baselines.ws[i_sample]) * scale;
            (0..sky_model.len())
                .map(|i_source| {
                    let l = f64::from(sky_model.ls[i_source]);
                    let m = f64::from(sky_model.ms[i_source]);
                    let n = f64::from(sky_model.ns[i_source]);
                    let phase = u * l + v * m + w * (n - n_offset);
                    let arg = -2.0 * std::f64::consts::PI * phase;
                    c64::new(arg.cos(), arg.sin()) * f64::from(fluxes[i_source])
                })
                .sum()
        })
        .collect()
}

#[track_caller]
fn assert_vis_close(result: &[c32], expected: &[c32], epsilon: f32) {
    assert_eq!(result.len(), expected.len());
    for (i, (r, e)) in result.iter().zip(expected.iter()).enumerate() {
        assert!(
            abs_diff_eq!(r.re, e.re, epsilon = epsilon) && abs_diff_eq!(r.im, e.im, epsilon = epsilon),
            "sample {i}: {r} != {e}"
        );
    }
}

#[track_caller]
fn assert_vis_close_to_reference(result: &[c32], expected: &[c64], epsilon: f64) {
    assert_eq!(result.len(), expected.len());
    for (r, e) in result.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(f64::from(r.re), e.re, epsilon = epsilon);
        assert_abs_diff_eq!(f64::from(r.im), e.im, epsilon = epsilon);
    }
}

#[test]
fn execution_config_defaults() {
    let exec = ExecutionConfig::default();
    assert_eq!(exec.samples_per_task, 64);
    assert_eq!(exec.threads_per_block, 128);
    assert!(exec.validate().is_ok());
}

#[test]
fn model_params_are_validated() {
    assert!(ModelParams::new(150e6).validate().is_ok());
    for freq in [0.0, -150e6, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            ModelParams::new(freq).validate(),
            Err(ModelError::InvalidFrequency(_))
        ));
    }
}

#[test]
fn uvw_scale_is_inverse_wavelength() {
    let params = ModelParams::new(VEL_C);
    assert_abs_diff_eq!(params.uvw_scale(), 1.0);
    let params = ModelParams::new(150e6);
    assert_abs_diff_eq!(params.uvw_scale(), (150e6 / VEL_C) as f32);
}

#[test]
fn phase_convention_offsets() {
    assert_eq!(PhaseConvention::default(), PhaseConvention::PhaseTracking);
    assert_abs_diff_eq!(PhaseConvention::PhaseTracking.n_offset(), 1.0);
    assert_abs_diff_eq!(PhaseConvention::Absolute.n_offset(), 0.0);
}

#[test]
fn model_devices_parse_from_strings() {
    use std::str::FromStr;

    assert_eq!(ModelDevice::from_str("cpu").unwrap(), ModelDevice::Cpu);
    assert_eq!(ModelDevice::from_str("gpu").unwrap(), ModelDevice::Gpu);
    assert!(ModelDevice::from_str("tpu").is_err());
    assert_eq!(ModelDevice::Cpu.to_string(), "cpu");
    assert_eq!(ModelDevice::Gpu.get_precision(), "single");
}

#[test]
fn cpu_device_info_is_available() {
    let info = ModelDevice::Cpu.get_device_info().unwrap();
    assert!(info.contains("CPU"), "{info}");
}

#[test]
#[cfg(not(feature = "cuda"))]
fn gpu_without_cuda_is_an_error() {
    let sky_model = get_sky_model();
    let result = new_sky_modeller(
        ModelDevice::Gpu,
        &sky_model,
        ModelParams::new(150e6),
        ExecutionConfig::default(),
    );
    assert!(matches!(result, Err(ModelError::NoGpuCompiled)));
    assert!(matches!(
        ModelDevice::Gpu.get_device_info(),
        Err(ModelError::NoGpuCompiled)
    ));
}

// Querying the device happens whether or not debug messages are enabled.
#[test]
#[serial_test::serial]
fn device_query_does_not_depend_on_log_level() {
    let sky_model = get_sky_model();
    let previous = log::max_level();
    for level in [log::LevelFilter::Off, log::LevelFilter::Debug] {
        log::set_max_level(level);
        let result = new_sky_modeller(
            ModelDevice::Cpu,
            &sky_model,
            ModelParams::new(150e6),
            ExecutionConfig::default(),
        );
        assert!(result.is_ok(), "{level}");

        #[cfg(not(feature = "cuda"))]
        {
            let result = new_sky_modeller(
                ModelDevice::Gpu,
                &sky_model,
                ModelParams::new(150e6),
                ExecutionConfig::default(),
            );
            assert!(matches!(result, Err(ModelError::NoGpuCompiled)), "{level}");
        }
    }
    log::set_max_level(previous);
}
