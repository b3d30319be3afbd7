// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use ndarray::Array1;

use super::*;

#[test]
fn test_new_checks_lengths() {
    let result = SkyModel::new(vec![0.0; 3], vec![0.0; 3], vec![1.0; 2], vec![1.0; 3]);
    assert!(result.is_err());
    match result.unwrap_err() {
        SkyModelError::LengthMismatch {
            name,
            expected,
            got,
        } => {
            assert_eq!(name, "ns");
            assert_eq!(expected, 3);
            assert_eq!(got, 2);
        }
    }

    let sky_model = SkyModel::new(vec![0.0; 3], vec![0.0; 3], vec![1.0; 3], vec![1.0; 3]).unwrap();
    assert_eq!(sky_model.len(), 3);
    assert!(!sky_model.is_empty());

    let result = sky_model.with_spectra(vec![-0.7; 3], vec![150e6; 2]);
    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("ref_freqs"), "{err}");
}

#[test]
fn test_empty_sky_model() {
    let sky_model = SkyModel::new(vec![], vec![], vec![], vec![]).unwrap();
    assert!(sky_model.is_empty());
    assert!(sky_model.fluxes_at(150e6).is_empty());

    let sky_model = SkyModel::from_point_sources(&[], RADec::from_degrees(0.0, -27.0));
    assert!(sky_model.is_empty());
}

#[test]
fn test_source_at_phase_centre() {
    let phase_centre = RADec::from_degrees(30.0, -27.0);
    let sky_model = SkyModel::from_point_sources(
        &[PointSource::new(
            SourcePosition::RaDec {
                ra: 30.0,
                dec: -27.0,
            },
            2.5,
        )],
        phase_centre,
    );
    assert_abs_diff_eq!(sky_model.ls()[0], 0.0);
    assert_abs_diff_eq!(sky_model.ms()[0], 0.0);
    assert_abs_diff_eq!(sky_model.ns()[0], 1.0);
    assert_abs_diff_eq!(sky_model.fluxes()[0], 2.5);
}

#[test]
fn test_source_off_phase_centre() {
    let phase_centre = RADec::from_degrees(0.0, -27.0);
    let sky_model = SkyModel::from_point_sources(
        &[PointSource::new(
            SourcePosition::RaDec {
                ra: 1.0,
                dec: -27.0,
            },
            1.0,
        )],
        phase_centre,
    );
    // A source east of the phase centre has positive l, and l^2 + m^2 + n^2
    // = 1.
    let (l, m, n) = (sky_model.ls()[0], sky_model.ms()[0], sky_model.ns()[0]);
    assert!(l > 0.0);
    assert!(n < 1.0);
    assert_abs_diff_eq!(l * l + m * m + n * n, 1.0, epsilon = 1e-6);
}

#[test]
fn test_lmn_positions_are_used_verbatim() {
    let sky_model = SkyModel::from_point_sources(
        &[
            PointSource::new(
                SourcePosition::Lmn {
                    l: 0.1,
                    m: -0.2,
                    n: 0.9746794,
                },
                1.0,
            ),
            PointSource::new(
                SourcePosition::Lmn {
                    l: 0.0,
                    m: 0.0,
                    n: 1.0,
                },
                3.0,
            ),
        ],
        RADec::from_degrees(60.0, 10.0),
    );
    assert_abs_diff_eq!(
        Array1::from(sky_model.ls().to_vec()),
        Array1::from(vec![0.1_f32, 0.0])
    );
    assert_abs_diff_eq!(
        Array1::from(sky_model.ms().to_vec()),
        Array1::from(vec![-0.2_f32, 0.0])
    );
    assert_abs_diff_eq!(
        Array1::from(sky_model.fluxes().to_vec()),
        Array1::from(vec![1.0_f32, 3.0])
    );
}

#[test]
fn test_fluxes_at() {
    let sky_model = SkyModel::new(vec![0.0; 3], vec![0.0; 3], vec![1.0; 3], vec![1.0, 2.0, 4.0])
        .unwrap()
        .with_spectra(vec![0.0, -1.0, -0.8], vec![150e6, 100e6, 150e6])
        .unwrap();

    let fluxes = sky_model.fluxes_at(200e6);
    // Flat spectrum; untouched.
    assert_eq!(fluxes[0], 1.0);
    // Twice the reference frequency with alpha = -1; half the flux.
    assert_abs_diff_eq!(fluxes[1], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(
        fluxes[2],
        (4.0 * (200.0_f64 / 150.0).powf(-0.8)) as f32,
        epsilon = 1e-6
    );

    // At the reference frequency nothing changes.
    let fluxes = sky_model.fluxes_at(150e6);
    assert_abs_diff_eq!(fluxes[2], 4.0);
}

#[test]
fn test_point_source_deserialise() {
    let json = r#"[
        {"pos": {"ra_dec": {"ra": 10.0, "dec": -27.0}}, "flux_density": 2.0},
        {"pos": {"lmn": {"l": 0.0, "m": 0.0, "n": 1.0}}, "flux_density": 1.0, "spectral_index": -0.7, "ref_freq": 200e6}
    ]"#;
    let sources: Vec<PointSource> = serde_json::from_str(json).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(
        sources[0].pos,
        SourcePosition::RaDec {
            ra: 10.0,
            dec: -27.0
        }
    );
    assert_abs_diff_eq!(sources[0].spectral_index, 0.0);
    assert_abs_diff_eq!(sources[0].ref_freq, DEFAULT_REF_FREQ_HZ);
    assert_abs_diff_eq!(sources[1].spectral_index, -0.7);
    assert_abs_diff_eq!(sources[1].ref_freq, 200e6);
}
