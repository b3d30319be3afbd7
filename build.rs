// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(feature = "cuda")]
    cuda::build();
}

/// Compile the visibility kernel in `src_cuda` into a static library named
/// "vis_sim_cu".
#[cfg(feature = "cuda")]
mod cuda {
    use std::{env, path::PathBuf};

    const COMPUTE_VAR: &str = "VIS_SIM_CUDA_COMPUTE";
    const DEFAULT_CUDA_ARCHES: &[u16] = &[60, 70, 80];
    const DEFAULT_CUDA_SMS: &[u16] = &[60, 70, 75, 80, 86];

    /// `VIS_SIM_CUDA_COMPUTE` is a comma-separated list of two-digit compute
    /// capabilities, e.g. "75,86".
    fn parse_compute_list(list: &str) -> Vec<u16> {
        list.trim()
            .split(',')
            .map(|c| {
                let c = c.trim();
                match (c.len(), c.parse::<u16>()) {
                    (2, Ok(cap)) => cap,
                    _ => panic!("{COMPUTE_VAR} contains '{c}'; expected a two-digit compute capability like 86"),
                }
            })
            .collect()
    }

    /// Every `.cu` file in `src_cuda` is compiled; headers only trigger
    /// rebuilds.
    fn kernel_sources() -> Vec<PathBuf> {
        let entries = std::fs::read_dir("src_cuda").expect("Couldn't read the src_cuda directory");
        let mut sources = vec![];
        for entry in entries {
            let path = entry.expect("Couldn't read an entry of src_cuda").path();
            if !path.is_file() {
                continue;
            }
            match path.extension().and_then(|e| e.to_str()) {
                Some("cu") => {
                    println!("cargo:rerun-if-changed={}", path.display());
                    sources.push(path);
                }
                Some("h" | "cuh") => println!("cargo:rerun-if-changed={}", path.display()),
                _ => (),
            }
        }
        sources
    }

    pub(super) fn build() {
        println!("cargo:rerun-if-env-changed={COMPUTE_VAR}");
        let (arches, sms) = match env::var(COMPUTE_VAR) {
            // Compile for exactly the requested devices.
            Ok(list) => {
                let caps = parse_compute_list(&list);
                (caps.clone(), caps)
            }
            Err(_) => {
                println!("cargo:warning={COMPUTE_VAR} not set; building the visibility kernel for compute_{DEFAULT_CUDA_ARCHES:?} and sm_{DEFAULT_CUDA_SMS:?}");
                (DEFAULT_CUDA_ARCHES.to_vec(), DEFAULT_CUDA_SMS.to_vec())
            }
        };

        let mut build = cc::Build::new();
        build
            .cuda(true)
            .cudart(if cfg!(feature = "cuda-static") {
                "static"
            } else {
                "shared"
            })
            // cargo sets DEBUG to "false" for release profiles.
            .define(
                match env::var("DEBUG").as_deref() {
                    Ok("false") => "NDEBUG",
                    _ => "DEBUG",
                },
                None,
            );

        // An SM is only generated from a virtual architecture it can run.
        for &arch in &arches {
            for &sm in sms.iter().filter(|&&sm| sm >= arch) {
                build.flag("-gencode");
                build.flag(&format!("arch=compute_{arch},code=sm_{sm}"));
            }
        }

        build.files(kernel_sources()).compile("vis_sim_cu");
    }
}
