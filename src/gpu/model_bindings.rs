// Bindings to the functions and types in src_cuda/model.h.

pub const VIS_SIM_PI_F: f32 = 3.14159274101257;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Sources {
    pub num_sources: ::std::os::raw::c_int,
    pub ls: *const f32,
    pub ms: *const f32,
    pub ns: *const f32,
    pub fluxes: *const f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Baselines {
    pub num_samples: ::std::os::raw::c_int,
    pub us: *const f32,
    pub vs: *const f32,
    pub ws: *const f32,
}

extern "C" {
    pub fn model_visibilities(
        sources: *const Sources,
        baselines: *const Baselines,
        uvw_scale: f32,
        n_offset: f32,
        samples_per_thread: ::std::os::raw::c_int,
        threads_per_block: ::std::os::raw::c_int,
        d_vis: *mut f32,
    ) -> *const ::std::os::raw::c_char;
}
