// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all vis_sim-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisSimError {
    #[error(transparent)]
    SkyModel(#[from] crate::sky::SkyModelError),

    #[error(transparent)]
    Baselines(#[from] crate::baselines::BaselineError),

    #[error(transparent)]
    Model(#[from] crate::model::ModelError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
