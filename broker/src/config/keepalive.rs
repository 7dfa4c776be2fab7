// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// `keepalive` section in config.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Keepalive {
    /// Multiplier applied to the client's requested keepalive interval
    /// before the connection is considered dead.
    ///
    /// Default is 1.5.
    #[serde(default = "Keepalive::default_grace_factor")]
    grace_factor: f64,
}

impl Keepalive {
    #[must_use]
    pub const fn default_grace_factor() -> f64 {
        1.5
    }

    #[must_use]
    pub const fn grace_factor(&self) -> f64 {
        self.grace_factor
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if `grace_factor` is less than 1.0.
    pub fn validate(&self) -> Result<(), Error> {
        if self.grace_factor < 1.0 {
            return Err(Error::from_string(
                ErrorKind::ConfigError,
                "keepalive.grace-factor must be >= 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Keepalive {
    fn default() -> Self {
        Self {
            grace_factor: Self::default_grace_factor(),
        }
    }
}
