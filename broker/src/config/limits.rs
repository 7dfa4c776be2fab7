// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// `limits` section in config.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Limits {
    /// Per-packet byte cap, 0 means unbounded (subject to the protocol's
    /// own 268,435,455-byte remaining-length ceiling).
    ///
    /// Default is 0.
    #[serde(default = "Limits::default_message_max_size")]
    message_max_size: u32,

    /// Seconds to wait for a PUBACK/PUBREC/PUBCOMP before retransmitting
    /// with dup=1.
    ///
    /// Default is 15.
    #[serde(default = "Limits::default_qos_retransmit")]
    qos_retransmit: u32,
}

impl Limits {
    #[must_use]
    pub const fn default_message_max_size() -> u32 {
        0
    }

    #[must_use]
    pub const fn default_qos_retransmit() -> u32 {
        15
    }

    #[must_use]
    pub const fn message_max_size(&self) -> u32 {
        self.message_max_size
    }

    #[must_use]
    pub const fn qos_retransmit(&self) -> u32 {
        self.qos_retransmit
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if `qos_retransmit` is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.qos_retransmit == 0 {
            return Err(Error::from_string(
                ErrorKind::ConfigError,
                "limits.qos-retransmit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            message_max_size: Self::default_message_max_size(),
            qos_retransmit: Self::default_qos_retransmit(),
        }
    }
}
