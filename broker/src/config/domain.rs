// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::expr::Expression;

/// One tenant domain entry, see `domain[]` in the main config.
#[derive(Debug, Deserialize, Clone)]
pub struct Domain {
    /// Tenant name, used in logs and $SYS reporting.
    name: String,

    /// Root directory for this domain's session/retained persistence.
    #[serde(default = "Domain::default_storage")]
    storage: PathBuf,

    /// Path to this domain's user backend data (flat password file or db handle).
    #[serde(default = "Domain::default_users_db")]
    users_db: Option<PathBuf>,

    /// Glob-like expression matched against username, client-id or server-name
    /// at CONNECT time; see [`crate::expr::Expression`].
    selector: String,

    /// Default is true.
    #[serde(default = "Domain::default_active")]
    active: bool,

    /// Maximum publishes accepted per calendar day, 0 disables the check.
    #[serde(default = "Domain::default_quota")]
    daily_quota: u64,

    /// Maximum publishes accepted per calendar month, 0 disables the check.
    #[serde(default = "Domain::default_quota")]
    monthly_quota: u64,
}

impl Domain {
    #[must_use]
    pub fn default_storage() -> PathBuf {
        PathBuf::from("/var/lib/mqttd/domains")
    }

    #[must_use]
    pub const fn default_users_db() -> Option<PathBuf> {
        None
    }

    #[must_use]
    pub const fn default_active() -> bool {
        true
    }

    #[must_use]
    pub const fn default_quota() -> u64 {
        0
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn storage(&self) -> &Path {
        &self.storage
    }

    #[must_use]
    pub fn users_db(&self) -> Option<&Path> {
        self.users_db.as_deref()
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn daily_quota(&self) -> u64 {
        self.daily_quota
    }

    #[must_use]
    pub const fn monthly_quota(&self) -> u64 {
        self.monthly_quota
    }

    /// Compile this entry's selector.
    ///
    /// # Errors
    ///
    /// Returns error if the selector expression fails to compile.
    pub fn compile_selector(&self) -> Result<Expression, Error> {
        Expression::compile(&self.selector)
    }

    /// Validate config.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or the selector fails to compile.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::from_string(
                crate::error::ErrorKind::ConfigError,
                "domain[].name must not be empty".to_string(),
            ));
        }
        self.compile_selector().map(drop)
    }
}
