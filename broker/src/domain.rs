// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Selects a tenant domain for an incoming connection from its CONNECT
//! fields, and tracks per-domain publish quotas.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config;
use crate::error::Error;
use crate::expr::Expression;

/// One active tenant, holding its compiled selector and running quota counters.
#[derive(Debug)]
pub struct Domain {
    name: String,
    active: bool,
    selector: Expression,
    daily_quota: u64,
    monthly_quota: u64,
    daily_count: AtomicU64,
    monthly_count: AtomicU64,
}

impl Domain {
    fn from_config(config: &config::Domain) -> Result<Self, Error> {
        Ok(Self {
            name: config.name().to_string(),
            active: config.active(),
            selector: config.compile_selector()?,
            daily_quota: config.daily_quota(),
            monthly_quota: config.monthly_quota(),
            daily_count: AtomicU64::new(0),
            monthly_count: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this domain accepts a CONNECT carrying `username`, `client_id`
    /// or `server_name`; any one of the three matching the selector is enough.
    #[must_use]
    fn accepts(&self, username: &str, client_id: &str, server_name: &str) -> bool {
        self.active
            && (self.selector.is_match(username)
                || self.selector.is_match(client_id)
                || self.selector.is_match(server_name))
    }

    /// Records one accepted publish against this domain's quotas.
    ///
    /// Returns `true` if the publish is within both quotas, `false` if either
    /// is already exhausted (the caller is expected to drop the publish and
    /// log it, per the quota-exceeded policy — MQTT 3.1.1 has no wire-level
    /// quota error).
    pub fn account_publish(&self) -> bool {
        let daily = self.daily_count.fetch_add(1, Ordering::Relaxed) + 1;
        let monthly = self.monthly_count.fetch_add(1, Ordering::Relaxed) + 1;
        (self.daily_quota == 0 || daily <= self.daily_quota)
            && (self.monthly_quota == 0 || monthly <= self.monthly_quota)
    }

    /// Resets the daily counter; called once per calendar day by the owning
    /// app's housekeeping timer.
    pub fn reset_daily(&self) {
        self.daily_count.store(0, Ordering::Relaxed);
    }

    /// Resets the monthly counter; called once per calendar month.
    pub fn reset_monthly(&self) {
        self.monthly_count.store(0, Ordering::Relaxed);
    }
}

/// Holds every configured domain in declaration order and resolves a CONNECT
/// to the first one whose selector accepts it.
#[derive(Debug, Default)]
pub struct DomainDispatcher {
    domains: Vec<Domain>,
}

impl DomainDispatcher {
    /// Compile every `domain[]` entry in declaration order.
    ///
    /// # Errors
    ///
    /// Returns error if any entry's selector fails to compile.
    pub fn new(configs: &[config::Domain]) -> Result<Self, Error> {
        let domains = configs
            .iter()
            .map(Domain::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { domains })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Returns the first active domain whose selector accepts one of
    /// `username`, `client_id` or `server_name`, evaluated in configuration
    /// order.
    #[must_use]
    pub fn find_by_indications(
        &self,
        username: &str,
        client_id: &str,
        server_name: &str,
    ) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|domain| domain.accepts(username, client_id, server_name))
    }

    /// Looks up a domain by the name resolved for it at CONNECT time.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|domain| domain.name() == name)
    }

    /// Resets every domain's daily quota counter.
    pub fn reset_all_daily(&self) {
        for domain in &self.domains {
            domain.reset_daily();
        }
    }

    /// Resets every domain's monthly quota counter.
    pub fn reset_all_monthly(&self) {
        for domain in &self.domains {
            domain.reset_monthly();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher_with(patterns: &[&str]) -> DomainDispatcher {
        let domains = patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let toml = format!(
                    "name = \"domain-{i}\"\nselector = \"{pattern}\"\n",
                    i = i,
                    pattern = pattern
                );
                toml::from_str::<config::Domain>(&toml).unwrap()
            })
            .collect::<Vec<_>>();
        DomainDispatcher::new(&domains).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let dispatcher = dispatcher_with(&["alice|bob", "*"]);
        let domain = dispatcher.find_by_indications("alice", "", "").unwrap();
        assert_eq!(domain.name(), "domain-0");
        let domain = dispatcher.find_by_indications("carol", "", "").unwrap();
        assert_eq!(domain.name(), "domain-1");
    }

    #[test]
    fn test_no_match() {
        let dispatcher = dispatcher_with(&["alice"]);
        assert!(dispatcher
            .find_by_indications("carol", "client-1", "")
            .is_none());
    }

    #[test]
    fn test_quota_exhausted() {
        let config = toml::from_str::<config::Domain>(
            "name = \"limited\"\nselector = \"*\"\ndaily_quota = 2\n",
        )
        .unwrap();
        let domain = Domain::from_config(&config).unwrap();
        assert!(domain.account_publish());
        assert!(domain.account_publish());
        assert!(!domain.account_publish());
    }
}
