// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::interval;

use crate::commands::{
    BackendsToDispatcherCmd, BridgeToDispatcherCmd, DispatcherToBackendsCmd, DispatcherToBridgeCmd,
    DispatcherToGatewayCmd, DispatcherToListenerCmd, DispatcherToMetricsCmd,
    DispatcherToRuleEngineCmd, GatewayToDispatcherCmd, ListenerToDispatcherCmd,
    MetricsToDispatcherCmd, RuleEngineToDispatcherCmd,
};
use crate::domain::DomainDispatcher;
use crate::types::ListenerId;

mod backends;
mod bridge;
mod gateway;
mod listener;
mod metrics;
mod retained;
mod rule_engine;
mod sessions;
mod trie;

/// Dispatcher is a message router.
///
/// Subscription, retained-message and parked-session state is partitioned
/// per tenant domain (the empty string keys connections with no domain
/// configured or matched), so one tenant's publishes never leak into
/// another's subscriptions.
#[derive(Debug)]
pub struct Dispatcher {
    sub_tries: HashMap<String, trie::SubTrie>,
    retained: HashMap<String, retained::RetainedStore>,
    cached_sessions: HashMap<String, sessions::CachedSessions>,
    domains: Arc<DomainDispatcher>,

    backends_sender: Sender<DispatcherToBackendsCmd>,
    backends_receiver: Receiver<BackendsToDispatcherCmd>,

    bridge_sender: Sender<DispatcherToBridgeCmd>,
    bridge_receiver: Receiver<BridgeToDispatcherCmd>,

    gateway_sender: Sender<DispatcherToGatewayCmd>,
    gateway_receiver: Receiver<GatewayToDispatcherCmd>,

    metrics_sender: Sender<DispatcherToMetricsCmd>,
    metrics_receiver: Receiver<MetricsToDispatcherCmd>,

    listener_senders: HashMap<ListenerId, Sender<DispatcherToListenerCmd>>,
    listener_receiver: Receiver<ListenerToDispatcherCmd>,

    rule_engine_sender: Sender<DispatcherToRuleEngineCmd>,
    rule_engine_receiver: Receiver<RuleEngineToDispatcherCmd>,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        backends_sender: Sender<DispatcherToBackendsCmd>,
        backends_receiver: Receiver<BackendsToDispatcherCmd>,

        bridge_sender: Sender<DispatcherToBridgeCmd>,
        bridge_receiver: Receiver<BridgeToDispatcherCmd>,

        gateway_sender: Sender<DispatcherToGatewayCmd>,
        gateway_receiver: Receiver<GatewayToDispatcherCmd>,

        metrics_sender: Sender<DispatcherToMetricsCmd>,
        metrics_receiver: Receiver<MetricsToDispatcherCmd>,

        listener_senders: Vec<(ListenerId, Sender<DispatcherToListenerCmd>)>,
        listener_receiver: Receiver<ListenerToDispatcherCmd>,

        rule_engine_sender: Sender<DispatcherToRuleEngineCmd>,
        rule_engine_receiver: Receiver<RuleEngineToDispatcherCmd>,

        domains: Arc<DomainDispatcher>,
    ) -> Self {
        Self {
            sub_tries: HashMap::new(),
            retained: HashMap::new(),
            cached_sessions: HashMap::new(),
            domains,

            backends_sender,
            backends_receiver,

            bridge_sender,
            bridge_receiver,

            gateway_sender,
            gateway_receiver,

            metrics_sender,
            metrics_receiver,

            listener_senders: listener_senders.into_iter().collect(),
            listener_receiver,

            rule_engine_sender,
            rule_engine_receiver,
        }
    }

    pub async fn run_loop(&mut self) -> ! {
        let mut daily_quota_timer = interval(Duration::from_secs(24 * 60 * 60));
        let mut monthly_quota_timer = interval(Duration::from_secs(30 * 24 * 60 * 60));

        loop {
            tokio::select! {
                Some(cmd) = self.backends_receiver.recv() => {
                    self.handle_backends_cmd(cmd).await;
                }
                Some(cmd) = self.bridge_receiver.recv() => {
                    self.handle_bridge_cmd(cmd).await;
                }
                Some(cmd) = self.gateway_receiver.recv() => {
                    self.handle_gateway_cmd(cmd).await;
                }
                Some(cmd) = self.metrics_receiver.recv() => {
                    self.handle_metrics_cmd(cmd).await;
                }
                Some(cmd) = self.listener_receiver.recv() => {
                    self.handle_listener_cmd(cmd).await;
                },
                Some(cmd) = self.rule_engine_receiver.recv() => {
                    self.handle_rule_engine_cmd(cmd).await;
                },
                _ = daily_quota_timer.tick() => {
                    self.domains.reset_all_daily();
                }
                _ = monthly_quota_timer.tick() => {
                    self.domains.reset_all_monthly();
                }
            }
        }
    }
}
