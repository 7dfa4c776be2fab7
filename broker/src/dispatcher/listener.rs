// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use codec::v3::{PublishPacket, SubscribeAck, SubscribePacket, UnsubscribePacket};
use codec::SubTopic;

use super::Dispatcher;
use crate::commands::{DispatcherToListenerCmd, ListenerToDispatcherCmd};
use crate::session::CachedSession;
use crate::types::SessionGid;

impl Dispatcher {
    pub(super) async fn handle_listener_cmd(&mut self, cmd: ListenerToDispatcherCmd) {
        log::info!("handle_listener_cmd: {:?}", cmd);
        match cmd {
            ListenerToDispatcherCmd::CheckCachedSession(session_gid, domain, client_id, clean_session) => {
                self.on_listener_check_cached_session(session_gid, domain, client_id, clean_session)
                    .await;
            }
            ListenerToDispatcherCmd::Publish(session_gid, domain, packet) => {
                self.on_listener_publish(session_gid, &domain, packet).await;
            }
            ListenerToDispatcherCmd::Subscribe(session_gid, domain, packet) => {
                self.on_listener_subscribe(session_gid, domain, packet).await;
            }
            ListenerToDispatcherCmd::Unsubscribe(session_gid, domain, packet) => {
                self.on_listener_unsubscribe(session_gid, &domain, packet).await;
            }
            ListenerToDispatcherCmd::SessionAdded(listener_id) => {
                self.metrics_on_session_added(listener_id).await;
            }
            ListenerToDispatcherCmd::SessionRemoved(session_gid, domain, client_id, clean_session) => {
                self.on_listener_session_removed(session_gid, &domain, &client_id, clean_session)
                    .await;
            }
        }
    }

    async fn on_listener_check_cached_session(
        &mut self,
        session_gid: SessionGid,
        domain: String,
        client_id: String,
        clean_session: bool,
    ) {
        let sessions = self.cached_sessions.entry(domain.clone()).or_default();

        let (cached_session, resumed_queue) = if clean_session {
            // Clean start: drop whatever subscriptions/backlog a prior,
            // non-clean-session connection for this client id left behind.
            if let Some(old_gid) = sessions.discard(&client_id) {
                self.sub_tries
                    .entry(domain.clone())
                    .or_default()
                    .remove_session(&old_gid);
            }
            (None, None)
        } else {
            match sessions.resume(&client_id) {
                Some((old_gid, queue)) => {
                    self.sub_tries
                        .entry(domain.clone())
                        .or_default()
                        .rename_session(&old_gid, session_gid);
                    (Some(CachedSession::new(client_id.clone())), Some(queue))
                }
                None => (None, None),
            }
        };

        let Some(listener_sender) = self.listener_senders.get(&session_gid.listener_id()) else {
            log::error!(
                "dispatcher: Failed to find listener sender with id: {}",
                session_gid.listener_id()
            );
            return;
        };

        let cmd = DispatcherToListenerCmd::CheckCachedSessionResp(
            session_gid.session_id(),
            cached_session,
        );
        if let Err(err) = listener_sender.send(cmd).await {
            log::error!(
                "dispatcher: Failed to send check cached session to listener: {:?}, err: {:?}",
                session_gid,
                err
            );
            return;
        }

        // Flush the offline backlog right after the resp, relying on the
        // mpsc channel's FIFO order to keep CONNACK ahead of the backlog.
        if let Some(queue) = resumed_queue {
            for packet in queue {
                let cmd = DispatcherToListenerCmd::Publish(session_gid.session_id(), packet);
                if let Err(err) = listener_sender.send(cmd).await {
                    log::error!(
                        "dispatcher: Failed to flush offline publish to listener: {:?}, err: {:?}",
                        session_gid,
                        err
                    );
                }
            }
        }
    }

    pub(super) async fn on_listener_publish(
        &mut self,
        session_gid: SessionGid,
        domain: &str,
        packet: PublishPacket,
    ) {
        if let Some(d) = self.domains.find_by_name(domain) {
            if !d.account_publish() {
                log::warn!(
                    "dispatcher: domain {:?} exceeded its publish quota, dropping publish from {:?}",
                    domain,
                    session_gid
                );
                return;
            }
        }

        // Retain=1 upserts the retained message for this topic; an empty
        // payload deletes it [MQTT-3.3.1-6], [MQTT-3.3.1-7].
        if packet.retain() {
            self.retained
                .entry(domain.to_string())
                .or_default()
                .store(&packet);
        }

        self.publish_packet_to_sub_trie(domain, &packet).await;
    }

    async fn on_listener_subscribe(
        &mut self,
        session_gid: SessionGid,
        domain: String,
        packet: SubscribePacket,
    ) {
        let (sub_ack_packet, n_subscribed) = self
            .sub_tries
            .entry(domain.clone())
            .or_default()
            .subscribe(session_gid, &packet);

        self.metrics_on_subscription_added(session_gid.listener_id(), n_subscribed)
            .await;

        // Deliver retained messages matching the freshly accepted filters,
        // with retain=1 since these are replies to a new SUBSCRIBE
        // [MQTT-3.3.1-8].
        let retained_matches: Vec<PublishPacket> = {
            let store = self.retained.entry(domain).or_default();
            packet
                .topics()
                .iter()
                .zip(sub_ack_packet.acknowledgements())
                .filter_map(|(topic, ack)| match ack {
                    SubscribeAck::QoS(granted) => {
                        SubTopic::new(topic.topic()).ok().map(|filter| (filter, *granted))
                    }
                    SubscribeAck::Failed => None,
                })
                .flat_map(|(filter, granted)| store.matching(&filter, granted))
                .collect()
        };

        let Some(listener_sender) = self.listener_senders.get(&session_gid.listener_id()) else {
            log::error!(
                "dispatcher: Failed to find listener sender with id: {}",
                session_gid.listener_id()
            );
            return;
        };

        let cmd = DispatcherToListenerCmd::SubscribeAck(session_gid.session_id(), sub_ack_packet);
        if let Err(err) = listener_sender.send(cmd).await {
            log::error!(
                "dispatcher: Failed to send subscribe ack to listener: {:?}, err: {:?}",
                session_gid,
                err
            );
            return;
        }

        for packet in retained_matches {
            let cmd = DispatcherToListenerCmd::Publish(session_gid.session_id(), packet);
            if let Err(err) = listener_sender.send(cmd).await {
                log::error!(
                    "dispatcher: Failed to send retained publish to listener: {:?}, err: {:?}",
                    session_gid,
                    err
                );
            }
        }
    }

    async fn on_listener_unsubscribe(
        &mut self,
        session_gid: SessionGid,
        domain: &str,
        packet: UnsubscribePacket,
    ) {
        let n_unsubscribed = self
            .sub_tries
            .entry(domain.to_string())
            .or_default()
            .unsubscribe(session_gid, &packet);
        self.metrics_on_subscription_removed(session_gid.listener_id(), n_unsubscribed)
            .await;
    }

    async fn on_listener_session_removed(
        &mut self,
        session_gid: SessionGid,
        domain: &str,
        client_id: &str,
        clean_session: bool,
    ) {
        self.metrics_on_session_removed(session_gid.listener_id())
            .await;

        if clean_session || client_id.is_empty() {
            // Nothing to keep alive: drop its subscriptions outright.
            self.sub_tries
                .entry(domain.to_string())
                .or_default()
                .remove_session(&session_gid);
        } else {
            // Leave the subscriptions live in the trie under this gid and
            // park the session so a later reconnect can reclaim them.
            self.cached_sessions
                .entry(domain.to_string())
                .or_default()
                .park(client_id.to_string(), session_gid);
        }
    }
}
