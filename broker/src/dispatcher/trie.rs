// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Subscription trie.
//!
//! Topics are split on `/`; `+` and `#` are stored in dedicated child slots
//! so that matching a concrete topic costs one walk proportional to its
//! depth rather than a scan over every subscription.

use codec::{
    v3::{PublishPacket, SubscribeAck, SubscribeAckPacket, SubscribePacket, UnsubscribePacket},
    QoS, SubTopic,
};
use std::collections::{HashMap, HashSet};

use super::Dispatcher;
use crate::commands::DispatcherToListenerCmd;
use crate::types::SessionGid;

fn split_levels(topic: &str) -> Vec<&str> {
    topic.split('/').collect()
}

#[derive(Debug, Default, Clone)]
struct TrieNode {
    exact: HashMap<String, TrieNode>,
    plus: Option<Box<TrieNode>>,
    /// Subscribers whose filter ends in `#` rooted at this node.
    hash_subscribers: HashMap<SessionGid, QoS>,
    /// Subscribers whose filter ends exactly at this node.
    subscribers: HashMap<SessionGid, QoS>,
}

impl TrieNode {
    fn insert(&mut self, levels: &[&str], gid: SessionGid, qos: QoS) {
        match levels.first() {
            None => {
                self.subscribers.insert(gid, qos);
            }
            Some(&"#") => {
                self.hash_subscribers.insert(gid, qos);
            }
            Some(&"+") => {
                self.plus
                    .get_or_insert_with(Box::default)
                    .insert(&levels[1..], gid, qos);
            }
            Some(level) => {
                self.exact
                    .entry((*level).to_string())
                    .or_default()
                    .insert(&levels[1..], gid, qos);
            }
        }
    }

    /// Removes `gid` from the given filter path. Returns `true` if it was present.
    fn remove(&mut self, levels: &[&str], gid: &SessionGid) -> bool {
        match levels.first() {
            None => self.subscribers.remove(gid).is_some(),
            Some(&"#") => self.hash_subscribers.remove(gid).is_some(),
            Some(&"+") => self
                .plus
                .as_mut()
                .is_some_and(|child| child.remove(&levels[1..], gid)),
            Some(level) => self
                .exact
                .get_mut(*level)
                .is_some_and(|child| child.remove(&levels[1..], gid)),
        }
    }

    /// Removes `gid` from every filter path under this node. Used when a
    /// connection closes and its exact filter set is not tracked separately.
    fn remove_all(&mut self, gid: &SessionGid) {
        self.subscribers.remove(gid);
        self.hash_subscribers.remove(gid);
        for child in self.exact.values_mut() {
            child.remove_all(gid);
        }
        if let Some(plus) = self.plus.as_mut() {
            plus.remove_all(gid);
        }
    }

    /// Re-keys every subscriber entry owned by `old` to `new`, e.g. when a
    /// persistent session resumes under a fresh gid. Used instead of
    /// snapshotting and replaying the filter set.
    fn rename_session(&mut self, old: &SessionGid, new: SessionGid) {
        if let Some(qos) = self.subscribers.remove(old) {
            self.subscribers.insert(new, qos);
        }
        if let Some(qos) = self.hash_subscribers.remove(old) {
            self.hash_subscribers.insert(new, qos);
        }
        for child in self.exact.values_mut() {
            child.rename_session(old, new);
        }
        if let Some(plus) = self.plus.as_mut() {
            plus.rename_session(old, new);
        }
    }

    /// `$`-prefixed topics (e.g. `$SYS/...`) are never matched by a `+` or `#`
    /// rooted at the first level, matching the codec's `SubTopic::is_match`.
    fn collect_matches(
        &self,
        topic_levels: &[&str],
        is_root: bool,
        out: &mut HashMap<SessionGid, QoS>,
    ) {
        let root_dollar = is_root && topic_levels.first().is_some_and(|l| l.starts_with('$'));

        if !root_dollar {
            for (gid, qos) in &self.hash_subscribers {
                merge_qos(out, *gid, *qos);
            }
        }

        match topic_levels.first() {
            None => {
                for (gid, qos) in &self.subscribers {
                    merge_qos(out, *gid, *qos);
                }
            }
            Some(level) => {
                if let Some(child) = self.exact.get(*level) {
                    child.collect_matches(&topic_levels[1..], false, out);
                }
                if !root_dollar {
                    if let Some(plus) = &self.plus {
                        plus.collect_matches(&topic_levels[1..], false, out);
                    }
                }
            }
        }
    }
}

fn merge_qos(out: &mut HashMap<SessionGid, QoS>, gid: SessionGid, qos: QoS) {
    out.entry(gid)
        .and_modify(|existing| {
            if qos > *existing {
                *existing = qos;
            }
        })
        .or_insert(qos);
}

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default, Clone)]
pub struct SubTrie {
    root: TrieNode,
    /// Exact filter strings held by each session, so unsubscribe/disconnect
    /// can walk straight to the right path instead of scanning the trie.
    filters: HashMap<SessionGid, HashSet<String>>,
}

impl SubTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        session_gid: SessionGid,
        packet: &SubscribePacket,
    ) -> (SubscribeAckPacket, usize) {
        // If a Server receives a SUBSCRIBE packet that contains multiple Topic Filters
        // it MUST handle that packet as if it had received a sequence of multiple SUBSCRIBE packets,
        // except that it combines their responses into a single SUBACK response [MQTT-3.8.4-4].
        let mut ack_vec = vec![];
        let mut pattern_added = 0;
        for topic in packet.topics() {
            match SubTopic::new(topic.topic()) {
                Ok(filter) => {
                    let levels = split_levels(filter.as_ref());
                    self.root.insert(&levels, session_gid, topic.qos());
                    self.filters
                        .entry(session_gid)
                        .or_default()
                        .insert(filter.as_ref().to_string());
                    ack_vec.push(SubscribeAck::QoS(topic.qos()));
                    pattern_added += 1;
                }
                Err(err) => {
                    log::error!(
                        "trie: Invalid subscribe topic: {}, err: {:?}",
                        topic.topic(),
                        err
                    );
                    ack_vec.push(SubscribeAck::Failed);
                }
            }
        }

        (
            SubscribeAckPacket::with_vec(packet.packet_id(), ack_vec),
            pattern_added,
        )
    }

    pub fn unsubscribe(&mut self, session_gid: SessionGid, packet: &UnsubscribePacket) -> usize {
        let Some(owned) = self.filters.get_mut(&session_gid) else {
            log::error!("trie: No subscription for gid: {:?}", session_gid);
            return 0;
        };

        let mut removed = 0;
        for topic in packet.topics() {
            let filter = topic.as_ref();
            if owned.remove(filter) {
                let levels = split_levels(filter);
                if self.root.remove(&levels, &session_gid) {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Drops every subscription owned by `session_gid`, e.g. on disconnect.
    pub fn remove_session(&mut self, session_gid: &SessionGid) {
        self.filters.remove(session_gid);
        self.root.remove_all(session_gid);
    }

    /// Re-keys every subscription owned by `old` to `new`, e.g. when a
    /// persistent session reconnects under a fresh gid.
    pub fn rename_session(&mut self, old: &SessionGid, new: SessionGid) {
        if let Some(filters) = self.filters.remove(old) {
            self.filters.insert(new, filters);
        }
        self.root.rename_session(old, new);
    }

    /// Returns, for each matching subscriber, the delivered QoS: `min(publish.qos, granted.qos)`.
    pub fn match_packet(&self, packet: &PublishPacket) -> Vec<(SessionGid, QoS)> {
        let topic_levels = split_levels(packet.topic());
        let mut hits = HashMap::new();
        self.root.collect_matches(&topic_levels, true, &mut hits);
        hits.into_iter()
            .map(|(gid, granted)| (gid, granted.min(packet.qos())))
            .collect()
    }
}

impl Dispatcher {
    /// Delivers `packet` to every subscriber matching it in `domain`'s trie.
    /// Delivered copies always carry retain=0: the Server only sets retain=1
    /// when replying to a fresh SUBSCRIBE [MQTT-3.3.1-9]. Subscribers parked
    /// offline get the message queued instead of sent.
    pub(super) async fn publish_packet_to_sub_trie(&mut self, domain: &str, packet: &PublishPacket) {
        let matches = self
            .sub_tries
            .entry(domain.to_string())
            .or_default()
            .match_packet(packet);

        for (session_gid, qos) in matches {
            let mut delivered = packet.clone();
            delivered.set_qos(qos);
            delivered.set_retain(false);

            if self
                .cached_sessions
                .entry(domain.to_string())
                .or_default()
                .is_offline(&session_gid)
            {
                self.cached_sessions
                    .entry(domain.to_string())
                    .or_default()
                    .queue_offline(&session_gid, delivered);
                continue;
            }

            if let Some(listener_sender) = self.listener_senders.get(&session_gid.listener_id()) {
                let cmd = DispatcherToListenerCmd::Publish(session_gid.session_id(), delivered);
                if let Err(err) = listener_sender.send(cmd).await {
                    log::error!(
                        "dispatcher: Failed to send publish packet to listener: {}, err: {:?}",
                        session_gid.listener_id(),
                        err
                    );
                }
            } else {
                log::error!(
                    "dispatcher: Failed to get listener sender with id: {}",
                    session_gid.listener_id()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::PacketId;

    fn gid(n: u32) -> SessionGid {
        SessionGid::new(n, u64::from(n))
    }

    fn sub(packet_id: u16, topic: &str, qos: QoS) -> SubscribePacket {
        SubscribePacket::new(topic, qos, PacketId::new(packet_id)).expect("valid filter")
    }

    #[test]
    fn test_plus_and_hash_dispatch() {
        let mut trie = SubTrie::new();
        trie.subscribe(gid(1), &sub(1, "sport/+/score", QoS::AtLeastOnce));
        trie.subscribe(gid(2), &sub(2, "sport/#", QoS::ExactOnce));

        let publish = PublishPacket::new("sport/tennis/score", QoS::ExactOnce, b"15-30")
            .expect("valid publish");
        let matches = trie.match_packet(&publish);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains(&(gid(1), QoS::AtLeastOnce)));
        assert!(matches.contains(&(gid(2), QoS::ExactOnce)));
    }

    #[test]
    fn test_dollar_topic_not_matched_by_wildcard_root() {
        let mut trie = SubTrie::new();
        trie.subscribe(gid(1), &sub(1, "#", QoS::AtMostOnce));
        let publish = PublishPacket::new("$SYS/broker/uptime", QoS::AtMostOnce, b"1").unwrap();
        assert!(trie.match_packet(&publish).is_empty());
    }

    #[test]
    fn test_unsubscribe_removes_only_named_filter() {
        let mut trie = SubTrie::new();
        trie.subscribe(gid(1), &sub(1, "a/b", QoS::AtMostOnce));
        trie.subscribe(gid(1), &sub(2, "a/c", QoS::AtMostOnce));

        let unsub =
            UnsubscribePacket::with_topics(&["a/b"], PacketId::new(3)).expect("valid filter");
        assert_eq!(trie.unsubscribe(gid(1), &unsub), 1);

        let still_there = PublishPacket::new("a/c", QoS::AtMostOnce, b"x").unwrap();
        assert_eq!(trie.match_packet(&still_there).len(), 1);
        let gone = PublishPacket::new("a/b", QoS::AtMostOnce, b"x").unwrap();
        assert!(trie.match_packet(&gone).is_empty());
    }

    #[test]
    fn test_remove_session_drops_all_filters() {
        let mut trie = SubTrie::new();
        trie.subscribe(gid(1), &sub(1, "a/b", QoS::AtMostOnce));
        trie.subscribe(gid(1), &sub(2, "c/d", QoS::AtMostOnce));
        trie.remove_session(&gid(1));

        let publish = PublishPacket::new("a/b", QoS::AtMostOnce, b"x").unwrap();
        assert!(trie.match_packet(&publish).is_empty());
    }
}
