// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Retained message store.
//!
//! A retain=1 PUBLISH upserts the retained message for its topic; an empty
//! payload deletes it. The Server MUST set retain=1 on messages replayed to
//! a new SUBSCRIBE, and retain=0 on messages delivered to subscribers already
//! live at publish time [MQTT-3.3.1-8], [MQTT-3.3.1-9].

use std::collections::HashMap;

use codec::{v3::PublishPacket, QoS, SubTopic};

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default)]
pub struct RetainedStore {
    by_topic: HashMap<String, PublishPacket>,
}

impl RetainedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a retain=1 publish: an empty payload deletes the retained
    /// message for this topic, otherwise it replaces it.
    pub fn store(&mut self, packet: &PublishPacket) {
        if packet.message().is_empty() {
            self.by_topic.remove(packet.topic());
        } else {
            self.by_topic
                .insert(packet.topic().to_string(), packet.clone());
        }
    }

    /// Returns every retained message whose topic matches `filter`, each
    /// delivered at `min(retained.qos, granted.qos)` with retain=1 set.
    pub fn matching(&self, filter: &SubTopic, granted: QoS) -> Vec<PublishPacket> {
        self.by_topic
            .values()
            .filter(|packet| filter.is_match(packet.topic()))
            .map(|packet| {
                let mut delivered = packet.clone();
                delivered.set_qos(granted.min(packet.qos()));
                delivered.set_retain(true);
                delivered
            })
            .collect()
    }
}
