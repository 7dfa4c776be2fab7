// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Tracks clients disconnected with clean_session=0, whose subscriptions are
//! left live in the subscription trie under their old session gid and whose
//! publishes are queued here until they reconnect.

use std::collections::{HashMap, HashSet, VecDeque};

use codec::v3::PublishPacket;

use crate::types::SessionGid;

/// Offline messages beyond this per-client cap are dropped, oldest first.
const MAX_OFFLINE_QUEUE: usize = 64;

#[derive(Debug, Default)]
struct Parked {
    gid: SessionGid,
    queue: VecDeque<PublishPacket>,
}

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default)]
pub struct CachedSessions {
    by_client: HashMap<String, Parked>,
    offline_gids: HashSet<SessionGid>,
}

impl CachedSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `client_id`'s session as resumable, keeping `gid`'s subscriptions
    /// live in the trie until it either reconnects or is discarded.
    pub fn park(&mut self, client_id: String, gid: SessionGid) {
        self.offline_gids.insert(gid);
        self.by_client.insert(
            client_id,
            Parked {
                gid,
                queue: VecDeque::new(),
            },
        );
    }

    #[must_use]
    pub fn is_offline(&self, gid: &SessionGid) -> bool {
        self.offline_gids.contains(gid)
    }

    /// Queues a publish destined for an offline subscriber, dropping the
    /// oldest queued message once the per-client cap is reached.
    pub fn queue_offline(&mut self, gid: &SessionGid, packet: PublishPacket) {
        if let Some(parked) = self.by_client.values_mut().find(|p| &p.gid == gid) {
            if parked.queue.len() >= MAX_OFFLINE_QUEUE {
                parked.queue.pop_front();
            }
            parked.queue.push_back(packet);
        }
    }

    /// Resumes a parked session: returns its old gid, so the trie can re-key
    /// its subscriptions onto the new connection, and its queued messages.
    pub fn resume(&mut self, client_id: &str) -> Option<(SessionGid, VecDeque<PublishPacket>)> {
        let parked = self.by_client.remove(client_id)?;
        self.offline_gids.remove(&parked.gid);
        Some((parked.gid, parked.queue))
    }

    /// Drops a parked session without resuming it, e.g. a clean_session=1
    /// reconnect. Returns its old gid, so callers can purge the trie.
    pub fn discard(&mut self, client_id: &str) -> Option<SessionGid> {
        let parked = self.by_client.remove(client_id)?;
        self.offline_gids.remove(&parked.gid);
        Some(parked.gid)
    }
}
