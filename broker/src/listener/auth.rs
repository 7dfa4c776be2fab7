// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use codec::v3::ConnectReturnCode;

use super::Listener;
use crate::commands::{AuthToListenerCmd, ListenerToDispatcherCmd};
use crate::error::Error;
use crate::types::{SessionGid, SessionId};

impl Listener {
    pub(super) async fn handle_auth_cmd(&mut self, cmd: AuthToListenerCmd) -> Result<(), Error> {
        match cmd {
            AuthToListenerCmd::ResponseAuth(session_id, access_granted, packet, domain) => {
                self.on_auth_response(session_id, access_granted, packet.client_id(), domain)
                    .await
            }
        }
    }

    async fn on_auth_response(
        &mut self,
        session_id: SessionId,
        access_granted: bool,
        client_id: &str,
        domain: String,
    ) -> Result<(), Error> {
        self.connecting_sessions.remove(&session_id);

        if !access_granted {
            return self
                .session_send_connect_ack(session_id, ConnectReturnCode::Unauthorized, None)
                .await;
        }

        self.client_ids.insert(client_id.to_string(), session_id);
        self.session_domains.insert(session_id, domain.clone());
        self.session_client_ids
            .insert(session_id, client_id.to_string());
        let clean_session = self.session_clean.get(&session_id).copied().unwrap_or(true);

        // Ask the dispatcher for any cached session state, so Session Present
        // can be set correctly in the CONNACK [MQTT-3.2.2-2].
        self.dispatcher_sender
            .send(ListenerToDispatcherCmd::CheckCachedSession(
                SessionGid::new(self.id, session_id),
                domain,
                client_id.to_string(),
                clean_session,
            ))
            .await
            .map_err(Into::into)
    }
}
