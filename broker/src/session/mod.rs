// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

use codec::{
    v3::{self, DisconnectPacket, Packet, PacketType},
    EncodePacket, PacketId,
};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::interval;

use crate::commands::{ListenerToSessionCmd, SessionToListenerCmd};
use crate::error::{Error, ErrorKind};
use crate::stream::Stream;
use crate::types::SessionId;

mod cache;
mod client;
mod config;
mod listener;

pub use cache::CachedSession;
pub use config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Invalid,
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
}

/// State of a QoS 1/2 publish sent to the client, not yet fully acknowledged.
#[derive(Debug)]
enum Inflight {
    /// QoS 1, waiting for PUBACK. Holds the packet for dup=1 resends.
    AwaitingPubAck(v3::PublishPacket, Instant),
    /// QoS 2, waiting for PUBREC. Holds the packet for dup=1 resends.
    AwaitingPubRec(v3::PublishPacket, Instant),
    /// QoS 2, PUBREC received, waiting for PUBCOMP. PUBREL is resent as-is.
    AwaitingPubComp(Instant),
}

impl Inflight {
    const fn last_sent(&self) -> Instant {
        match self {
            Self::AwaitingPubAck(_, t) | Self::AwaitingPubRec(_, t) | Self::AwaitingPubComp(t) => {
                *t
            }
        }
    }
}

/// ConnectionContext represents a client connection.
///
/// All the status of this client is maintained in this struct.
// TODO(Shaohua): Handle Will Message
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    stream: Stream,

    status: Status,
    client_id: String,
    // TODO(Shaohua): Add session flag
    instant: Instant,
    clean_session: bool,

    pub_recv_packets: HashSet<PacketId>,
    outbound_inflight: HashMap<PacketId, Inflight>,
    next_packet_id: u16,

    sender: Sender<SessionToListenerCmd>,
    receiver: Receiver<ListenerToSessionCmd>,
}

impl Session {
    pub fn new(
        id: SessionId,
        config: SessionConfig,
        stream: Stream,
        sender: Sender<SessionToListenerCmd>,
        receiver: Receiver<ListenerToSessionCmd>,
    ) -> Session {
        Session {
            id,
            config,
            stream,

            status: Status::Invalid,
            client_id: String::new(),
            instant: Instant::now(),
            clean_session: true,

            pub_recv_packets: HashSet::new(),
            outbound_inflight: HashMap::new(),
            next_packet_id: 0,

            sender,
            receiver,
        }
    }

    pub async fn run_loop(mut self) {
        // TODO(Shaohua): Set buffer cap based on settings
        let mut buf = Vec::with_capacity(1024);

        let connect_timeout = Instant::now();
        let mut retransmit_timer = interval(Duration::from_secs(1));

        loop {
            // If the Server does not receive a CONNECT Packet within a reasonable amount of time after the
            // Network Connection is established, the Server SHOULD close the connection.
            if self.status == Status::Invalid
                && self.config.connect_timeout() > 0
                && connect_timeout.elapsed().as_secs() > self.config.connect_timeout()
            {
                break;
            }

            if self.status == Status::Disconnected {
                break;
            }

            tokio::select! {
                Ok(n_recv) = self.stream.read_buf(&mut buf) => {
                    log::info!("n_recv: {}", n_recv);
                    if n_recv > 0 {
                        if let Err(err) = self.handle_client_packet(&buf).await {
                            log::error!("handle_client_packet() failed: {:?}", err);
                            break;
                        }
                        buf.clear();

                    } else {
                        log::info!("session: Empty packet received, disconnect client, {}", self.id);
                        if let Err(err) = self.send_disconnect().await {
                            log::error!("session: Failed to send disconnect packet: {:?}", err);
                        }
                        break;
                    }
                }
                Some(cmd) = self.receiver.recv() => {
                    if let Err(err) = self.handle_listener_cmd(cmd).await {
                        log::error!("Failed to handle server packet: {:?}", err);
                    }
                },

                _ = retransmit_timer.tick() => {
                    if let Err(err) = self.retransmit_inflight().await {
                        log::error!("session: Failed to retransmit inflight packet: {:?}", err);
                    }
                }
            }

            // From [MQTT-3.1.2-24]
            //
            // If the Keep Alive value is non-zero and the Server does not receive a Control Packet
            // from the Client within one and a half times the Keep Alive time period,
            // it MUST disconnect the Network Connection to the Client as if the network had
            // failed.
            //
            // A Keep Alive value of zero (0) has the effect of turning off the keep alive mechanism.
            // This means that, in this case, the Server is not required to disconnect the Client
            // on the grounds of inactivity.
            //
            // Note that a Server is permitted to disconnect a Client that it determines to be inactive
            // or non-responsive at any time, regardless of the Keep Alive value provided by that Client.
            if self.config.keep_alive() > 0
                && self.instant.elapsed().as_secs() > self.config.keep_alive_deadline()
            {
                log::warn!("sessoin: keep_alive time reached, disconnect client!");
                if let Err(err) = self.send_disconnect().await {
                    log::error!("session: Failed to send disconnect packet: {:?}", err);
                }
                break;
            }
        }

        if let Err(err) = self
            .sender
            .send(SessionToListenerCmd::Disconnect(self.id))
            .await
        {
            log::error!(
                "Failed to send disconnect cmd to server, id: {}, err: {:?}",
                self.id,
                err
            );
        }
    }

    /// Reset instant if packet is send to or receive from client.
    fn reset_instant(&mut self) {
        self.instant = Instant::now();
    }

    /// Allocates a packet id for an outbound QoS 1/2 publish, distinct from
    /// whatever id the original publisher used. `0` is reserved, so the
    /// counter wraps from `1`; collisions with a still-inflight id are
    /// skipped since the same subscriber can have many publishes in flight.
    fn alloc_outbound_packet_id(&mut self) -> PacketId {
        loop {
            self.next_packet_id = self.next_packet_id.wrapping_add(1);
            if self.next_packet_id == 0 {
                self.next_packet_id = 1;
            }
            let packet_id = PacketId::new(self.next_packet_id);
            if !self.outbound_inflight.contains_key(&packet_id) {
                return packet_id;
            }
        }
    }

    /// Resend any QoS 1/2 publish that has been waiting for its ack longer
    /// than `qos_retransmit`, with dup=1, per [MQTT-3.3.1-1].
    async fn retransmit_inflight(&mut self) -> Result<(), Error> {
        let deadline = Duration::from_secs(self.config.qos_retransmit());
        let due: Vec<PacketId> = self
            .outbound_inflight
            .iter()
            .filter(|(_, inflight)| inflight.last_sent().elapsed() > deadline)
            .map(|(packet_id, _)| *packet_id)
            .collect();

        for packet_id in due {
            match self.outbound_inflight.remove(&packet_id) {
                Some(Inflight::AwaitingPubAck(mut packet, _)) => {
                    packet.set_dup(true)?;
                    self.send(packet.clone()).await?;
                    self.outbound_inflight
                        .insert(packet_id, Inflight::AwaitingPubAck(packet, Instant::now()));
                }
                Some(Inflight::AwaitingPubRec(mut packet, _)) => {
                    packet.set_dup(true)?;
                    self.send(packet.clone()).await?;
                    self.outbound_inflight
                        .insert(packet_id, Inflight::AwaitingPubRec(packet, Instant::now()));
                }
                Some(Inflight::AwaitingPubComp(_)) => {
                    let packet = v3::PublishReleasePacket::new(packet_id);
                    self.send(packet).await?;
                    self.outbound_inflight
                        .insert(packet_id, Inflight::AwaitingPubComp(Instant::now()));
                }
                None => {}
            }
        }
        Ok(())
    }

    async fn send<P: EncodePacket + Packet>(&mut self, packet: P) -> Result<(), Error> {
        // The CONNACK Packet is the packet sent by the Server in response to a CONNECT Packet
        // received from a Client. The first packet sent from the Server to the Client MUST be
        // a CONNACK Packet [MQTT-3.2.0-1].
        if self.status == Status::Connecting && packet.packet_type() != PacketType::ConnectAck {
            log::error!(
                "ConnectAck is not the first packet to send: {:?}",
                packet.packet_type()
            );
        }

        // After sending a DISCONNECT Packet the Client:
        // - MUST close the Network Connection [MQTT-3.14.4-1].
        // - MUST NOT send any more Control Packets on that Network Connection [MQTT-3.14.4-2].
        if self.status == Status::Disconnected {
            return Err(Error::from_string(
                ErrorKind::SendError,
                format!(
                    "session: Cannot send packet when stream has been disconnected: {:?}",
                    packet.packet_type()
                ),
            ));
        }

        let mut buf = Vec::new();
        packet.encode(&mut buf)?;
        self.stream.write(&buf).await.map(drop)?;
        self.reset_instant();
        Ok(())
    }

    /// Send disconnect packet to client and update status.
    async fn send_disconnect(&mut self) -> Result<(), Error> {
        self.status = Status::Disconnecting;
        let packet = DisconnectPacket::new();
        if let Err(err) = self.send(packet).await.map(drop) {
            log::error!(
                "session: Failed to send disconnect packet, {}, err: {:?}",
                self.id,
                err
            );
            return Err(err);
        }
        self.status = Status::Disconnected;
        Ok(())
    }
}