// Copyright (c) 2020 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Message types passed between the broker's internal actors (listener,
//! dispatcher, auth, acl, session and the optional backends/bridge/gateway/
//! rule-engine/metrics apps).

use tokio::sync::oneshot;

use codec::v3::{
    ConnectAckPacket, ConnectPacket, PublishPacket, SubscribeAck, SubscribeAckPacket,
    SubscribePacket, UnsubscribePacket,
};

use crate::session::CachedSession;
use crate::types::{ListenerId, SessionGid, SessionId, Uptime};

// ---------------------------------------------------------------------
// listener <-> auth
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ListenerToAuthCmd {
    RequestAuth(SessionGid, ConnectPacket),
}

#[derive(Debug, Clone)]
pub enum AuthToListenerCmd {
    /// session-id, access-granted, original connect packet, resolved domain
    /// name (empty if no domain selector matched, or none configured)
    ResponseAuth(SessionId, bool, ConnectPacket, String),
}

// ---------------------------------------------------------------------
// listener <-> acl
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ListenerToAclCmd {
    Publish(SessionGid, PublishPacket),
    Subscribe(SessionGid, SubscribePacket),
}

#[derive(Debug, Clone)]
pub enum AclToListenerCmd {
    PublishAck(SessionId, PublishPacket, bool),
    SubscribeAck(SessionId, SubscribePacket, Vec<SubscribeAck>, bool),
}

// ---------------------------------------------------------------------
// listener <-> session
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ListenerToSessionCmd {
    /// Connect ack packet, plus any session state recovered from the dispatcher.
    ConnectAck(ConnectAckPacket, Option<CachedSession>),

    PublishAck(codec::PacketId, codec::QoS, bool),

    Publish(PublishPacket),

    SubscribeAck(SubscribeAckPacket),

    Disconnect,
}

#[derive(Debug, Clone)]
pub enum SessionToListenerCmd {
    Connect(SessionId, ConnectPacket),
    Publish(SessionId, PublishPacket),
    Subscribe(SessionId, SubscribePacket),
    Unsubscribe(SessionId, UnsubscribePacket),
    Disconnect(SessionId),
}

// ---------------------------------------------------------------------
// listener <-> dispatcher
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum DispatcherToListenerCmd {
    CheckCachedSessionResp(SessionId, Option<CachedSession>),
    Publish(SessionId, PublishPacket),
    SubscribeAck(SessionId, SubscribeAckPacket),
}

#[derive(Debug, Clone)]
pub enum ListenerToDispatcherCmd {
    /// session-gid, domain, client-id, clean-session
    CheckCachedSession(SessionGid, String, String, bool),

    /// session-gid, domain, publish packet
    Publish(SessionGid, String, PublishPacket),
    /// session-gid, domain, subscribe packet
    Subscribe(SessionGid, String, SubscribePacket),
    /// session-gid, domain, unsubscribe packet
    Unsubscribe(SessionGid, String, UnsubscribePacket),

    SessionAdded(ListenerId),
    /// session-gid, domain, client-id, clean-session
    SessionRemoved(SessionGid, String, String, bool),
}

// ---------------------------------------------------------------------
// dispatcher <-> metrics
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum DispatcherToMetricsCmd {
    /// listener id, listener address
    ListenerAdded(ListenerId, String),
    /// listener id
    ListenerRemoved(ListenerId),

    /// listener id, count
    SessionAdded(ListenerId, usize),
    /// listener id, count
    SessionRemoved(ListenerId, usize),

    /// listener id, count
    SubscriptionsAdded(ListenerId, usize),
    /// listener id, count
    SubscriptionsRemoved(ListenerId, usize),

    /// listener id, count, bytes
    RetainedMessageAdded(ListenerId, usize, usize),
    /// listener id, count, bytes
    RetainedMessageRemoved(ListenerId, usize, usize),

    /// listener id, count, bytes
    PublishPacketSent(ListenerId, usize, usize),
    /// listener id, count, bytes
    PublishPacketReceived(ListenerId, usize, usize),
    /// count, bytes
    PublishPacketDropped(usize, usize),

    /// listener id, count, bytes
    PacketSent(ListenerId, usize, usize),
    /// listener id, count, bytes
    PacketReceived(ListenerId, usize, usize),
}

#[derive(Debug, Clone)]
pub enum MetricsToDispatcherCmd {
    Publish(PublishPacket),
}

// ---------------------------------------------------------------------
// dispatcher <-> backends/bridge/gateway/rule-engine
//
// These apps are pluggable sinks the dispatcher fans packets out to; none
// of them is required by the broker's core routing path, so their command
// sets stay thin until a concrete backend needs more than a notification.
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum DispatcherToBackendsCmd {}

#[derive(Debug, Clone)]
pub enum BackendsToDispatcherCmd {}

#[derive(Debug, Clone)]
pub enum DispatcherToBridgeCmd {}

#[derive(Debug, Clone)]
pub enum BridgeToDispatcherCmd {}

#[derive(Debug, Clone)]
pub enum DispatcherToGatewayCmd {}

#[derive(Debug, Clone)]
pub enum GatewayToDispatcherCmd {}

#[derive(Debug, Clone)]
pub enum DispatcherToRuleEngineCmd {}

#[derive(Debug, Clone)]
pub enum RuleEngineToDispatcherCmd {}

// ---------------------------------------------------------------------
// server context <-> apps
//
// The server context is the one process-lifetime owner of every app; these
// commands let it push config reloads or answer dashboard queries. Only the
// metrics link carries a real request/response payload today.
// ---------------------------------------------------------------------

#[derive(Debug)]
pub enum ServerContextToMetricsCmd {
    MetricsGetUptime(oneshot::Sender<Uptime>),
}

#[derive(Debug, Clone)]
pub enum ServerContextToAuthCmd {}

#[derive(Debug, Clone)]
pub enum ServerContextToAclCmd {}

#[derive(Debug, Clone)]
pub enum ServerContextToBackendsCmd {}

#[derive(Debug, Clone)]
pub enum ServerContextToBridgeCmd {}

#[derive(Debug, Clone)]
pub enum ServerContextToGatewayCmd {}

#[derive(Debug, Clone)]
pub enum ServerContextToRuleEngineCmd {}

#[derive(Debug)]
pub enum DashboardToServerContexCmd {
    MetricsGetUptime(oneshot::Sender<Uptime>),
}
