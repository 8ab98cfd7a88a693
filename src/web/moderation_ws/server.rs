//! ModerationServer actor fanning comment changes out to operator sockets

use super::message::{CommentsChanged, Connect, Disconnect, FeedPush, GetConnectionCount};
use actix::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

/// Stored connection information
struct OperatorConnection {
    operator_id: Uuid,
    /// Channel to send messages to this connection
    recipient: Recipient<FeedPush>,
}

/// Tracks every open live feed connection. Every operator sees every change.
pub struct ModerationServer {
    /// Connection ID counter
    next_id: usize,
    /// Connection ID -> OperatorConnection
    connections: HashMap<usize, OperatorConnection>,
}

impl ModerationServer {
    pub fn new() -> Self {
        log::info!("ModerationServer starting up.");
        Self {
            next_id: 0,
            connections: HashMap::new(),
        }
    }

    fn broadcast(&self, message: &str) {
        for conn in self.connections.values() {
            conn.recipient.do_send(FeedPush(message.to_owned()));
        }
    }
}

impl Default for ModerationServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for ModerationServer {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(64);
        log::info!("ModerationServer started");
    }
}

/// Handle new connections
impl Handler<Connect> for ModerationServer {
    type Result = usize;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        let conn_id = self.next_id;
        self.next_id += 1;

        self.connections.insert(
            conn_id,
            OperatorConnection {
                operator_id: msg.operator_id,
                recipient: msg.addr,
            },
        );

        log::debug!(
            "Operator {} connected to live feed with connection ID {} (total connections: {})",
            msg.operator_id,
            conn_id,
            self.connections.len()
        );

        conn_id
    }
}

/// Handle disconnections
impl Handler<Disconnect> for ModerationServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        if let Some(conn) = self.connections.remove(&msg.id) {
            log::debug!(
                "Operator {} connection {} disconnected (total connections: {})",
                conn.operator_id,
                msg.id,
                self.connections.len()
            );
        }
    }
}

/// Push a change to every connection
impl Handler<CommentsChanged> for ModerationServer {
    type Result = ();

    fn handle(&mut self, msg: CommentsChanged, _: &mut Context<Self>) {
        let json = serde_json::json!({
            "type": "comments_changed",
            "kind": msg.0.kind,
            "ids": msg.0.ids,
        });

        if let Ok(message) = serde_json::to_string(&json) {
            self.broadcast(&message);
            log::debug!(
                "Broadcasted comment {:?} event to {} connection(s)",
                msg.0.kind,
                self.connections.len()
            );
        }
    }
}

/// Get connection count (for monitoring)
impl Handler<GetConnectionCount> for ModerationServer {
    type Result = usize;

    fn handle(&mut self, _: GetConnectionCount, _: &mut Context<Self>) -> Self::Result {
        self.connections.len()
    }
}
