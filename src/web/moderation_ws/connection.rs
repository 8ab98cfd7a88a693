//! One operator's live feed socket.
//!
//! The socket is only opened after the upgrade request passed operator
//! authentication, so everything here trusts `operator_id`. Traffic is
//! push-only: the server sends change notices and the client may send
//! nothing but keepalives. A text `ping` gets `{"type":"pong"}` back for
//! browsers that cannot send protocol-level pings. Anything else from the
//! client is ignored, apart from continuation frames which end the session.

use super::message::{Connect, Disconnect, FeedPush};
use super::server::ModerationServer;
use super::{CLIENT_TIMEOUT, HEARTBEAT_INTERVAL};
use actix::*;
use actix_web_actors::ws;
use std::time::Instant;
use uuid::Uuid;

const TEXT_PONG: &str = r#"{"type":"pong"}"#;

/// Reply owed to a text frame from the client, if any.
fn text_reply(text: &str) -> Option<&'static str> {
    (text.trim() == "ping").then(|| TEXT_PONG)
}

pub struct FeedConnection {
    /// Slot in the server's table, 0 until registration completes.
    pub id: usize,
    pub operator_id: Uuid,
    last_seen: Instant,
    pub server: Addr<ModerationServer>,
}

impl FeedConnection {
    pub fn new(operator_id: Uuid, server: Addr<ModerationServer>) -> Self {
        Self {
            id: 0,
            operator_id,
            last_seen: Instant::now(),
            server,
        }
    }

    fn seen(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Drop operators whose browser went away without a close frame.
    fn watch_liveness(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if act.last_seen.elapsed() > CLIENT_TIMEOUT {
                log::debug!(
                    "Operator {} live feed went quiet, closing slot {}",
                    act.operator_id,
                    act.id
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    /// Nothing is pushed to this socket until the server hands back a slot.
    fn register(&self, ctx: &mut ws::WebsocketContext<Self>) {
        self.server
            .send(Connect {
                addr: ctx.address().recipient(),
                operator_id: self.operator_id,
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(id) => {
                        act.id = id;
                        log::debug!("Operator {} subscribed to live feed as slot {}", act.operator_id, id);
                    }
                    Err(err) => {
                        log::warn!(
                            "Moderation server refused operator {}: {:?}",
                            act.operator_id,
                            err
                        );
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }
}

impl Actor for FeedConnection {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.watch_liveness(ctx);
        self.register(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.server.do_send(Disconnect { id: self.id });
        Running::Stop
    }
}

impl Handler<FeedPush> for FeedConnection {
    type Result = ();

    fn handle(&mut self, msg: FeedPush, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for FeedConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(_) => {
                ctx.stop();
                return;
            }
        };

        match msg {
            ws::Message::Ping(data) => {
                self.seen();
                ctx.pong(&data);
            }
            ws::Message::Pong(_) => self.seen(),
            ws::Message::Text(text) => {
                self.seen();
                if let Some(reply) = text_reply(&text) {
                    ctx.text(reply);
                }
            }
            ws::Message::Close(reason) => {
                log::debug!("Operator {} left the live feed: {:?}", self.operator_id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) => ctx.stop(),
            ws::Message::Binary(_) | ws::Message::Nop => {}
        }
    }
}
