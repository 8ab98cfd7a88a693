//! Live comment changes for the moderation console
//!
//! ## Architecture
//!
//! - `ModerationServer` actor holds every operator connection
//! - `FeedConnection` actor handles one WebSocket
//! - `FeedRelay` listens on the comment change feed and forwards each
//!   event to the server, which pushes
//!   `{"type":"comments_changed","kind":...,"ids":[...]}` to every client
//!
//! Clients re-fetch the listing when they receive a change.

pub mod connection;
pub mod message;
pub mod server;

use crate::auth::AuthenticatedOperator;
use crate::moderation::{ChangeListener, CommentEvent};
use actix::Addr;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::time::Duration;

pub use message::CommentsChanged;
pub use server::ModerationServer;

/// Heartbeat interval - send ping every 5 seconds
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

/// Client timeout - disconnect if no response for 30 seconds
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Forwards comment change events to the [`ModerationServer`] mailbox.
pub struct FeedRelay {
    server: Addr<ModerationServer>,
}

impl FeedRelay {
    pub fn new(server: Addr<ModerationServer>) -> Self {
        Self { server }
    }
}

impl ChangeListener for FeedRelay {
    fn comments_changed(&self, event: &CommentEvent) {
        self.server.do_send(CommentsChanged(event.clone()));
    }
}

/// WebSocket endpoint for live moderation updates
///
/// GET /api/admin/comments/live
#[get("/api/admin/comments/live")]
pub async fn moderation_ws(
    req: HttpRequest,
    stream: web::Payload,
    operator: AuthenticatedOperator,
    server: web::Data<Addr<ModerationServer>>,
) -> Result<HttpResponse, Error> {
    log::debug!("Operator {} connecting to live feed", operator.id);

    let connection = connection::FeedConnection::new(operator.id, server.get_ref().clone());
    ws::start(connection, &req, stream)
}
