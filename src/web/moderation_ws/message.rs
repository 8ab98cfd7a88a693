//! Message types for the moderation live feed

use crate::moderation::CommentEvent;
use actix::prelude::*;
use uuid::Uuid;

/// New live feed connection
pub struct Connect {
    /// Channel to send messages back to this connection
    pub addr: Recipient<FeedPush>,
    /// Operator owning this connection
    pub operator_id: Uuid,
}

impl Message for Connect {
    /// Returns connection ID
    type Result = usize;
}

/// Disconnect message
pub struct Disconnect {
    /// Connection ID
    pub id: usize,
}

impl Message for Disconnect {
    type Result = ();
}

/// A comment change to fan out to every connection
pub struct CommentsChanged(pub CommentEvent);

impl Message for CommentsChanged {
    type Result = ();
}

/// Server -> Client push message
pub struct FeedPush(pub String);

impl Message for FeedPush {
    type Result = ();
}

/// Get count of live connections
pub struct GetConnectionCount;

impl Message for GetConnectionCount {
    type Result = usize;
}
