//! Comment moderation: the operator console and the change feed it
//! listens to.

pub mod console;
pub mod feed;

pub use console::{
    BulkAction, ConsoleError, ListingPage, ListingQuery, ModerationConsole, StatusFilter,
    PAGE_SIZE,
};
pub use feed::{ChangeFeed, ChangeKind, ChangeListener, CommentEvent};
