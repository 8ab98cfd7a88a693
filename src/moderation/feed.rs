//! Change notifications for the comments table.
//!
//! The comment store publishes one event per successful write. Listeners
//! are held weakly so a dropped cache or console unsubscribes itself.

use serde::Serialize;
use std::sync::{Arc, RwLock, Weak};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One write against the comments table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentEvent {
    pub kind: ChangeKind,
    pub ids: Vec<Uuid>,
}

impl CommentEvent {
    pub fn insert(id: Uuid) -> Self {
        Self {
            kind: ChangeKind::Insert,
            ids: vec![id],
        }
    }

    pub fn update(ids: Vec<Uuid>) -> Self {
        Self {
            kind: ChangeKind::Update,
            ids,
        }
    }

    pub fn delete(ids: Vec<Uuid>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            ids,
        }
    }
}

/// Something that wants to hear about comment changes.
///
/// Called synchronously from the publishing task, so implementations must
/// not block.
pub trait ChangeListener: Send + Sync {
    fn comments_changed(&self, event: &CommentEvent);
}

#[derive(Default)]
pub struct ChangeFeed {
    listeners: RwLock<Vec<Weak<dyn ChangeListener>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. The feed does not keep it alive.
    pub fn subscribe<L>(&self, listener: &Arc<L>)
    where
        L: ChangeListener + 'static,
    {
        let listener: Arc<dyn ChangeListener> = listener.clone();
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(Arc::downgrade(&listener));
        }
    }

    /// Deliver an event to every live listener, pruning dropped ones.
    pub fn publish(&self, event: CommentEvent) {
        let live: Vec<Arc<dyn ChangeListener>> = match self.listeners.write() {
            Ok(mut listeners) => {
                listeners.retain(|l| l.strong_count() > 0);
                listeners.iter().filter_map(Weak::upgrade).collect()
            }
            Err(_) => {
                log::error!("Comment change feed lock is poisoned, dropping event");
                return;
            }
        };

        log::debug!(
            "Publishing comment {:?} event for {} row(s) to {} listener(s)",
            event.kind,
            event.ids.len(),
            live.len()
        );

        for listener in live {
            listener.comments_changed(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .map(|l| l.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }
}
