pub mod admin;
pub mod articles;
pub mod comments;
pub mod contact;
pub mod error;
pub mod likes;
pub mod moderation_ws;
pub mod projects;
pub mod settings;

use crate::comments::{CommentStore, DbCommentStore, PublicListingCache};
use crate::email::Relay;
use crate::likes::{DbLikeStore, LikeStore};
use crate::moderation::{ChangeFeed, ModerationConsole};
use crate::settings::Settings;
use actix::Addr;
use actix_web::web::{Data, ServiceConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut ServiceConfig) {
    // Order is important: admin routes with literal segments (`bulk`,
    // `live`, `reorder`) are registered before their `{id}` siblings.
    admin::configure(conf);
    articles::configure(conf);
    comments::configure(conf);
    contact::configure(conf);
    likes::configure(conf);
    projects::configure(conf);
    settings::configure(conf);
}

/// Shared state handed to every worker.
///
/// The change feed only holds weak references, so the listeners subscribed
/// here live exactly as long as this value and its clones.
#[derive(Clone)]
pub struct AppServices {
    pub db: Data<DatabaseConnection>,
    pub feed: Arc<ChangeFeed>,
    pub comments: Data<dyn CommentStore>,
    pub public_comments: Data<PublicListingCache>,
    pub console: Data<ModerationConsole>,
    pub likes: Data<dyn LikeStore>,
    pub settings: Data<Settings>,
    pub relay: Data<Relay>,
    live: Option<(Data<Addr<moderation_ws::ModerationServer>>, Arc<moderation_ws::FeedRelay>)>,
}

impl AppServices {
    pub fn new(
        db: DatabaseConnection,
        settings: Arc<Settings>,
        relay: Relay,
        public_cache_ttl: Duration,
    ) -> Self {
        let feed = Arc::new(ChangeFeed::new());

        let store: Arc<dyn CommentStore> = Arc::new(DbCommentStore::new(db.clone(), feed.clone()));
        let public_comments = Arc::new(PublicListingCache::new(public_cache_ttl));
        let console = Arc::new(ModerationConsole::new(store.clone()));
        feed.subscribe(&public_comments);
        feed.subscribe(&console);

        let likes: Arc<dyn LikeStore> = Arc::new(DbLikeStore::new(db.clone()));

        Self {
            db: Data::new(db),
            feed,
            comments: Data::from(store),
            public_comments: Data::from(public_comments),
            console: Data::from(console),
            likes: Data::from(likes),
            settings: Data::from(settings),
            relay: Data::new(relay),
            live: None,
        }
    }

    /// Forward comment change events to connected admin WebSocket clients.
    pub fn with_live_feed(mut self, server: Addr<moderation_ws::ModerationServer>) -> Self {
        let relay = Arc::new(moderation_ws::FeedRelay::new(server.clone()));
        self.feed.subscribe(&relay);
        self.live = Some((Data::new(server), relay));
        self
    }

    /// Register the shared state as app data.
    pub fn register(&self, conf: &mut ServiceConfig) {
        conf.app_data(self.db.clone())
            .app_data(self.comments.clone())
            .app_data(self.public_comments.clone())
            .app_data(self.console.clone())
            .app_data(self.likes.clone())
            .app_data(self.settings.clone())
            .app_data(self.relay.clone());

        if let Some((server, _)) = &self.live {
            conf.app_data(server.clone());
        }
    }
}
