use crate::services::{dispatcher::Dispatcher, email::EmailService};
use sea_orm::DatabaseConnection;
use services::Outbox;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use util::events::EventBroadcaster;

/// Shared handles every handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    events: EventBroadcaster,
    outbox: Arc<dyn Outbox>,
    uploads_root: PathBuf,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        events: EventBroadcaster,
        outbox: Arc<dyn Outbox>,
        uploads_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            events,
            outbox,
            uploads_root: uploads_root.into(),
        }
    }

    /// State wired to the real dispatcher: email, in-app notifications and
    /// the live event stream.
    pub fn with_dispatcher(
        db: DatabaseConnection,
        email: EmailService,
        uploads_root: impl Into<PathBuf>,
    ) -> Self {
        let events = EventBroadcaster::new();
        let outbox = Arc::new(Dispatcher::new(db.clone(), events.clone(), email));
        Self::new(db, events, outbox, uploads_root)
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    pub fn outbox(&self) -> &dyn Outbox {
        self.outbox.as_ref()
    }

    pub fn uploads_root(&self) -> &Path {
        &self.uploads_root
    }
}
