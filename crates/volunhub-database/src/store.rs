//! The data-access context handed to request handlers.

use tracing::info;

use volunhub_core::config::DatabaseConfig;
use volunhub_core::result::AppResult;

use crate::connection::Database;
use crate::repositories::{
    ApplicationRepository, ConversationRepository, NotificationRepository, OpportunityRepository,
    StatsRepository, UserRepository,
};

/// Every store of the data layer sharing one connection pool.
///
/// Built once with [`DataStore::open`] and passed explicitly to whatever
/// needs it; there is no process-wide pool.
#[derive(Debug, Clone)]
pub struct DataStore {
    pub db: Database,
    pub users: UserRepository,
    pub stats: StatsRepository,
    pub opportunities: OpportunityRepository,
    pub applications: ApplicationRepository,
    pub conversations: ConversationRepository,
    pub notifications: NotificationRepository,
}

impl DataStore {
    /// Build every repository over an existing gateway.
    pub fn new(db: Database) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            stats: StatsRepository::new(db.clone()),
            opportunities: OpportunityRepository::new(db.clone()),
            applications: ApplicationRepository::new(db.clone()),
            conversations: ConversationRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            db,
        }
    }

    /// Open the pool described by `config` and build every repository.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Database::open(config).await?;
        info!("Data store ready");
        Ok(Self::new(db))
    }

    /// Close the shared pool. Clones of this store stop working afterwards.
    pub async fn close(&self) {
        self.db.close().await;
    }
}
