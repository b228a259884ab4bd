//! Operations exposed to the API layer.

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::error::{Error, Result};
use crate::registry::{self, Resource};
use crate::revision::{self, HistoryEntry, Revision};
use crate::scheduler::SchedulerHandle;

#[derive(Clone)]
pub struct Backcast {
    db: DatabaseConnection,
    scheduler: SchedulerHandle,
}

impl Backcast {
    pub fn new(db: DatabaseConnection, scheduler: SchedulerHandle) -> Self {
        Backcast { db, scheduler }
    }

    /// Register `url` and ask the scheduler for a first poll.
    pub async fn create_resource(&self, url: &str) -> Result<Resource> {
        let resource = registry::create(&self.db, url).await?;
        info!("Registered resource {} ({})", resource.id, resource.url);

        // Never-polled resources are swept anyway, so this is best effort.
        if let Err(e) = self.scheduler.refresh(resource.id).await {
            warn!("Unable to queue first poll of resource {}: {}", resource.id, e);
        }
        Ok(resource)
    }

    pub async fn get_resource(&self, id: i32) -> Result<Resource> {
        registry::get(&self.db, id).await
    }

    pub async fn trigger_refresh(&self, id: i32) -> Result<()> {
        registry::get(&self.db, id).await?;
        self.scheduler.refresh(id).await
    }

    pub async fn history(&self, id: i32) -> Result<Vec<HistoryEntry>> {
        let txn = self.db.begin().await.map_err(Error::Transaction)?;
        registry::get(&txn, id).await?;
        let history = revision::list_history(&txn, id).await?;
        txn.rollback().await.map_err(Error::Transaction)?;
        Ok(history)
    }

    /// Content of resource `id`, latest or as of `fingerprint`, with the
    /// content type and validator recorded for it.
    pub async fn content(&self, id: i32, fingerprint: Option<&str>) -> Result<Revision> {
        let txn = self.db.begin().await.map_err(Error::Transaction)?;
        registry::get(&txn, id).await?;
        let found = revision::revision(&txn, id, fingerprint).await?;
        txn.rollback().await.map_err(Error::Transaction)?;
        Ok(found)
    }
}
