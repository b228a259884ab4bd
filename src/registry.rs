//! Tracked resources and their polling metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};
use entity::resource;
use sea_orm::prelude::*;
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, SqlErr};

use crate::error::{Error, Result};

pub type Resource = resource::Model;

/// Register `url` for polling.
pub async fn create<C: ConnectionTrait>(db: &C, url: &str) -> Result<Resource> {
    let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl {
            url: url.to_owned(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }

    let new_resource = resource::ActiveModel {
        url: Set(parsed.to_string()),
        conditional_token: Set(String::new()),
        last_polled_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match new_resource.insert(db).await {
        Ok(r) => Ok(r),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Err(Error::DuplicateResource(parsed.to_string()))
            }
            _ => Err(e.into()),
        },
    }
}

pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> Result<Resource> {
    resource::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("resource", id))
}

/// Resources not polled within `older_than`, never-polled first and then
/// oldest first, at most `limit` of them.
pub async fn find_stale<C: ConnectionTrait>(
    db: &C,
    older_than: Duration,
    limit: u64,
) -> Result<Vec<Resource>> {
    find_stale_at(db, Utc::now(), older_than, limit).await
}

pub async fn find_stale_at<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
    older_than: Duration,
    limit: u64,
) -> Result<Vec<Resource>> {
    let cutoff = chrono::Duration::from_std(older_than)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let stale = resource::Entity::find()
        .filter(
            Condition::any()
                .add(resource::Column::LastPolledAt.lt(cutoff))
                .add(resource::Column::LastPolledAt.is_null()),
        )
        .order_by_asc(resource::Column::LastPolledAt.is_not_null())
        .order_by_asc(resource::Column::LastPolledAt)
        .order_by_asc(resource::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(stale)
}

/// Mark resource `id` as polled now, replacing its conditional token if a
/// fresh one came back with the response.
pub async fn record_poll<C: ConnectionTrait>(db: &C, id: i32, token: Option<&str>) -> Result<()> {
    record_poll_at(db, id, token, Utc::now()).await
}

pub async fn record_poll_at<C: ConnectionTrait>(
    db: &C,
    id: i32,
    token: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut update = resource::ActiveModel {
        last_polled_at: Set(Some(now)),
        ..Default::default()
    };
    if let Some(token) = token {
        update.conditional_token = Set(token.to_owned());
    }

    let res = resource::Entity::update_many()
        .set(update)
        .filter(resource::Column::Id.eq(id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(Error::not_found("resource", id));
    }
    Ok(())
}
