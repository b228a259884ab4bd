//! The append-only edit chain kept for every resource.
//!
//! Content is never stored whole. Each edit row holds the patch from the
//! previous state plus the fingerprint of the state it produces, and any
//! version is recovered by replaying patches from the empty string.

use chrono::{DateTime, Utc};
use entity::edit;
use sea_orm::prelude::*;
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, Set};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::patch;

/// Edits fetched per query while replaying a chain.
const REPLAY_PAGE_SIZE: u64 = 64;

/// One entry of a resource's history, without the patch itself.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct HistoryEntry {
    pub edit_id: i32,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// What the server sent along with a fetched body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// A reconstructed version of a resource's content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Revision {
    pub fingerprint: String,
    pub content: String,
    pub content_type: Option<String>,
    /// Length of `content` in bytes.
    pub content_length: usize,
    /// The server's ETag for this revision, or the fingerprint if it sent none.
    pub etag: String,
}

/// Rebuild the content of resource `resource_id`.
///
/// With `up_to` unset this is the latest content. Otherwise replay stops at the
/// first edit carrying that fingerprint, and the result is checked against it.
pub async fn reconstruct<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
    up_to: Option<&str>,
) -> Result<String> {
    let (content, _) = replay_until(db, resource_id, up_to).await?;
    Ok(content)
}

/// Like [`reconstruct`], with the metadata recorded for that version.
///
/// An empty chain yields the empty revision, validated by its fingerprint.
pub async fn revision<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
    up_to: Option<&str>,
) -> Result<Revision> {
    let (content, last) = replay_until(db, resource_id, up_to).await?;
    let (fingerprint, content_type, etag) = match last {
        Some(e) => (
            e.fingerprint,
            Some(e.content_type).filter(|t| !t.is_empty()),
            Some(e.etag).filter(|t| !t.is_empty()),
        ),
        None => (fingerprint(&content), None, None),
    };
    Ok(Revision {
        etag: etag.unwrap_or_else(|| fingerprint.clone()),
        fingerprint,
        content_type,
        content_length: content.len(),
        content,
    })
}

/// Replay the chain, returning the content and the last edit applied.
async fn replay_until<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
    up_to: Option<&str>,
) -> Result<(String, Option<edit::Model>)> {
    let mut pages = edit::Entity::find()
        .filter(edit::Column::ResourceId.eq(resource_id))
        .order_by_asc(edit::Column::Id)
        .paginate(db, REPLAY_PAGE_SIZE);

    let mut content = String::new();
    let mut last = None;
    while let Some(edits) = pages.fetch_and_next().await? {
        for e in edits {
            content = replay(&content, &e)?;
            if up_to == Some(e.fingerprint.as_str()) {
                let actual = fingerprint(&content);
                if actual != e.fingerprint {
                    return Err(Error::RevisionMismatch {
                        resource_id,
                        expected: e.fingerprint,
                        actual,
                    });
                }
                return Ok((content, Some(e)));
            }
            last = Some(e);
        }
    }

    match up_to {
        Some(wanted) => Err(Error::UnknownRevision {
            resource_id,
            fingerprint: wanted.to_owned(),
        }),
        None => Ok((content, last)),
    }
}

fn replay(base: &str, e: &edit::Model) -> Result<String> {
    let patch = patch::deserialize(&e.patch).map_err(|source| Error::Patch {
        edit_id: e.id,
        source,
    })?;
    patch::apply(base, &patch).map_err(|source| Error::Patch {
        edit_id: e.id,
        source,
    })
}

/// Append an edit if `new_content` differs from the current reconstruction.
///
/// Returns whether an edit was written. Run this in the same transaction as
/// the poll bookkeeping for the resource.
pub async fn commit_if_changed<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
    new_content: &str,
) -> Result<bool> {
    commit_response(db, resource_id, new_content, &ResponseMeta::default()).await
}

/// [`commit_if_changed`], keeping `meta` on the appended edit. Metadata alone
/// never produces an edit.
pub async fn commit_response<C: ConnectionTrait>(
    db: &C,
    resource_id: i32,
    new_content: &str,
    meta: &ResponseMeta,
) -> Result<bool> {
    let current = reconstruct(db, resource_id, None).await?;
    let patch = patch::diff(&current, new_content);
    if patch.is_empty() {
        return Ok(false);
    }

    let new_edit = edit::ActiveModel {
        resource_id: Set(resource_id),
        patch: Set(patch.serialize()),
        fingerprint: Set(fingerprint(new_content)),
        created_at: Set(Utc::now()),
        content_type: Set(meta.content_type.clone().unwrap_or_default()),
        etag: Set(meta.etag.clone().unwrap_or_default()),
        ..Default::default()
    };
    let inserted = edit::Entity::insert(new_edit).exec(db).await?;
    debug!(
        "Appended edit {} to resource {}",
        inserted.last_insert_id, resource_id
    );
    Ok(true)
}

pub async fn list_history<C: ConnectionTrait>(db: &C, resource_id: i32) -> Result<Vec<HistoryEntry>> {
    let history = edit::Entity::find()
        .select_only()
        .column_as(edit::Column::Id, "edit_id")
        .column(edit::Column::Fingerprint)
        .column(edit::Column::CreatedAt)
        .filter(edit::Column::ResourceId.eq(resource_id))
        .order_by_asc(edit::Column::Id)
        .into_model::<HistoryEntry>()
        .all(db)
        .await?;
    Ok(history)
}
