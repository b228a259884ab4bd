//! Line-oriented text patches.
//!
//! A [`PatchSet`] is a unified diff between two strings. Its serialized form is
//! the diff text itself, which is what the revision store keeps per edit.

use std::fmt;

use diffy::{DiffOptions, Patch};
use thiserror::Error;

/// Lines of unchanged context kept around each hunk.
const CONTEXT_LINES: usize = 3;

/// Header every serialized patch starts with.
const HEADER: &str = "--- ";

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("malformed patch: {0}")]
    Malformed(String),

    #[error("patch does not apply: {0}")]
    Apply(#[from] diffy::ApplyError),
}

impl From<diffy::ParsePatchError> for PatchError {
    fn from(err: diffy::ParsePatchError) -> Self {
        PatchError::Malformed(err.to_string())
    }
}

/// Edit description turning one string into another.
pub struct PatchSet<'a>(Patch<'a, str>);

impl fmt::Debug for PatchSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchSet")
            .field("hunks", &self.0.hunks().len())
            .finish()
    }
}

impl PatchSet<'_> {
    /// True when the two diffed strings were identical.
    pub fn is_empty(&self) -> bool {
        self.0.hunks().is_empty()
    }

    pub fn serialize(&self) -> String {
        self.0.to_string()
    }
}

/// Compute the patch from `base` to `target`. Deterministic for given inputs.
pub fn diff<'a>(base: &'a str, target: &'a str) -> PatchSet<'a> {
    PatchSet(
        DiffOptions::new()
            .set_context_len(CONTEXT_LINES)
            .create_patch(base, target),
    )
}

pub fn deserialize(text: &str) -> Result<PatchSet<'_>, PatchError> {
    if !text.starts_with(HEADER) {
        return Err(PatchError::Malformed("missing file header".to_string()));
    }
    Ok(PatchSet(Patch::<str>::from_str(text)?))
}

/// Apply every hunk of `patch` to `base`.
///
/// Either the whole patch applies and the derived string is returned, or
/// nothing is returned at all.
pub fn apply(base: &str, patch: &PatchSet<'_>) -> Result<String, PatchError> {
    Ok(diffy::apply(base, &patch.0)?)
}
