//! Public comment submission.

use super::store::CommentStore;
use super::validation::{validate_article_slug, validate_comment, CommentForm, FieldErrors};
use crate::db::StoreError;
use crate::spam;
use serde::Deserialize;

/// A comment as posted by the public form, decoy field included.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub form: CommentForm,
    #[serde(default)]
    pub hp_website: Option<String>,
}

#[derive(Debug)]
pub enum SubmitError {
    Invalid(FieldErrors),
    Store(StoreError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Invalid(errors) => write!(f, "Invalid comment ({} field(s))", errors.len()),
            SubmitError::Store(e) => write!(f, "Unable to save comment: {}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<FieldErrors> for SubmitError {
    fn from(e: FieldErrors) -> Self {
        SubmitError::Invalid(e)
    }
}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        SubmitError::Store(e)
    }
}

/// Validate and store a public comment in the `pending` state.
///
/// A filled decoy field ends the call early with `Ok(())`, exactly like an
/// accepted comment, and nothing is validated or stored.
pub async fn submit(
    store: &dyn CommentStore,
    article_slug: &str,
    submission: Submission,
) -> Result<(), SubmitError> {
    if spam::is_tripped(submission.hp_website.as_deref()) {
        return Ok(());
    }

    validate_article_slug(article_slug)?;
    let comment = validate_comment(&submission.form)?;
    store.insert(article_slug, comment).await?;

    Ok(())
}
