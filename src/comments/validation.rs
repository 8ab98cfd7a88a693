//! Structural checks on a submitted comment.
//!
//! Pure and synchronous: no storage access happens here. Every field is
//! trimmed before it is measured, and lengths count characters, not bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

pub const ARTICLE_SLUG_MAX: usize = 255;

/// Raw comment fields as typed by the visitor.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Normalized comment fields that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidComment {
    pub first_name: String,
    pub email: String,
    pub website: Option<String>,
    pub content: String,
}

/// Human-readable messages keyed by field name, at most one per field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field unless one is already present.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            if let Some(first) = list.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                out.add(field, message);
            }
        }
        out
    }
}

#[derive(Debug, Validate)]
struct TrimmedComment {
    #[validate(length(
        min = 2,
        max = 50,
        message = "First name must be between 2 and 50 characters"
    ))]
    first_name: String,
    #[validate(
        email(message = "Please enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    email: String,
    #[validate(
        custom = "validate_web_link",
        length(max = 255, message = "Website must be at most 255 characters")
    )]
    website: Option<String>,
    #[validate(length(
        min = 20,
        max = 500,
        message = "Comment must be between 20 and 500 characters"
    ))]
    content: String,
}

/// Absolute `http`/`https` URL with a host. Other schemes would end up as
/// a clickable link next to a public comment.
fn validate_web_link(website: &str) -> Result<(), ValidationError> {
    match url::Url::parse(website) {
        Ok(link) if matches!(link.scheme(), "http" | "https") && link.has_host() => Ok(()),
        _ => {
            let mut err = ValidationError::new("url");
            err.message = Some("Please enter a valid URL".into());
            Err(err)
        }
    }
}

/// Validate and normalize a comment form.
///
/// An empty or whitespace-only website counts as no website.
pub fn validate_comment(form: &CommentForm) -> Result<ValidComment, FieldErrors> {
    let trimmed = TrimmedComment {
        first_name: form.first_name.trim().to_string(),
        email: form.email.trim().to_string(),
        website: form
            .website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string),
        content: form.content.trim().to_string(),
    };

    trimmed.validate()?;

    Ok(ValidComment {
        first_name: trimmed.first_name,
        email: trimmed.email,
        website: trimmed.website,
        content: trimmed.content,
    })
}

/// Check the slug a comment is filed under.
pub fn validate_article_slug(slug: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let slug = slug.trim();
    if slug.is_empty() {
        errors.add("article_slug", "Article is required");
    } else if slug.chars().count() > ARTICLE_SLUG_MAX {
        errors.add("article_slug", "Article slug is too long");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
