use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tags::TagSet;
use crate::types::identifiers::ContentId;
use crate::types::input::InputError;

/// A historical piece of content with its precomputed embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub body_text: String,
    pub tags: TagSet,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of a content item before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContentItem {
    pub id: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// Validate and build a content item.
    ///
    /// This is the checked way in: the id must be non-blank and the
    /// embedding non-empty with only finite components.
    pub fn ingest(
        id: &str,
        body_text: impl Into<String>,
        tags: TagSet,
        embedding: Vec<f32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InputError> {
        let id = ContentId::new(id)?;

        if embedding.is_empty() {
            return Err(InputError::EmptyEmbedding {
                id: id.as_str().to_string(),
            });
        }
        if let Some(position) = embedding.iter().position(|v| !v.is_finite()) {
            return Err(InputError::NonFiniteEmbedding {
                id: id.as_str().to_string(),
                position,
            });
        }

        Ok(ContentItem {
            id,
            body_text: body_text.into(),
            tags,
            embedding,
            created_at,
        })
    }

    /// Parse one item from JSON and validate it.
    pub fn from_json(raw: &str) -> Result<Self, InputError> {
        let raw: RawContentItem = serde_json::from_str(raw)?;
        ContentItem::try_from(raw)
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

impl TryFrom<RawContentItem> for ContentItem {
    type Error = InputError;

    fn try_from(raw: RawContentItem) -> Result<Self, Self::Error> {
        ContentItem::ingest(
            &raw.id,
            raw.body_text,
            raw.tags.into_iter().collect(),
            raw.embedding,
            raw.created_at,
        )
    }
}
