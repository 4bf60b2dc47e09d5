//! Child image rules shared by areas and properties.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// How a batch of newly attached images interacts with the primary flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryPolicy {
    /// Parent creation: the first image in input order becomes primary.
    FirstUpload,
    /// Update: images are appended, existing flags are untouched.
    Append,
    /// Explicit request: existing primaries are demoted, first upload promoted.
    Promote,
}

impl PrimaryPolicy {
    /// Flags for a batch of `count` uploads, in input order.
    pub fn flags(self, count: usize) -> Vec<bool> {
        match self {
            PrimaryPolicy::FirstUpload | PrimaryPolicy::Promote => {
                (0..count).map(|i| i == 0).collect()
            }
            PrimaryPolicy::Append => vec![false; count],
        }
    }

    /// Whether the existing primaries must be cleared before inserting.
    pub fn demotes_existing(self) -> bool {
        matches!(self, PrimaryPolicy::Promote)
    }
}

/// Image row attached to an area or property
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Image {
    pub id: Uuid,
    pub image: String,
    pub is_primary: bool,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Representative image for list views: the primary one, else the first.
pub fn representative(images: &[Image]) -> Option<&Image> {
    images
        .iter()
        .find(|img| img.is_primary)
        .or_else(|| images.iter().min_by_key(|img| img.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn image(name: &str, primary: bool, offset_secs: i64) -> Image {
        Image {
            id: Uuid::new_v4(),
            image: name.to_string(),
            is_primary: primary,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_first_upload_is_only_primary() {
        assert_eq!(PrimaryPolicy::FirstUpload.flags(3), vec![true, false, false]);
        assert!(PrimaryPolicy::FirstUpload.flags(0).is_empty());
    }

    #[test]
    fn test_append_never_promotes() {
        assert_eq!(PrimaryPolicy::Append.flags(2), vec![false, false]);
        assert!(!PrimaryPolicy::Append.demotes_existing());
        assert!(PrimaryPolicy::Promote.demotes_existing());
    }

    #[test]
    fn test_representative_prefers_primary_then_oldest() {
        let images = vec![image("b.jpg", false, 5), image("a.jpg", false, 1), image("p.jpg", true, 9)];
        assert_eq!(representative(&images).unwrap().image, "p.jpg");

        let images = vec![image("b.jpg", false, 5), image("a.jpg", false, 1)];
        assert_eq!(representative(&images).unwrap().image, "a.jpg");

        assert!(representative(&[]).is_none());
    }
}
