use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound on the number of tags an idea carries.
pub const MAX_TAGS: usize = 3;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    Important,
    Urgent,
}

impl Priority {
    /// Sort weight: urgent > important > normal.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Normal => 1,
            Priority::Important => 2,
            Priority::Urgent => 3,
        }
    }

    /// Lowercase name shared by the wire format and the database column.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Actioned,
    Archived,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Priority,
}

/// A persisted idea.
///
/// `category` is a copy of a [`Category`] name, not a reference to its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Idea {
    pub id: Uuid,
    pub raw_input: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub status: Status,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Structured suggestion produced by the normalizer, pending human review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiResult {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub is_new_category: bool,
}

/// User-reviewed fields submitted when confirming a capture.
///
/// Missing text fields deserialize as empty strings so that validation can
/// name the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct IdeaDraft {
    #[serde(default)]
    pub raw_input: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

/// Insert payload for the record store. Ids and timestamps are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdea {
    pub raw_input: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub status: Status,
    pub notes: Option<String>,
}

/// Partial update. There is deliberately no `raw_input` field: the original
/// text is immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct IdeaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// `None` leaves notes untouched, `Some(None)` clears them.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl IdeaPatch {
    /// Applies the patch onto an in-memory record. Timestamps are the
    /// caller's concern.
    pub fn apply_to(&self, idea: &mut Idea) {
        if let Some(title) = &self.title {
            idea.title = title.clone();
        }
        if let Some(summary) = &self.summary {
            idea.summary = summary.clone();
        }
        if let Some(category) = &self.category {
            idea.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            idea.tags = tags.clone();
        }
        if let Some(priority) = self.priority {
            idea.priority = priority;
        }
        if let Some(status) = self.status {
            idea.status = status;
        }
        if let Some(notes) = &self.notes {
            idea.notes = notes.clone();
        }
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Store-side listing query: equality filters plus ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdeaQuery {
    pub category: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub sort: SortOrder,
}

/// Trims, lowercases and drops blank tags, then keeps at most [`MAX_TAGS`].
pub fn sanitize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_priority_parse_is_exact() {
        assert_eq!(Priority::from_str("urgent").unwrap(), Priority::Urgent);
        assert!(Priority::from_str("Urgent").is_err());
        assert!(Priority::from_str("high").is_err());
        assert_eq!(Priority::Important.to_string(), "important");
    }

    #[test]
    fn test_priority_rank_ordering() {
        assert!(Priority::Urgent.rank() > Priority::Important.rank());
        assert!(Priority::Important.rank() > Priority::Normal.rank());
    }

    #[test]
    fn test_column_names_match_wire_names() {
        for priority in [Priority::Normal, Priority::Important, Priority::Urgent] {
            let wire = serde_json::to_value(priority).unwrap();
            assert_eq!(wire, priority.as_str());
            assert_eq!(priority.to_string(), priority.as_str());
        }
        for status in [Status::Active, Status::Actioned, Status::Archived] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.as_str());
            assert_eq!(Status::from_str(status.as_str()).unwrap(), status);
        }
        assert_eq!(Priority::Urgent.as_str(), "urgent");
        assert_eq!(Status::Actioned.as_str(), "actioned");
    }

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(Status::default(), Status::Active);
        assert_eq!(Status::from_str("archived").unwrap(), Status::Archived);
    }

    #[test]
    fn test_ai_result_serializes_camel_case() {
        let result = AiResult {
            title: "Renew passport".to_string(),
            summary: "Passport expires before the trip.".to_string(),
            category: "Travel".to_string(),
            tags: vec!["passport".to_string()],
            priority: Priority::Urgent,
            is_new_category: true,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isNewCategory"], true);
        assert_eq!(json["priority"], "urgent");
    }

    #[test]
    fn test_sanitize_tags() {
        let tags = sanitize_tags(["  Rust ", "", "WEB", "  ", "async", "extra"]);
        assert_eq!(tags, vec!["rust", "web", "async"]);
    }

    #[test]
    fn test_patch_notes_null_vs_absent() {
        let absent: IdeaPatch = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.notes, None);

        let cleared: IdeaPatch = serde_json::from_str(r#"{"notes":null}"#).unwrap();
        assert_eq!(cleared.notes, Some(None));

        let set: IdeaPatch = serde_json::from_str(r#"{"notes":"call back"}"#).unwrap();
        assert_eq!(set.notes, Some(Some("call back".to_string())));
    }

    #[test]
    fn test_patch_ignores_raw_input() {
        let patch: IdeaPatch =
            serde_json::from_str(r#"{"raw_input":"rewritten","status":"actioned"}"#).unwrap();
        assert_eq!(patch.status, Some(Status::Actioned));
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_draft_missing_fields_default_empty() {
        let draft: IdeaDraft = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(draft.title, "t");
        assert!(draft.summary.is_empty());
        assert_eq!(draft.priority, Priority::Normal);
        assert!(draft.tags.is_empty());
    }
}
