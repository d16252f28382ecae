use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SUMMARY_CHARS: usize = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WebsiteId(Uuid);

impl WebsiteId {
    pub fn new() -> Self {
        WebsiteId(Uuid::new_v4())
    }
}

impl Default for WebsiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WebsiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for WebsiteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(WebsiteId)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: WebsiteId,
    pub user_name: String,
    pub selected_color: String,
    pub topics: Vec<Topic>,
    pub created_at: DateTime<Utc>,
}

/// A validated record that is ready to be stored. Only
/// [`CreateWebsiteRequest::validate`] builds one.
#[derive(Clone, Debug, PartialEq)]
pub struct NewWebsite {
    user_name: String,
    selected_color: String,
    topics: Vec<Topic>,
}

impl NewWebsite {
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn selected_color(&self) -> &str {
        &self.selected_color
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Re-checks the invariants a stored record must hold.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.user_name.trim().is_empty() {
            return Err(ValidationError::MissingUserName);
        }
        if self.selected_color.trim().is_empty() {
            return Err(ValidationError::MissingTheme);
        }
        if self.topics.is_empty() {
            return Err(ValidationError::NoTopics);
        }
        for (index, topic) in self.topics.iter().enumerate() {
            if topic.title.trim().is_empty() {
                return Err(ValidationError::TopicWithoutTitle(index));
            }
            if topic.content.trim().is_empty() {
                return Err(ValidationError::TopicWithoutContent(index));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn unchecked(user_name: &str, selected_color: &str, topics: Vec<Topic>) -> Self {
        Self {
            user_name: user_name.to_string(),
            selected_color: selected_color.to_string(),
            topics,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebsiteRequest {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<TopicDraft>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
}

/// Browsers send dates either as ISO strings or as epoch milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("userName is required")]
    MissingUserName,
    #[error("selectedColor is required")]
    MissingTheme,
    #[error("at least one topic is required")]
    NoTopics,
    #[error("topic {0} has no title")]
    TopicWithoutTitle(usize),
    #[error("topic {0} has no content")]
    TopicWithoutContent(usize),
    #[error("topic {index} has an invalid createdAt value: {value}")]
    InvalidTimestamp { index: usize, value: String },
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The first [`SUMMARY_CHARS`] characters of the trimmed content plus an ellipsis.
pub fn summarize(content: &str) -> String {
    let prefix: String = content.trim().chars().take(SUMMARY_CHARS).collect();
    format!("{prefix}...")
}

impl RawTimestamp {
    pub fn normalize(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|date| date.with_timezone(&Utc)),
        }
    }

    fn describe(&self) -> String {
        match self {
            RawTimestamp::Millis(millis) => millis.to_string(),
            RawTimestamp::Text(text) => text.clone(),
        }
    }
}

impl TopicDraft {
    fn into_topic(self, index: usize, now: DateTime<Utc>) -> Result<Topic, ValidationError> {
        let title = non_blank(self.title).ok_or(ValidationError::TopicWithoutTitle(index))?;
        let content = non_blank(self.content).ok_or(ValidationError::TopicWithoutContent(index))?;

        let created_at = match self.created_at {
            Some(raw) => raw
                .normalize()
                .ok_or_else(|| ValidationError::InvalidTimestamp {
                    index,
                    value: raw.describe(),
                })?,
            None => now,
        };

        let summary = non_blank(self.summary).unwrap_or_else(|| summarize(&content));
        let id = non_blank(self.id).unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Topic {
            id,
            title,
            content,
            summary,
            image_url: non_blank(self.image_url),
            created_at,
        })
    }
}

impl CreateWebsiteRequest {
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewWebsite, ValidationError> {
        let user_name = non_blank(self.user_name).ok_or(ValidationError::MissingUserName)?;
        let selected_color = non_blank(self.selected_color).ok_or(ValidationError::MissingTheme)?;

        let drafts = self.topics.unwrap_or_default();
        if drafts.is_empty() {
            return Err(ValidationError::NoTopics);
        }

        let topics = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| draft.into_topic(index, now))
            .collect::<Result<Vec<_>, _>>()?;

        let website = NewWebsite {
            user_name,
            selected_color,
            topics,
        };
        website.check()?;
        Ok(website)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> TopicDraft {
        TopicDraft {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    fn request(topics: Vec<TopicDraft>) -> CreateWebsiteRequest {
        CreateWebsiteRequest {
            user_name: Some("Ayşe".to_string()),
            selected_color: Some("green".to_string()),
            topics: Some(topics),
        }
    }

    #[test]
    fn summary_is_truncated_prefix() {
        let content = "a".repeat(400);
        let summary = summarize(&content);
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));

        assert_eq!(summarize("  short text  "), "short text...");
    }

    #[test]
    fn summary_respects_multibyte_characters() {
        let content = "ğ".repeat(200);
        assert_eq!(summarize(&content), format!("{}...", "ğ".repeat(150)));
    }

    #[test]
    fn rejects_empty_topic_list() {
        let err = request(vec![]).validate(Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::NoTopics);

        let missing = CreateWebsiteRequest {
            topics: None,
            ..request(vec![])
        };
        assert_eq!(
            missing.validate(Utc::now()).unwrap_err(),
            ValidationError::NoTopics
        );
    }

    #[test]
    fn rejects_blank_author_and_theme() {
        let blank_name = CreateWebsiteRequest {
            user_name: Some("   ".to_string()),
            ..request(vec![draft("t", "c")])
        };
        assert_eq!(
            blank_name.validate(Utc::now()).unwrap_err(),
            ValidationError::MissingUserName
        );

        let no_theme = CreateWebsiteRequest {
            selected_color: None,
            ..request(vec![draft("t", "c")])
        };
        assert_eq!(
            no_theme.validate(Utc::now()).unwrap_err(),
            ValidationError::MissingTheme
        );
    }

    #[test]
    fn rejects_topic_without_content() {
        let err = request(vec![draft("ok", "body"), draft("empty", " ")])
            .validate(Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::TopicWithoutContent(1));
    }

    #[test]
    fn normalizes_timestamps_and_defaults() {
        let now = Utc::now();
        let mut iso = draft("iso", "body");
        iso.created_at = Some(RawTimestamp::Text("2024-05-01T10:00:00.000+03:00".into()));
        let mut millis = draft("millis", "body");
        millis.created_at = Some(RawTimestamp::Millis(1_714_550_400_000));
        let mut missing = draft("missing", "body");
        missing.image_url = Some("".into());

        let website = request(vec![iso, millis, missing]).validate(now).unwrap();

        assert_eq!(
            website.topics()[0].created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap()
        );
        assert_eq!(
            website.topics()[1].created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(website.topics()[2].created_at, now);
        assert_eq!(website.topics()[2].image_url, None);
        assert_eq!(website.topics()[2].summary, "body...");
    }

    #[test]
    fn rejects_unparsable_timestamp() {
        let mut bad = draft("bad", "body");
        bad.created_at = Some(RawTimestamp::Text("yesterday".into()));
        let err = request(vec![bad]).validate(Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTimestamp {
                index: 0,
                value: "yesterday".into()
            }
        );
    }

    #[test]
    fn deserializes_browser_payload() {
        let body = r#"{
            "userName": "Mehmet",
            "selectedColor": "blue",
            "topics": [{
                "id": "1714550400000",
                "title": "My school",
                "content": "My school is big.",
                "summary": "My school is big....",
                "createdAt": "2024-05-01T08:00:00.000Z"
            }]
        }"#;
        let request: CreateWebsiteRequest = serde_json::from_str(body).unwrap();
        let website = request.validate(Utc::now()).unwrap();
        assert_eq!(website.user_name(), "Mehmet");
        assert_eq!(website.topics()[0].id, "1714550400000");
        assert_eq!(website.topics()[0].image_url, None);
    }

    #[test]
    fn check_rejects_broken_records() {
        assert_eq!(
            NewWebsite::unchecked("", " ", vec![]).check(),
            Err(ValidationError::MissingUserName)
        );
        assert_eq!(
            NewWebsite::unchecked("Can", "red", vec![]).check(),
            Err(ValidationError::NoTopics)
        );

        let website = request(vec![draft("t", "c")]).validate(Utc::now()).unwrap();
        assert_eq!(website.check(), Ok(()));
    }

    #[test]
    fn website_id_rejects_malformed_input() {
        assert!("not-an-id".parse::<WebsiteId>().is_err());
        let id = WebsiteId::new();
        assert_eq!(id.to_string().parse::<WebsiteId>().unwrap(), id);
        assert_ne!(WebsiteId::new(), WebsiteId::new());
    }
}
