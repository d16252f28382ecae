use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;

use crate::website::{NewWebsite, Topic, Website, WebsiteId};

use super::DB;

#[derive(sqlx::FromRow)]
struct WebsiteRow {
    user_name: String,
    selected_color: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TopicRow {
    topic_id: String,
    title: String,
    content: String,
    summary: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TopicRow> for Topic {
    fn from(row: TopicRow) -> Self {
        Topic {
            id: row.topic_id,
            title: row.title,
            content: row.content,
            summary: row.summary,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

impl DB {
    /// Stores the record and its topics atomically under a fresh id.
    /// Records that break the website invariants are refused before any write.
    pub async fn create_website(&self, website: &NewWebsite) -> Result<WebsiteId> {
        website
            .check()
            .context("Refusing to store an invalid website")?;

        let id = WebsiteId::new();
        let id_text = id.to_string();
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to acquire a store connection")?;

        sqlx::query(
            r#"
            INSERT INTO websites (id, user_name, selected_color, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id_text)
        .bind(website.user_name())
        .bind(website.selected_color())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, topic) in website.topics().iter().enumerate() {
            let position = position as i64;
            sqlx::query(
                r#"
                INSERT INTO topics (
                    website_id,
                    position,
                    topic_id,
                    title,
                    content,
                    summary,
                    image_url,
                    created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id_text)
            .bind(position)
            .bind(&topic.id)
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(&topic.summary)
            .bind(&topic.image_url)
            .bind(topic.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    pub async fn get_website(&self, id: &WebsiteId) -> Result<Option<Website>> {
        let id_text = id.to_string();
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire a store connection")?;

        let row: Option<WebsiteRow> = sqlx::query_as(
            r#"
            SELECT user_name, selected_color, created_at
            FROM websites
            WHERE id = ?
            "#,
        )
        .bind(&id_text)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut topics = Vec::new();
        let mut rows = sqlx::query_as::<_, TopicRow>(
            r#"
            SELECT topic_id, title, content, summary, image_url, created_at
            FROM topics
            WHERE website_id = ?
            ORDER BY position
            "#,
        )
        .bind(&id_text)
        .fetch(&mut *conn);

        while let Some(topic) = rows.try_next().await? {
            topics.push(Topic::from(topic));
        }

        Ok(Some(Website {
            id: *id,
            user_name: row.user_name,
            selected_color: row.selected_color,
            topics,
            created_at: row.created_at,
        }))
    }
}
