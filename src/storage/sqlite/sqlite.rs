#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;

use std::collections::BTreeMap;

use async_trait::async_trait;
use eyre::{Context, Result, bail};
use tokio_rusqlite::{Connection, OpenFlags, ToSql, named_params, params};

use crate::{
    models::{Conversation, Message, storage::FilterConversation},
    storage::Storage,
    tree::SiblingIndex,
};

use super::migration::MIGRATION;

/// Sibling selections made before any message exists are stored under this
/// message id.
const UNKEYED: &str = "";

pub struct Sqlite {
    conn: Connection,
}

impl Sqlite {
    pub async fn new(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
            )
            .await
            .wrap_err(format!("opening database path: {}", path))?,
            None => Connection::open_in_memory()
                .await
                .wrap_err("opening in-memory database")?,
        };

        let ret = Self { conn };
        ret.run_migration().await.wrap_err("running migration")?;
        Ok(ret)
    }

    async fn run_migration(&self) -> Result<()> {
        self.conn
            .call(|conn| Ok(conn.execute_batch(MIGRATION)?))
            .await
            .wrap_err("executing migration")?;
        Ok(())
    }
}

#[async_trait]
impl Storage for Sqlite {
    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let conversation = self
            .get_conversations(FilterConversation::default().with_id(id))
            .await
            .wrap_err("getting conversation")?
            .into_iter()
            .next();
        Ok(conversation)
    }

    async fn get_conversations(&self, filter: FilterConversation) -> Result<Vec<Conversation>> {
        let conversations = self
            .conn
            .call(move |conn| {
                let (query, params) = filter_to_query(&filter);
                let mut stmt = conn.prepare(&query)?;
                let params: Vec<(&str, &dyn ToSql)> =
                    params.iter().map(|(n, v)| (*n, v.as_ref())).collect();
                let mut rows = stmt.query(params.as_slice())?;

                let mut conversations = vec![];
                while let Some(row) = rows.next()? {
                    let id: String = row.get(0)?;
                    let title: String = row.get(1)?;
                    let endpoint: Option<String> = row.get(2)?;
                    let options: String = row.get(3)?;
                    let created_at: i64 = row.get(4)?;
                    let updated_at: i64 = row.get(5)?;

                    let options: BTreeMap<String, serde_json::Value> =
                        serde_json::from_str(&options)
                            .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;
                    let created_at = chrono::DateTime::from_timestamp_millis(created_at).ok_or(
                        tokio_rusqlite::Error::Other(eyre::eyre!("invalid created_at").into()),
                    )?;
                    let updated_at = chrono::DateTime::from_timestamp_millis(updated_at).ok_or(
                        tokio_rusqlite::Error::Other(eyre::eyre!("invalid updated_at").into()),
                    )?;

                    let mut con = Conversation::default()
                        .with_id(id)
                        .with_title(title)
                        .with_options(options)
                        .with_created_at(created_at)
                        .with_updated_at(updated_at);
                    if let Some(endpoint) = endpoint {
                        con = con.with_endpoint(endpoint);
                    }
                    conversations.push(con);
                }
                Ok(conversations)
            })
            .await?;

        let mut ret = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let messages = self.get_messages(conversation.id()).await?;
            ret.push(conversation.with_messages(messages));
        }
        Ok(ret)
    }

    async fn upsert_conversation(&self, conversation: Conversation) -> Result<()> {
        let options =
            serde_json::to_string(conversation.options()).wrap_err("serializing options")?;
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    r#"INSERT INTO conversations (id, title, endpoint, options, created_at, updated_at)
                VALUES (:id, :title, :endpoint, :options, :created_at, :updated_at)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    endpoint = excluded.endpoint,
                    options = excluded.options,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at
                "#,
                    named_params! {
                        ":id": conversation.id(),
                        ":title": conversation.title(),
                        ":endpoint": conversation.endpoint(),
                        ":options": options,
                        ":created_at": conversation.created_at().timestamp_millis(),
                        ":updated_at": conversation.updated_at().timestamp_millis(),
                    },
                )?;
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn delete_conversation(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM sibling_indices WHERE conversation_id = ?",
                    params![id],
                )?;
                tx.execute("DELETE FROM messages WHERE conversation_id = ?", params![id])?;
                tx.execute("DELETE FROM conversations WHERE id = ?", params![id])?;
                Ok(tx.commit()?)
            })
            .await?;
        Ok(())
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conversation_id = conversation_id.to_string();
        let messages = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT data FROM messages WHERE conversation_id = ? ORDER BY seq ASC",
                )?;

                let mut rows = stmt.query(params![conversation_id])?;
                let mut messages = vec![];
                while let Some(row) = rows.next()? {
                    let data: String = row.get(0)?;
                    let message: Message = serde_json::from_str(&data)
                        .map_err(|e| tokio_rusqlite::Error::Other(e.into()))?;
                    messages.push(message);
                }
                Ok(messages)
            })
            .await?;
        Ok(messages)
    }

    async fn add_messages(&self, conversation_id: &str, messages: &[Message]) -> Result<()> {
        let conversation_id = conversation_id.to_string();
        let mut rows = Vec::with_capacity(messages.len());
        for message in messages {
            let data = serde_json::to_string(message).wrap_err(format!(
                "serializing message {}",
                message.message_id().unwrap_or_default()
            ))?;
            rows.push((
                message
                    .message_id()
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
                message.parent_message_id().map(str::to_string),
                message.text().to_string(),
                data,
            ));
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (id, parent_message_id, text, data) in rows {
                    tx.execute(
                        r#"INSERT INTO messages (id, conversation_id, parent_message_id, text, data)
            VALUES (:id, :conversation_id, :parent_message_id, :text, :data)
            ON CONFLICT(id, conversation_id) DO UPDATE SET
                parent_message_id = excluded.parent_message_id,
                text = excluded.text,
                data = excluded.data
            "#,
                        named_params! {
                            ":id": id,
                            ":conversation_id": conversation_id,
                            ":parent_message_id": parent_message_id,
                            ":text": text,
                            ":data": data,
                        },
                    )?;
                }
                Ok(tx.commit()?)
            })
            .await?;
        Ok(())
    }

    async fn delete_message(&self, conversation_id: &str, id: &str) -> Result<()> {
        let conversation_id = conversation_id.to_string();
        let id = id.to_string();
        let missing = id.clone();
        let affected_rows = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let affected = tx.execute(
                    "DELETE FROM messages WHERE conversation_id = ? AND id = ?",
                    params![conversation_id, id],
                )?;
                tx.execute(
                    "DELETE FROM sibling_indices WHERE conversation_id = ? AND message_id = ?",
                    params![conversation_id, id],
                )?;
                tx.commit()?;
                Ok(affected)
            })
            .await?;

        if affected_rows == 0 {
            bail!("no message with id {}", missing);
        }
        Ok(())
    }

    async fn get_sibling_index(&self, conversation_id: &str) -> Result<SiblingIndex> {
        let conversation_id = conversation_id.to_string();
        let index = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT message_id, sibling_index FROM sibling_indices WHERE conversation_id = ?",
                )?;
                let mut rows = stmt.query(params![conversation_id])?;

                let mut index = SiblingIndex::new();
                while let Some(row) = rows.next()? {
                    let message_id: String = row.get(0)?;
                    let sibling_index: i64 = row.get(1)?;
                    let key = Some(message_id.as_str()).filter(|id| *id != UNKEYED);
                    index.set(key, usize::try_from(sibling_index).unwrap_or_default());
                }
                Ok(index)
            })
            .await?;
        Ok(index)
    }

    async fn set_sibling_index(
        &self,
        conversation_id: &str,
        message_id: Option<String>,
        index: usize,
    ) -> Result<()> {
        if message_id.as_deref() == Some(UNKEYED) {
            bail!("message id must not be empty");
        }
        let conversation_id = conversation_id.to_string();
        let message_id = message_id.unwrap_or_else(|| UNKEYED.to_string());
        let index = i64::try_from(index).wrap_err("sibling index too large")?;
        self.conn
            .call(move |conn| {
                Ok(conn.execute(
                    r#"INSERT INTO sibling_indices (conversation_id, message_id, sibling_index)
            VALUES (:conversation_id, :message_id, :sibling_index)
            ON CONFLICT(conversation_id, message_id) DO UPDATE SET
                sibling_index = excluded.sibling_index
            "#,
                    named_params! {
                        ":conversation_id": conversation_id,
                        ":message_id": message_id,
                        ":sibling_index": index,
                    },
                )?)
            })
            .await
            .wrap_err("storing sibling index")?;
        Ok(())
    }

    async fn reset_sibling_index(&self, conversation_id: &str) -> Result<()> {
        let conversation_id = conversation_id.to_string();
        self.conn
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM sibling_indices WHERE conversation_id = ?",
                    params![conversation_id],
                )?)
            })
            .await?;
        Ok(())
    }
}

fn filter_to_query(filter: &FilterConversation) -> (String, Vec<(&str, Box<dyn ToSql>)>) {
    let mut query = String::from(
        "SELECT id, title, endpoint, options, created_at, updated_at FROM conversations WHERE 1=1",
    );
    let mut params: Vec<(&str, Box<dyn ToSql>)> = vec![];

    if let Some(id) = filter.id() {
        query.push_str(" AND id = :id");
        params.push((":id", Box::new(id.to_string())));
    }

    if let Some(title) = filter.title() {
        query.push_str(" AND title LIKE :title");
        params.push((":title", Box::new(format!("%{}%", title))));
    }

    if let Some(message_contains) = filter.message_contains() {
        query.push_str(" AND EXISTS (SELECT 1 FROM messages WHERE conversation_id = conversations.id AND text LIKE :message_contains)");
        params.push((
            ":message_contains",
            Box::new(format!("%{}%", message_contains)),
        ));
    }

    if let Some(from) = filter.updated_at_from() {
        query.push_str(" AND updated_at >= :updated_at_from");
        params.push((":updated_at_from", Box::new(from.timestamp_millis())));
    }

    if let Some(to) = filter.updated_at_to() {
        query.push_str(" AND updated_at <= :updated_at_to");
        params.push((":updated_at_to", Box::new(to.timestamp_millis())));
    }

    if let Some(from) = filter.created_at_from() {
        query.push_str(" AND created_at >= :created_at_from");
        params.push((":created_at_from", Box::new(from.timestamp_millis())));
    }

    if let Some(to) = filter.created_at_to() {
        query.push_str(" AND created_at <= :created_at_to");
        params.push((":created_at_to", Box::new(to.timestamp_millis())));
    }

    query.push_str(" ORDER BY updated_at DESC");
    (query, params)
}
