//! Supabase store: inserts and reads through the PostgREST API (`/rest/v1/<table>`).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Appointment, NewTicket, RecordStore, StoreError};

/// Client for a Supabase project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseStore {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SettingsRow {
    #[serde(default)]
    instructions: Option<String>,
}

impl SupabaseStore {
    /// `timeout` bounds every request, connect through body.
    pub fn new(url: &str, key: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            key: key.into(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// POST one row to a table; the row id and created_at come from column defaults.
    async fn insert<T: serde::Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<(), StoreError> {
        let res = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("insert into {}: {} {}", table, status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn insert_ticket(&self, ticket: NewTicket) -> Result<(), StoreError> {
        self.insert("tickets", &ticket).await
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<(), StoreError> {
        self.insert("appointments", &appointment).await
    }

    async fn load_instructions(&self) -> Result<Option<String>, StoreError> {
        let url = format!("{}?select=instructions&limit=1", self.table_url("settings"));
        let res = self
            .client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Api(format!("select settings: {} {}", status, body)));
        }
        let rows: Vec<SettingsRow> = res.json().await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.instructions)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_trims_trailing_slash() {
        let store =
            SupabaseStore::new("https://xyz.supabase.co/", "k", Duration::from_secs(2)).unwrap();
        assert_eq!(
            store.table_url("tickets"),
            "https://xyz.supabase.co/rest/v1/tickets"
        );
    }

    #[test]
    fn ticket_row_uses_snake_case_columns() {
        let row = serde_json::to_value(NewTicket {
            customer_name: "X".to_string(),
            last_message: String::new(),
            ai_reply: Some("menu".to_string()),
            status: crate::store::TicketStatus::Automated,
            tag: "menu".to_string(),
        })
        .unwrap();
        assert_eq!(row["customer_name"], "X");
        assert_eq!(row["last_message"], "");
        assert_eq!(row["status"], "automated");
    }
}
