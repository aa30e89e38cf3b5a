use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::store::{Row, StoreError, TabularStore};

/// [`TabularStore`] backed by a Sheets-style values REST API: one GET per
/// table scan, `:append` for new rows, and a ranged PUT for in-place
/// overwrites. Writes are acknowledged by the service before they are
/// necessarily visible to the next scan.
pub struct SheetsStore {
    client: reqwest::Client,
    endpoint: String,
    sheet_id: String,
    api_token: Option<String>,
}

/// Wire envelope for the values API. `values` is absent for an empty range.
#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

impl SheetsStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.sheet_endpoint.trim_end_matches('/').to_owned(),
            sheet_id: config.sheet_id.clone(),
            api_token: config.sheet_api_token.clone(),
        }
    }

    #[cfg(test)]
    fn for_endpoint(endpoint: &str, sheet_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            sheet_id: sheet_id.to_owned(),
            api_token: None,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{range}", self.endpoint, self.sheet_id)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(StoreError::Unavailable(format!(
                "sheet API returned {status}"
            )))
        }
    }
}

fn transport_err(err: &reqwest::Error) -> StoreError {
    StoreError::Unavailable(format!("sheet API request failed: {err}"))
}

#[async_trait]
impl TabularStore for SheetsStore {
    #[tracing::instrument(skip(self), err)]
    async fn rows(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let resp = self
            .authorize(self.client.get(self.values_url(table)))
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        let body: ValueRange = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| transport_err(&e))?;
        Ok(body.values)
    }

    #[tracing::instrument(skip(self, row), err)]
    async fn append_row(&self, table: &str, row: Row) -> Result<(), StoreError> {
        let url = format!("{}:append", self.values_url(table));
        let resp = self
            .authorize(self.client.post(url))
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange { values: vec![row] })
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        Self::check(resp).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, row), err)]
    async fn update_row(&self, table: &str, position: u32, row: Row) -> Result<(), StoreError> {
        // A1-notation range pinned to the row being overwritten
        let url = self.values_url(&format!("{table}!A{position}"));
        let resp = self
            .authorize(self.client.put(url))
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange { values: vec![row] })
            .send()
            .await
            .map_err(|e| transport_err(&e))?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn rows_parses_value_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet1/values/deals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "range": "deals!A1:Z100",
                "values": [["id", "status"], ["d1", "submitted"]],
            })))
            .mount(&server)
            .await;

        let store = SheetsStore::for_endpoint(&server.uri(), "sheet1");
        let rows = store.rows("deals").await.unwrap();
        assert_eq!(rows, vec![vec!["id", "status"], vec!["d1", "submitted"]]);
    }

    #[tokio::test]
    async fn rows_empty_table_yields_no_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet1/values/deals"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "range": "deals!A1" })),
            )
            .mount(&server)
            .await;

        let store = SheetsStore::for_endpoint(&server.uri(), "sheet1");
        assert!(store.rows("deals").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet1/values/deals"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = SheetsStore::for_endpoint(&server.uri(), "sheet1");
        let err = store.rows("deals").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn append_posts_row_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sheet1/values/deals:append"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_partial_json(
                serde_json::json!({ "values": [["d2", "submitted"]] }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = SheetsStore::for_endpoint(&server.uri(), "sheet1");
        store
            .append_row("deals", vec!["d2".into(), "submitted".into()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_targets_positioned_range() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/sheet1/values/deals!A4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = SheetsStore::for_endpoint(&server.uri(), "sheet1");
        store
            .update_row("deals", 4, vec!["d2".into(), "approved".into()])
            .await
            .unwrap();
    }
}
