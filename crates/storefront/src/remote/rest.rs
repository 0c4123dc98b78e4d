//! HTTP implementation of the remote table API.
//!
//! Uses `reqwest` with a hard per-request timeout so that one hanging request
//! cannot exceed the gateway's nominal retry budget.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::config::RemoteConfig;

use super::{Filter, OrderBy, RemoteError, RemoteQuery, RemoteStore};

/// API key header name.
const API_KEY_HEADER: &str = "X-Zada-Api-Key";

/// Response envelope returned by every remote endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the remote table API.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: String,
}

impl RestStore {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.expose_secret().to_string(),
        })
    }

    fn table_url(&self, table: &str, action: Option<&str>) -> Result<url::Url, RemoteError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RemoteError::Api("remote endpoint cannot be a base URL".into()))?;
            segments.pop_if_empty().push("tables").push(table);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    /// Send a request and unwrap the `{data, error}` envelope.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>, RemoteError> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;

        let status = response.status();
        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "remote table API returned non-success status"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body)?;
        if let Some(error) = envelope.error {
            return Err(RemoteError::Api(error));
        }

        Ok(envelope.data)
    }
}

impl RemoteStore for RestStore {
    #[instrument(skip(self), fields(table = %query.table))]
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<Value>, RemoteError> {
        let mut url = self.table_url(&query.table, None)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (column, value) in query.filter.predicates() {
                // Bare JSON scalars render without quotes in the query string
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                pairs.append_pair(column, &rendered);
            }
            if let Some(OrderBy { column, ascending }) = &query.order {
                let direction = if *ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{column}.{direction}"));
            }
        }

        let data = self.execute(self.client.get(url)).await?;
        match data {
            Some(Value::Array(rows)) => Ok(rows),
            Some(other) => Err(RemoteError::Api(format!(
                "expected an array of rows, got {other}"
            ))),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, rows), fields(table = %table, count = rows.len()))]
    async fn upsert(&self, table: &str, rows: &[Value]) -> Result<(), RemoteError> {
        let url = self.table_url(table, Some("upsert"))?;
        self.execute(self.client.post(url).json(&rows)).await?;
        Ok(())
    }

    #[instrument(skip(self, filter), fields(table = %table))]
    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RemoteError> {
        let url = self.table_url(table, Some("delete"))?;
        self.execute(self.client.post(url).json(filter)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;

    fn store() -> RestStore {
        RestStore::new(&RemoteConfig {
            endpoint: url::Url::parse("https://tables.zada.dev/v1").unwrap(),
            api_key: SecretString::from("k"),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_nesting() {
        let store = store();
        assert_eq!(
            store.table_url("orders", None).unwrap().as_str(),
            "https://tables.zada.dev/v1/tables/orders"
        );
        assert_eq!(
            store.table_url("orders", Some("upsert")).unwrap().as_str(),
            "https://tables.zada.dev/v1/tables/orders/upsert"
        );
    }

    #[test]
    fn test_envelope_parses_error() {
        let envelope: Envelope = serde_json::from_str("{\"error\":\"nope\"}").unwrap();
        assert_eq!(envelope.error.as_deref(), Some("nope"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_parses_data() {
        let envelope: Envelope = serde_json::from_str("{\"data\":[{\"id\":1}]}").unwrap();
        assert!(envelope.error.is_none());
        assert!(envelope.data.unwrap().is_array());
    }
}
