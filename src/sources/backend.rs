//! HTTP client for the backend REST API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{BackendConfig, BackendEndpoints};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, DateRange, Employee, ExpenseClaim, TravelAllowanceEntry, TravelDetail,
};

use super::retry::RetryPolicy;
use super::{AttendanceSource, EmployeeSource, ExpenseSource, TravelAllowanceSink, TravelSource};

/// List endpoints answer either with a bare array or with `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Wrapped { data } => data,
        }
    }
}

/// Reads records from and writes travel allowances to the backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
    endpoints: BackendEndpoints,
    retry: RetryPolicy,
    api_token: Option<String>,
}

impl BackendClient {
    /// Builds a client from the backend settings.
    ///
    /// When `api_token_env` names a variable that is not set, requests are
    /// sent without a bearer token.
    pub fn new(config: &BackendConfig) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| EngineError::Network {
                endpoint: config.base_url.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let api_token = config.api_token_env.as_deref().and_then(|name| {
            let token = std::env::var(name).ok();
            if token.is_none() {
                warn!(variable = name, "Backend API token variable is not set");
            }
            token
        });

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
            retry: config.http.retry_policy(),
            api_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> EngineResult<Vec<T>> {
        let url = self.url(path);
        let url = url.as_str();

        let items = self
            .retry
            .run(path, move || async move {
                let response = self
                    .authorized(self.client.get(url).query(query))
                    .send()
                    .await
                    .map_err(|e| transport_error(path, e))?;
                let response = ensure_success(path, response).await?;
                let body: ListBody<T> =
                    response.json().await.map_err(|e| EngineError::Network {
                        endpoint: path.to_string(),
                        message: format!("invalid response body: {}", e),
                    })?;
                Ok(body.into_items())
            })
            .await?;

        debug!(endpoint = path, count = items.len(), "Fetched records");
        Ok(items)
    }
}

fn range_query(range: DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("startDate", range.start_date.to_string()),
        ("endDate", range.end_date.to_string()),
    ]
}

fn transport_error(endpoint: &str, error: reqwest::Error) -> EngineError {
    EngineError::Network {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Client errors are final; server errors may clear up on a retry.
async fn ensure_success(endpoint: &str, response: Response) -> EngineResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status.is_client_error() {
        return Err(EngineError::UpstreamRejected {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: body,
        });
    }
    Err(EngineError::Network {
        endpoint: endpoint.to_string(),
        message: format!("HTTP {}: {}", status, body),
    })
}

#[async_trait]
impl EmployeeSource for BackendClient {
    async fn employees(&self) -> EngineResult<Vec<Employee>> {
        self.get_list(&self.endpoints.employees, &[]).await
    }
}

#[async_trait]
impl AttendanceSource for BackendClient {
    async fn attendance(&self, range: DateRange) -> EngineResult<Vec<AttendanceRecord>> {
        self.get_list(&self.endpoints.attendance, &range_query(range))
            .await
    }
}

#[async_trait]
impl TravelSource for BackendClient {
    async fn travel_details(
        &self,
        employee_id: Option<&str>,
        range: DateRange,
    ) -> EngineResult<Vec<TravelDetail>> {
        let mut query = range_query(range);
        if let Some(id) = employee_id {
            query.push(("employeeId", id.to_string()));
        }
        self.get_list(&self.endpoints.travel_details, &query).await
    }
}

#[async_trait]
impl ExpenseSource for BackendClient {
    async fn expenses(&self, range: DateRange) -> EngineResult<Vec<ExpenseClaim>> {
        self.get_list(&self.endpoints.expenses, &range_query(range))
            .await
    }
}

#[async_trait]
impl TravelAllowanceSink for BackendClient {
    /// Creates one travel-allowance entry.
    ///
    /// The create is not idempotent, so only a failure to connect is retried.
    /// Once the request may have reached the backend, a timeout or error
    /// status is returned as is.
    async fn create_travel_allowance(&self, entry: &TravelAllowanceEntry) -> EngineResult<()> {
        let path = self.endpoints.travel_allowance.as_str();
        let url = self.url(path);
        let url = url.as_str();

        // The outer result drives retries; the inner one is final.
        let delivered: EngineResult<()> = self
            .retry
            .run(path, move || async move {
                match self
                    .authorized(self.client.post(url).json(entry))
                    .send()
                    .await
                {
                    Ok(response) => Ok(ensure_success(path, response).await.map(drop)),
                    Err(e) if e.is_connect() => Err(transport_error(path, e)),
                    Err(e) => Ok(Err(transport_error(path, e))),
                }
            })
            .await?;
        delivered?;

        debug!(
            employee_id = %entry.employee_id,
            date = %entry.date,
            "Created travel allowance entry"
        );
        Ok(())
    }
}
