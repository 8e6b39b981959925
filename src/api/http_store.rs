//! Implements the `Store` trait with `reqwest` against a REST collection endpoint.

use crate::api::Store;
use crate::error::Res;
use crate::model::{Debt, DebtId, NewDebt};
use crate::Config;
use anyhow::{anyhow, bail, Context};
use reqwest::{Method, Response};
use tracing::trace;
use url::Url;

/// Talks to a collection endpoint such as `https://example.com/api/debts`:
/// - `GET {base}` lists, `POST {base}` creates
/// - `GET {base}/{id}` fetches one, `PATCH {base}/{id}` updates
pub struct HttpStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpStore {
    pub fn new(config: &Config) -> Res<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Unable to build the HTTP client")?;
        Ok(Self {
            client,
            base: config.api_url().clone(),
        })
    }

    /// The URL of a single debt, `{base}/{id}`.
    fn item_url(&self, id: &DebtId) -> Res<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("The store URL '{}' cannot have an id appended", self.base))?;
            segments.pop_if_empty().push(id.as_str());
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Res<Response> {
        trace!("{method} {url}");
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Unable to send {method} request to {url}"))?;
        check_status(response, &method, &url).await
    }
}

#[async_trait::async_trait]
impl Store for HttpStore {
    async fn list(&mut self) -> Res<Vec<Debt>> {
        let response = self.send(Method::GET, self.base.clone(), None).await?;
        response
            .json()
            .await
            .context("Unable to parse the list of debts returned by the store")
    }

    async fn get(&mut self, id: &DebtId) -> Res<Debt> {
        let url = self.item_url(id)?;
        let response = self.send(Method::GET, url, None).await?;
        response
            .json()
            .await
            .with_context(|| format!("Unable to parse debt '{id}' returned by the store"))
    }

    async fn create(&mut self, debt: &NewDebt) -> Res<Debt> {
        let body = serde_json::to_value(debt).context("Unable to serialize the new debt")?;
        let response = self.send(Method::POST, self.base.clone(), Some(body)).await?;
        response
            .json()
            .await
            .context("Unable to parse the debt returned by the store after creating it")
    }

    async fn update(&mut self, debt: &Debt) -> Res<()> {
        let url = self.item_url(debt.id())?;
        let body = serde_json::to_value(debt).context("Unable to serialize the debt")?;
        self.send(Method::PATCH, url, Some(body)).await?;
        Ok(())
    }
}

/// Turns any non-2xx response into an error that carries the status and body.
async fn check_status(response: Response, method: &Method, url: &Url) -> Res<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{method} {url} failed with status {status}: {body}")
}
