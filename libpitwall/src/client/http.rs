//! HTTP fetch client backed by `ureq`
//!
//! `ureq` is blocking, so each request runs on tokio's blocking pool and never
//! on the caller's task.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::FetchClient;
use crate::config::ApiConfig;
use crate::error::{FetchError, NetworkError};
use crate::types::{DriversPayload, SchedulePayload};

pub struct HttpFetchClient {
    agent: ureq::Agent,
    drivers_url: String,
    schedule_url: String,
}

impl HttpFetchClient {
    pub fn new(config: &ApiConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_connect(Some(config.connect_timeout()))
            .timeout_global(Some(config.request_timeout()))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            drivers_url: config.drivers_url(),
            schedule_url: config.schedule_url(),
        }
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = url.to_owned();

        tokio::task::spawn_blocking(move || -> Result<T, FetchError> {
            debug!(url = %url, "GET");
            let body = do_get(&agent, &url)?;
            Ok(serde_json::from_str(&body)?)
        })
        .await
        .map_err(|e| FetchError::Other(format!("fetch task failed: {e}")))?
    }
}

fn do_get(agent: &ureq::Agent, url: &str) -> Result<String, FetchError> {
    let mut resp = agent
        .get(url)
        .header("Accept", "application/json")
        .call()
        .map_err(map_transport_error)?;

    let code = resp.status().as_u16();
    if !(200..300).contains(&code) {
        return Err(NetworkError::server_error(Some(code)).into());
    }

    resp.body_mut()
        .read_to_string()
        .map_err(map_transport_error)
}

/// Translate a `ureq` failure into the raw error vocabulary the classifier
/// understands
fn map_transport_error(error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::StatusCode(code) => NetworkError::ServerError {
            status: Some(code),
            cause: Some(format!("HTTP {code}")),
        }
        .into(),
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::ConnectionRefused => {
            std::io::Error::new(io.kind(), format!("Network is unreachable: {io}")).into()
        }
        ureq::Error::Io(io) => io.into(),
        ureq::Error::HostNotFound => std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Unable to resolve host",
        )
        .into(),
        ureq::Error::ConnectionFailed => std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Network is unreachable",
        )
        .into(),
        e @ ureq::Error::Timeout(_) => FetchError::Timeout(e.to_string()),
        other => FetchError::Other(other.to_string()),
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn fetch_drivers(&self) -> Result<DriversPayload, FetchError> {
        self.get_json(&self.drivers_url).await
    }

    async fn fetch_schedule(&self) -> Result<SchedulePayload, FetchError> {
        self.get_json(&self.schedule_url).await
    }
}
