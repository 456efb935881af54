use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::matching::{StartMatchingRequest, StartMatchingResponse};
use log::*;
use service::config::Config;

/// HTTP client for the matching backend's session-start endpoint.
pub struct MatchingClient {
    client: reqwest::Client,
    base_url: String,
}

impl MatchingClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().to_string(),
        })
    }

    /// Ask the backend to start calling hospitals for a patient.
    ///
    /// On success the response carries the `channel` whose status stream reports
    /// the outcome of each call.
    pub async fn start_matching(
        &self,
        request: &StartMatchingRequest,
    ) -> Result<StartMatchingResponse, Error> {
        request.validate()?;

        let url = format!("{}/matching/start", self.base_url);

        info!("Starting matching session ({})", request.grade);
        debug!("Matching request: {request:?}");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to send matching request: {e:?}");
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Matching request failed: {status} - {error_text}");
            return Err(Error {
                source: (!error_text.is_empty()).then(|| error_text.into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Status(status.as_u16())),
            });
        }

        let body: StartMatchingResponse = response.json().await?;

        if !body.success {
            warn!("Matching backend declined the request: {}", body.message);
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(body.message)),
            });
        }

        info!(
            "Matching session started for patient {} on channel {} ({} candidate hospitals)",
            body.patient_id,
            body.channel,
            body.hospitals.len()
        );

        Ok(body)
    }
}
