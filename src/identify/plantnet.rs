// Pl@ntNet identification client
// POSTs the photo as multipart form data to /v2/identify/all.

use std::path::Path;
use std::time::Duration;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::StatusCode;

use super::{parse_identification, Identification, PlantIdentifier};
use crate::constants::{
    PLANTNET_API_URL, PLANTNET_DEFAULT_LANG, PLANTNET_DEFAULT_ORGAN, PLANTNET_IMAGE_MIME,
    PLANTNET_TIMEOUT_SECS,
};
use crate::error::{LeafeonError, Result};

#[derive(Debug, Clone)]
pub struct PlantNetClient {
    api_key: String,
    lang: String,
    organ: String,
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl PlantNetClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(PLANTNET_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeafeonError::Identification(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            lang: PLANTNET_DEFAULT_LANG.to_string(),
            organ: PLANTNET_DEFAULT_ORGAN.to_string(),
            endpoint: PLANTNET_API_URL.to_string(),
            client,
        })
    }

    /// Language for common names, e.g. "en", "pt", "fr".
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Photographed organ: "flower", "leaf", "fruit", "bark" or "auto".
    pub fn with_organ(mut self, organ: impl Into<String>) -> Self {
        self.organ = organ.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_url(&self) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[("api-key", self.api_key.as_str()), ("lang", self.lang.as_str())],
        )
        .map_err(|e| LeafeonError::Config(format!("Invalid Pl@ntNet endpoint {}: {}", self.endpoint, e)))
    }
}

impl PlantIdentifier for PlantNetClient {
    fn identify(&self, image: &Path) -> Result<Option<Identification>> {
        let bytes = std::fs::read(image)?;
        let file_name = image
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "plant.jpg".to_string());

        let image_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(PLANTNET_IMAGE_MIME)
            .map_err(|e| LeafeonError::Identification(e.to_string()))?;

        let form = Form::new()
            .part("images", image_part)
            .text("organs", self.organ.clone());

        log::info!("Identifying {} via Pl@ntNet (organ: {})", image.display(), self.organ);

        let resp = self
            .client
            .post(self.request_url()?)
            .multipart(form)
            .send()
            .map_err(|e| {
                log::error!("Failed to reach Pl@ntNet: {}", e);
                LeafeonError::Identification(format!("Cannot reach Pl@ntNet: {}", e))
            })?;

        let status = resp.status();
        // Pl@ntNet answers 404 "Species not found" when nothing matches
        if status == StatusCode::NOT_FOUND {
            log::info!("Pl@ntNet found no matching species");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            log::error!("Pl@ntNet returned {}: {}", status, body);
            return Err(LeafeonError::Identification(format!(
                "Pl@ntNet error: {} {}",
                status, body
            )));
        }

        match resp.json::<serde_json::Value>() {
            Ok(json) => Ok(parse_identification(&json)),
            Err(e) => {
                log::warn!("Unreadable Pl@ntNet response: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_params() {
        let client = PlantNetClient::new("key with/space").unwrap().with_lang("pt");
        let url = client.request_url().unwrap();

        assert_eq!(url.host_str(), Some("my-api.plantnet.org"));
        assert_eq!(url.path(), "/v2/identify/all");
        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("api-key".to_string(), "key with/space".to_string()),
                ("lang".to_string(), "pt".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let client = PlantNetClient::new("k").unwrap().with_endpoint("not a url");
        assert!(matches!(client.request_url(), Err(LeafeonError::Config(_))));
    }

    #[test]
    fn test_missing_image_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = PlantNetClient::new("k").unwrap();
        let err = client.identify(&dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, LeafeonError::Io(_)));
    }
}
