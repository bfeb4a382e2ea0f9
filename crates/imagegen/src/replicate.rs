use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::config::ReplicateConfig;
use crate::error::GenerationError;
use crate::generator::{GeneratedImage, GenerationRequest, ImageGenerator};

/// A prediction as returned by the Replicate API.
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Where the generated image lives in a prediction's output.
#[derive(Debug, PartialEq, Eq)]
enum ImageSource {
    /// Bytes carried inline as a `data:` URI.
    Inline(Bytes),
    /// Bytes to be downloaded from a URL.
    Remote(String),
}

/// Image generator backed by the Replicate predictions API.
#[derive(Debug)]
pub struct ReplicateImageGenerator {
    client: reqwest::Client,
    config: ReplicateConfig,
}

impl ReplicateImageGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: ReplicateConfig) -> Result<Self, GenerationError> {
        if config.api_token.trim().is_empty() {
            return Err(GenerationError::Configuration(
                "Replicate API token is empty".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the prediction request body.
    fn build_request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "input": {
                "prompt": request.instruction(),
                "num_outputs": 1,
                "aspect_ratio": self.config.aspect_ratio,
                "output_format": self.config.output_format.as_str(),
                "output_quality": self.config.output_quality,
                "num_inference_steps": self.config.num_inference_steps,
            }
        })
    }

    /// Pick the first image out of a finished prediction.
    fn extract_source(prediction: &Prediction) -> Result<ImageSource, GenerationError> {
        match prediction.status.as_str() {
            "failed" | "canceled" => {
                let reason = prediction
                    .error
                    .as_ref()
                    .map_or_else(|| prediction.status.clone(), Value::to_string);
                return Err(GenerationError::Api(format!(
                    "prediction {} {}: {reason}",
                    prediction.id, prediction.status
                )));
            }
            "starting" | "processing" if prediction.output.is_none() => {
                return Err(GenerationError::Incomplete(prediction.id.clone()));
            }
            _ => {}
        }

        let first = match &prediction.output {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(items)) => items.first().and_then(Value::as_str),
            _ => None,
        };

        let Some(first) = first.map(str::trim).filter(|s| !s.is_empty()) else {
            return Err(GenerationError::Empty);
        };

        if first.starts_with("data:") {
            decode_data_uri(first).map(ImageSource::Inline)
        } else {
            Ok(ImageSource::Remote(first.to_owned()))
        }
    }

    fn map_send_error(&self, e: &reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.config.timeout_seconds)
        } else {
            GenerationError::Http(e.to_string())
        }
    }

    async fn download(&self, url: &str) -> Result<Bytes, GenerationError> {
        debug!(url = %url, "downloading generated image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        if !response.status().is_success() {
            return Err(GenerationError::Api(format!(
                "image download returned HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))
    }
}

/// Decode a base64 `data:` URI into raw bytes.
fn decode_data_uri(uri: &str) -> Result<Bytes, GenerationError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| GenerationError::Parse("not a data URI".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| GenerationError::Parse("data URI has no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(GenerationError::Parse(format!(
            "unsupported data URI encoding: {header}"
        )));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| GenerationError::Parse(format!("invalid base64 in data URI: {e}")))?;
    if bytes.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(Bytes::from(bytes))
}

#[async_trait]
impl ImageGenerator for ReplicateImageGenerator {
    #[instrument(skip(self, request), fields(model = %self.config.model))]
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedImage, GenerationError> {
        let body = self.build_request_body(request);

        debug!(endpoint = %self.config.predictions_url(), "sending image generation request");

        let response = self
            .client
            .post(self.config.predictions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .header("Content-Type", "application/json")
            .header("Prefer", self.config.prefer_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "image provider returned error");
            return Err(GenerationError::Api(format!("HTTP {status}: {body}")));
        }

        let prediction: Prediction = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(format!("failed to parse prediction: {e}")))?;

        debug!(prediction_id = %prediction.id, status = %prediction.status, "prediction returned");

        let data = match Self::extract_source(&prediction)? {
            ImageSource::Inline(data) => data,
            ImageSource::Remote(url) => self.download(&url).await?,
        };

        if data.is_empty() {
            return Err(GenerationError::Empty);
        }

        Ok(GeneratedImage {
            data,
            format: self.config.output_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portrait_core::ImageFormat;

    fn prediction(value: Value) -> Prediction {
        serde_json::from_value(value).unwrap()
    }

    fn generator() -> ReplicateImageGenerator {
        ReplicateImageGenerator::new(ReplicateConfig::new("r8_test")).unwrap()
    }

    #[test]
    fn empty_token_rejected() {
        assert!(matches!(
            ReplicateImageGenerator::new(ReplicateConfig::new("  ")),
            Err(GenerationError::Configuration(_))
        ));
    }

    #[test]
    fn request_body_has_fixed_parameters() {
        let body = generator().build_request_body(&GenerationRequest::new("a fox"));
        let input = &body["input"];
        assert_eq!(input["num_outputs"], 1);
        assert_eq!(input["aspect_ratio"], "1:1");
        assert_eq!(input["output_format"], "webp");
        assert_eq!(input["output_quality"], 80);
        assert_eq!(input["num_inference_steps"], 4);
        assert!(input["prompt"].as_str().unwrap().ends_with(": a fox"));
    }

    #[test]
    fn request_body_follows_configured_format() {
        let generator = ReplicateImageGenerator::new(
            ReplicateConfig::new("t").with_output_format(ImageFormat::Png),
        )
        .unwrap();
        let body = generator.build_request_body(&GenerationRequest::new("x"));
        assert_eq!(body["input"]["output_format"], "png");
    }

    #[test]
    fn extract_url_from_array() {
        let p = prediction(json!({
            "id": "abc",
            "status": "succeeded",
            "output": ["https://replicate.delivery/out-0.webp"]
        }));
        assert_eq!(
            ReplicateImageGenerator::extract_source(&p).unwrap(),
            ImageSource::Remote("https://replicate.delivery/out-0.webp".into())
        );
    }

    #[test]
    fn extract_url_from_string() {
        let p = prediction(json!({
            "id": "abc",
            "status": "succeeded",
            "output": "https://replicate.delivery/out.webp"
        }));
        assert!(matches!(
            ReplicateImageGenerator::extract_source(&p).unwrap(),
            ImageSource::Remote(_)
        ));
    }

    #[test]
    fn extract_inline_data_uri() {
        let p = prediction(json!({
            "id": "abc",
            "status": "succeeded",
            "output": ["data:image/webp;base64,UklGRg=="]
        }));
        assert_eq!(
            ReplicateImageGenerator::extract_source(&p).unwrap(),
            ImageSource::Inline(Bytes::from_static(b"RIFF"))
        );
    }

    #[test]
    fn empty_output_is_generation_empty() {
        let p = prediction(json!({"id": "abc", "status": "succeeded", "output": []}));
        assert!(matches!(
            ReplicateImageGenerator::extract_source(&p),
            Err(GenerationError::Empty)
        ));

        let p = prediction(json!({"id": "abc", "status": "succeeded", "output": null}));
        assert!(matches!(
            ReplicateImageGenerator::extract_source(&p),
            Err(GenerationError::Empty)
        ));
    }

    #[test]
    fn failed_prediction_is_api_error() {
        let p = prediction(json!({
            "id": "abc",
            "status": "failed",
            "error": "NSFW content detected"
        }));
        let err = ReplicateImageGenerator::extract_source(&p).unwrap_err();
        assert!(matches!(err, GenerationError::Api(_)));
        assert!(err.to_string().contains("NSFW"));
    }

    #[test]
    fn unfinished_prediction_is_incomplete() {
        let p = prediction(json!({"id": "abc", "status": "processing"}));
        assert!(matches!(
            ReplicateImageGenerator::extract_source(&p),
            Err(GenerationError::Incomplete(id)) if id == "abc"
        ));
    }

    #[test]
    fn data_uri_requires_base64() {
        assert!(matches!(
            decode_data_uri("data:text/plain,hello"),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(
            decode_data_uri("data:image/webp;base64,"),
            Err(GenerationError::Empty)
        ));
    }
}
