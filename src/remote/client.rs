use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;

use crate::capture::ImagePayload;
use crate::config::RemoteConfig;
use crate::remote::{
    RemoteError,
    types::{ArtResponse, HandwritingSample, SynthesisParams, TextResponse, TextToArtRequest},
};

/// Typed contract with the compute backend.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Render `text` as handwriting. Returns the raw SVG.
    async fn text_to_art(
        &self,
        text: &str,
        params: SynthesisParams,
    ) -> Result<String, RemoteError>;

    /// Turn a photograph straight into line art. Returns the raw SVG.
    async fn image_to_art(&self, image: &ImagePayload) -> Result<String, RemoteError>;

    /// Recognize the text in a photograph.
    async fn image_to_text(&self, image: &ImagePayload) -> Result<String, RemoteError>;

    async fn upload_sample(&self, sample: &HandwritingSample) -> Result<(), RemoteError>;
}

/// [`RemoteClient`] over HTTP.
pub struct HttpRemoteClient {
    client: Client,
    base_url: url::Url,
    config: RemoteConfig,
}

impl HttpRemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            RemoteError::RequestFailed(format!("invalid base url '{}': {}", config.base_url, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("plotbooth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    /// Rendering parameters from config, used for every text to art call.
    pub fn synthesis_params(&self) -> SynthesisParams {
        SynthesisParams::from_config(&self.config)
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::RequestFailed(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn image_part(image: &ImagePayload) -> Result<Part, RemoteError> {
        Part::bytes(image.bytes.clone())
            .file_name(image.file_name)
            .mime_str(image.mime)
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::RequestFailed(format!(
                "{} {}",
                status,
                body.trim()
            )));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn text_to_art(
        &self,
        text: &str,
        params: SynthesisParams,
    ) -> Result<String, RemoteError> {
        let url = self.endpoint(&self.config.synthesize_path)?;
        log::info!("Requesting art for {} characters of text", text.chars().count());

        let body = TextToArtRequest {
            text: text.to_string(),
            bias: params.bias,
            style: params.style,
            line_width: params.line_width,
        };
        let response: ArtResponse = self.send_json(self.client.post(url).json(&body)).await?;
        Ok(response.svg)
    }

    async fn image_to_art(&self, image: &ImagePayload) -> Result<String, RemoteError> {
        let url = self.endpoint(&self.config.image_to_art_path)?;
        log::info!("Uploading {} byte snapshot for art", image.bytes.len());

        let mut form = Form::new()
            .part("image", Self::image_part(image)?)
            .text("line_width", self.config.image_line_width.to_string());
        if let Some(username) = self.config.username.clone() {
            form = form.text("username", username);
        }

        let response: ArtResponse = self.send_json(self.client.post(url).multipart(form)).await?;
        Ok(response.svg)
    }

    async fn image_to_text(&self, image: &ImagePayload) -> Result<String, RemoteError> {
        let url = self.endpoint(&self.config.image_to_text_path)?;
        log::info!("Uploading {} byte snapshot for recognition", image.bytes.len());

        let form = Form::new()
            .part("image", Self::image_part(image)?)
            .text("line_width", self.config.image_line_width.to_string());

        let response: TextResponse = self.send_json(self.client.post(url).multipart(form)).await?;
        Ok(response.result)
    }

    async fn upload_sample(&self, sample: &HandwritingSample) -> Result<(), RemoteError> {
        let url = self.endpoint(&self.config.sample_path)?;
        log::info!(
            "Uploading handwriting sample '{}' ({} strokes, {} points)",
            sample.transcription,
            sample.strokes.len(),
            sample.point_count()
        );
        self.send(self.client.post(url).json(sample)).await?;
        Ok(())
    }
}
