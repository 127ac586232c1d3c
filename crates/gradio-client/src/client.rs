use crate::types::{AppConfig, EventIdResponse, FileData, PredictRequest, parse_sse};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// A client for a single Gradio app.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
    download_dir: PathBuf,
}

/// The outputs of one completed prediction.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub event_id: String,
    pub data: Vec<Value>,
}

/// Connects to a Gradio app and discovers where its API lives.
pub async fn connect(url: &str) -> Result<Client> {
    let http = reqwest::Client::new();
    let base_url = url.trim().trim_end_matches('/').to_string();

    let config = http
        .get(format!("{base_url}/config"))
        .send()
        .await
        .with_context(|| format!("Failed to reach Gradio app at {base_url}"))?
        .error_for_status()
        .with_context(|| format!("Could not fetch config for {base_url}"))?
        .json::<AppConfig>()
        .await
        .context("Failed to parse Gradio app config")?;

    let api_prefix = config
        .api_prefix
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string();

    tracing::info!(%base_url, %api_prefix, "Connected to Gradio app.");
    Ok(Client {
        http,
        base_url,
        api_prefix,
        download_dir: std::env::temp_dir().join("gradio"),
    })
}

impl Client {
    /// Where downloaded output files are written. Defaults to `<tmp>/gradio`.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_prefix, path)
    }

    /// The URL the app serves a file from when the output carries no `url`.
    pub fn file_url(&self, file: &FileData) -> String {
        match &file.url {
            Some(url) => url.clone(),
            None => self.api_url(&format!("file={}", file.path)),
        }
    }

    /// Uploads a local file so it can be passed to an endpoint.
    pub async fn upload(&self, path: &Path) -> Result<FileData> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new().part("files", Part::bytes(bytes).file_name(name.clone()));
        let paths = self
            .http
            .post(self.api_url("upload"))
            .multipart(form)
            .send()
            .await
            .context("Failed to upload file")?
            .error_for_status()
            .context("Gradio app rejected upload")?
            .json::<Vec<String>>()
            .await
            .context("Failed to parse upload response")?;

        let server_path = paths
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Upload response contained no path"))?;
        tracing::debug!(local = %path.display(), server = %server_path, "Uploaded file.");
        Ok(FileData::from_server_path(server_path, Some(name)))
    }

    /// Calls a named endpoint (e.g. `/predict`) with positional inputs and
    /// waits for its outputs.
    pub async fn predict(&self, api_name: &str, data: Vec<Value>) -> Result<Prediction> {
        let endpoint = format!("call/{}", api_name.trim_start_matches('/'));

        let EventIdResponse { event_id } = self
            .http
            .post(self.api_url(&endpoint))
            .json(&PredictRequest { data })
            .send()
            .await
            .with_context(|| format!("Failed to call {api_name}"))?
            .error_for_status()
            .with_context(|| format!("Gradio app rejected call to {api_name}"))?
            .json::<EventIdResponse>()
            .await
            .context("Failed to parse event id")?;
        tracing::debug!(%event_id, api_name, "Prediction queued.");

        let body = self
            .http
            .get(self.api_url(&format!("{endpoint}/{event_id}")))
            .send()
            .await
            .context("Failed to open result stream")?
            .error_for_status()
            .context("Gradio app rejected result stream")?
            .text()
            .await
            .context("Failed to read result stream")?;

        for event in parse_sse(&body) {
            match event.event.as_str() {
                "complete" => {
                    let data: Vec<Value> = serde_json::from_str(&event.data)
                        .context("Failed to parse prediction output")?;
                    return Ok(Prediction { event_id, data });
                }
                "error" => bail!("{}", error_message(&event.data)),
                other => tracing::trace!(event = other, "Ignoring stream event."),
            }
        }

        bail!("Result stream for {api_name} ended without output")
    }

    /// Downloads an output file and returns the local path it was saved to.
    pub async fn download(&self, file: &FileData, event_id: &str) -> Result<PathBuf> {
        let url = self.file_url(file);
        let bytes = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to download {url}"))?
            .error_for_status()
            .with_context(|| format!("Gradio app refused download of {url}"))?
            .bytes()
            .await
            .context("Failed to read downloaded file")?;

        let dir = self.download_dir.join(event_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let local = dir.join(file.file_name());
        tokio::fs::write(&local, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", local.display()))?;

        tracing::debug!(%url, local = %local.display(), size = bytes.len(), "Downloaded file.");
        Ok(local)
    }
}

fn error_message(data: &str) -> String {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::String(message)) => message,
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(message)) => message.clone(),
            _ => data.trim().to_string(),
        },
        Ok(Value::Null) => "Gradio app reported an error".to_string(),
        _ if data.trim().is_empty() => "Gradio app reported an error".to_string(),
        _ => data.trim().to_string(),
    }
}
