use crate::reference::ReferenceAudio;
use anyhow::Result;
use async_trait::async_trait;
use gradio_client::{Client, FileData};
#[cfg(test)]
use mockall::automock;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// The MOSS TTS Gradio endpoint that runs synthesis.
pub const LAMBDA_API: &str = "/lambda";

/// Sampling and mode settings sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub mode_with_reference: &'static str,
    pub duration_control_enabled: bool,
    pub duration_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub repetition_penalty: f64,
    pub max_new_tokens: u32,
}

impl SynthesisParams {
    pub const CLONE: Self = Self {
        mode_with_reference: "Clone",
        duration_control_enabled: false,
        duration_tokens: 1,
        temperature: 1.7,
        top_p: 0.8,
        top_k: 25,
        repetition_penalty: 1.0,
        max_new_tokens: 4096,
    };

    /// Positional inputs for [`LAMBDA_API`].
    pub fn inputs(&self, text: &str, reference: Value) -> Vec<Value> {
        vec![
            json!(text),
            reference,
            json!(self.mode_with_reference),
            json!(self.duration_control_enabled),
            json!(self.duration_tokens),
            json!(self.temperature),
            json!(self.top_p),
            json!(self.top_k),
            json!(self.repetition_penalty),
            json!(self.max_new_tokens),
        ]
    }
}

/// What the service handed back: a local copy of the audio, if any, and its
/// status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub audio: Option<PathBuf>,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("MOSS TTS produced no audio. Status: {status}")]
    NoAudio { status: String },
    #[error("Failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Service(#[from] anyhow::Error),
}

// Implemented by `MossTts`; tests drive `synthesize_to_file` through `MockSpeechSynthesizer`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        reference: Option<ReferenceAudio>,
    ) -> Result<SynthesisResult>;
}

/// [`SpeechSynthesizer`] backed by a MOSS TTS Gradio app.
pub struct MossTts {
    client: Client,
    params: SynthesisParams,
}

impl MossTts {
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(gradio_client::connect(url).await?))
    }

    pub fn new(client: Client) -> Self {
        Self {
            client,
            params: SynthesisParams::CLONE,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MossTts {
    async fn synthesize(
        &self,
        text: &str,
        reference: Option<ReferenceAudio>,
    ) -> Result<SynthesisResult> {
        let reference = match reference {
            Some(ReferenceAudio::Url(url)) => FileData::from_url(url).to_value(),
            Some(ReferenceAudio::Local(path)) => self.client.upload(&path).await?.to_value(),
            None => Value::Null,
        };

        let prediction = self
            .client
            .predict(LAMBDA_API, self.params.inputs(text, reference))
            .await?;

        let status = match prediction.data.get(1) {
            Some(Value::String(status)) => status.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let audio = match prediction.data.first().and_then(FileData::from_output) {
            Some(file) => Some(self.client.download(&file, &prediction.event_id).await?),
            None => None,
        };

        Ok(SynthesisResult { audio, status })
    }
}

/// Synthesises `text` and copies the audio to `output`, returning the path
/// written. When `output` is an existing directory the audio keeps its own
/// file name inside it.
///
/// Nothing is written unless the service produced an audio file that exists
/// locally.
pub async fn synthesize_to_file(
    synth: &dyn SpeechSynthesizer,
    text: &str,
    output: &Path,
    reference: Option<ReferenceAudio>,
) -> Result<PathBuf, SynthesisError> {
    let SynthesisResult { audio, status } = synth.synthesize(text, reference).await?;
    tracing::debug!(?audio, %status, "Synthesis finished");

    let audio = audio
        .filter(|path| !path.as_os_str().is_empty() && path.exists())
        .ok_or(SynthesisError::NoAudio { status })?;

    let destination = match (tokio::fs::metadata(output).await, audio.file_name()) {
        (Ok(meta), Some(name)) if meta.is_dir() => output.join(name),
        _ => output.to_path_buf(),
    };

    copy_into_place(&audio, &destination)
        .await
        .map_err(|source| SynthesisError::Copy {
            from: audio.clone(),
            to: destination.clone(),
            source,
        })?;

    Ok(destination)
}

/// Copies via a sibling `.part` file so `to` is either untouched or complete.
async fn copy_into_place(from: &Path, to: &Path) -> std::io::Result<()> {
    let mut staging_name = to.file_name().unwrap_or_default().to_os_string();
    staging_name.push(".part");
    let staging = to.with_file_name(staging_name);

    let copied = match tokio::fs::copy(from, &staging).await {
        Ok(_) => tokio::fs::rename(&staging, to).await,
        Err(e) => Err(e),
    };
    if copied.is_err() {
        let _ = tokio::fs::remove_file(&staging).await;
    }
    copied
}
