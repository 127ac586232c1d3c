use serde::{Deserialize, Serialize};
use serde_json::Value;

// Outgoing messages
#[derive(Serialize, Debug)]
pub struct PredictRequest {
    pub data: Vec<Value>,
}

// Incoming messages
#[derive(Deserialize, Debug, Clone)]
pub struct EventIdResponse {
    pub event_id: String,
}

/// The subset of an app's `/config` the client needs.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AppConfig {
    /// `/gradio_api` on Gradio 5, absent on older apps.
    #[serde(default)]
    pub api_prefix: Option<String>,
}

/// A file reference as Gradio passes it in and out of endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileData {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub meta: FileMeta,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileMeta {
    #[serde(rename = "_type")]
    pub kind: String,
}

impl Default for FileMeta {
    fn default() -> Self {
        Self {
            kind: "gradio.FileData".to_string(),
        }
    }
}

impl FileData {
    /// A path the app already knows about, e.g. one returned by an upload.
    pub fn from_server_path(path: impl Into<String>, orig_name: Option<String>) -> Self {
        Self {
            path: path.into(),
            url: None,
            orig_name,
            size: None,
            mime_type: None,
            meta: FileMeta::default(),
        }
    }

    /// A remote file the app fetches itself.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let orig_name = url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Self {
            path: url.clone(),
            url: Some(url),
            orig_name,
            size: None,
            mime_type: None,
            meta: FileMeta::default(),
        }
    }

    /// Reads a file output. Gradio returns either a `FileData` object or, on
    /// older versions, a bare path. `null` and empty paths mean no file.
    pub fn from_output(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) if !path.is_empty() => {
                Some(Self::from_server_path(path.clone(), None))
            }
            Value::Object(_) => serde_json::from_value::<Self>(value.clone())
                .ok()
                .filter(|file| !file.path.is_empty()),
            _ => None,
        }
    }

    /// The name to save a downloaded copy under. Only the final path
    /// component is kept so a download cannot leave its directory.
    pub fn file_name(&self) -> String {
        self.orig_name
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.path.as_str()))
            .find_map(|name| std::path::Path::new(name).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string())
    }

    pub fn to_value(&self) -> Value {
        // Serialising plain strings and options cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Splits a complete `text/event-stream` body into events.
pub fn parse_sse(body: &str) -> Vec<SseEvent> {
    let body = body.replace("\r\n", "\n");
    body.split("\n\n")
        .filter_map(|block| {
            let mut event = None;
            let mut data: Vec<&str> = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = Some(value.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            if event.is_none() && data.is_empty() {
                return None;
            }
            Some(SseEvent {
                event: event.unwrap_or_else(|| "message".to_string()),
                data: data.join("\n"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_sse_reads_events_in_order() {
        let body = "event: generating\ndata: null\n\nevent: complete\ndata: [\"a.wav\", \"ok\"]\n\n";
        let events = parse_sse(body);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, "generating");
        assert_eq!(events[1].event, "complete");
        assert_eq!(events[1].data, "[\"a.wav\", \"ok\"]");
    }

    #[test]
    fn parse_sse_handles_crlf_and_heartbeats() {
        let body = "event: heartbeat\r\ndata: null\r\n\r\nevent: error\r\ndata: \"boom\"\r\n\r\n";
        let events = parse_sse(body);
        assert_eq!(events[0].event, "heartbeat");
        assert_eq!(events[1].event, "error");
        assert_eq!(events[1].data, "\"boom\"");
    }

    #[test]
    fn file_output_accepts_object_and_bare_path() {
        let object = json!({
            "path": "/tmp/gradio/abc/audio.wav",
            "url": "http://host/gradio_api/file=/tmp/gradio/abc/audio.wav",
            "orig_name": "audio.wav",
            "meta": {"_type": "gradio.FileData"}
        });
        let file = FileData::from_output(&object).unwrap();
        assert_eq!(file.file_name(), "audio.wav");
        assert!(file.url.is_some());

        let bare = FileData::from_output(&json!("/tmp/gradio/x/out.wav")).unwrap();
        assert_eq!(bare.file_name(), "out.wav");
        assert!(bare.url.is_none());
    }

    #[test]
    fn file_name_drops_directories_from_remote_names() {
        let mut file = FileData::from_server_path("/tmp/gradio/abc/out.wav", None);

        file.orig_name = Some("/home/user/.bashrc".to_string());
        assert_eq!(file.file_name(), ".bashrc");

        file.orig_name = Some("../../escape.wav".to_string());
        assert_eq!(file.file_name(), "escape.wav");

        file.orig_name = Some("..".to_string());
        assert_eq!(file.file_name(), "out.wav");

        file.path = "/".to_string();
        assert_eq!(file.file_name(), "output");
    }

    #[test]
    fn missing_file_outputs_are_none() {
        assert!(FileData::from_output(&Value::Null).is_none());
        assert!(FileData::from_output(&json!("")).is_none());
        assert!(FileData::from_output(&json!({"path": ""})).is_none());
    }

    #[test]
    fn url_file_data_serialises_with_meta() {
        let file = FileData::from_url("https://example.com/voices/alice.wav");
        assert_eq!(
            file.to_value(),
            json!({
                "path": "https://example.com/voices/alice.wav",
                "url": "https://example.com/voices/alice.wav",
                "orig_name": "alice.wav",
                "meta": {"_type": "gradio.FileData"}
            })
        );
    }
}
