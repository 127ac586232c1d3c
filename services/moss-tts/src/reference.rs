use std::path::{Path, PathBuf};

/// Sample audio whose voice the synthesiser should clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceAudio {
    /// Fetched by the service itself.
    Url(String),
    /// Uploaded to the service before synthesis.
    Local(PathBuf),
}

impl ReferenceAudio {
    /// Interprets a command-line argument. Returns `None` when it is neither an
    /// HTTP(S) URL nor an existing local path.
    pub fn resolve(arg: &str) -> Option<Self> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            return Some(Self::Url(arg.to_string()));
        }
        let path = Path::new(arg);
        path.exists().then(|| Self::Local(path.to_path_buf()))
    }
}
