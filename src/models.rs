use crate::FaceAttentionError;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub name: &'static str,
    pub url: &'static str,
    pub filename: &'static str,
}

pub const YUNET_MODEL: ModelInfo = ModelInfo {
    name: "yunet",
    url: "https://github.com/opencv/opencv_zoo/raw/main/models/face_detection_yunet/face_detection_yunet_2023mar.onnx",
    filename: "face_detection_yunet_2023mar.onnx",
};

/// `<data dir>/face-attention/models`, or `./face-attention/models` without a data dir.
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("face-attention")
        .join("models")
}

pub fn model_path(model: &ModelInfo, dir: &Path) -> PathBuf {
    dir.join(model.filename)
}

/// Returns the local model path, downloading from `url` if it isn't cached in `dir` yet.
pub fn ensure_model(model: &ModelInfo, url: &str, dir: &Path) -> anyhow::Result<PathBuf> {
    let path = model_path(model, dir);
    if path.exists() {
        debug!("Model {} already at {}", model.name, path.display());
        return Ok(path);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create models directory {}", dir.display()))?;
    download(model, url, &path)?;
    Ok(path)
}

fn download(model: &ModelInfo, url: &str, path: &Path) -> anyhow::Result<()> {
    info!("Downloading model {} from {}", model.name, url);

    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download {}", model.name))?;
    if !response.status().is_success() {
        return Err(FaceAttentionError::ModelDownload {
            name: model.name.to_owned(),
            status: response.status().as_u16(),
        }
        .into());
    }
    let bytes = response
        .bytes()
        .with_context(|| format!("Failed to read response for {}", model.name))?;

    // only complete downloads land at `path`
    let partial = path.with_extension("part");
    fs::write(&partial, &bytes).with_context(|| format!("Failed to write {}", model.name))?;
    fs::rename(&partial, path).with_context(|| format!("Failed to move {}", model.name))?;

    info!("Downloaded {} ({} bytes)", model.name, bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_dir_is_namespaced() {
        assert!(models_dir().ends_with("face-attention/models"));
    }

    #[test]
    fn model_path_joins_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = model_path(&YUNET_MODEL, dir.path());
        assert!(path.starts_with(dir.path()));
        assert!(path.ends_with("face_detection_yunet_2023mar.onnx"));
    }

    #[test]
    fn cached_model_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let cached = model_path(&YUNET_MODEL, dir.path());
        fs::write(&cached, b"model").unwrap();

        // unreachable url, must not be contacted
        let path = ensure_model(&YUNET_MODEL, "http://127.0.0.1:9/none", dir.path()).unwrap();
        assert_eq!(path, cached);
        assert_eq!(fs::read(&path).unwrap(), b"model");
    }
}
