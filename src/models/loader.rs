//! Model artifact loader

use super::{LinearRegressor, ModelHandle, OnnxRegressor, TrafficModel};
use crate::error::DashboardError;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Loads a model artifact, picking the adapter from the file extension
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Load a model from `path`.
    ///
    /// `.onnx` files go through ONNX Runtime, `.json` files are linear
    /// models. Anything else is a load failure.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<dyn TrafficModel>, DashboardError> {
        let path = path.as_ref();
        let failure = |reason: String| DashboardError::ModelLoadFailure {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(failure("file not found".to_string()));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let model: Arc<dyn TrafficModel> = match extension.as_deref() {
            Some("onnx") => Arc::new(
                OnnxRegressor::load(path, &name, self.onnx_threads)
                    .map_err(|e| failure(format!("{:#}", e)))?,
            ),
            Some("json") => {
                Arc::new(LinearRegressor::load(path).map_err(|e| failure(format!("{:#}", e)))?)
            }
            other => {
                return Err(failure(format!(
                    "unsupported model format {:?} (expected .onnx or .json)",
                    other.unwrap_or("")
                )))
            }
        };

        info!(model = %model.name(), path = %path.display(), "Model ready");
        Ok(model)
    }

    /// Startup load: a failure is logged and returned alongside an empty
    /// handle so the caller can keep running with predictions disabled.
    pub fn load_optional<P: AsRef<Path>>(&self, path: P) -> (ModelHandle, Option<DashboardError>) {
        match self.load(path) {
            Ok(model) => (Some(model), None),
            Err(e) => {
                warn!(error = %e, "Model load failed, prediction disabled");
                (None, Some(e))
            }
        }
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_load_failure() {
        let loader = ModelLoader::new();
        let err = loader.load("does/not/exist.onnx").err().unwrap();
        assert!(matches!(err, DashboardError::ModelLoadFailure { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("best_model.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();

        let err = ModelLoader::new().load(&path).err().unwrap();
        match err {
            DashboardError::ModelLoadFailure { reason, .. } => {
                assert!(reason.contains("unsupported model format"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_json_is_load_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();

        let (handle, err) = ModelLoader::new().load_optional(&path);
        assert!(handle.is_none());
        assert!(matches!(err, Some(DashboardError::ModelLoadFailure { .. })));
    }

    #[test]
    fn test_corrupt_onnx_is_load_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let err = ModelLoader::new().load(&path).err().unwrap();
        assert!(matches!(err, DashboardError::ModelLoadFailure { .. }));

        let (handle, err) = ModelLoader::new().load_optional(&path);
        assert!(handle.is_none());
        assert!(matches!(err, Some(DashboardError::ModelLoadFailure { .. })));
    }

    #[test]
    fn test_loads_linear_model() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("traffic.json");
        std::fs::write(
            &path,
            r#"{"model_name":"traffic","weights":[1,0,0,0,0,0,0],"bias":0}"#,
        )
        .unwrap();

        let (handle, err) = ModelLoader::new().load_optional(&path);
        assert!(err.is_none());
        assert_eq!(handle.unwrap().name(), "traffic");
    }
}
