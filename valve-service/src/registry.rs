//! Model registry access
//!
//! Resolves the configured model URI and fetches the ONNX artifact plus the
//! metadata sidecar stored next to it. http(s) registries are queried with
//! basic auth; anything else is treated as a filesystem path.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::model::metadata::MetadataError;
use crate::model::ModelMetadata;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read model artifact {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("registry request for {0} failed: {1}")]
    Http(String, #[source] reqwest::Error),

    #[error("registry returned status {1} for {0}")]
    Status(String, u16),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Raw model bytes plus the metadata resolved for them.
pub struct ModelArtifact {
    pub bytes: Vec<u8>,
    pub metadata: ModelMetadata,
}

/// Fetch the configured model artifact and its metadata sidecar.
///
/// Artifacts without a sidecar fall back to the legacy identifier naming
/// convention; if neither yields a method, startup fails here.
pub async fn fetch_artifact(config: &Config) -> Result<ModelArtifact, RegistryError> {
    let client = reqwest::Client::new();

    let model_uri = resolve(&config.registry_uri, &config.model_uri);
    let sidecar = sidecar_uri(&model_uri);

    let bytes = fetch(&client, config, &model_uri).await?;

    let metadata = match try_fetch(&client, config, &sidecar).await? {
        Some(raw) => ModelMetadata::from_sidecar_json(&config.model_uri, &raw)?,
        None => {
            tracing::warn!(
                "no metadata sidecar at {}, falling back to identifier parsing",
                sidecar
            );
            ModelMetadata::from_identifier(&config.model_uri)?
        }
    };

    Ok(ModelArtifact { bytes, metadata })
}

fn is_http(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Resolve the model URI against the registry base.
fn resolve(registry_uri: &str, model_uri: &str) -> String {
    if is_http(model_uri) || Path::new(model_uri).is_absolute() {
        return model_uri.to_string();
    }

    if is_http(registry_uri) {
        format!(
            "{}/{}",
            registry_uri.trim_end_matches('/'),
            model_uri.trim_start_matches('/')
        )
    } else {
        PathBuf::from(registry_uri)
            .join(model_uri)
            .to_string_lossy()
            .into_owned()
    }
}

/// Sidecar location: the artifact path with its extension swapped for `.json`.
fn sidecar_uri(model_uri: &str) -> String {
    let name_start = model_uri.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match model_uri[name_start..].rfind('.') {
        Some(dot) => format!("{}.json", &model_uri[..name_start + dot]),
        None => format!("{}.json", model_uri),
    }
}

async fn fetch(
    client: &reqwest::Client,
    config: &Config,
    uri: &str,
) -> Result<Vec<u8>, RegistryError> {
    if is_http(uri) {
        let response = client
            .get(uri)
            .basic_auth(&config.registry_username, Some(&config.registry_password))
            .send()
            .await
            .map_err(|e| RegistryError::Http(uri.to_string(), e))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(
                uri.to_string(),
                response.status().as_u16(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::Http(uri.to_string(), e))?;
        Ok(bytes.to_vec())
    } else {
        tokio::fs::read(uri)
            .await
            .map_err(|e| RegistryError::Io(uri.to_string(), e))
    }
}

/// Like `fetch` but maps "not found" to `None` so callers can fall back.
async fn try_fetch(
    client: &reqwest::Client,
    config: &Config,
    uri: &str,
) -> Result<Option<Vec<u8>>, RegistryError> {
    match fetch(client, config, uri).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(RegistryError::Status(_, 404)) => Ok(None),
        Err(RegistryError::Io(_, ref e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_uri_joins_http_registry() {
        assert_eq!(
            resolve("https://registry.example.com/models/", "valve/model.onnx"),
            "https://registry.example.com/models/valve/model.onnx"
        );
    }

    #[test]
    fn relative_uri_joins_directory_registry() {
        assert_eq!(
            resolve("/srv/models", "valve/model.onnx"),
            "/srv/models/valve/model.onnx"
        );
    }

    #[test]
    fn absolute_model_uri_wins_over_registry() {
        assert_eq!(
            resolve("/srv/models", "https://elsewhere.example.com/m.onnx"),
            "https://elsewhere.example.com/m.onnx"
        );
        assert_eq!(resolve("/srv/models", "/opt/m.onnx"), "/opt/m.onnx");
    }

    #[test]
    fn sidecar_swaps_extension() {
        assert_eq!(sidecar_uri("/srv/models/valve.onnx"), "/srv/models/valve.json");
        assert_eq!(
            sidecar_uri("https://r.example.com/valve.onnx"),
            "https://r.example.com/valve.json"
        );
    }

    #[test]
    fn sidecar_appends_when_no_extension() {
        assert_eq!(sidecar_uri("/srv/models/valve"), "/srv/models/valve.json");
    }

    #[test]
    fn sidecar_ignores_dots_in_directories() {
        assert_eq!(
            sidecar_uri("/srv/models.v2/valve"),
            "/srv/models.v2/valve.json"
        );
    }
}
