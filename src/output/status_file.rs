//! JSON files on disk: infrastructure config input and status output.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::azure::decode;
use crate::error::{Error, Result};
use crate::models::InfrastructureStatus;

/// Read and decode a JSON file, reporting the path of the first bad field.
pub fn read_json_file<T: DeserializeOwned>(kind: &'static str, path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Reading {kind} from file: {}", path.display());
    decode(kind, &json)
}

/// Read the status of `resource_group`, or a fresh one when the file does
/// not exist yet.
pub fn read_status(path: &Path, resource_group: &str) -> Result<InfrastructureStatus> {
    if !path.exists() {
        log::warn!("Status file not found: {}", path.display());
        return Ok(InfrastructureStatus::new(resource_group));
    }
    let status: InfrastructureStatus = read_json_file("status", path)?;
    if status.resource_group.name != resource_group {
        return Err(Error::Config(format!(
            "status file {} belongs to resource group {}, not {resource_group}",
            path.display(),
            status.resource_group.name
        )));
    }
    Ok(status)
}

pub fn write_status(path: &Path, status: &InfrastructureStatus) -> Result<()> {
    let json = serde_json::to_string_pretty(status)
        .map_err(|e| Error::Config(format!("cannot serialize status: {e}")))?;
    log::info!("Writing status to file: {}", path.display());
    std::fs::write(path, json).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })
}
