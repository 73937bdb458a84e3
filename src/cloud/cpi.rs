// ABOUTME: CPI client that runs an external provider executable per call.
// ABOUTME: Sends a JSON request on stdin and parses the JSON response from stdout.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::protocol::{CpiRequest, CpiResponse};
use super::{Cloud, CloudError, CloudErrorKind, Deletion};
use crate::types::{DiskCid, StemcellCid, VmCid};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs a CPI executable for every call.
#[derive(Debug, Clone)]
pub struct ExternalCpi {
    command: PathBuf,
    args: Vec<String>,
    context: Map<String, Value>,
    api_version: Option<u32>,
    timeout: Duration,
}

impl ExternalCpi {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            context: Map::new(),
            api_version: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Extra arguments passed to the executable.
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Context object sent with every request (director uuid, credentials).
    pub fn context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    pub fn api_version(mut self, api_version: Option<u32>) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    async fn call(&self, method: &str, arguments: Vec<Value>) -> Result<Value, CloudError> {
        let request = CpiRequest {
            method,
            arguments,
            context: &self.context,
            api_version: self.api_version,
        };
        let payload = serde_json::to_vec(&request).map_err(|e| CloudError::Protocol {
            method: method.to_string(),
            reason: format!("failed to encode request: {}", e),
        })?;

        tracing::debug!(method, command = %self.command.display(), "Calling CPI");

        let execute_err = |source| CloudError::Execute {
            method: method.to_string(),
            source,
        };

        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(execute_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await.map_err(execute_err)?;
            // Dropping stdin closes the pipe so the CPI sees EOF.
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(execute_err)?,
            Err(_elapsed) => {
                return Err(CloudError::Timeout {
                    method: method.to_string(),
                    after: self.timeout,
                });
            }
        };

        let response: CpiResponse =
            serde_json::from_slice(&output.stdout).map_err(|e| CloudError::Protocol {
                method: method.to_string(),
                reason: format!(
                    "{} (exit status {}, stderr: {})",
                    e,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })?;

        if !response.log.is_empty() {
            tracing::trace!(method, log = %response.log, "CPI log");
        }

        match response.error {
            Some(error) => Err(CloudError::Cpi {
                method: method.to_string(),
                error_type: error.error_type,
                message: error.message,
                ok_to_retry: error.ok_to_retry,
            }),
            None => Ok(response.result),
        }
    }

    async fn delete(
        &self,
        method: &str,
        cid: &str,
        not_found: CloudErrorKind,
    ) -> Result<Deletion, CloudError> {
        match self.call(method, vec![Value::from(cid)]).await {
            Ok(_) => Ok(Deletion::Deleted),
            Err(e) if e.kind() == not_found => {
                tracing::debug!(method, cid, "CPI reported resource already gone: {}", e);
                Ok(Deletion::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Cloud for ExternalCpi {
    async fn has_vm(&self, cid: &VmCid) -> Result<bool, CloudError> {
        let result = self.call("has_vm", vec![Value::from(cid.as_str())]).await?;
        result.as_bool().ok_or_else(|| CloudError::Protocol {
            method: "has_vm".to_string(),
            reason: format!("expected boolean result, got {}", result),
        })
    }

    async fn delete_vm(&self, cid: &VmCid) -> Result<Deletion, CloudError> {
        self.delete("delete_vm", cid.as_str(), CloudErrorKind::VmNotFound)
            .await
    }

    async fn delete_disk(&self, cid: &DiskCid) -> Result<Deletion, CloudError> {
        self.delete("delete_disk", cid.as_str(), CloudErrorKind::DiskNotFound)
            .await
    }

    async fn delete_stemcell(&self, cid: &StemcellCid) -> Result<Deletion, CloudError> {
        self.delete(
            "delete_stemcell",
            cid.as_str(),
            CloudErrorKind::StemcellNotFound,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write a fake CPI script that answers every call with `response`.
    fn fake_cpi(dir: &TempDir, response: &str) -> PathBuf {
        let path = dir.path().join("cpi");
        let script = format!("#!/bin/sh\ncat > \"$0.request\"\necho '{}'\n", response);
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[tokio::test]
    async fn has_vm_reads_boolean_result() {
        let dir = TempDir::new().unwrap();
        let cpi = ExternalCpi::new(fake_cpi(&dir, r#"{"result": false, "error": null, "log": ""}"#));

        assert!(!cpi.has_vm(&VmCid::new("vm-1")).await.unwrap());

        let request = std::fs::read_to_string(dir.path().join("cpi.request")).unwrap();
        let request: Value = serde_json::from_str(&request).unwrap();
        assert_eq!(request["method"], "has_vm");
        assert_eq!(request["arguments"][0], "vm-1");
    }

    #[tokio::test]
    async fn matching_not_found_is_a_deletion_outcome() {
        let dir = TempDir::new().unwrap();
        let cpi = ExternalCpi::new(fake_cpi(
            &dir,
            r#"{"result": null, "error": {"type": "Bosh::Clouds::DiskNotFound", "message": "gone", "ok_to_retry": false}}"#,
        ));

        let outcome = cpi.delete_disk(&DiskCid::new("disk-1")).await.unwrap();
        assert_eq!(outcome, Deletion::NotFound);
    }

    #[tokio::test]
    async fn mismatched_not_found_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cpi = ExternalCpi::new(fake_cpi(
            &dir,
            r#"{"result": null, "error": {"type": "Bosh::Clouds::DiskNotFound", "message": "gone", "ok_to_retry": false}}"#,
        ));

        let err = cpi.delete_vm(&VmCid::new("vm-1")).await.unwrap_err();
        assert_eq!(err.kind(), CloudErrorKind::DiskNotFound);
    }

    #[tokio::test]
    async fn garbage_output_is_a_protocol_error() {
        let dir = TempDir::new().unwrap();
        let cpi = ExternalCpi::new(fake_cpi(&dir, "not json"));

        let err = cpi.delete_stemcell(&StemcellCid::new("sc-1")).await.unwrap_err();
        assert!(matches!(err, CloudError::Protocol { .. }));
        assert_eq!(err.kind(), CloudErrorKind::Transport);
    }

    #[tokio::test]
    async fn missing_executable_is_an_execute_error() {
        let cpi = ExternalCpi::new("/nonexistent/cpi");
        let err = cpi.has_vm(&VmCid::new("vm-1")).await.unwrap_err();
        assert!(matches!(err, CloudError::Execute { .. }));
    }
}
