//! aws cli listing backend
//!
//! Enumerates bucket contents by shelling out to `aws s3api list-objects-v2`
//! and parsing its JSON output.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::errors::RemoteError;
use super::types::{ListObjectsOutput, ObjectInfo};
use super::RemoteLister;

/// Remote lister backed by the aws command line tool.
///
/// Credentials and region come from the cli's own configuration (environment
/// or ~/.aws), not from this daemon.
#[derive(Debug, Clone)]
pub struct AwsCliLister {
    bin: String,
}

impl AwsCliLister {
    /// Create a lister that invokes `aws` from PATH.
    pub fn new() -> Self {
        Self::with_binary("aws")
    }

    /// Create a lister that invokes a specific binary.
    pub fn with_binary(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Probe whether the aws cli can be launched at all.
    ///
    /// Run once at startup so a missing installation is reported before the
    /// first LIST miss fails.
    pub async fn check_available(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for AwsCliLister {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteLister for AwsCliLister {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, RemoteError> {
        debug!(bucket = %bucket, prefix = %prefix, "Listing objects via aws cli");

        let output = Command::new(&self.bin)
            .args([
                "s3api",
                "list-objects-v2",
                "--bucket",
                bucket,
                "--prefix",
                prefix,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| RemoteError::Launch(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RemoteError::CliFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        // The cli prints nothing at all for an empty result set.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let parsed: ListObjectsOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        let objects: Vec<ObjectInfo> = parsed.contents.into_iter().map(ObjectInfo::from).collect();
        debug!(bucket = %bucket, prefix = %prefix, count = objects.len(), "Listed objects from remote");
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let lister = AwsCliLister::with_binary("/nonexistent/aws-cli-binary");
        let err = lister.list_objects("bucket", "p/").await.unwrap_err();
        assert!(matches!(err, RemoteError::Launch(_)));
    }

    #[tokio::test]
    async fn test_check_available_false_for_missing_binary() {
        let lister = AwsCliLister::with_binary("/nonexistent/aws-cli-binary");
        assert!(!lister.check_available().await);
    }
}
