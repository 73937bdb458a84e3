// ABOUTME: Job name validation and the `job/index` instance label.
// ABOUTME: Labels are for humans only and never drive control flow.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobNameError {
    #[error("job name cannot be empty")]
    Empty,

    #[error("job name exceeds maximum length of 128 characters")]
    TooLong,

    #[error("invalid character in job name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    /// Name used when the deployment does not declare one.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(value: &str) -> Result<Self, JobNameError> {
        if value.is_empty() {
            return Err(JobNameError::Empty);
        }

        if value.len() > 128 {
            return Err(JobNameError::TooLong);
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(JobNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobName {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for JobName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        JobName::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Identity of an instance, rendered as `job/index` in stage names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceName {
    pub job: JobName,
    pub index: u32,
}

impl InstanceName {
    pub fn new(job: JobName, index: u32) -> Self {
        Self { job, index }
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.job, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_instance_is_unknown_zero() {
        assert_eq!(InstanceName::default().to_string(), "unknown/0");
    }

    #[test]
    fn accepts_typical_job_names() {
        assert!(JobName::new("bosh").is_ok());
        assert!(JobName::new("concourse_web-1.x").is_ok());
    }

    #[test]
    fn rejects_invalid_job_names() {
        assert!(matches!(JobName::new(""), Err(JobNameError::Empty)));
        assert!(matches!(
            JobName::new("web/0"),
            Err(JobNameError::InvalidChar('/'))
        ));
        assert!(matches!(
            JobName::new(&"a".repeat(129)),
            Err(JobNameError::TooLong)
        ));
    }
}
