use thiserror::Error;

use crate::model::BuildMarker;

/// Conditions that abort a run before any tracker write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
  #[error("cannot classify job `{job_name}`: no known project code in its name")]
  Classification { job_name: String },

  #[error("job `{job_name}` is unknown to the build server")]
  JobNotFound { job_name: String },

  #[error("build #{build} not found for job `{job_name}`")]
  RangeNotFound { job_name: String, build: BuildMarker },

  #[error("job `{job_name}` has no last successful build; pass --since-build")]
  NoPreviousBuild { job_name: String },
}
