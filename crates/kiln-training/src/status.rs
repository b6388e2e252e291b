//! Status normalization: raw platform job/endpoint states mapped into the
//! small vocabulary the API surfaces (`SUCCEEDED`, `FAILED`, `DEPLOYED`,
//! `UNKNOWN`, ...).

use kiln_abstraction::{EndpointDescriptor, RawJob};
use serde::{Deserialize, Serialize};

/// Fixed prefix on the platform's job-state tokens.
const JOB_STATE_PREFIX: &str = "JOB_STATE_";

/// The raw token that denotes a failed job.
const JOB_STATE_FAILED: &str = "JOB_STATE_FAILED";

/// Normalized state when a deployed model exposes a live serving address.
pub const STATE_DEPLOYED: &str = "DEPLOYED";

/// Normalized state when deployment liveness cannot be established.
pub const STATE_UNKNOWN: &str = "UNKNOWN";

/// Normalized status of a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingJobStatus {
    pub job_id: String,
    pub state: String,
    pub error: Option<String>,
}

/// Normalized status of an endpoint deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub endpoint_id: String,
    pub state: String,
    pub error: Option<String>,
}

/// Normalizes a raw job state: the `JOB_STATE_` prefix is stripped and the
/// platform's error message is carried verbatim, but only for a failed job.
/// Unknown raw tokens pass through minus the prefix; the platform enumeration
/// is open-ended.
#[must_use]
pub fn normalize_job_status(job_id: &str, job: &RawJob) -> TrainingJobStatus {
    let error = if job.state == JOB_STATE_FAILED { job.error_message.clone() } else { None };
    TrainingJobStatus {
        job_id: job_id.to_string(),
        state: job.state.strip_prefix(JOB_STATE_PREFIX).unwrap_or(&job.state).to_string(),
        error,
    }
}

/// Normalizes an endpoint descriptor against the deployed-model display name
/// we expect to find.
///
/// `DEPLOYED` means the matching deployed model exposes a live serving
/// address: a private endpoint's predict URI, or, on the public path, a
/// service-account identity. Anything else is `UNKNOWN` with no error,
/// including "no matching deployed model". This is a heuristic; the platform
/// descriptor carries no explicit lifecycle state, so "still deploying" and
/// "failed" are indistinguishable here.
#[must_use]
pub fn normalize_deployment_status(
    endpoint_id: &str,
    endpoint: &EndpointDescriptor,
    expected_display_name: &str,
) -> DeploymentStatus {
    let mut state = STATE_UNKNOWN;

    for deployed in &endpoint.deployed_models {
        if deployed.display_name != expected_display_name {
            continue;
        }
        let live = match &deployed.private_endpoints {
            Some(private) => private.predict_http_uri.is_some(),
            None => deployed.service_account.is_some(),
        };
        if live {
            state = STATE_DEPLOYED;
        }
        break;
    }

    DeploymentStatus {
        endpoint_id: endpoint_id.to_string(),
        state: state.to_string(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_abstraction::{DeployedModel, PrivateEndpoints};

    fn raw(state: &str, error: Option<&str>) -> RawJob {
        RawJob { state: state.to_string(), error_message: error.map(str::to_string) }
    }

    #[test]
    fn test_failed_job_carries_error_verbatim() {
        let status = normalize_job_status("123", &raw("JOB_STATE_FAILED", Some("OOM")));
        assert_eq!(status.state, "FAILED");
        assert_eq!(status.error.as_deref(), Some("OOM"));
    }

    #[test]
    fn test_succeeded_job_has_no_error() {
        let status = normalize_job_status("123", &raw("JOB_STATE_SUCCEEDED", None));
        assert_eq!(status.state, "SUCCEEDED");
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_non_failed_state_drops_platform_error_message() {
        // Only a failed job surfaces the message, even if the platform set one.
        let status = normalize_job_status("123", &raw("JOB_STATE_CANCELLED", Some("cancelled")));
        assert_eq!(status.state, "CANCELLED");
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_unknown_raw_token_passes_through_without_prefix() {
        let status = normalize_job_status("123", &raw("JOB_STATE_PAUSED_V2", None));
        assert_eq!(status.state, "PAUSED_V2");

        let status = normalize_job_status("123", &raw("SOMETHING_ELSE", None));
        assert_eq!(status.state, "SOMETHING_ELSE");
    }

    #[test]
    fn test_public_model_with_service_account_is_deployed() {
        let endpoint = EndpointDescriptor {
            deployed_models: vec![DeployedModel {
                display_name: "deployed-llm".to_string(),
                service_account: Some("svc@project.iam".to_string()),
                private_endpoints: None,
            }],
        };
        let status = normalize_deployment_status("ep-1", &endpoint, "deployed-llm");
        assert_eq!(status.state, STATE_DEPLOYED);
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_private_model_needs_predict_uri() {
        let mut endpoint = EndpointDescriptor {
            deployed_models: vec![DeployedModel {
                display_name: "deployed-llm".to_string(),
                service_account: Some("svc@project.iam".to_string()),
                private_endpoints: Some(PrivateEndpoints { predict_http_uri: None }),
            }],
        };
        // Private path ignores the service account.
        let status = normalize_deployment_status("ep-1", &endpoint, "deployed-llm");
        assert_eq!(status.state, STATE_UNKNOWN);

        endpoint.deployed_models[0].private_endpoints =
            Some(PrivateEndpoints { predict_http_uri: Some("https://ep/predict".to_string()) });
        let status = normalize_deployment_status("ep-1", &endpoint, "deployed-llm");
        assert_eq!(status.state, STATE_DEPLOYED);
    }

    #[test]
    fn test_no_matching_deployed_model_is_unknown() {
        let endpoint = EndpointDescriptor {
            deployed_models: vec![DeployedModel {
                display_name: "other-model".to_string(),
                service_account: Some("svc@project.iam".to_string()),
                private_endpoints: None,
            }],
        };
        let status = normalize_deployment_status("ep-1", &endpoint, "deployed-llm");
        assert_eq!(status.state, STATE_UNKNOWN);
        assert_eq!(status.error, None);
    }

    #[test]
    fn test_empty_endpoint_is_unknown() {
        let status =
            normalize_deployment_status("ep-1", &EndpointDescriptor::default(), "deployed-llm");
        assert_eq!(status.state, STATE_UNKNOWN);
    }
}
