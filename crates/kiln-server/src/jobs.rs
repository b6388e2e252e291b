//! Custom-job construction for fine-tuning runs.

use crate::config::Settings;
use kiln_abstraction::{ContainerSpec, CustomJobSpec, EnvVar, MachineSpec, StoreLocator};

pub const TRAINING_JOB_DISPLAY_NAME: &str = "llm-training-job";
const TRAINING_MACHINE_TYPE: &str = "a2-highgpu-8g";
const TRAINING_ACCELERATOR_TYPE: &str = "NVIDIA_TESLA_A100";
const TRAINING_ACCELERATOR_COUNT: u32 = 8;

/// Builds the custom job for a stored training config.
///
/// The config is reachable inside the worker through the platform's bucket
/// mount at `/gcs/<bucket>/<object>`; the trainer CLI is pointed straight at
/// it.
#[must_use]
pub fn custom_job_for_config(settings: &Settings, config: &StoreLocator) -> CustomJobSpec {
    let mounted_config = format!("/gcs/{}/{}", config.bucket(), config.object());

    let mut env = vec![
        EnvVar::new("PYTHONUNBUFFERED", "1"),
        EnvVar::new("WORLD_SIZE", "1"),
        EnvVar::new("RANK", "0"),
        EnvVar::new("N_NODES", "1"),
    ];
    if let Some(hf_token) = &settings.hf_token {
        env.push(EnvVar::new("HF_TOKEN", hf_token));
    }

    CustomJobSpec {
        display_name: TRAINING_JOB_DISPLAY_NAME.to_string(),
        machine: MachineSpec {
            machine_type: TRAINING_MACHINE_TYPE.to_string(),
            accelerator_type: TRAINING_ACCELERATOR_TYPE.to_string(),
            accelerator_count: TRAINING_ACCELERATOR_COUNT,
        },
        replica_count: 1,
        container: ContainerSpec {
            image_uri: settings.model_image_uri.clone(),
            command: vec![
                "bash".to_string(),
                "-c".to_string(),
                format!("/usr/local/bin/llamafactory-cli train {mounted_config}"),
            ],
            env,
        },
    }
}
