//! Training configuration materializer.
//!
//! Flattens the four top-level fields plus every hyperparameter into one flat
//! YAML document, the shape the llama-factory trainer CLI consumes. Pure and
//! deterministic; once uploaded the document is never mutated.

use crate::error::TrainingResult;
use serde::{Deserialize, Serialize};

/// The fixed hyperparameter set of a fine-tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub learning_rate: f64,
    pub template: String,
    pub stage: String,
    pub do_train: bool,
    pub finetuning_type: String,
    pub lora_target: String,
    pub per_device_train_batch_size: u32,
    pub gradient_accumulation_steps: u32,
    pub num_train_epochs: f64,
    pub lr_scheduler_type: String,
    pub warmup_ratio: f64,
    pub bf16: bool,
    pub ddp_timeout: u64,
    pub val_size: f64,
    pub per_device_eval_batch_size: u32,
    pub eval_strategy: String,
    pub eval_steps: u32,
}

#[derive(Serialize)]
struct TrainingConfigDocument<'a> {
    dataset_dir: &'a str,
    model_name_or_path: &'a str,
    output_dir: &'a str,
    dataset: &'a str,
    #[serde(flatten)]
    params: &'a TrainingParams,
}

/// Serializes a training configuration document. No defaulting, no validation
/// beyond what the request schema already enforced.
pub fn materialize_training_config(
    dataset_dir: &str,
    model_name_or_path: &str,
    output_dir: &str,
    dataset: &str,
    params: &TrainingParams,
) -> TrainingResult<String> {
    let doc = TrainingConfigDocument { dataset_dir, model_name_or_path, output_dir, dataset, params };
    Ok(serde_yaml::to_string(&doc)?)
}

/// Store path for a materialized config, keyed by a random suffix.
#[must_use]
pub fn config_object_path(suffix: &str) -> String {
    format!("training_configs/training_config_{suffix}.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TrainingParams {
        TrainingParams {
            learning_rate: 0.001,
            template: "llama3".to_string(),
            stage: "sft".to_string(),
            do_train: true,
            finetuning_type: "lora".to_string(),
            lora_target: "all".to_string(),
            per_device_train_batch_size: 1,
            gradient_accumulation_steps: 8,
            num_train_epochs: 3.0,
            lr_scheduler_type: "cosine".to_string(),
            warmup_ratio: 0.1,
            bf16: true,
            ddp_timeout: 180_000_000,
            val_size: 0.1,
            per_device_eval_batch_size: 1,
            eval_strategy: "steps".to_string(),
            eval_steps: 500,
        }
    }

    #[test]
    fn test_document_is_flat_and_complete() {
        let yaml = materialize_training_config("d", "m", "o", "n", &params()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let map = value.as_mapping().unwrap();

        // Four top-level fields plus the seventeen hyperparameters, flat.
        assert_eq!(map.len(), 21);
        for key in [
            "dataset_dir",
            "model_name_or_path",
            "output_dir",
            "dataset",
            "learning_rate",
            "template",
            "stage",
            "do_train",
            "finetuning_type",
            "lora_target",
            "per_device_train_batch_size",
            "gradient_accumulation_steps",
            "num_train_epochs",
            "lr_scheduler_type",
            "warmup_ratio",
            "bf16",
            "ddp_timeout",
            "val_size",
            "per_device_eval_batch_size",
            "eval_strategy",
            "eval_steps",
        ] {
            assert!(map.contains_key(key), "missing key {key}");
        }

        assert_eq!(value["dataset_dir"], serde_yaml::Value::from("d"));
        assert_eq!(value["learning_rate"], serde_yaml::Value::from(0.001));
    }

    #[test]
    fn test_materialization_is_deterministic() {
        let a = materialize_training_config("d", "m", "o", "n", &params()).unwrap();
        let b = materialize_training_config("d", "m", "o", "n", &params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_object_path_shape() {
        assert_eq!(
            config_object_path("a1b2c3d4"),
            "training_configs/training_config_a1b2c3d4.yaml"
        );
    }
}
