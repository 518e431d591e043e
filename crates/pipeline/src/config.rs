use movecheck_core::segmentation::{
    validate_config, SegmentationConfig, DEFAULT_HIP_THRESHOLD, DEFAULT_MIN_CYCLE_DURATION,
};

/// Analysis run tuning loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub segmentation: SegmentationConfig,
    /// Treat the whole-sequence fallback cycle as a segmentation failure.
    pub strict_segmentation: bool,
    /// Store the compared cycle frames alongside the result.
    pub store_skeleton_snapshot: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            strict_segmentation: false,
            store_skeleton_snapshot: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `SEGMENTATION_HIP_THRESHOLD`    | `0.05`  |
    /// | `SEGMENTATION_MIN_CYCLE_FRAMES` | `15`    |
    /// | `SEGMENTATION_STRICT`           | `false` |
    /// | `STORE_SKELETON_SNAPSHOT`       | `true`  |
    pub fn from_env() -> Self {
        let hip_threshold: f64 = std::env::var("SEGMENTATION_HIP_THRESHOLD")
            .map(|v| {
                v.parse()
                    .expect("SEGMENTATION_HIP_THRESHOLD must be a valid f64")
            })
            .unwrap_or(DEFAULT_HIP_THRESHOLD);

        let min_cycle_duration: usize = std::env::var("SEGMENTATION_MIN_CYCLE_FRAMES")
            .map(|v| {
                v.parse()
                    .expect("SEGMENTATION_MIN_CYCLE_FRAMES must be a valid usize")
            })
            .unwrap_or(DEFAULT_MIN_CYCLE_DURATION);

        let strict_segmentation = env_flag("SEGMENTATION_STRICT", false);
        let store_skeleton_snapshot = env_flag("STORE_SKELETON_SNAPSHOT", true);

        let segmentation = SegmentationConfig {
            hip_threshold,
            min_cycle_duration,
        };
        if let Err(e) = validate_config(&segmentation) {
            panic!("Invalid segmentation configuration: {e}");
        }

        Self {
            segmentation,
            strict_segmentation,
            store_skeleton_snapshot,
        }
    }
}

/// Parse a boolean flag. Accepts `1/0`, `true/false`, `yes/no`.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value)
            .unwrap_or_else(|| panic!("{name} must be a boolean, got '{value}'")),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
