pub mod config;
pub mod constants;

pub use config::{
    AxisSampling, ConfigError, MarginalizationKind, PhzRunConfig, load_run_config,
};
