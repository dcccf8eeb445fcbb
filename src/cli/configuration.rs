use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;

use crate::core::error::ConfigError;
use crate::core::transition::arc_eager::ArcEager;
use crate::core::transition::arc_standard::ArcStandard;
use crate::core::transition::stack_projective::StackProjective;
use crate::core::transition::TransitionSystem;

/// The run configuration's `transition_system` field, one of the three systems this
/// crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionSystemKind {
    Arcstandard,
    Arceager,
    Stackproj,
}

impl TransitionSystemKind {
    pub fn build(self) -> Box<dyn TransitionSystem + Send + Sync> {
        match self {
            TransitionSystemKind::Arcstandard => Box::new(ArcStandard),
            TransitionSystemKind::Arceager => Box::new(ArcEager),
            TransitionSystemKind::Stackproj => Box::new(StackProjective::new()),
        }
    }
}

/// The YAML run configuration: which transition system, which feature/transitions/model
/// files, the hash-kernel size, and the worker thread count.
#[derive(Debug, PartialEq, Deserialize)]
pub struct RunConfig {
    pub transition_system: TransitionSystemKind,
    pub feature_file: String,
    pub transitions_file: String,
    pub model_file: String,
    pub kernel_size: usize,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    1
}

pub fn read_configuration(path: &Path) -> Result<RunConfig, ConfigError> {
    let path_string = path.to_string_lossy().to_string();
    let mut conf_str = String::new();

    let mut file = File::open(path).map_err(|err| ConfigError::Io(path_string.clone(), err))?;
    file.read_to_string(&mut conf_str).map_err(|err| ConfigError::Io(path_string, err))?;

    Ok(serde_yaml::from_str(&conf_str)?)
}
