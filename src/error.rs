use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OhmspiceError {
    #[error("Raw file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not find end of header in raw file")]
    HeaderMarkerNotFound,

    #[error("No frequency data found in results")]
    NoFrequencyData,

    #[error("No time data found in results")]
    NoTimeData,

    #[error("Voltage at node '{node}' not found. Available: {available:?}")]
    NodeNotFound { node: String, available: Vec<String> },

    #[error("Current through '{component}' not found. Available: {available:?}")]
    ComponentNotFound {
        component: String,
        available: Vec<String>,
    },

    #[error("Variable '{name}' not found. Available: {available:?}")]
    VariableNotFound { name: String, available: Vec<String> },

    #[error("Data for '{0}' is not complex, no phase available")]
    NotComplexData(String),

    #[error("Simulator not found: {0}")]
    SimulatorNotFound(String),

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OhmspiceError>;
