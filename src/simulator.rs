//! Simulator backends.
//!
//! A backend turns a netlist on disk into [`SimulationResults`]. Backends are
//! collected in an explicitly constructed [`SimulatorRegistry`]; nothing is
//! registered globally.

use std::path::{Path, PathBuf};

use crate::error::{OhmspiceError, Result};
use crate::results::SimulationResults;

/// A SPICE simulator that produces raw output files.
pub trait Simulator: Send + Sync {
    /// Registry key, e.g. "ltspice".
    fn name(&self) -> &str;

    /// Whether the backend can run on this system.
    fn is_available(&self) -> bool;

    /// Path to the simulator executable, if the backend uses one.
    fn find_executable(&self) -> Option<PathBuf>;

    /// Produce results for the netlist at `netlist`.
    fn run_netlist(&self, netlist: &Path) -> Result<SimulationResults>;
}

/// Backend for output an external simulator run already wrote.
///
/// Simulators write `<netlist>.raw` (and `<netlist>.log`) beside the netlist.
/// This backend loads that raw file; it never starts a process.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedOutput;

impl PrecomputedOutput {
    pub fn new() -> Self {
        PrecomputedOutput
    }
}

impl Simulator for PrecomputedOutput {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn find_executable(&self) -> Option<PathBuf> {
        None
    }

    fn run_netlist(&self, netlist: &Path) -> Result<SimulationResults> {
        if !netlist.exists() {
            return Err(OhmspiceError::FileNotFound(netlist.to_path_buf()));
        }

        let raw_path = netlist.with_extension("raw");
        if raw_path.exists() {
            tracing::info!(raw = %raw_path.display(), "loading simulator output");
            return SimulationResults::open(&raw_path);
        }

        let mut message = String::from("Simulation failed - no output file generated");
        let log_path = netlist.with_extension("log");
        if let Ok(bytes) = std::fs::read(&log_path) {
            message.push_str("\nLog:\n");
            message.push_str(&String::from_utf8_lossy(&bytes));
        }
        Err(OhmspiceError::SimulationFailed(message))
    }
}

/// Named simulator backends, in registration order.
#[derive(Default)]
pub struct SimulatorRegistry {
    backends: Vec<Box<dyn Simulator>>,
}

impl SimulatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the backends this crate ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PrecomputedOutput::new()));
        registry
    }

    /// Add a backend. A backend with the same name is replaced.
    pub fn register(&mut self, backend: Box<dyn Simulator>) {
        match self.backends.iter_mut().find(|b| b.name() == backend.name()) {
            Some(slot) => *slot = backend,
            None => self.backends.push(backend),
        }
    }

    pub fn get(&self, name: &str) -> Result<&dyn Simulator> {
        self.backends
            .iter()
            .find(|b| b.name() == name)
            .map(|b| &**b)
            .ok_or_else(|| OhmspiceError::SimulatorNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// First registered backend that reports itself available.
    pub fn first_available(&self) -> Option<&dyn Simulator> {
        self.backends
            .iter()
            .find(|b| b.is_available())
            .map(|b| &**b)
    }
}
