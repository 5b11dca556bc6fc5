//! Typed, name-tolerant queries over a decoded raw file.
//!
//! ```no_run
//! use ohmspice::SimulationResults;
//!
//! let results = SimulationResults::open("circuit.raw")?;
//! let freq = results.frequency()?;
//! let vout_mag = results.voltage("out")?;
//! let vout_phase = results.phase("out")?;
//! # Ok::<(), ohmspice::OhmspiceError>(())
//! ```

use std::fmt;
use std::path::Path;

use crate::error::{OhmspiceError, Result};
use crate::raw::{AnalysisKind, Header, RawFile, VariableDescriptor};
use crate::signal::{Signal, SignalStore};
use crate::stats::Stats;

const FREQUENCY_KEYS: [&str; 3] = ["frequency", "freq", "Frequency"];
const TIME_KEYS: [&str; 2] = ["time", "Time"];

/// Read-only view over a parsed raw file.
///
/// All queries are pure reads, so a `SimulationResults` can be shared across
/// threads once constructed.
#[derive(Debug, Clone)]
pub struct SimulationResults {
    raw: RawFile,
}

impl SimulationResults {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from(RawFile::open(path)?))
    }

    pub fn open_with_stats(path: impl AsRef<Path>, stats: Option<&mut Stats>) -> Result<Self> {
        Ok(Self::from(RawFile::open_with_stats(path, stats)?))
    }

    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Ok(Self::from(RawFile::from_bytes(content)?))
    }

    pub fn raw(&self) -> &RawFile {
        &self.raw
    }

    pub fn header(&self) -> &Header {
        self.raw.header()
    }

    pub fn store(&self) -> &SignalStore {
        self.raw.store()
    }

    pub fn analysis(&self) -> AnalysisKind {
        self.header().analysis
    }

    pub fn is_complex(&self) -> bool {
        self.header().is_complex
    }

    /// Number of decoded points.
    pub fn point_count(&self) -> usize {
        self.raw.point_count()
    }

    /// Variable table from the header, including unfilled slots.
    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.header().variables
    }

    /// Names of all stored variables, in store order.
    pub fn variable_names(&self) -> Vec<String> {
        self.store().names()
    }

    /// Frequency axis (magnitude, so complex-stored frequencies come out real).
    pub fn frequency(&self) -> Result<Vec<f64>> {
        self.axis(&FREQUENCY_KEYS, &["frequency", "freq"])
            .map(Signal::magnitude)
            .ok_or(OhmspiceError::NoFrequencyData)
    }

    /// Time axis (real component; time is signed).
    pub fn time(&self) -> Result<Vec<f64>> {
        self.axis(&TIME_KEYS, &["time"])
            .map(Signal::real)
            .ok_or(OhmspiceError::NoTimeData)
    }

    /// Voltage at `node`: magnitude for complex data, raw values otherwise.
    pub fn voltage(&self, node: &str) -> Result<Vec<f64>> {
        self.find_voltage(node)
            .map(|(_, signal)| signal.values())
            .ok_or_else(|| OhmspiceError::NodeNotFound {
                node: node.to_string(),
                available: self.variable_names(),
            })
    }

    /// Voltage phase at `node` in degrees. Requires complex data.
    pub fn phase(&self, node: &str) -> Result<Vec<f64>> {
        let (_, signal) = self
            .find_voltage(node)
            .ok_or_else(|| OhmspiceError::NodeNotFound {
                node: node.to_string(),
                available: self.variable_names(),
            })?;
        signal
            .phase_degrees()
            .ok_or_else(|| OhmspiceError::NotComplexData(node.to_string()))
    }

    /// Current through `component`: magnitude for complex data, raw values otherwise.
    pub fn current(&self, component: &str) -> Result<Vec<f64>> {
        self.find_current(component)
            .map(|(_, signal)| signal.values())
            .ok_or_else(|| OhmspiceError::ComponentNotFound {
                component: component.to_string(),
                available: self.variable_names(),
            })
    }

    /// Exact-name lookup, no fallbacks.
    pub fn variable(&self, name: &str) -> Result<&Signal> {
        self.store()
            .get(name)
            .ok_or_else(|| OhmspiceError::VariableNotFound {
                name: name.to_string(),
                available: self.variable_names(),
            })
    }

    /// Store key for `name`: an exact variable name first, then the voltage
    /// and current naming conventions.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.store().iter().find(|(key, _)| *key == name) {
            return Some(key);
        }
        self.find_voltage(name)
            .or_else(|| self.find_current(name))
            .map(|(key, _)| key)
    }

    fn axis(&self, keys: &[&str], index0_names: &[&str]) -> Option<&Signal> {
        if let Some(signal) = keys.iter().find_map(|key| self.store().get(key)) {
            return Some(signal);
        }
        let first = self.variables().first()?;
        let lower = first.name.to_lowercase();
        if index0_names.contains(&lower.as_str()) {
            self.store().get(&first.name)
        } else {
            None
        }
    }

    /// Conventional spellings first, then any key equal to `V(node)` ignoring case.
    fn find_voltage(&self, node: &str) -> Option<(&str, &Signal)> {
        self.first_match(&voltage_candidates(node))
            .or_else(|| self.match_ignore_case(&format!("V({})", node)))
    }

    fn find_current(&self, component: &str) -> Option<(&str, &Signal)> {
        self.first_match(&current_candidates(component))
            .or_else(|| self.match_ignore_case(&format!("I({})", component)))
    }

    fn match_ignore_case(&self, name: &str) -> Option<(&str, &Signal)> {
        self.store()
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    fn first_match(&self, candidates: &[String]) -> Option<(&str, &Signal)> {
        candidates.iter().find_map(|candidate| {
            self.store()
                .iter()
                .find(|(key, _)| *key == candidate.as_str())
        })
    }
}

impl From<RawFile> for SimulationResults {
    fn from(raw: RawFile) -> Self {
        Self { raw }
    }
}

impl fmt::Display for SimulationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SimulationResults(type={}, points={}, variables={})",
            self.analysis(),
            self.point_count(),
            self.variables().len()
        )
    }
}

/// Store keys tried, in order, for the voltage at `node`.
pub fn voltage_candidates(node: &str) -> Vec<String> {
    vec![
        format!("V({})", node),
        format!("v({})", node),
        format!("V({})", node.to_lowercase()),
        format!("V({})", node.to_uppercase()),
        node.to_string(),
    ]
}

/// Store keys tried, in order, for the current through `component`.
pub fn current_candidates(component: &str) -> Vec<String> {
    vec![
        format!("I({})", component),
        format!("i({})", component),
        format!("I({})", component.to_lowercase()),
        format!("I({})", component.to_uppercase()),
        format!("Ix({}:+)", component),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_candidates_order() {
        assert_eq!(
            voltage_candidates("Out"),
            vec!["V(Out)", "v(Out)", "V(out)", "V(OUT)", "Out"]
        );
    }

    #[test]
    fn test_current_candidates_order() {
        assert_eq!(
            current_candidates("r1"),
            vec!["I(r1)", "i(r1)", "I(r1)", "I(R1)", "Ix(r1:+)"]
        );
    }

    #[test]
    fn test_results_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimulationResults>();
    }
}
