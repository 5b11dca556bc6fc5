//! Reader for SPICE simulator raw output files.
//!
//! Raw files carry a text header (ASCII or UTF-16LE) describing the plot and
//! its variables, followed by the data section. [`RawFile`] parses the header
//! and decodes the data once; [`SimulationResults`] answers typed queries
//! (time/frequency axis, node voltages, branch currents, phases) over it.

pub mod error;
pub mod output;
pub mod raw;
pub mod results;
pub mod signal;
pub mod simulator;
pub mod stats;

pub use error::{OhmspiceError, Result};
pub use raw::{AnalysisKind, DataFormat, Header, HeaderEncoding, RawFile, VariableDescriptor};
pub use results::SimulationResults;
pub use signal::{Signal, SignalStore};
pub use simulator::{PrecomputedOutput, Simulator, SimulatorRegistry};
