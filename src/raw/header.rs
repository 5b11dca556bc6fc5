//! Raw file header parsing.
//!
//! The header is a block of `key: value` lines followed by a `Variables:`
//! table with one `index name type` entry per line:
//!
//! ```text
//! Title: * rc lowpass
//! Plotname: AC Analysis
//! Flags: complex
//! No. Variables: 2
//! No. Points: 41
//! Variables:
//!     0   frequency   frequency
//!     1   V(out)      voltage
//! Binary:
//! ```
//!
//! Parsing is tolerant: unknown keys are ignored, malformed variable lines
//! are skipped and a missing variable count leaves the table empty.

use std::fmt;

use nom::bytes::complete::{take_till, take_while1};
use nom::character::complete::{char, i64 as integer, space0, space1};
use nom::IResult;
use nom::Parser;

/// Sweep mode of the simulation that produced the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisKind {
    OperatingPoint,
    DcSweep,
    AcAnalysis,
    Transient,
    Noise,
    #[default]
    Unknown,
}

impl AnalysisKind {
    /// Classify a `Plotname` value. Keywords are checked in order and the
    /// first case-insensitive substring match wins.
    pub fn from_plotname(plotname: &str) -> Self {
        let lower = plotname.to_lowercase();
        if lower.contains("operating point") {
            AnalysisKind::OperatingPoint
        } else if lower.contains("dc") {
            AnalysisKind::DcSweep
        } else if lower.contains("ac") {
            AnalysisKind::AcAnalysis
        } else if lower.contains("transient") || lower.contains("tran") {
            AnalysisKind::Transient
        } else if lower.contains("noise") {
            AnalysisKind::Noise
        } else {
            AnalysisKind::Unknown
        }
    }

    /// Canonical plot name, as written by [`crate::raw::writer`].
    pub fn plotname(self) -> &'static str {
        match self {
            AnalysisKind::OperatingPoint => "Operating Point",
            AnalysisKind::DcSweep => "DC sweep",
            AnalysisKind::AcAnalysis => "AC Analysis",
            AnalysisKind::Transient => "Transient Analysis",
            AnalysisKind::Noise => "Noise Spectral Density",
            AnalysisKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plotname())
    }
}

/// One entry of the variable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub index: usize,
    pub name: String,
    /// Free-form type from the table, e.g. "voltage", "time", "frequency".
    pub declared_type: String,
}

impl VariableDescriptor {
    pub fn new(index: usize, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }

    /// Slot reserved by `No. Variables` that the table has not filled yet.
    pub fn placeholder(index: usize) -> Self {
        Self::new(index, "", "")
    }

    pub fn is_set(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Parsed header metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub title: Option<String>,
    pub date: Option<String>,
    pub command: Option<String>,
    pub plotname: Option<String>,
    pub analysis: AnalysisKind,
    pub is_complex: bool,
    /// Point count as declared by `No. Points`.
    pub point_count: usize,
    pub variables: Vec<VariableDescriptor>,
}

/// Encoding the header text was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEncoding {
    Utf16Le,
    Ascii,
    Latin1,
}

/// Decode the header bytes: UTF-16LE, then ASCII with invalid bytes
/// skipped, then Latin-1.
///
/// A stage is accepted only if its text contains a `:`, since every header
/// line is `key: value`. Latin-1 cannot fail and is the last resort.
pub fn decode_text(bytes: &[u8]) -> (String, HeaderEncoding) {
    if let Some(text) = decode_utf16le(bytes) {
        if text.contains(':') {
            return (text, HeaderEncoding::Utf16Le);
        }
    }

    let ascii: String = bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();
    if ascii.contains(':') {
        return (ascii, HeaderEncoding::Ascii);
    }

    let latin1: String = bytes.iter().map(|&b| b as char).collect();
    (latin1, HeaderEncoding::Latin1)
}

fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    let text: String = char::decode_utf16(units).collect::<Result<_, _>>().ok()?;
    Some(text.trim_start_matches('\u{feff}').to_string())
}

/// Shortest possible variable table line: `0 a b\n`.
const MIN_VARIABLE_LINE: usize = 6;

/// Parse decoded header text.
pub fn parse(text: &str) -> Header {
    let mut header = Header::default();
    let mut in_variables = false;
    // Every variable needs at least an `i n t` line in the table
    let max_variables = text.len() / MIN_VARIABLE_LINE;

    for raw_line in text.split('\n') {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if in_variables {
            if is_data_marker(line) {
                break;
            }
            parse_variable_entry(line, &mut header.variables);
            continue;
        }

        let Ok((_, (key, value))) = key_value(line) else {
            continue;
        };

        match key.to_lowercase().as_str() {
            "title" => header.title = Some(value.to_string()),
            "date" => header.date = Some(value.to_string()),
            "command" => header.command = Some(value.to_string()),
            "plotname" => {
                header.analysis = AnalysisKind::from_plotname(value);
                header.plotname = Some(value.to_string());
            }
            "flags" => header.is_complex = value.to_lowercase().contains("complex"),
            "no. points" => match value.parse::<usize>() {
                Ok(n) => header.point_count = n,
                Err(_) => tracing::warn!(value, "ignoring unparseable point count"),
            },
            "no. variables" => match value.parse::<usize>() {
                Ok(n) => {
                    let slots = n.min(max_variables);
                    if slots < n {
                        tracing::warn!(declared = n, slots, "variable count exceeds header size, clamping");
                    }
                    header.variables = (0..slots).map(VariableDescriptor::placeholder).collect();
                }
                Err(_) => tracing::warn!(value, "ignoring unparseable variable count"),
            },
            "variables" => in_variables = true,
            _ => {}
        }
    }

    header
}

/// `Binary:` or `Values:` closes the variable table.
fn is_data_marker(line: &str) -> bool {
    line.eq_ignore_ascii_case("binary:") || line.eq_ignore_ascii_case("values:")
}

/// Fill a variable slot from an `index name type` line. Lines with a bad
/// or out-of-range index are dropped.
fn parse_variable_entry(line: &str, variables: &mut [VariableDescriptor]) {
    let Ok((_, (index, name, declared_type))) = variable_line(line) else {
        tracing::warn!(line, "skipping malformed variable line");
        return;
    };
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| variables.get_mut(i));
    match slot {
        Some(slot) => {
            slot.name = name.to_string();
            slot.declared_type = declared_type.to_string();
        }
        None => tracing::debug!(index, "skipping variable with out-of-range index"),
    }
}

// ---------------------------------------------------------------------------
// Line parsers
// ---------------------------------------------------------------------------

/// `key: value`, split at the first colon, both sides trimmed.
fn key_value(line: &str) -> IResult<&str, (&str, &str)> {
    let parsed: IResult<&str, (&str, char)> =
        (take_till(|c: char| c == ':'), char(':')).parse(line);
    let (value, (key, _)) = parsed?;
    Ok(("", (key.trim(), value.trim())))
}

/// Whitespace-delimited token.
fn token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// `index name type [extra...]`
fn variable_line(line: &str) -> IResult<&str, (i64, &str, &str)> {
    let (rest, (_, index, _, name, _, declared_type)) =
        (space0, integer, space1, token, space1, token).parse(line)?;
    Ok((rest, (index, name, declared_type)))
}
