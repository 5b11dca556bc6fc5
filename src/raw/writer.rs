//! Binary raw file writer.
//!
//! Emits an ASCII header followed by `Binary:` records in the layout the
//! decoder reads: variable 0 as one f64, the others as one f64 (real plots)
//! or a (real, imaginary) pair (complex plots), all little-endian.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use num_complex::Complex64;

use super::decoder::is_complex_variable;
use super::header::Header;
use super::RawFile;
use crate::error::Result;
use crate::signal::{Signal, SignalStore};

/// Write `store` as a binary raw file described by `header`.
///
/// Only variables that are named in the header and present in the store are
/// written, in header order. The point count is the shortest of their
/// sequences. Values are converted to the layout implied by
/// `header.is_complex`: real values gain a zero imaginary part, complex
/// values in a real column keep their real part.
pub fn write_raw<W: Write>(writer: &mut W, header: &Header, store: &SignalStore) -> Result<()> {
    let columns: Vec<(&str, &str, &Signal)> = header
        .variables
        .iter()
        .filter_map(|v| {
            store
                .get(&v.name)
                .map(|signal| (v.name.as_str(), v.declared_type.as_str(), signal))
        })
        .collect();
    let num_points = columns.iter().map(|(_, _, s)| s.len()).min().unwrap_or(0);

    tracing::debug!(points = num_points, variables = columns.len(), "writing raw file");

    write_header(writer, header, &columns, num_points)?;

    for i in 0..num_points {
        for (index, (_, _, signal)) in columns.iter().enumerate() {
            let value = signal.complex_at(i).unwrap_or_default();
            writer.write_all(&value.re.to_le_bytes())?;
            if is_complex_variable(index, header.is_complex) {
                writer.write_all(&value.im.to_le_bytes())?;
            }
        }
    }

    Ok(())
}

fn write_header<W: Write>(
    writer: &mut W,
    header: &Header,
    columns: &[(&str, &str, &Signal)],
    num_points: usize,
) -> Result<()> {
    let plotname = header
        .plotname
        .as_deref()
        .unwrap_or_else(|| header.analysis.plotname());

    if let Some(title) = &header.title {
        writeln!(writer, "Title: {}", title)?;
    }
    if let Some(date) = &header.date {
        writeln!(writer, "Date: {}", date)?;
    }
    writeln!(writer, "Plotname: {}", plotname)?;
    writeln!(
        writer,
        "Flags: {}",
        if header.is_complex { "complex" } else { "real" }
    )?;
    writeln!(writer, "No. Variables: {}", columns.len())?;
    writeln!(writer, "No. Points: {}", num_points)?;
    if let Some(command) = &header.command {
        writeln!(writer, "Command: {}", command)?;
    }
    writeln!(writer, "Variables:")?;
    for (i, (name, declared_type, _)) in columns.iter().enumerate() {
        let declared_type = if declared_type.is_empty() { "notype" } else { declared_type };
        writeln!(writer, "\t{}\t{}\t{}", i, name, declared_type)?;
    }
    writeln!(writer, "Binary:")?;
    Ok(())
}

impl RawFile {
    /// Re-emit this file's decoded data as a binary raw file.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_raw(writer, self.header(), self.store())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Pack a real sequence as consecutive little-endian f64 values.
pub fn encode_f64s(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Pack complex values as (real, imaginary) little-endian f64 pairs.
pub fn encode_complex(values: &[Complex64]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|c| c.re.to_le_bytes().into_iter().chain(c.im.to_le_bytes()))
        .collect()
}
