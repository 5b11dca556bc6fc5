//! Results output formatting (CSV and summary).

use std::io::Write;

use crate::error::Result;
use crate::results::SimulationResults;
use crate::signal::Signal;

/// Write every stored variable as CSV.
///
/// Format (complex variables split into magnitude and phase columns):
/// ```csv
/// frequency,V(out)_mag,V(out)_phase_deg
/// 1,1.0,-45.0
/// 10,0.1414,-45.0
/// ```
pub fn write_csv<W: Write>(results: &SimulationResults, writer: &mut W) -> Result<()> {
    let names = results.variable_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    write_csv_columns(results, &names, writer)
}

/// Write the named store variables as CSV. Unknown names are skipped.
pub fn write_csv_columns<W: Write>(
    results: &SimulationResults,
    names: &[&str],
    writer: &mut W,
) -> Result<()> {
    let columns: Vec<(&str, &Signal)> = names
        .iter()
        .filter_map(|name| results.store().get(name).map(|signal| (*name, signal)))
        .collect();

    // Header row
    let header: Vec<String> = columns
        .iter()
        .flat_map(|(name, signal)| match signal {
            Signal::Real(_) => vec![name.to_string()],
            Signal::Complex(_) => vec![format!("{}_mag", name), format!("{}_phase_deg", name)],
        })
        .collect();
    writeln!(writer, "{}", header.join(","))?;

    // Data rows
    let n_points = columns.iter().map(|(_, s)| s.len()).min().unwrap_or(0);
    for i in 0..n_points {
        let mut cells: Vec<String> = Vec::with_capacity(header.len());
        for (_, signal) in &columns {
            match signal {
                Signal::Real(values) => cells.push(values[i].to_string()),
                Signal::Complex(values) => {
                    let c = values[i];
                    cells.push(c.norm().to_string());
                    cells.push(c.arg().to_degrees().to_string());
                }
            }
        }
        writeln!(writer, "{}", cells.join(","))?;
    }
    Ok(())
}

/// Write a human-readable summary: analysis, sizes and the variable table.
pub fn write_summary<W: Write>(results: &SimulationResults, writer: &mut W) -> Result<()> {
    let header = results.header();
    if let Some(title) = &header.title {
        writeln!(writer, "Title:     {}", title)?;
    }
    writeln!(writer, "Analysis:  {}", header.analysis)?;
    writeln!(
        writer,
        "Data:      {}",
        if header.is_complex { "complex" } else { "real" }
    )?;
    writeln!(
        writer,
        "Points:    {} (declared {})",
        results.point_count(),
        header.point_count
    )?;
    writeln!(writer, "Variables: {}", header.variables.len())?;
    for var in &header.variables {
        if var.is_set() {
            writeln!(writer, "  {:>4}  {:<24} {}", var.index, var.name, var.declared_type)?;
        } else {
            writeln!(writer, "  {:>4}  <unset>", var.index)?;
        }
    }
    Ok(())
}
