//! Record decoders for the data section that follows the header.
//!
//! Binary records are fixed-size: per point, variable 0 is one
//! little-endian f64 and every other variable is either one f64 (real plots)
//! or two (real, imaginary) for complex plots. A file shorter than the
//! declared point count is truncated to the complete points it holds.

use num_complex::Complex64;

use super::header::Header;
use crate::signal::{Signal, SignalStore};

/// Output of a decode pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub store: SignalStore,
    /// Number of points actually decoded.
    pub point_count: usize,
}

/// Bytes per point for `num_variables` variables.
pub fn point_size(num_variables: usize, is_complex: bool) -> usize {
    match num_variables {
        0 => 0,
        n if is_complex => 8 + (n - 1) * 16,
        n => n * 8,
    }
}

/// Whether the variable at `index` is stored as a complex sequence.
pub fn is_complex_variable(index: usize, is_complex: bool) -> bool {
    is_complex && index > 0
}

/// Decode the binary record stream.
pub fn decode_binary(body: &[u8], header: &Header) -> Decoded {
    let num_vars = header.variables.len();
    if num_vars == 0 || header.point_count == 0 {
        return Decoded::default();
    }

    let point_size = point_size(num_vars, header.is_complex);
    let available = body.len() / point_size;
    let point_count = header.point_count.min(available);
    if point_count < header.point_count {
        tracing::warn!(
            declared = header.point_count,
            available = point_count,
            "binary data shorter than declared, truncating"
        );
    }

    let mut columns = empty_columns(header, point_count);
    let mut decoded = 0;
    for record in body.chunks_exact(point_size).take(point_count) {
        let Some(samples) = read_record(record, &columns) else {
            break;
        };
        push_samples(&mut columns, samples);
        decoded += 1;
    }

    Decoded {
        store: into_store(header, columns),
        point_count: decoded,
    }
}

/// Decode an ASCII `Values:` section.
///
/// Each point is an integer point index followed by one token per variable.
/// Complex tokens are `re,im`; the independent variable keeps only the real
/// part. Decoding stops at the first incomplete or unparseable point.
pub fn decode_ascii(body: &[u8], header: &Header) -> Decoded {
    let num_vars = header.variables.len();
    if num_vars == 0 || header.point_count == 0 {
        return Decoded::default();
    }

    // A value takes at least one byte plus a separator
    let capacity = header.point_count.min(body.len() / (2 * num_vars));
    let text = String::from_utf8_lossy(body);
    let mut tokens = text.split_whitespace();
    let mut columns = empty_columns(header, capacity);
    let mut decoded = 0;

    while decoded < header.point_count {
        let Some(samples) = read_ascii_point(&mut tokens, &columns) else {
            break;
        };
        push_samples(&mut columns, samples);
        decoded += 1;
    }

    if decoded < header.point_count {
        tracing::warn!(
            declared = header.point_count,
            available = decoded,
            "ascii values shorter than declared, truncating"
        );
    }

    Decoded {
        store: into_store(header, columns),
        point_count: decoded,
    }
}

fn empty_columns(header: &Header, capacity: usize) -> Vec<Signal> {
    (0..header.variables.len())
        .map(|i| Signal::with_capacity(is_complex_variable(i, header.is_complex), capacity))
        .collect()
}

/// Read one full record. Samples are collected before anything is pushed so
/// a short record never leaves a partial point behind.
fn read_record(record: &[u8], columns: &[Signal]) -> Option<Vec<Complex64>> {
    let mut offset = 0;
    let mut samples = Vec::with_capacity(columns.len());
    for column in columns {
        let re = read_f64(record, offset)?;
        offset += 8;
        let im = if column.is_complex() {
            let im = read_f64(record, offset)?;
            offset += 8;
            im
        } else {
            0.0
        };
        samples.push(Complex64::new(re, im));
    }
    Some(samples)
}

fn read_f64(bytes: &[u8], offset: usize) -> Option<f64> {
    let chunk: [u8; 8] = bytes.get(offset..offset + 8)?.try_into().ok()?;
    Some(f64::from_le_bytes(chunk))
}

fn read_ascii_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    columns: &[Signal],
) -> Option<Vec<Complex64>> {
    tokens.next()?.parse::<usize>().ok()?;
    columns
        .iter()
        .map(|_| tokens.next().and_then(parse_ascii_value))
        .collect()
}

/// `1.5e-3` or `1.5e-3,-2.0e-1`.
fn parse_ascii_value(token: &str) -> Option<Complex64> {
    match token.split_once(',') {
        Some((re, im)) => Some(Complex64::new(re.parse().ok()?, im.parse().ok()?)),
        None => Some(Complex64::new(token.parse().ok()?, 0.0)),
    }
}

fn push_samples(columns: &mut [Signal], samples: Vec<Complex64>) {
    for (column, sample) in columns.iter_mut().zip(samples) {
        match column {
            Signal::Real(values) => values.push(sample.re),
            Signal::Complex(values) => values.push(sample),
        }
    }
}

/// Name the columns. Slots the variable table never filled are decoded
/// (their bytes still occupy the record) but not stored.
fn into_store(header: &Header, columns: Vec<Signal>) -> SignalStore {
    let mut store = SignalStore::new();
    for (descriptor, column) in header.variables.iter().zip(columns) {
        if descriptor.is_set() {
            store.insert(descriptor.name.as_str(), column);
        } else {
            tracing::debug!(index = descriptor.index, "dropping unnamed variable");
        }
    }
    store
}
