//! Raw file reading pipeline.
//!
//! A raw file is a text header terminated by a `Binary:` (ASCII or UTF-16LE)
//! or `Values:` marker, followed by the data section. The whole file is read
//! into memory, the header is parsed, then the data section is decoded using
//! the header's layout. The result is immutable.

pub mod decoder;
pub mod header;
pub mod writer;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{OhmspiceError, Result};
use crate::signal::SignalStore;
use crate::stats::Stats;

pub use header::{AnalysisKind, Header, HeaderEncoding, VariableDescriptor};

const BINARY_MARKER: &[u8] = b"Binary:\n";
const BINARY_MARKER_UTF16: &[u8] = b"B\0i\0n\0a\0r\0y\0:\0\n\0";
const VALUES_MARKER: &[u8] = b"Values:\n";

/// Storage format of the data section, implied by the header marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Fixed-size little-endian f64 records.
    Binary,
    /// Whitespace-separated text values.
    Ascii,
}

/// Locate the header/data boundary.
///
/// Markers are tried in order of preference; the returned offset points just
/// past the first occurrence of the first marker found.
pub fn find_header_end(content: &[u8]) -> Option<(usize, DataFormat)> {
    [
        (BINARY_MARKER, DataFormat::Binary),
        (BINARY_MARKER_UTF16, DataFormat::Binary),
        (VALUES_MARKER, DataFormat::Ascii),
    ]
    .into_iter()
    .find_map(|(marker, format)| {
        find_subslice(content, marker).map(|pos| (pos + marker.len(), format))
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// A parsed raw file: header metadata plus decoded signals.
#[derive(Debug, Clone)]
pub struct RawFile {
    path: Option<PathBuf>,
    format: DataFormat,
    encoding: HeaderEncoding,
    header: Header,
    store: SignalStore,
    point_count: usize,
}

impl RawFile {
    /// Read and parse a raw file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_stats(path, None)
    }

    pub fn open_with_stats(path: impl AsRef<Path>, mut stats: Option<&mut Stats>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OhmspiceError::FileNotFound(path.to_path_buf()));
        }

        let start = Instant::now();
        let content = std::fs::read(path)?;
        if let Some(s) = stats.as_deref_mut() {
            s.add_phase("read", start.elapsed());
        }

        let mut raw = Self::parse(&content, stats)?;
        raw.path = Some(path.to_path_buf());
        Ok(raw)
    }

    /// Parse an in-memory raw file.
    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Self::parse(content, None)
    }

    pub fn parse(content: &[u8], mut stats: Option<&mut Stats>) -> Result<Self> {
        let _span = tracing::info_span!("raw_parse", bytes = content.len()).entered();

        let start = Instant::now();
        let (header_end, format) =
            find_header_end(content).ok_or(OhmspiceError::HeaderMarkerNotFound)?;
        let (text, encoding) = header::decode_text(&content[..header_end]);
        let header = header::parse(&text);
        tracing::debug!(
            header_end,
            ?format,
            ?encoding,
            analysis = %header.analysis,
            is_complex = header.is_complex,
            points = header.point_count,
            variables = header.variables.len(),
            "parsed header"
        );
        if let Some(s) = stats.as_deref_mut() {
            s.add_phase("header", start.elapsed());
        }

        let start = Instant::now();
        let body = &content[header_end..];
        let decoded = match format {
            DataFormat::Binary => decoder::decode_binary(body, &header),
            DataFormat::Ascii => decoder::decode_ascii(body, &header),
        };
        if let Some(s) = stats.as_deref_mut() {
            s.add_phase("decode", start.elapsed());
            s.bytes_read = content.len();
            s.header_bytes = header_end;
            s.declared_points = header.point_count;
            s.decoded_points = decoded.point_count;
            s.variables = header.variables.len();
        }

        Ok(RawFile {
            path: None,
            format,
            encoding,
            header,
            store: decoded.store,
            point_count: decoded.point_count,
        })
    }

    /// Source path, if the file was read from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn encoding(&self) -> HeaderEncoding {
        self.encoding
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn store(&self) -> &SignalStore {
        &self.store
    }

    /// Number of points actually decoded; at most the declared count.
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}
