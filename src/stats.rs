//! Parse statistics collection for `--stats` output.

use std::time::{Duration, Instant};

/// Collects phase timings and size counters for one raw file parse.
///
/// Created when `--stats` is passed, threaded as `Option<&mut Stats>`.
/// Zero cost when `None`.
pub struct Stats {
    total_start: Instant,
    phases: Vec<(&'static str, Duration)>,
    pub bytes_read: usize,
    pub header_bytes: usize,
    pub declared_points: usize,
    pub decoded_points: usize,
    pub variables: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            total_start: Instant::now(),
            phases: Vec::new(),
            bytes_read: 0,
            header_bytes: 0,
            declared_points: 0,
            decoded_points: 0,
            variables: 0,
        }
    }

    /// Record a completed phase with its duration.
    pub fn add_phase(&mut self, name: &'static str, duration: Duration) {
        self.phases.push((name, duration));
    }

    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }

    /// Whether fewer points were decoded than the header declared.
    pub fn truncated(&self) -> bool {
        self.decoded_points < self.declared_points
    }

    /// Print the stats table to stderr.
    pub fn display(&self) {
        let total = self.total_start.elapsed();
        eprintln!();
        eprintln!("=== Ohmspice Parse Stats ===");

        for (name, dur) in &self.phases {
            eprintln!("  {:<24} {:>8.3}s", name, dur.as_secs_f64());
        }

        eprintln!("  Bytes read:             {}", self.bytes_read);
        eprintln!("  Header bytes:           {}", self.header_bytes);
        eprintln!("  Variables:              {}", self.variables);
        eprintln!("  Points:                 decoded={}  declared={}", self.decoded_points, self.declared_points);
        if self.truncated() {
            eprintln!("  (data section truncated)");
        }

        eprintln!("  ─────────────────────────────────");
        eprintln!("  Total:                  {:>8.3}s", total.as_secs_f64());
    }
}
