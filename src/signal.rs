//! Decoded signal storage.
//!
//! Each variable of a raw file decodes into exactly one [`Signal`]: the
//! independent variable (time or frequency) is always real, the others are
//! complex only for complex-valued plots. The kind is fixed at decode time.

use num_complex::Complex64;

/// One decoded variable: a real or a complex sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Signal {
    /// Empty sequence of the given kind with room for `capacity` points.
    pub fn with_capacity(complex: bool, capacity: usize) -> Self {
        if complex {
            Signal::Complex(Vec::with_capacity(capacity))
        } else {
            Signal::Real(Vec::with_capacity(capacity))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Signal::Real(values) => values.len(),
            Signal::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Signal::Complex(_))
    }

    /// Element-wise absolute value (`|x|` for real, `norm` for complex).
    pub fn magnitude(&self) -> Vec<f64> {
        match self {
            Signal::Real(values) => values.iter().map(|v| v.abs()).collect(),
            Signal::Complex(values) => values.iter().map(|c| c.norm()).collect(),
        }
    }

    /// Element-wise real component. Real sequences are returned unchanged.
    pub fn real(&self) -> Vec<f64> {
        match self {
            Signal::Real(values) => values.clone(),
            Signal::Complex(values) => values.iter().map(|c| c.re).collect(),
        }
    }

    /// Magnitude for complex sequences, raw values for real ones.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Signal::Real(values) => values.clone(),
            Signal::Complex(values) => values.iter().map(|c| c.norm()).collect(),
        }
    }

    /// Phase in degrees, `None` for real sequences.
    pub fn phase_degrees(&self) -> Option<Vec<f64>> {
        match self {
            Signal::Real(_) => None,
            Signal::Complex(values) => {
                Some(values.iter().map(|c| c.im.atan2(c.re).to_degrees()).collect())
            }
        }
    }

    /// Value at `index` as a complex number (real values get a zero imaginary part).
    pub fn complex_at(&self, index: usize) -> Option<Complex64> {
        match self {
            Signal::Real(values) => values.get(index).map(|&v| Complex64::new(v, 0.0)),
            Signal::Complex(values) => values.get(index).copied(),
        }
    }
}

/// Variable name to decoded sequence, in first-insertion order.
///
/// Inserting an existing name replaces its sequence in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalStore {
    entries: Vec<(String, Signal)>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, signal: Signal) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = signal,
            None => self.entries.push((name, signal)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, signal)| signal)
    }

    /// Variable names in store order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Signal)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position_and_last_value() {
        let mut store = SignalStore::new();
        store.insert("time", Signal::Real(vec![0.0]));
        store.insert("V(out)", Signal::Real(vec![1.0]));
        store.insert("time", Signal::Real(vec![2.0]));

        assert_eq!(store.names(), vec!["time", "V(out)"]);
        assert_eq!(store.get("time"), Some(&Signal::Real(vec![2.0])));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_magnitude_of_real_is_absolute() {
        let s = Signal::Real(vec![-2.0, 3.0]);
        assert_eq!(s.magnitude(), vec![2.0, 3.0]);
        assert_eq!(s.real(), vec![-2.0, 3.0]);
        assert_eq!(s.values(), vec![-2.0, 3.0]);
        assert!(s.phase_degrees().is_none());
    }

    #[test]
    fn test_complex_magnitude_and_phase() {
        let s = Signal::Complex(vec![Complex64::new(3.0, 4.0), Complex64::new(0.0, -1.0)]);
        assert_eq!(s.magnitude(), vec![5.0, 1.0]);
        let phase = s.phase_degrees().unwrap();
        assert!((phase[0] - 53.130_102_354_155_98).abs() < 1e-9);
        assert!((phase[1] + 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_with_capacity_kind() {
        assert!(Signal::with_capacity(true, 4).is_complex());
        assert!(!Signal::with_capacity(false, 4).is_complex());
        assert!(Signal::with_capacity(false, 4).is_empty());
    }
}
