//! End-to-end tests: raw bytes in, typed queries out.

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use ohmspice::raw::writer::{encode_complex, encode_f64s};
use ohmspice::{AnalysisKind, OhmspiceError, Signal, SimulationResults};

/// Helper: ASCII header for the given plot followed by `Binary:`.
fn header_text(plotname: &str, flags: &str, variables: &[(&str, &str)], points: usize) -> String {
    let mut text = format!(
        "Title: * test circuit\nDate: Thu Jan  1 00:00:00 2026\nPlotname: {plotname}\nFlags: {flags}\n\
         No. Variables: {}\nNo. Points: {points}\nVariables:\n",
        variables.len()
    );
    for (i, (name, kind)) in variables.iter().enumerate() {
        text.push_str(&format!("\t{i}\t{name}\t{kind}\n"));
    }
    text.push_str("Binary:\n");
    text
}

/// Helper: transient file with rows of real values.
fn real_raw(variables: &[(&str, &str)], rows: &[&[f64]]) -> Vec<u8> {
    let mut bytes = header_text("Transient Analysis", "real", variables, rows.len()).into_bytes();
    for row in rows {
        bytes.extend(encode_f64s(row));
    }
    bytes
}

/// Helper: AC file, each row is (frequency, complex values...).
fn complex_raw(variables: &[(&str, &str)], rows: &[(f64, &[Complex64])]) -> Vec<u8> {
    let mut bytes = header_text("AC Analysis", "complex", variables, rows.len()).into_bytes();
    for (freq, values) in rows {
        bytes.extend(encode_f64s(&[*freq]));
        bytes.extend(encode_complex(values));
    }
    bytes
}

fn scenario_b() -> SimulationResults {
    let bytes = complex_raw(
        &[("frequency", "frequency"), ("V(out)", "voltage")],
        &[
            (1.0, &[Complex64::new(0.707, -0.707)]),
            (10.0, &[Complex64::new(0.1, -0.1)]),
        ],
    );
    SimulationResults::from_bytes(&bytes).expect("parse failed")
}

// ── Scenarios ─────────────────────────────────────────────────────

#[test]
fn test_transient_real_scenario() {
    let bytes = real_raw(
        &[("time", "time"), ("V(out)", "voltage")],
        &[&[0.0, 1.0], &[0.001, 0.5], &[0.002, 0.25]],
    );
    let results = SimulationResults::from_bytes(&bytes).expect("parse failed");

    assert_eq!(results.analysis(), AnalysisKind::Transient);
    assert!(!results.is_complex());
    assert_eq!(results.point_count(), 3);
    assert_eq!(results.time().unwrap(), vec![0.0, 0.001, 0.002]);
    assert_eq!(results.voltage("out").unwrap(), vec![1.0, 0.5, 0.25]);
}

#[test]
fn test_ac_complex_scenario() {
    let results = scenario_b();

    assert_eq!(results.analysis(), AnalysisKind::AcAnalysis);
    assert_eq!(results.frequency().unwrap(), vec![1.0, 10.0]);

    let mag = results.voltage("out").unwrap();
    assert_abs_diff_eq!(mag[0], 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(mag[1], 0.1414, epsilon = 1e-4);

    let phase = results.phase("out").unwrap();
    assert_abs_diff_eq!(phase[0], -45.0, epsilon = 1e-9);
    assert_abs_diff_eq!(phase[1], -45.0, epsilon = 1e-9);

    assert!(!results.variable("frequency").unwrap().is_complex());
    assert!(results.variable("V(out)").unwrap().is_complex());
}

#[test]
fn test_missing_node_lists_available_variables() {
    let results = scenario_b();
    let err = results.voltage("missing").unwrap_err();
    match &err {
        OhmspiceError::NodeNotFound { node, available } => {
            assert_eq!(node, "missing");
            assert_eq!(available, &vec!["frequency".to_string(), "V(out)".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(r#"["frequency", "V(out)"]"#));
}

#[test]
fn test_short_file_truncates_to_complete_points() {
    let variables = [("time", "time"), ("V(out)", "voltage"), ("I(R1)", "device_current")];
    let mut bytes = header_text("Transient Analysis", "real", &variables, 100).into_bytes();
    for i in 0..40 {
        let t = i as f64 * 1e-6;
        bytes.extend(encode_f64s(&[t, 2.0 * t, -t]));
    }
    // Half a record of trailing garbage
    bytes.extend_from_slice(&[0xFF; 12]);

    let results = SimulationResults::from_bytes(&bytes).expect("short file must not fail");
    assert_eq!(results.header().point_count, 100);
    assert_eq!(results.point_count(), 40);
    for name in ["time", "V(out)", "I(R1)"] {
        assert_eq!(results.variable(name).unwrap().len(), 40, "{name}");
    }
    assert_abs_diff_eq!(results.time().unwrap()[39], 39e-6, epsilon = 1e-18);
}

// ── Properties ────────────────────────────────────────────────────

#[test]
fn test_every_sequence_has_declared_length() {
    let variables = [
        ("time", "time"),
        ("V(a)", "voltage"),
        ("V(b)", "voltage"),
        ("I(V1)", "device_current"),
    ];
    let rows: Vec<Vec<f64>> = (0..17)
        .map(|i| (0..4).map(|j| (i * 4 + j) as f64).collect())
        .collect();
    let rows: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
    let results = SimulationResults::from_bytes(&real_raw(&variables, &rows)).unwrap();

    assert_eq!(results.store().len(), 4);
    for (_, signal) in results.store().iter() {
        assert_eq!(signal.len(), 17);
    }
}

#[test]
fn test_values_decode_bit_exact() {
    let tricky = [
        0.1,
        -0.0,
        f64::MIN_POSITIVE,
        f64::MAX,
        1.0 / 3.0,
        std::f64::consts::PI,
        -2.5e-300,
        f64::EPSILON,
    ];
    let rows: Vec<[f64; 2]> = tricky.iter().enumerate().map(|(i, v)| [i as f64, *v]).collect();
    let rows: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
    let bytes = real_raw(&[("time", "time"), ("V(x)", "voltage")], &rows);

    let results = SimulationResults::from_bytes(&bytes).unwrap();
    let Signal::Real(decoded) = results.variable("V(x)").unwrap() else {
        panic!("expected real signal");
    };
    for (got, want) in decoded.iter().zip(tricky) {
        assert_eq!(got.to_bits(), want.to_bits());
    }
}

#[test]
fn test_truncation_at_every_point_boundary() {
    let full = real_raw(
        &[("time", "time"), ("V(out)", "voltage")],
        &[&[0.0, 1.0], &[1.0, 2.0], &[2.0, 3.0], &[3.0, 4.0]],
    );
    let body_start = full.len() - 4 * 16;
    for cut in body_start..full.len() {
        let results = SimulationResults::from_bytes(&full[..cut]).unwrap();
        let k = (cut - body_start) / 16;
        assert_eq!(results.point_count(), k);
        assert_eq!(results.voltage("out").unwrap().len(), k);
    }
}

#[test]
fn test_voltage_name_variants_resolve_identically() {
    for key in ["V(out)", "v(OUT)", "V(OUT)", "v(out)", "out"] {
        let bytes = real_raw(&[("time", "time"), (key, "voltage")], &[&[0.0, 3.3], &[1.0, 1.1]]);
        let results = SimulationResults::from_bytes(&bytes).unwrap();
        assert_eq!(results.voltage("out").unwrap(), vec![3.3, 1.1], "key {key}");
    }
}

#[test]
fn test_phase_on_real_data_fails() {
    let bytes = real_raw(&[("time", "time"), ("V(out)", "voltage")], &[&[0.0, 1.0]]);
    let results = SimulationResults::from_bytes(&bytes).unwrap();
    assert!(matches!(
        results.phase("out"),
        Err(OhmspiceError::NotComplexData(node)) if node == "out"
    ));
    assert!(matches!(
        results.phase("nowhere"),
        Err(OhmspiceError::NodeNotFound { .. })
    ));
}

// ── Header variants ───────────────────────────────────────────────

#[test]
fn test_utf16_header() {
    let header = header_text("Transient Analysis", "real", &[("time", "time"), ("V(n1)", "voltage")], 2);
    let mut bytes: Vec<u8> = header.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    bytes.extend(encode_f64s(&[0.0, 5.0, 1e-3, 4.0]));

    let results = SimulationResults::from_bytes(&bytes).unwrap();
    assert_eq!(results.raw().encoding(), ohmspice::HeaderEncoding::Utf16Le);
    assert_eq!(results.time().unwrap(), vec![0.0, 1e-3]);
    assert_eq!(results.voltage("N1").unwrap(), vec![5.0, 4.0]);
}

#[test]
fn test_ascii_values_section() {
    let text = "\
Title: * ascii
Plotname: AC Analysis
Flags: complex
No. Variables: 2
No. Points: 2
Variables:
\t0\tfrequency\tfrequency
\t1\tv(out)\tvoltage
Values:
 0\t1.000000e+00,0.000000e+00
\t0.000000e+00,-2.000000e+00

 1\t1.000000e+01,0.000000e+00
\t1.000000e+00,1.000000e+00
";
    let results = SimulationResults::from_bytes(text.as_bytes()).unwrap();
    assert_eq!(results.raw().format(), ohmspice::DataFormat::Ascii);
    assert_eq!(results.frequency().unwrap(), vec![1.0, 10.0]);
    let phase = results.phase("out").unwrap();
    assert_abs_diff_eq!(phase[0], -90.0, epsilon = 1e-12);
    assert_abs_diff_eq!(phase[1], 45.0, epsilon = 1e-12);
}

#[test]
fn test_inflated_counts_truncate_instead_of_aborting() {
    let text = "\
Plotname: Transient Analysis
Flags: real
No. Variables: 2
No. Points: 100000000000000
Variables:
\t0\ttime\ttime
\t1\tV(out)\tvoltage
Values:
 0 0.0 1.0
 1 1.0 2.0
";
    let results = SimulationResults::from_bytes(text.as_bytes()).unwrap();
    assert_eq!(results.point_count(), 2);
    assert_eq!(results.voltage("out").unwrap(), vec![1.0, 2.0]);

    let mut bytes = b"Plotname: Transient Analysis\nFlags: real\nNo. Variables: 100000000000000\n\
No. Points: 1\nVariables:\n\t0\ttime\ttime\nBinary:\n"
        .to_vec();
    bytes.extend(encode_f64s(&[1.0]));
    let results = SimulationResults::from_bytes(&bytes).unwrap();
    assert!(results.variables().len() < 100);
    assert_eq!(results.point_count(), 0);
}

#[test]
fn test_missing_marker_is_fatal() {
    let err = SimulationResults::from_bytes(b"Title: x\nNo. Points: 3\n").unwrap_err();
    assert!(matches!(err, OhmspiceError::HeaderMarkerNotFound));
}

#[test]
fn test_zero_points_gives_empty_store() {
    let bytes = real_raw(&[("time", "time"), ("V(out)", "voltage")], &[]);
    let results = SimulationResults::from_bytes(&bytes).unwrap();
    assert!(results.store().is_empty());
    assert_eq!(results.point_count(), 0);
    assert!(matches!(results.time(), Err(OhmspiceError::NoTimeData)));
}

#[test]
fn test_missing_variable_count_decodes_nothing() {
    let mut bytes = b"Plotname: Transient Analysis\nFlags: real\nNo. Points: 1\nVariables:\n\t0\ttime\ttime\nBinary:\n".to_vec();
    bytes.extend(encode_f64s(&[1.0]));
    let results = SimulationResults::from_bytes(&bytes).unwrap();
    assert!(results.variables().is_empty());
    assert!(results.variable_names().is_empty());
}

#[test]
fn test_results_shared_across_threads() {
    let results = std::sync::Arc::new(scenario_b());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let results = std::sync::Arc::clone(&results);
            std::thread::spawn(move || results.voltage("out").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 2);
    }
}
