#![no_main]

use libfuzzer_sys::fuzz_target;

use aerolab_solver::extractor::{parse_coefficients, parse_pressure_rows};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    // Should not panic
    let coefficients = parse_coefficients(&text);
    assert!(coefficients.values().all(|v| v.is_finite()));

    let rows = parse_pressure_rows(&text);
    assert!(rows.len() <= text.lines().count());
});
