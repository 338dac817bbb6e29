//! Parsing of solver console output and pressure files.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use aerolab_core::constants::coefficients::{CD, CDF, CDP, CL, CM};
use aerolab_core::{FidelityTag, PressureSample, SolverResult};
use tracing::{debug, warn};

use crate::error::AttemptError;

/// Marker the solver prints when the viscous iteration gives up.
pub const CONVERGENCE_FAILURE_MARKER: &str = "Convergence failed";

/// Turns raw solver output into a [`SolverResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultExtractor;

impl ResultExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract a result from captured stdout and the pressure file.
    ///
    /// Checks run in a fixed order: an explicit convergence failure, then a
    /// missing lift coefficient, then missing pressure rows.
    pub fn extract(
        &self,
        stdout: &str,
        pressure_path: &Path,
        fidelity: FidelityTag,
    ) -> Result<SolverResult, AttemptError> {
        if reports_convergence_failure(stdout) {
            return Err(AttemptError::ConvergenceFailure);
        }

        let coefficients = parse_coefficients(stdout);
        if !coefficients.contains_key(CL) {
            return Err(AttemptError::MissingCoefficients);
        }

        let pressure = read_pressure_file(pressure_path)?;
        if pressure.is_empty() {
            return Err(AttemptError::MissingPressureData);
        }

        debug!(
            coefficients = coefficients.len(),
            pressure_rows = pressure.len(),
            %fidelity,
            "Extracted solver result"
        );

        Ok(SolverResult {
            pressure,
            coefficients,
            fidelity,
        })
    }
}

/// Whether the solver reported a convergence failure anywhere in `stdout`.
#[must_use]
pub fn reports_convergence_failure(stdout: &str) -> bool {
    stdout.contains(CONVERGENCE_FAILURE_MARKER)
}

/// Collect `LABEL = value` pairs for the known coefficient labels.
///
/// Labels match whole identifiers only, so `CD` is never read out of `CDp`.
/// The solver prints a line per iteration; the last value wins.
#[must_use]
pub fn parse_coefficients(stdout: &str) -> BTreeMap<String, f64> {
    let mut found = BTreeMap::new();
    let bytes = stdout.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !is_ident(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_ident(bytes[i]) {
            i += 1;
        }
        let Some(label) = canonical_label(&stdout[start..i]) else {
            continue;
        };
        if let Some(value) = value_after_equals(&stdout[i..]) {
            found.insert(label.to_string(), value);
        }
    }
    found
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn canonical_label(ident: &str) -> Option<&'static str> {
    match ident {
        "CL" => Some(CL),
        "CD" => Some(CD),
        "CDp" => Some(CDP),
        "CDf" => Some(CDF),
        "CM" | "Cm" => Some(CM),
        _ => None,
    }
}

/// Parse `= <number>` at the start of `rest`, ignoring surrounding blanks.
fn value_after_equals(rest: &str) -> Option<f64> {
    let rest = rest.trim_start_matches([' ', '\t']).strip_prefix('=')?;
    leading_number(rest.trim_start_matches([' ', '\t']))
}

/// Longest numeric prefix of `s`. Overflow markers such as `*****` yield `None`.
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .find(|c: char| !matches!(c, '0'..='9' | '+' | '-' | '.' | 'e' | 'E'))
        .unwrap_or(s.len());
    let token = &s[..end];
    (1..=token.len())
        .rev()
        .find_map(|n| token[..n].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Read a pressure file. A file that does not exist yields no rows.
pub fn read_pressure_file(path: &Path) -> Result<Vec<PressureSample>, AttemptError> {
    match fs::read(path) {
        Ok(bytes) => Ok(parse_pressure_rows(&String::from_utf8_lossy(&bytes))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Solver wrote no pressure file");
            Ok(Vec::new())
        }
        Err(err) => Err(AttemptError::WorkDir(err)),
    }
}

/// Parse pressure rows.
///
/// Rows with letters or a leading `#` are headers. Two columns are `x Cp`;
/// wider rows are `x y Cp` and keep the first and last columns.
#[must_use]
pub fn parse_pressure_rows(text: &str) -> Vec<PressureSample> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.chars().any(char::is_alphabetic) {
                return None;
            }
            let cols: Vec<f64> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .ok()?;
            match cols.as_slice() {
                [x, .., cp] if x.is_finite() && cp.is_finite() => {
                    Some(PressureSample { x: *x, cp: *cp })
                }
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VISCOUS_OUTPUT: &str = "\
 Side 1  free  transition at x/c =  0.5123   42
 Side 2  free  transition at x/c =  0.9811   44

   1   rms: 0.1234E-01   max: -0.5432E+00   D at   87  2
       a =  5.000      CL =  0.7901
      Cm = -0.0520     CD =  0.00901   =>   CDf =  0.00560    CDp =  0.00341

  12   rms: 0.4321E-05   max:  0.1111E-03   C at   12  1
       a =  5.000      CL =  0.8012
      Cm = -0.0536     CD =  0.00823   =>   CDf =  0.00541    CDp =  0.00282
";

    #[test]
    fn last_occurrence_wins() {
        let c = parse_coefficients(VISCOUS_OUTPUT);
        assert_eq!(c.get(CL), Some(&0.8012));
        assert_eq!(c.get(CD), Some(&0.00823));
        assert_eq!(c.get(CDF), Some(&0.00541));
        assert_eq!(c.get(CDP), Some(&0.00282));
        assert_eq!(c.get(CM), Some(&-0.0536));
        assert_eq!(c.len(), 5);
    }

    #[test]
    fn cd_is_not_read_from_cdp() {
        let c = parse_coefficients("CL = 0.5\nCDp = 0.004\n");
        assert_eq!(c.get(CDP), Some(&0.004));
        assert!(!c.contains_key(CD));
    }

    #[test]
    fn labels_inside_words_are_ignored() {
        let c = parse_coefficients("XCL = 9.0\nCLmax = 1.5\nCL = 0.25\n");
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(CL), Some(&0.25));
    }

    #[test]
    fn overflowed_values_are_skipped() {
        let c = parse_coefficients("CL =  0.3000\nCD = ********\n");
        assert_eq!(c.get(CL), Some(&0.3));
        assert!(!c.contains_key(CD));
    }

    #[test]
    fn exponent_values() {
        let c = parse_coefficients("CL = 1.5E-01 CD=2e-3");
        assert_eq!(c.get(CL), Some(&0.15));
        assert_eq!(c.get(CD), Some(&0.002));
    }

    #[test]
    fn pressure_rows_two_and_three_columns() {
        let text = "# x Cp\n  1.00000   0.19573\n  0.50000  -0.41000\n\
                    #    x        y        Cp\n  0.00000  0.00000  1.00000\n";
        let rows = parse_pressure_rows(text);
        assert_eq!(
            rows,
            vec![
                PressureSample { x: 1.0, cp: 0.19573 },
                PressureSample { x: 0.5, cp: -0.41 },
                PressureSample { x: 0.0, cp: 1.0 },
            ]
        );
    }

    #[test]
    fn pressure_headers_and_junk_skipped() {
        let text = "NACA 0012\nAlfa = 5.0\n\n1.0\n0.5 0.1\n0.4 0.2 x\n";
        let rows = parse_pressure_rows(text);
        assert_eq!(rows, vec![PressureSample { x: 0.5, cp: 0.1 }]);
    }

    #[test]
    fn convergence_failure_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let out = format!("{VISCOUS_OUTPUT}\n VISCAL:  Convergence failed\n");
        let err = ResultExtractor::new()
            .extract(&out, &dir.path().join("cp.txt"), FidelityTag::Viscous)
            .unwrap_err();
        assert!(matches!(err, AttemptError::ConvergenceFailure));
    }

    #[test]
    fn missing_lift_coefficient() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultExtractor::new()
            .extract("CD = 0.01\n", &dir.path().join("cp.txt"), FidelityTag::Viscous)
            .unwrap_err();
        assert!(matches!(err, AttemptError::MissingCoefficients));
    }

    #[test]
    fn missing_pressure_file_is_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResultExtractor::new()
            .extract(VISCOUS_OUTPUT, &dir.path().join("cp.txt"), FidelityTag::Viscous)
            .unwrap_err();
        assert!(matches!(err, AttemptError::MissingPressureData));
    }

    #[test]
    fn header_only_pressure_file_is_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.txt");
        fs::write(&path, "#  x  Cp\n").unwrap();
        let err = ResultExtractor::new()
            .extract(VISCOUS_OUTPUT, &path, FidelityTag::Viscous)
            .unwrap_err();
        assert!(matches!(err, AttemptError::MissingPressureData));
    }

    #[test]
    fn full_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp.txt");
        fs::write(&path, "#  x  Cp\n 1.0 0.2\n 0.0 1.0\n 1.0 0.1\n").unwrap();
        let result = ResultExtractor::new()
            .extract(VISCOUS_OUTPUT, &path, FidelityTag::Viscous)
            .unwrap();
        assert_eq!(result.pressure.len(), 3);
        assert_eq!(result.cl(), Some(0.8012));
        assert_eq!(result.fidelity, FidelityTag::Viscous);
    }
}
