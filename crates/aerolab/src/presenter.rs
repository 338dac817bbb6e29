//! Terminal output for one-shot analyses.

use std::io::{self, Write};

use aerolab_core::constants::coefficients;
use aerolab_core::Advisory;
use aerolab_orchestration::AnalysisOutcome;
use aerolab_server::AnalysisResponse;

/// Write the outcome as pretty JSON, in the same shape the HTTP API returns.
pub fn write_json(out: &mut dyn Write, outcome: AnalysisOutcome) -> io::Result<()> {
    let response = AnalysisResponse::from(outcome);
    serde_json::to_writer_pretty(&mut *out, &response)?;
    writeln!(out)
}

/// Write a human-readable report.
pub fn write_report(out: &mut dyn Write, outcome: &AnalysisOutcome, quiet: bool) -> io::Result<()> {
    let result = &outcome.result;
    if quiet {
        for label in coefficients::ALL {
            if let Some(value) = result.coefficients.get(label) {
                writeln!(out, "{label} {value:.5}")?;
            }
        }
        return Ok(());
    }

    writeln!(
        out,
        "Reynolds: {}  Alpha: {} deg",
        outcome.flow.reynolds(),
        outcome.flow.alpha()
    )?;
    writeln!(out, "Points: {}", outcome.airfoil.len())?;
    writeln!(out, "Fidelity: {}", result.fidelity)?;
    for label in coefficients::ALL {
        if let Some(value) = result.coefficients.get(label) {
            writeln!(out, "  {label:<4} {value:>10.5}")?;
        }
    }
    if let Some(ld) = outcome.summary.lift_to_drag {
        writeln!(out, "  L/D  {ld:>10.2}")?;
    }
    for advisory in &outcome.summary.advisories {
        writeln!(out, "Note: {}", advisory_text(*advisory))?;
    }
    for attempt in &outcome.attempts {
        let status = attempt.detail.as_deref().unwrap_or("ok");
        writeln!(
            out,
            "  attempt {:<18} {:>8.2?} {status}",
            attempt.mode.as_str(),
            attempt.elapsed
        )?;
    }
    Ok(())
}

fn advisory_text(advisory: Advisory) -> &'static str {
    match advisory {
        Advisory::NegativeLift => "negative lift (downforce)",
        Advisory::NearZeroLift => "lift is near zero, L/D not meaningful",
        Advisory::PossibleStall => "low lift at high angle of attack, possible stall",
        Advisory::ReducedFidelity => "inviscid result, drag is not physically meaningful",
    }
}
