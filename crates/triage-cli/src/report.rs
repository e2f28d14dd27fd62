//! Rendering of triage verdicts for humans.

use std::io::{self, Write};

use triage_core::{ClassificationResult, LogLine, RuleCatalog};
use triage_drone::StepVerdict;

/// One line per classified step, or a header plus the full log when no
/// signature matched.
pub fn write_step_verdict(out: &mut impl Write, verdict: &StepVerdict) -> io::Result<()> {
    let subject = format!("Drone build {}", verdict.build);
    write_result(out, &subject, &verdict.result, &verdict.logs)
}

pub fn write_result(
    out: &mut impl Write,
    subject: &str,
    result: &ClassificationResult,
    logs: &[LogLine],
) -> io::Result<()> {
    if result.matched {
        writeln!(out, "{} failed due to {}", subject, result.summary())
    } else {
        writeln!(out, "{} failed with unknown error. Dumping logs:", subject)?;
        write_dump(out, logs)
    }
}

/// Every line, in original order. Messages that already carry their line
/// terminator are written as-is.
pub fn write_dump(out: &mut impl Write, logs: &[LogLine]) -> io::Result<()> {
    for line in logs {
        if line.message.ends_with('\n') {
            write!(out, "{}", line.message)?;
        } else {
            writeln!(out, "{}", line.message)?;
        }
    }
    Ok(())
}

/// The catalog in priority order.
pub fn write_rules(out: &mut impl Write, catalog: &RuleCatalog) -> io::Result<()> {
    for (position, rule) in catalog.rules().iter().enumerate() {
        let flow = if rule.terminal { "" } else { ", non-terminal" };
        writeln!(
            out,
            "{:>3}. {} [{}{}] {}",
            position + 1,
            rule.name,
            rule.matcher.kind(),
            flow,
            rule.label
        )?;
    }
    Ok(())
}
