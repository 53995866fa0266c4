//! External ngspice adapter.
//!
//! Per this crate's scope, launching ngspice itself (subprocess invocation, `.cir`/output file
//! paths, interactive-vs-batch mode) is an external collaborator's job; this module's only
//! contract is producing the `.cir` source ngspice expects and parsing the two-column time-series
//! data file it produces in batch mode.
use crate::{Netlist, Node};
use indexmap::IndexMap;
use std::rc::Rc;
use thiserror::Error;

/// Column width (in characters) ngspice uses for each value in its fixed-width batch output.
const COLUMN_WIDTH: usize = 16;

#[derive(Debug, Error)]
pub enum SpiceError {
    #[error("spice output line has {actual} characters, expected a multiple of {expected}")]
    MalformedLine { actual: usize, expected: usize },

    #[error("spice output line's time/index columns disagree within one row")]
    InconsistentTimeColumn,

    #[error("spice output rows are not sorted by time")]
    UnsortedOutput,

    #[error("no data within tolerance of requested time {requested}")]
    NoDataNearTime { requested: f64 },
}

/// Renders a `.title`/device-line/`.control tran`/`.endc` ngspice script for `netlist`, PWL-driving
/// `inputs` and plotting `output_nodes`.
pub fn make_spice_script(
    title: &str,
    netlist: &Netlist,
    inputs: &[(Rc<Node>, Vec<(f64, f64)>)],
    output_nodes: &[Rc<Node>],
    supply_voltage: f64,
    time_step: &str,
    time_stop: &str,
) -> String {
    let mut segments = Vec::new();
    segments.push(format!(".title {title}"));
    segments.push(".option TEMP=25C".to_string());
    segments.push(".include 2N7000.mod".to_string());
    segments.push(format!("Vdd vdd gnd dc {supply_voltage}"));

    let mut comp_id = 1;
    for atomic in netlist.atomic_devices() {
        let port_mapping: IndexMap<String, String> = atomic
            .ports()
            .iter()
            .map(|(name, node)| (name.clone(), format!("n{}", netlist.group_id(node))))
            .collect();
        segments.push(atomic.ngspice_line(comp_id, &port_mapping));
        comp_id += 1;
    }

    for (node, points) in inputs {
        let piecewise = points
            .iter()
            .map(|(t, v)| format!("{t}us {v}"))
            .collect::<Vec<_>>()
            .join(" ");
        segments.push(format!(
            "V{comp_id} n{} gnd PWL({piecewise})",
            netlist.group_id(node)
        ));
        comp_id += 1;
    }

    segments.push(".control".to_string());
    segments.push(format!("tran {time_step} {time_stop}"));

    let plot_targets = output_nodes
        .iter()
        .map(|n| format!("v(n{})", netlist.group_id(n)))
        .collect::<Vec<_>>()
        .join(" ");
    segments.push(format!("plot {plot_targets}"));
    segments.push("print".to_string());
    segments.push(".endc".to_string());
    segments.push(".end".to_string());

    segments.join("\n")
}

/// One row of a parsed ngspice batch-mode data file: a time and one value per plotted output.
pub type SpiceSample = (f64, Vec<f64>);

/// Parses ngspice's fixed-width two-column-per-output batch data file (the header row is
/// discarded; each output contributes a redundant time column that must agree with the others in
/// its row).
pub fn parse_spice_output(data: &str, num_outputs: usize) -> Result<Vec<SpiceSample>, SpiceError> {
    let lines: Vec<&str> = data.lines().filter(|l| !l.is_empty()).collect();
    let lines = if lines.is_empty() { &lines[..] } else { &lines[1..] };

    let expected_len = 2 * COLUMN_WIDTH * num_outputs;
    let mut samples = Vec::with_capacity(lines.len());

    for line in lines {
        if line.len() != expected_len {
            return Err(SpiceError::MalformedLine {
                actual: line.len(),
                expected: expected_len,
            });
        }

        let columns: Vec<f64> = (0..num_outputs * 2)
            .map(|i| {
                line[i * COLUMN_WIDTH..(i + 1) * COLUMN_WIDTH]
                    .trim()
                    .parse::<f64>()
                    .unwrap_or(f64::NAN)
            })
            .collect();

        let time = columns[0];
        if columns.iter().step_by(2).any(|&t| (t - time).abs() > f64::EPSILON) {
            return Err(SpiceError::InconsistentTimeColumn);
        }

        let values: Vec<f64> = columns.iter().skip(1).step_by(2).copied().collect();
        samples.push((time, values));
    }

    if !samples.windows(2).all(|w| w[0].0 <= w[1].0) {
        return Err(SpiceError::UnsortedOutput);
    }

    Ok(samples)
}

/// ngspice emits native time in seconds regardless of the `us` suffix used on PWL inputs; rows
/// within this tolerance of a requested time are considered a match.
const REQUIRED_INCREMENT_S: f64 = 20e-9;

/// Binary-searches `samples` for the row nearest `required_time` (seconds), returning its values
/// keyed by `output_names` in order.
pub fn find_output_at_time(
    samples: &[SpiceSample],
    output_names: &[String],
    required_time: f64,
) -> Result<IndexMap<String, f64>, SpiceError> {
    if samples.is_empty() {
        return Err(SpiceError::NoDataNearTime { requested: required_time });
    }

    let mut start = 0usize;
    let mut end = samples.len();
    while start + 1 < end {
        let mid = (start + end) / 2;
        if samples[mid].0 < required_time {
            start = mid;
        } else {
            end = mid;
        }
    }

    let closest = if end < samples.len()
        && (samples[end].0 - required_time).abs() < (samples[start].0 - required_time).abs()
    {
        end
    } else {
        start
    };

    if (samples[closest].0 - required_time).abs() > REQUIRED_INCREMENT_S {
        return Err(SpiceError::NoDataNearTime { requested: required_time });
    }

    Ok(output_names
        .iter()
        .cloned()
        .zip(samples[closest].1.iter().copied())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_column_rows() {
        let header = "Index   time            v(n1)\n";
        let row = format!("{:>16}{:>16}\n", "0.000000e+00", "5.000000e+00");
        let data = format!("{header}{row}");
        let samples = parse_spice_output(&data, 1).unwrap();
        assert_eq!(samples.len(), 1);
        assert!((samples[0].0 - 0.0).abs() < 1e-12);
        assert!((samples[0].1[0] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_width() {
        let data = "header\nshort\n";
        assert!(parse_spice_output(data, 1).is_err());
    }
}
