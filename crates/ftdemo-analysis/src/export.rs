//! Whitespace-separated `.dat` tables for external plotting tools.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{DiffSeries, FamilySummary, RawPoint};
use crate::calibration::CalibrationSummary;
use crate::error::AnalysisResult;

fn conf_column(confidence: f64) -> String {
    format!("conf_int{}", (confidence * 100.0).round() as u32)
}

fn write_table(path: PathBuf, content: String) -> AnalysisResult<PathBuf> {
    std::fs::write(&path, content)?;
    info!(path = %path.display(), "table written");
    Ok(path)
}

/// `<family>.dat`: `index stat_dist conf_int<c>`.
pub fn write_family_table(dir: &Path, summary: &FamilySummary, confidence: f64) -> AnalysisResult<PathBuf> {
    let mut out = format!("index stat_dist {}\n", conf_column(confidence));
    for p in &summary.points {
        let _ = writeln!(out, "{} {} {}", p.index, p.mean, p.conf_int);
    }
    write_table(dir.join(format!("{}.dat", summary.family.file_stem())), out)
}

/// `<family>-<baseline>.dat`: `index stat_dist_diff conf_int<c>`.
pub fn write_diff_table(dir: &Path, series: &DiffSeries, confidence: f64) -> AnalysisResult<PathBuf> {
    let mut out = format!("index stat_dist_diff {}\n", conf_column(confidence));
    for p in &series.points {
        let _ = writeln!(out, "{} {} {}", p.index, p.diff, p.conf_int);
    }
    let name = format!("{}-{}.dat", series.family.file_stem(), series.baseline.file_stem());
    write_table(dir.join(name), out)
}

/// `<family>_qasm_count.dat`: `index qasm_count`.
pub fn write_qasm_counts(dir: &Path, summary: &FamilySummary) -> AnalysisResult<PathBuf> {
    let mut out = String::from("index qasm_count\n");
    for p in &summary.points {
        let _ = writeln!(out, "{} {}", p.index, p.qasm_count);
    }
    write_table(dir.join(format!("{}_qasm_count.dat", summary.family.file_stem())), out)
}

/// `raw_points.dat`: `qasm_count stat_dist` for every logged run.
pub fn write_raw_points(dir: &Path, points: &[RawPoint]) -> AnalysisResult<PathBuf> {
    let mut out = String::from("qasm_count stat_dist\n");
    for p in points {
        let _ = writeln!(out, "{} {}", p.qasm_count, p.stat_dist);
    }
    write_table(dir.join("raw_points.dat"), out)
}

/// `single_q.dat`, `multi_q.dat` and, when a temperature was reported,
/// `temp.dat`.
pub fn write_calibration(dir: &Path, summary: &CalibrationSummary) -> AnalysisResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    let mut single = String::from(
        "name T1 sigma(T1) T2 sigma(T2) gateError sigma(gateError) readoutError sigma(readoutError)\n",
    );
    for q in &summary.qubits {
        let _ = writeln!(
            single,
            "{} {} {} {} {} {} {} {} {}",
            q.name,
            q.t1.mean,
            q.t1.sigma,
            q.t2.mean,
            q.t2.sigma,
            q.gate_error.mean,
            q.gate_error.sigma,
            q.readout_error.mean,
            q.readout_error.sigma
        );
    }
    written.push(write_table(dir.join("single_q.dat"), single)?);

    let mut multi = String::from("qubits gateError sigma(gateError)\n");
    for c in &summary.couplings {
        let _ = writeln!(
            multi,
            "{}-{} {} {}",
            c.qubits[0], c.qubits[1], c.gate_error.mean, c.gate_error.sigma
        );
    }
    written.push(write_table(dir.join("multi_q.dat"), multi)?);

    if let Some(t) = summary.temperature {
        written.push(write_table(
            dir.join("temp.dat"),
            format!("T sigma(T)\n{} {}\n", t.mean, t.sigma),
        )?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{DiffPoint, Family, PointSummary};
    use crate::calibration::{CouplingSummary, Estimate};
    use ftdemo_catalog::{EncodingVersion, InitialState, QubitPair, SpecId};

    fn summary() -> FamilySummary {
        FamilySummary {
            family: Family::Bare(QubitPair::new(1, 0).unwrap()),
            points: vec![PointSummary {
                index: 1,
                spec: SpecId(19),
                runs: 3,
                mean: 0.25,
                std_dev: 0.1,
                conf_int: 0.5,
                qasm_count: 5,
                post_selection: 1.0,
            }],
        }
    }

    #[test]
    fn test_family_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_family_table(dir.path(), &summary(), 0.99).unwrap();
        assert_eq!(path.file_name().unwrap(), "bare_1-0.dat");
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "index stat_dist conf_int99\n1 0.25 0.5\n");

        let path = write_qasm_counts(dir.path(), &summary()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "index qasm_count\n1 5\n");
    }

    #[test]
    fn test_diff_table() {
        let dir = tempfile::tempdir().unwrap();
        let series = DiffSeries {
            family: Family::Encoded(InitialState::Zero, Some(EncodingVersion::Ftv2)),
            baseline: Family::Bare(QubitPair::new(2, 0).unwrap()),
            points: vec![DiffPoint {
                index: 4,
                diff: -0.125,
                conf_int: 0.0,
            }],
        };
        let path = write_diff_table(dir.path(), &series, 0.95).unwrap();
        assert_eq!(path.file_name().unwrap(), "encoded_00_ftv2-bare_2-0.dat");
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "index stat_dist_diff conf_int95\n4 -0.125 0\n"
        );
    }

    #[test]
    fn test_raw_points() {
        let dir = tempfile::tempdir().unwrap();
        let points = [RawPoint {
            name: "bM|00>[1, 0]".to_string(),
            qasm_count: 12,
            stat_dist: 0.5,
        }];
        let path = write_raw_points(dir.path(), &points).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "qasm_count stat_dist\n12 0.5\n");
    }

    #[test]
    fn test_calibration_tables() {
        let dir = tempfile::tempdir().unwrap();
        let summary = CalibrationSummary {
            runs: 2,
            qubits: vec![],
            couplings: vec![CouplingSummary {
                qubits: [1, 0],
                gate_error: Estimate { mean: 0.5, sigma: 0.25 },
            }],
            temperature: None,
        };
        let written = write_calibration(dir.path(), &summary).unwrap();
        assert_eq!(written.len(), 2);
        let multi = std::fs::read_to_string(dir.path().join("multi_q.dat")).unwrap();
        assert_eq!(multi, "qubits gateError sigma(gateError)\n1-0 0.5 0.25\n");
    }
}
