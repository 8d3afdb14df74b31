//! SVG figures of aggregated and single-run results.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use ftdemo_catalog::ExperimentCatalog;

use crate::aggregate::{Aggregation, DiffSeries, Family};
use crate::decode::OUTCOME_LABELS;
use crate::error::{AnalysisError, AnalysisResult};
use crate::stats::DecodedStats;
use crate::tdist::{check_confidence, normal_quantile};

const SIZE: (u32, u32) = (1400, 900);
const LOG_FLOOR: f64 = 1e-4;

const PALETTE: [RGBColor; 11] = [
    RGBColor(31, 120, 180),
    RGBColor(227, 26, 28),
    RGBColor(106, 61, 154),
    RGBColor(177, 89, 40),
    RGBColor(251, 154, 153),
    RGBColor(166, 206, 227),
    RGBColor(253, 191, 111),
    RGBColor(255, 127, 0),
    RGBColor(51, 160, 44),
    RGBColor(178, 223, 138),
    RGBColor(202, 178, 214),
];

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

fn plot_error(e: Box<dyn Error>) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

fn tick_label(catalog: &ExperimentCatalog, x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 1.0 {
        return String::new();
    }
    catalog
        .display_order()
        .get(index as usize - 1)
        .and_then(|&id| catalog.spec(id))
        .map(|spec| spec.label()[1..].to_string())
        .unwrap_or_default()
}

/// Mean statistical distance per experiment for each of `families`, with
/// confidence error bars and the operation count of the first family on a
/// secondary axis.
pub fn plot_comparison(
    path: &Path,
    aggregation: &Aggregation,
    catalog: &ExperimentCatalog,
    families: &[Family],
) -> AnalysisResult<()> {
    draw_comparison(path, aggregation, catalog, families).map_err(plot_error)?;
    info!(path = %path.display(), "comparison plot written");
    Ok(())
}

fn draw_comparison(
    path: &Path,
    aggregation: &Aggregation,
    catalog: &ExperimentCatalog,
    families: &[Family],
) -> Result<(), Box<dyn Error>> {
    let x_max = catalog.len() as f64 + 1.0;
    let max_ops = families
        .first()
        .and_then(|f| aggregation.family(f))
        .map_or(1, |s| s.points.iter().map(|p| p.qasm_count).max().unwrap_or(1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("All experiments", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(120)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, (LOG_FLOOR..1.0).log_scale())?
        .set_secondary_coord(0f64..x_max, 0f64..(max_ops as f64 * 1.1));

    chart
        .configure_mesh()
        .x_labels(catalog.len() + 2)
        .x_label_formatter(&|x| tick_label(catalog, *x))
        .y_desc("statistical distance")
        .draw()?;
    chart.configure_secondary_axes().y_desc("operation count").draw()?;

    for (i, family) in families.iter().enumerate() {
        let Some(summary) = aggregation.family(family) else {
            continue;
        };
        let c = color(i);
        let floor = |y: f64| y.max(LOG_FLOOR);
        chart.draw_series(summary.points.iter().map(|p| {
            PathElement::new(
                vec![
                    (p.index as f64, floor(p.mean - p.conf_int)),
                    (p.index as f64, floor(p.mean + p.conf_int)),
                ],
                c.stroke_width(2),
            )
        }))?;
        chart
            .draw_series(
                summary
                    .points
                    .iter()
                    .map(|p| Cross::new((p.index as f64, floor(p.mean)), 7, c.stroke_width(3))),
            )?
            .label(family.to_string())
            .legend(move |(x, y)| Cross::new((x + 10, y), 5, c.stroke_width(2)));
    }

    if let Some(summary) = families.first().and_then(|f| aggregation.family(f)) {
        chart
            .draw_secondary_series(LineSeries::new(
                summary.points.iter().map(|p| (p.index as f64, p.qasm_count as f64)),
                &BLACK,
            ))?
            .label("operation count")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Difference of each encoded family to its baseline, per experiment.
pub fn plot_difference(path: &Path, series: &[DiffSeries], catalog: &ExperimentCatalog) -> AnalysisResult<()> {
    draw_difference(path, series, catalog).map_err(plot_error)?;
    info!(path = %path.display(), "difference plot written");
    Ok(())
}

fn draw_difference(path: &Path, series: &[DiffSeries], catalog: &ExperimentCatalog) -> Result<(), Box<dyn Error>> {
    let x_max = catalog.len() as f64 + 1.0;
    let (mut lo, mut hi) = (-0.05f64, 0.05f64);
    for p in series.iter().flat_map(|s| &s.points) {
        lo = lo.min(p.diff - p.conf_int);
        hi = hi.max(p.diff + p.conf_int);
    }
    let pad = 0.05 * (hi - lo);
    let caption = series.first().map_or_else(
        || "Encoded circuits".to_string(),
        |s| format!("Encoded circuits compared to {}", s.baseline),
    );

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(120)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, (lo - pad)..(hi + pad))?;

    chart
        .configure_mesh()
        .x_labels(catalog.len() + 2)
        .x_label_formatter(&|x| tick_label(catalog, *x))
        .y_desc("statistical distance difference")
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(vec![(0.0, 0.0), (x_max, 0.0)], RED)))?;

    // colors follow the family position among the standard families
    for (i, s) in series.iter().enumerate() {
        let c = color(i + 6);
        chart.draw_series(s.points.iter().map(|p| {
            PathElement::new(
                vec![
                    (p.index as f64, p.diff - p.conf_int),
                    (p.index as f64, p.diff + p.conf_int),
                ],
                c.stroke_width(2),
            )
        }))?;
        chart
            .draw_series(
                s.points
                    .iter()
                    .map(|p| Cross::new((p.index as f64, p.diff), 7, c.stroke_width(3))),
            )?
            .label(s.family.to_string())
            .legend(move |(x, y)| Cross::new((x + 10, y), 5, c.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Pick one logged run of experiment `label` at random for every family
/// that ran it.
pub fn select_random_runs<'a, R: Rng + ?Sized>(
    records: &'a [DecodedStats],
    catalog: &ExperimentCatalog,
    label: &str,
    rng: &mut R,
) -> AnalysisResult<Vec<(Family, &'a DecodedStats)>> {
    let spec = catalog
        .lookup(label)
        .ok_or_else(|| ftdemo_catalog::CatalogError::SpecNotFound(label.to_string()))?;
    let mut by_family: Vec<(Family, Vec<&DecodedStats>)> = Vec::new();
    for record in records {
        let family = match Family::resolve(&record.id, catalog) {
            Some((family, id)) if id == spec => family,
            _ => continue,
        };
        match by_family.iter_mut().find(|(f, _)| *f == family) {
            Some((_, runs)) => runs.push(record),
            None => by_family.push((family, vec![record])),
        }
    }
    if by_family.is_empty() {
        return Err(AnalysisError::InsufficientData(format!("no logged runs of {label}")));
    }
    by_family.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(by_family
        .into_iter()
        .filter_map(|(family, runs)| runs.choose(rng).map(|r| (family, *r)))
        .collect())
}

/// Bar chart of single runs against the expected distribution, with error
/// bars at the `confidence` normal quantile.
pub fn plot_single_run(
    path: &Path,
    label: &str,
    runs: &[(Family, &DecodedStats)],
    confidence: f64,
) -> AnalysisResult<()> {
    check_confidence(confidence)?;
    let z = normal_quantile(0.5 + confidence / 2.0)?;
    draw_single_run(path, label, runs, z).map_err(plot_error)?;
    info!(path = %path.display(), "single-run plot written");
    Ok(())
}

fn draw_single_run(path: &Path, label: &str, runs: &[(Family, &DecodedStats)], z: f64) -> Result<(), Box<dyn Error>> {
    let width = 1.0 / (runs.len() as f64 + 1.0);
    let root = SVGBackend::new(path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Performance on the circuit: {label}"), ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..4f64, 0f64..1.05f64)?;

    let center = (runs.len() as f64 - 1.0) * width / 2.0 + width / 2.0;
    chart
        .configure_mesh()
        .x_labels(9)
        .x_label_formatter(&|x| {
            let k = (x - center).round();
            if (x - center - k).abs() < 1e-6 && (0.0..4.0).contains(&k) {
                OUTCOME_LABELS[k as usize].to_string()
            } else {
                String::new()
            }
        })
        .y_desc("frequency")
        .draw()?;

    for (j, (family, stats)) in runs.iter().enumerate() {
        let c = color(j);
        let left = |k: usize| k as f64 + j as f64 * width;
        chart
            .draw_series((0..4).map(|k| {
                Rectangle::new(
                    [(left(k), 0.0), (left(k) + width, stats.experimental[k])],
                    c.filled(),
                )
            }))?
            .label(format!(
                "{family} (stat dist: {:.4} - r: {:.3})",
                stats.stat_dist, stats.post_selection_ratio
            ))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], c.filled()));
        chart.draw_series((0..4).map(|k| {
            let x = left(k) + width / 2.0;
            let e = stats.stand_dev[k] * z;
            PathElement::new(
                vec![(x, (stats.experimental[k] - e).max(0.0)), (x, stats.experimental[k] + e)],
                BLACK.stroke_width(2),
            )
        }))?;
    }

    if let Some((_, first)) = runs.first() {
        let span = runs.len() as f64 * width;
        chart
            .draw_series((0..4).map(|k| {
                Rectangle::new(
                    [(k as f64, 0.0), (k as f64 + span, first.expected[k])],
                    BLACK.stroke_width(1),
                )
            }))?
            .label("expected")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], BLACK.stroke_width(1)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DEFAULT_CONFIDENCE;
    use crate::decode::DecodedCounts;
    use crate::stats::RunContext;
    use chrono::Utc;
    use ftdemo_catalog::{CircuitId, EncodingVersion, QubitPair};
    use ftdemo_hal::{Calibration, Counts};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn records(catalog: &ExperimentCatalog) -> Vec<DecodedStats> {
        let spec = catalog.lookup("MX1|00>").unwrap();
        let ids = [
            CircuitId::bare(spec, "MX1|00>", QubitPair::new(1, 0).unwrap()),
            CircuitId::encoded(spec, "MX1|00>", Some(EncodingVersion::Ftv1)),
        ];
        let mut out = Vec::new();
        for id in &ids {
            for miss in [2, 5, 9] {
                out.push(
                    DecodedStats::compute(
                        RunContext {
                            id,
                            raw_counts: &Counts::new(),
                            qasm_count: 3,
                            expected: [0.0, 1.0, 0.0, 0.0],
                            calibration: &Calibration::default(),
                            date: Utc::now(),
                        },
                        DecodedCounts {
                            buckets: [miss, 100 - miss, 0, 0],
                            err: miss,
                            total_valid: 100,
                        },
                    )
                    .unwrap(),
                );
            }
        }
        out
    }

    #[test]
    fn test_tick_labels() {
        let catalog = ExperimentCatalog::standard().unwrap();
        assert_eq!(tick_label(&catalog, 1.0), "|00>");
        assert_eq!(tick_label(&catalog, 20.0), "X2-CZ-HHS-X1|00>");
        assert_eq!(tick_label(&catalog, 1.5), "");
        assert_eq!(tick_label(&catalog, 0.0), "");
    }

    #[test]
    fn test_random_selection_one_per_family() {
        let catalog = ExperimentCatalog::standard().unwrap();
        let records = records(&catalog);
        let mut rng = StdRng::seed_from_u64(3);
        let runs = select_random_runs(&records, &catalog, "MX1|00>", &mut rng).unwrap();
        assert_eq!(runs.len(), 2);
        assert!(matches!(runs[0].0, Family::Bare(_)));
        assert!(select_random_runs(&records, &catalog, "MX2|00>", &mut rng).is_err());
        assert!(select_random_runs(&records, &catalog, "nope", &mut rng).is_err());
    }

    #[test]
    fn test_svg_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ExperimentCatalog::standard().unwrap();
        let records = records(&catalog);
        let agg = Aggregation::summarize(&records, &catalog, DEFAULT_CONFIDENCE).unwrap();
        let families: Vec<Family> = agg.families().iter().map(|f| f.family).collect();

        let path = dir.path().join("comparison.svg");
        plot_comparison(&path, &agg, &catalog, &families).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));

        let diff = agg.difference(&families[0]).unwrap();
        let path = dir.path().join("difference.svg");
        plot_difference(&path, &diff, &catalog).unwrap();
        assert!(path.exists());

        let mut rng = StdRng::seed_from_u64(1);
        let runs = select_random_runs(&records, &catalog, "MX1|00>", &mut rng).unwrap();
        let path = dir.path().join("single.svg");
        plot_single_run(&path, "MX1|00>", &runs, 0.99).unwrap();
        assert!(path.exists());
    }
}
