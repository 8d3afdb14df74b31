//! Aggregation of logged runs per family and experiment.
//!
//! A family groups the circuits realized the same way: the bare circuits of
//! one qubit pair, or the encoded circuits of one preparation. Within a
//! family every experiment appears at its display index.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::warn;

use ftdemo_catalog::{
    CircuitId, EncodingVersion, ExperimentCatalog, InitialState, QubitPair, SpecId, Variant, label_stem,
};

use crate::error::{AnalysisError, AnalysisResult};
use crate::stats::{DecodedStats, mean, sample_std_dev};
use crate::tdist::{check_confidence, t_interval_bound};

/// Default confidence level of interval half-widths.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// How a set of circuits is realized on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Bare circuits on one pair.
    Bare(QubitPair),
    /// Encoded circuits prepared from one state and version.
    Encoded(InitialState, Option<EncodingVersion>),
}

impl Family {
    /// Family and experiment of a circuit, looked up by its label.
    ///
    /// `None` when the label names no experiment of `catalog` or the
    /// encoding version does not fit its initial state.
    pub fn resolve(id: &CircuitId, catalog: &ExperimentCatalog) -> Option<(Self, SpecId)> {
        let spec_id = catalog.lookup(&id.label)?;
        let family = match id.variant {
            Variant::Bare { pair } => Family::Bare(pair),
            Variant::Encoded { version } => {
                let state = catalog.spec(spec_id)?.state();
                state.check_version(version).ok()?;
                Family::Encoded(state, version)
            }
        };
        Some((family, spec_id))
    }

    /// Standard families: one per pair, then the five encoded preparations.
    pub fn standard(pairs: &[QubitPair]) -> Vec<Family> {
        let mut families: Vec<Family> = pairs.iter().copied().map(Family::Bare).collect();
        families.extend(
            EncodingVersion::ALL
                .into_iter()
                .map(|v| Family::Encoded(InitialState::Zero, Some(v))),
        );
        families.push(Family::Encoded(InitialState::ZeroPlus, None));
        families.push(Family::Encoded(InitialState::Bell, None));
        families
    }

    /// Whether this is an encoded family.
    pub fn is_encoded(&self) -> bool {
        matches!(self, Family::Encoded(..))
    }

    /// Filename-safe rendering of the label.
    pub fn file_stem(&self) -> String {
        match self {
            Family::Bare(pair) => {
                let [a, b] = pair.indices();
                format!("bare_{a}-{b}")
            }
            Family::Encoded(state, version) => {
                let state = label_stem(state.label());
                match version {
                    Some(v) => format!("encoded{state}_{v}"),
                    None => format!("encoded{state}"),
                }
            }
        }
    }

    fn sort_key(&self) -> (u8, [u32; 2], u8) {
        match self {
            Family::Bare(pair) => (0, pair.indices(), 0),
            Family::Encoded(state, version) => {
                let state_rank = match state {
                    InitialState::Zero => 0,
                    InitialState::ZeroPlus => 1,
                    InitialState::Bell => 2,
                };
                let version_rank = version.map_or(0, |v| v as u8);
                (1, [state_rank, 0], version_rank)
            }
        }
    }
}

impl PartialOrd for Family {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Family {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Bare(pair) => write!(f, "bare{pair}"),
            Family::Encoded(state, Some(v)) => write!(f, "encoded{state}{v}"),
            Family::Encoded(state, None) => write!(f, "encoded{state}"),
        }
    }
}

impl FromStr for Family {
    type Err = AnalysisError;

    /// Parse a label such as `bare[2, 0]` or `encoded|00>ftv1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || AnalysisError::UnknownFamily(s.to_string());
        if let Some(pair) = s.strip_prefix("bare") {
            return pair.parse().map(Family::Bare).map_err(|_| unknown());
        }
        let rest = s.strip_prefix("encoded").ok_or_else(unknown)?;
        InitialState::ALL
            .into_iter()
            .flat_map(|state| state.versions().into_iter().map(move |v| Family::Encoded(state, v)))
            .find(|family| family.to_string() == format!("encoded{rest}"))
            .ok_or_else(unknown)
    }
}

/// Summary of one experiment within one family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSummary {
    /// 1-based x-axis position.
    pub index: usize,
    /// Experiment.
    pub spec: SpecId,
    /// Number of logged runs.
    pub runs: usize,
    /// Mean statistical distance.
    pub mean: f64,
    /// Sample standard deviation of the statistical distance.
    pub std_dev: f64,
    /// Confidence interval half-width of the mean.
    pub conf_int: f64,
    /// Operation count of the circuit.
    pub qasm_count: usize,
    /// Mean post-selection ratio.
    pub post_selection: f64,
}

/// All experiments of one family, by display index.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySummary {
    /// The family.
    pub family: Family,
    /// Points sorted by index.
    pub points: Vec<PointSummary>,
}

impl FamilySummary {
    /// Point at a display index.
    pub fn point(&self, index: usize) -> Option<&PointSummary> {
        self.points.iter().find(|p| p.index == index)
    }

    /// Mean of the point means.
    pub fn mean_distance(&self) -> Option<f64> {
        mean(&self.points.iter().map(|p| p.mean).collect::<Vec<_>>())
    }

    /// Post-selection ratio averaged over every run of the family.
    pub fn mean_post_selection(&self) -> Option<f64> {
        let runs: usize = self.points.iter().map(|p| p.runs).sum();
        if runs == 0 {
            return None;
        }
        let weighted: f64 = self.points.iter().map(|p| p.post_selection * p.runs as f64).sum();
        Some(weighted / runs as f64)
    }
}

/// One point of a difference view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffPoint {
    /// 1-based x-axis position.
    pub index: usize,
    /// Family mean minus baseline mean.
    pub diff: f64,
    /// Confidence half-width of the family mean.
    pub conf_int: f64,
}

/// A family compared with a baseline family.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffSeries {
    /// The compared family.
    pub family: Family,
    /// The baseline.
    pub baseline: Family,
    /// Points sorted by index.
    pub points: Vec<DiffPoint>,
}

/// Op count against statistical distance for a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPoint {
    /// Circuit name.
    pub name: String,
    /// Operation count.
    pub qasm_count: usize,
    /// Statistical distance.
    pub stat_dist: f64,
}

/// Every logged run, summarized per family and experiment.
#[derive(Debug, Clone)]
pub struct Aggregation {
    confidence: f64,
    families: Vec<FamilySummary>,
    skipped: usize,
}

impl Aggregation {
    /// Summarize `records`.
    ///
    /// Records whose label matches no experiment are skipped and counted.
    /// Confidence half-widths are `t_{(1+c)/2, n-1} * s / sqrt(n)`; a point
    /// with a single run gets a zero half-width.
    pub fn summarize(records: &[DecodedStats], catalog: &ExperimentCatalog, confidence: f64) -> AnalysisResult<Self> {
        check_confidence(confidence)?;
        let mut groups: FxHashMap<Family, FxHashMap<SpecId, (usize, Vec<&DecodedStats>)>> = FxHashMap::default();
        let mut skipped = 0;
        for record in records {
            let resolved = Family::resolve(&record.id, catalog)
                .and_then(|(family, spec)| catalog.display_index(spec).map(|index| (family, spec, index)));
            let Some((family, spec, index)) = resolved else {
                warn!(circuit = %record.name, label = %record.id.label, "record matches no experiment, skipped");
                skipped += 1;
                continue;
            };
            groups
                .entry(family)
                .or_default()
                .entry(spec)
                .or_insert_with(|| (index, Vec::new()))
                .1
                .push(record);
        }

        let mut families = Vec::with_capacity(groups.len());
        for (family, specs) in groups {
            let mut points = Vec::with_capacity(specs.len());
            for (spec, (index, runs)) in specs {
                points.push(summarize_point(index, spec, &runs, confidence)?);
            }
            points.sort_by_key(|p| p.index);
            families.push(FamilySummary { family, points });
        }
        families.sort_by(|a, b| a.family.cmp(&b.family));
        Ok(Self {
            confidence,
            families,
            skipped,
        })
    }

    /// Records left out because they match no experiment of the catalog.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Confidence level of the half-widths.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Families present in the data, in standard order.
    pub fn families(&self) -> &[FamilySummary] {
        &self.families
    }

    /// Summary of one family.
    pub fn family(&self, family: &Family) -> Option<&FamilySummary> {
        self.families.iter().find(|f| f.family == *family)
    }

    /// Every encoded family minus `baseline` at the same display index.
    ///
    /// Points the baseline lacks are left out.
    pub fn difference(&self, baseline: &Family) -> AnalysisResult<Vec<DiffSeries>> {
        let base = self
            .family(baseline)
            .ok_or_else(|| AnalysisError::UnknownFamily(baseline.to_string()))?;
        let series = self
            .families
            .iter()
            .filter(|f| f.family.is_encoded())
            .map(|f| {
                let points = f
                    .points
                    .iter()
                    .filter_map(|p| match base.point(p.index) {
                        Some(b) => Some(DiffPoint {
                            index: p.index,
                            diff: p.mean - b.mean,
                            conf_int: p.conf_int,
                        }),
                        None => {
                            warn!(family = %f.family, index = p.index, "baseline has no such experiment");
                            None
                        }
                    })
                    .collect();
                DiffSeries {
                    family: f.family,
                    baseline: *baseline,
                    points,
                }
            })
            .collect();
        Ok(series)
    }

    /// Mean statistical distance of every family.
    pub fn family_means(&self) -> Vec<(Family, f64)> {
        self.families
            .iter()
            .filter_map(|f| f.mean_distance().map(|m| (f.family, m)))
            .collect()
    }

    /// Mean post-selection ratio of every encoded family.
    pub fn post_selection_means(&self) -> Vec<(Family, f64)> {
        self.families
            .iter()
            .filter(|f| f.family.is_encoded())
            .filter_map(|f| f.mean_post_selection().map(|m| (f.family, m)))
            .collect()
    }
}

fn summarize_point(index: usize, spec: SpecId, runs: &[&DecodedStats], confidence: f64) -> AnalysisResult<PointSummary> {
    let distances: Vec<f64> = runs.iter().map(|r| r.stat_dist).collect();
    let ratios: Vec<f64> = runs.iter().map(|r| r.post_selection_ratio).collect();
    let n = distances.len();
    let (std_dev, conf_int) = match sample_std_dev(&distances) {
        Some(s) => (s, t_interval_bound(confidence, n - 1)? * s / (n as f64).sqrt()),
        None => {
            warn!(%spec, index, "single run, confidence interval set to zero");
            (0.0, 0.0)
        }
    };
    Ok(PointSummary {
        index,
        spec,
        runs: n,
        mean: mean(&distances).unwrap_or_default(),
        std_dev,
        conf_int,
        qasm_count: runs.last().map_or(0, |r| r.qasm_count),
        post_selection: mean(&ratios).unwrap_or_default(),
    })
}

/// Op count and statistical distance of every run.
pub fn raw_points(records: &[DecodedStats]) -> Vec<RawPoint> {
    records
        .iter()
        .map(|r| RawPoint {
            name: r.name.clone(),
            qasm_count: r.qasm_count,
            stat_dist: r.stat_dist,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedCounts;
    use crate::stats::RunContext;
    use chrono::Utc;
    use ftdemo_catalog::default_pairs;
    use ftdemo_hal::{Calibration, Counts};

    fn run(id: &CircuitId, catalog: &ExperimentCatalog, buckets: [u64; 4], err: u64) -> DecodedStats {
        let expected = catalog.spec(id.spec).unwrap().expected();
        DecodedStats::compute(
            RunContext {
                id,
                raw_counts: &Counts::new(),
                qasm_count: 4,
                expected,
                calibration: &Calibration::default(),
                date: Utc::now(),
            },
            DecodedCounts {
                buckets,
                err,
                total_valid: buckets.iter().sum(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_family_labels() {
        let families = Family::standard(&default_pairs());
        assert_eq!(families.len(), 11);
        let labels: Vec<String> = families.iter().map(ToString::to_string).collect();
        assert_eq!(labels[0], "bare[1, 0]");
        assert_eq!(labels[6], "encoded|00>ftv1");
        assert_eq!(labels[10], "encoded|00>+|11>");
        for (family, label) in families.iter().zip(&labels) {
            assert_eq!(&label.parse::<Family>().unwrap(), family);
        }
        assert!("encoded|0+>ftv1".parse::<Family>().is_err());
        assert!("bare[9, 0]".parse::<Family>().is_err());
        assert_eq!(families[9].file_stem(), "encoded_0p");
        assert_eq!(families[0].file_stem(), "bare_1-0");
    }

    #[test]
    fn test_standard_order_is_sorted() {
        let families = Family::standard(&default_pairs());
        let mut sorted = families.clone();
        sorted.sort();
        assert_eq!(sorted, families);
    }

    #[test]
    fn test_summary_and_difference() {
        let catalog = ExperimentCatalog::standard().unwrap();
        let pair = QubitPair::new(2, 0).unwrap();
        // M|00> at display index 1, expected 00 with certainty
        let spec = catalog.lookup("M|00>").unwrap();
        let bare = CircuitId::bare(spec, "M|00>", pair);
        let enc = CircuitId::encoded(spec, "M|00>", Some(EncodingVersion::Ftv1));

        let records = vec![
            run(&bare, &catalog, [90, 10, 0, 0], 0),
            run(&bare, &catalog, [80, 20, 0, 0], 0),
            run(&enc, &catalog, [95, 5, 0, 0], 100),
            run(&enc, &catalog, [97, 3, 0, 0], 100),
            run(&enc, &catalog, [99, 1, 0, 0], 100),
        ];
        let agg = Aggregation::summarize(&records, &catalog, DEFAULT_CONFIDENCE).unwrap();
        assert_eq!(agg.families().len(), 2);
        assert_eq!(agg.families()[0].family, Family::Bare(pair));

        let bare_point = agg.family(&Family::Bare(pair)).unwrap().point(1).unwrap();
        assert_eq!(bare_point.runs, 2);
        assert!((bare_point.mean - 0.15).abs() < 1e-12);

        let enc_family = Family::Encoded(InitialState::Zero, Some(EncodingVersion::Ftv1));
        let enc_point = agg.family(&enc_family).unwrap().point(1).unwrap();
        assert!((enc_point.mean - 0.03).abs() < 1e-12);
        assert!((enc_point.std_dev - 0.02).abs() < 1e-12);
        // t_{0.995, 2} = 9.9248
        let expected_ci = 9.924_843 * 0.02 / 3f64.sqrt();
        assert!((enc_point.conf_int - expected_ci).abs() < 1e-5);
        assert!((enc_point.post_selection - 0.5).abs() < 1e-12);

        let diff = agg.difference(&Family::Bare(pair)).unwrap();
        assert_eq!(diff.len(), 1);
        assert!((diff[0].points[0].diff - (0.03 - 0.15)).abs() < 1e-12);

        let means = agg.post_selection_means();
        assert_eq!(means.len(), 1);
        assert!(agg.difference(&Family::Bare(QubitPair::new(3, 4).unwrap())).is_err());
    }

    #[test]
    fn test_single_run_has_zero_interval() {
        let catalog = ExperimentCatalog::standard().unwrap();
        let spec = catalog.lookup("MX1|00>").unwrap();
        let id = CircuitId::bare(spec, "MX1|00>", QubitPair::new(1, 0).unwrap());
        let records = vec![run(&id, &catalog, [0, 100, 0, 0], 0)];
        let agg = Aggregation::summarize(&records, &catalog, 0.95).unwrap();
        let point = &agg.families()[0].points[0];
        assert_eq!(point.conf_int, 0.0);
        assert_eq!(point.index, catalog.display_index(spec).unwrap());
        assert_eq!(raw_points(&records)[0].qasm_count, 4);
    }

    #[test]
    fn test_records_resolve_by_label_and_unknown_are_skipped() {
        let catalog = ExperimentCatalog::standard().unwrap();
        let spec = catalog.lookup("MX1|00>").unwrap();
        let pair = QubitPair::new(1, 0).unwrap();
        let id = CircuitId::bare(spec, "MX1|00>", pair);
        let good = run(&id, &catalog, [0, 100, 0, 0], 0);

        let mut stale_index = good.clone();
        stale_index.id.spec = SpecId(42);
        let mut foreign = good.clone();
        foreign.id.label = "custom-circuit".to_string();
        // |00> experiments always carry an encoding version
        let bad_version = run(&CircuitId::encoded(spec, "MX1|00>", None), &catalog, [0, 100, 0, 0], 0);

        let records = vec![good, stale_index, foreign, bad_version];
        let agg = Aggregation::summarize(&records, &catalog, DEFAULT_CONFIDENCE).unwrap();
        assert_eq!(agg.skipped(), 2);
        assert_eq!(agg.families().len(), 1);
        let point = agg.family(&Family::Bare(pair)).unwrap().point(catalog.display_index(spec).unwrap());
        assert_eq!(point.unwrap().runs, 2);
        assert_eq!(point.unwrap().spec, spec);
    }

    #[test]
    fn test_invalid_confidence() {
        let catalog = ExperimentCatalog::standard().unwrap();
        assert!(matches!(
            Aggregation::summarize(&[], &catalog, 1.0),
            Err(AnalysisError::InvalidConfidence(_))
        ));
    }
}
