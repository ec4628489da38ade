//! Anomaly detection over transaction amounts
//!
//! Amounts are scored with an isolation forest: random axis splits isolate
//! rare values in fewer steps than common ones, so a short average path
//! length means an unusual amount. Rows whose score lies above the
//! `1 - contamination` quantile of all scores are reported.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;

use crate::config::AnalyticsSettings;
use crate::domain::result::{Error, Result};
use crate::domain::{truncate_amount, AnomalyFlag, NormalizedTable};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub trees: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::from(&AnalyticsSettings::default())
    }
}

impl From<&AnalyticsSettings> for ForestParams {
    fn from(settings: &AnalyticsSettings) -> Self {
        Self {
            trees: settings.trees,
            max_samples: settings.max_samples,
            contamination: settings.contamination,
            seed: settings.seed,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf { size: usize },
    Split { threshold: f64, left: usize, right: usize },
}

/// One tree stored as a flat node arena; index 0 is the root
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(sample: Vec<f64>, height_limit: usize, rng: &mut StdRng) -> Result<Self> {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(sample, 0, height_limit, rng)?;
        Ok(tree)
    }

    fn grow(
        &mut self,
        values: Vec<f64>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Result<usize> {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: values.len() });

        if depth >= height_limit || values.len() <= 1 {
            return Ok(id);
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if max <= min {
            // Constant node, nothing left to isolate
            return Ok(id);
        }
        let span = max - min;
        if !span.is_finite() {
            return Err(Error::model(format!("amount range overflows: {} to {}", min, max)));
        }

        let threshold = min + rng.gen::<f64>() * span;
        let (left_values, right_values): (Vec<f64>, Vec<f64>) =
            values.into_iter().partition(|&v| v <= threshold);

        let left = self.grow(left_values, depth + 1, height_limit, rng)?;
        let right = self.grow(right_values, depth + 1, height_limit, rng)?;
        self.nodes[id] = Node::Split { threshold, left, right };
        Ok(id)
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split { threshold, left, right } => {
                    id = if value <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Fitted isolation forest over a single feature
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    contamination: f64,
}

impl IsolationForest {
    /// Fit on `values`; the same values and seed always give the same forest
    pub fn fit(values: &[f64], params: &ForestParams) -> Result<Self> {
        if values.len() < 2 {
            return Err(Error::model("at least two values are required"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::model(format!("non-finite amount: {}", bad)));
        }
        if params.trees == 0 || params.max_samples == 0 {
            return Err(Error::model("forest needs at least one tree and one sample"));
        }
        if !(params.contamination > 0.0 && params.contamination <= 0.5) {
            return Err(Error::model(format!(
                "contamination out of range: {}",
                params.contamination
            )));
        }

        let sample_size = params.max_samples.min(values.len()).max(2);
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut trees = Vec::with_capacity(params.trees);
        for _ in 0..params.trees {
            let sample: Vec<f64> = rand::seq::index::sample(&mut rng, values.len(), sample_size)
                .into_iter()
                .map(|i| values[i])
                .collect();
            trees.push(IsolationTree::build(sample, height_limit, &mut rng)?);
        }

        Ok(Self {
            trees,
            sample_size,
            contamination: params.contamination,
        })
    }

    /// Anomaly score in (0, 1]; higher is more isolated
    pub fn score(&self, value: f64) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(value)).sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.sample_size))
    }

    /// Indices of the values classified as outliers, in input order
    pub fn outliers(&self, values: &[f64]) -> Vec<usize> {
        let scores: Vec<f64> = values.iter().map(|&v| self.score(v)).collect();
        let threshold = quantile(&scores, 1.0 - self.contamination);
        scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s > threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Linear-interpolation quantile of unsorted data; `q` in [0, 1]
fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// What the detector did with a table
#[derive(Debug)]
pub enum AnomalyScan {
    /// Too few rows for a stable model
    Skipped { rows: usize },
    Completed(Vec<AnomalyFlag>),
    /// The model could not be fit; reported as no anomalies
    Failed(Error),
}

impl AnomalyScan {
    pub fn into_flags(self) -> Vec<AnomalyFlag> {
        match self {
            Self::Completed(flags) => flags,
            Self::Skipped { .. } | Self::Failed(_) => Vec::new(),
        }
    }
}

/// Flag rows whose amount is an outlier across the whole table
pub fn detect_anomalies(table: &NormalizedTable, settings: &AnalyticsSettings) -> AnomalyScan {
    if table.len() < settings.anomaly_min_rows {
        return AnomalyScan::Skipped { rows: table.len() };
    }

    let mut values = Vec::with_capacity(table.len());
    for total in table.totals() {
        match total.to_f64() {
            Some(v) => values.push(v),
            None => return AnomalyScan::Failed(Error::model(format!("amount out of range: {}", total))),
        }
    }

    let params = ForestParams::from(settings);
    match IsolationForest::fit(&values, &params) {
        Ok(forest) => AnomalyScan::Completed(
            forest
                .outliers(&values)
                .into_iter()
                .map(|i| {
                    let record = &table.records[i];
                    AnomalyFlag { date: record.date, amount: truncate_amount(record.total) }
                })
                .collect(),
        ),
        Err(e) => AnomalyScan::Failed(e),
    }
}
