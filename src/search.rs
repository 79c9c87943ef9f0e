use std::fmt;

use crate::error::SearchError;
use crate::orifice::{FlowParameters, BETA_MAX, BETA_MIN, SAMPLE_COUNT};

/// Closed interval of diameter ratios to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaRange {
    pub min: f64,
    pub max: f64,
}

impl Default for BetaRange {
    fn default() -> Self {
        Self {
            min: BETA_MIN,
            max: BETA_MAX,
        }
    }
}

impl BetaRange {
    pub fn new(min: f64, max: f64) -> Result<Self, SearchError> {
        if !(min > 0.0 && min < max && max < 1.0) {
            return Err(SearchError::InvalidRange { min, max });
        }

        Ok(Self { min, max })
    }

    /// Evenly spaced samples over `[min, max]`, both ends included.
    pub fn samples(&self, count: usize) -> Vec<f64> {
        match count {
            0 => return Vec::new(),
            1 => return vec![self.min],
            _ => {}
        }

        let step = (self.max - self.min) / (count - 1) as f64;
        let mut points: Vec<f64> = (0..count).map(|i| self.min + i as f64 * step).collect();

        // Pin the endpoint against accumulated rounding
        points[count - 1] = self.max;
        points
    }
}

impl fmt::Display for BetaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Everything one search needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub parameters: FlowParameters,
    /// Target volumetric flow [m3/s]
    pub desired_flow: f64,
    /// Accepted absolute deviation from `desired_flow` [m3/s]
    pub tolerance: f64,
    pub beta_range: BetaRange,
    pub sample_count: usize,
}

impl SearchRequest {
    /// Request over the default range (0.2 to 0.75) with 1000 samples.
    pub fn new(
        parameters: FlowParameters,
        desired_flow: f64,
        tolerance: f64,
    ) -> Result<Self, SearchError> {
        if !desired_flow.is_finite() {
            return Err(SearchError::InvalidDesiredFlow(desired_flow));
        }
        check_tolerance(tolerance)?;

        Ok(Self {
            parameters,
            desired_flow,
            tolerance,
            beta_range: BetaRange::default(),
            sample_count: SAMPLE_COUNT,
        })
    }

    pub fn with_beta_range(mut self, beta_range: BetaRange) -> Self {
        self.beta_range = beta_range;
        self
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Result<Self, SearchError> {
        if sample_count < 2 {
            return Err(SearchError::TooFewSamples(sample_count));
        }
        self.sample_count = sample_count;
        Ok(self)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, SearchError> {
        check_tolerance(tolerance)?;
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Same request with the tolerance doubled.
    pub fn relaxed(&self) -> Self {
        Self {
            tolerance: self.tolerance * 2.0,
            ..self.clone()
        }
    }

    pub fn accepts(&self, flow: f64) -> bool {
        (flow - self.desired_flow).abs() < self.tolerance
    }
}

fn check_tolerance(tolerance: f64) -> Result<(), SearchError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(SearchError::InvalidTolerance(tolerance))
    }
}

/// Relax-and-retry composition: the prior request with twice the tolerance.
pub fn relax_tolerance(previous: &SearchRequest) -> SearchRequest {
    previous.relaxed()
}

/// Outcome of a search: the first matching beta, if any, and the sampled curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub optimal_beta: Option<f64>,
    pub sampled_betas: Vec<f64>,
    pub sampled_flows: Vec<f64>,
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        self.optimal_beta.is_some()
    }

    pub fn optimal_index(&self) -> Option<usize> {
        let beta = self.optimal_beta?;
        self.sampled_betas.iter().position(|&b| b == beta)
    }

    pub fn optimal_flow(&self) -> Option<f64> {
        self.optimal_index().map(|i| self.sampled_flows[i])
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.sampled_betas
            .iter()
            .copied()
            .zip(self.sampled_flows.iter().copied())
    }

    /// Sample whose flow lies nearest `desired_flow`, skipping non-finite flows.
    pub fn closest(&self, desired_flow: f64) -> Option<(f64, f64)> {
        self.points()
            .filter(|(_, q)| q.is_finite())
            .min_by(|a, b| {
                (a.1 - desired_flow)
                    .abs()
                    .total_cmp(&(b.1 - desired_flow).abs())
            })
    }

    /// Number of samples whose flow is NaN or infinite.
    pub fn anomaly_count(&self) -> usize {
        self.sampled_flows.iter().filter(|q| !q.is_finite()).count()
    }

    /// Smallest and largest finite flow on the curve.
    pub fn flow_span(&self) -> Option<(f64, f64)> {
        self.sampled_flows
            .iter()
            .copied()
            .filter(|q| q.is_finite())
            .fold(None, |span, q| match span {
                None => Some((q, q)),
                Some((lo, hi)) => Some((lo.min(q), hi.max(q))),
            })
    }
}

/// Scans the whole range in ascending beta and keeps the first sample within tolerance.
///
/// Every sample is evaluated even after a match. Samples where the flow
/// equation leaves its domain are kept as non-finite flows; they never match.
pub fn search(request: &SearchRequest) -> SearchResult {
    let sampled_betas = request.beta_range.samples(request.sample_count);
    let mut sampled_flows = Vec::with_capacity(sampled_betas.len());
    let mut optimal_beta = None;

    for &beta in &sampled_betas {
        let q = request.parameters.flow(beta);
        sampled_flows.push(q);
        if optimal_beta.is_none() && request.accepts(q) {
            optimal_beta = Some(beta);
        }
    }

    SearchResult {
        optimal_beta,
        sampled_betas,
        sampled_flows,
    }
}
