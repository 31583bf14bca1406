//! Positional alignment of several entities under the canonical labels

use crate::error::{EngineError, Result};
use finmetric_core::{ComparisonResult, ComparisonSeries, Metric, MetricValue, StockMetricSet};

/// Fewest entities a comparison is built from by default
pub const DEFAULT_MIN_ENTITIES: usize = 2;

/// Builds [`ComparisonResult`]s from extracted metric sets
#[derive(Debug, Clone)]
pub struct ComparisonAligner {
    min_count: usize,
}

impl Default for ComparisonAligner {
    fn default() -> Self {
        Self {
            min_count: DEFAULT_MIN_ENTITIES,
        }
    }
}

impl ComparisonAligner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Align `entities` in the given order
    ///
    /// Unavailable metrics are emitted as `0` with the matching
    /// `missing_mask` slot set, so the substitution stays visible.
    pub fn align(&self, entities: &[StockMetricSet]) -> Result<ComparisonResult> {
        if entities.len() < self.min_count {
            return Err(EngineError::InsufficientEntities {
                required: self.min_count,
                actual: entities.len(),
            });
        }

        let series = entities
            .iter()
            .map(|entity| {
                let (values, missing_mask) = Metric::ALL
                    .iter()
                    .map(|metric| match entity.metric(*metric) {
                        MetricValue::Numeric(v) => (v, false),
                        MetricValue::Unavailable => (0.0, true),
                    })
                    .unzip();
                ComparisonSeries {
                    name: entity.company_name.clone(),
                    values,
                    missing_mask,
                }
            })
            .collect();

        Ok(ComparisonResult {
            labels: Metric::ALL.iter().map(|m| m.label().to_string()).collect(),
            series,
        })
    }

    /// Align an entity's peer list, as shown on the single-stock view
    pub fn align_peers(&self, entity: &StockMetricSet) -> Result<ComparisonResult> {
        self.align(&entity.peers)
    }
}
