//! Cost model parameter registry.
//!
//! Consumes the `CostParam` entries of a `CostParams` or `CostModelConfig`
//! section. Parameters are addressable by name and by a dense id assigned in
//! installation order.

use std::collections::HashMap;

use serde::Serialize;

use crate::ast::optimizer::CostParam;
use crate::error::{DxlError, Result};

/// Default parameters of the GPDB cost model, as `(name, value)`.
///
/// Default bounds are `[0, 2 * value]`.
const GPDB_DEFAULTS: &[(&str, f64)] = &[
    ("SeqIOBandwidth", 1024.0),
    ("RandomIOBandwidth", 30.0),
    ("TupProcBandwidth", 512.0),
    ("OutputBandwidth", 256.0),
    ("InitScanFactor", 431.0),
    ("TableScanCostUnit", 5.50e-07),
    ("InitIndexScanFactor", 142.0),
    ("IndexBlockCostUnit", 1.27e-06),
    ("IndexFilterCostUnit", 1.65e-04),
    ("IndexScanTupCostUnit", 3.66e-06),
    ("IndexScanTupRandomFactor", 6.0),
    ("FilterColCostUnit", 3.29e-05),
    ("OutputTupCostUnit", 1.86e-06),
    ("GatherSendCostUnit", 4.58e-06),
    ("GatherRecvCostUnit", 2.20e-06),
    ("RedistributeSendCostUnit", 2.33e-06),
    ("RedistributeRecvCostUnit", 8.0e-07),
    ("BroadcastSendCostUnit", 4.965e-05),
    ("BroadcastRecvCostUnit", 1.35e-06),
    ("NoOpCostUnit", 0.0),
    ("JoinFeedingTupColumnCostUnit", 8.69e-05),
    ("JoinFeedingTupWidthCostUnit", 6.09e-07),
    ("JoinOutputTupCostUnit", 3.50e-06),
    ("HJSpillingMemThreshold", 52_428_800.0),
    ("HJHashTableInitCostFactor", 500.0),
    ("HJHashTableColumnCostUnit", 5.0e-05),
    ("HJHashTableWidthCostUnit", 3.0e-06),
    ("HJHashingTupWidthCostUnit", 1.97e-08),
    ("HJFeedingTupColumnSpillingCostUnit", 1.97e-04),
    ("HJFeedingTupWidthSpillingCostUnit", 3.0e-06),
    ("HJHashingTupWidthSpillingCostUnit", 2.30e-05),
    ("HashAggInputTupColumnCostUnit", 1.20e-04),
    ("HashAggInputTupWidthCostUnit", 1.12e-07),
    ("HashAggOutputTupWidthCostUnit", 5.61e-07),
    ("SortTupWidthCostUnit", 5.67e-06),
    ("TupDefaultProcCostUnit", 1.0e-06),
    ("MaterializeCostUnit", 4.68e-06),
    ("TupUpdateBandwidth", 256.0),
    ("NetworkBandwidth", 1024.0),
    ("Segments", 4.0),
    ("NLJFactor", 1024.0),
    ("HJFactor", 2.0),
    ("HashFactor", 2.0),
    ("DefaultCost", 100.0),
];

/// One installed cost parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostParamEntry {
    pub id: usize,
    pub name: String,
    pub value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Table of cost model parameters keyed by name and by id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CostModelParams {
    entries: Vec<CostParamEntry>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

fn check_bounds(name: &str, value: f64, lower: f64, upper: f64) -> Result<()> {
    if lower <= upper && (lower..=upper).contains(&value) {
        Ok(())
    } else {
        Err(DxlError::CostParamOutOfBounds {
            name: name.to_string(),
            value,
            lower,
            upper,
        })
    }
}

impl CostModelParams {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from parsed parameters, assigning ids in document order.
    ///
    /// # Errors
    /// `DuplicateCostParam` when a name repeats, `CostParamOutOfBounds` when a
    /// value lies outside its own bounds.
    pub fn install(params: &[CostParam]) -> Result<Self> {
        let mut table = Self::new();
        for param in params {
            table.insert(&param.name, param.value, param.lower_bound, param.upper_bound)?;
        }
        tracing::debug!(params = table.len(), "Cost model parameters installed");
        Ok(table)
    }

    /// The GPDB cost model with its default parameter values.
    #[must_use]
    pub fn gpdb_defaults() -> Self {
        let mut table = Self::new();
        for &(name, value) in GPDB_DEFAULTS {
            let id = table.entries.len();
            table.by_name.insert(name.to_string(), id);
            table.entries.push(CostParamEntry {
                id,
                name: name.to_string(),
                value,
                lower_bound: 0.0,
                upper_bound: value * 2.0,
            });
        }
        table
    }

    fn insert(&mut self, name: &str, value: f64, lower: f64, upper: f64) -> Result<usize> {
        if self.by_name.contains_key(name) {
            return Err(DxlError::DuplicateCostParam(name.to_string()));
        }
        check_bounds(name, value, lower, upper)?;

        let id = self.entries.len();
        self.by_name.insert(name.to_string(), id);
        self.entries.push(CostParamEntry {
            id,
            name: name.to_string(),
            value,
            lower_bound: lower,
            upper_bound: upper,
        });
        Ok(id)
    }

    /// Override one known parameter.
    ///
    /// # Errors
    /// `UnknownCostParam` for names not in the table, `CostParamOutOfBounds`
    /// when the value lies outside the new bounds.
    pub fn set(&mut self, name: &str, value: f64, lower: f64, upper: f64) -> Result<()> {
        let id = self.validate(name, value, lower, upper)?;
        self.commit(id, value, lower, upper)
    }

    /// Apply every parsed parameter as an override of a known one.
    ///
    /// All overrides are checked before any is applied, so a rejected set
    /// leaves the table unchanged.
    ///
    /// # Errors
    /// The first error of [`set`](Self::set).
    pub fn apply(&mut self, params: &[CostParam]) -> Result<()> {
        let ids = params
            .iter()
            .map(|p| self.validate(&p.name, p.value, p.lower_bound, p.upper_bound))
            .collect::<Result<Vec<_>>>()?;
        for (id, param) in ids.into_iter().zip(params) {
            self.commit(id, param.value, param.lower_bound, param.upper_bound)?;
        }
        tracing::debug!(overrides = params.len(), "Cost model parameters applied");
        Ok(())
    }

    /// Resolve a known parameter and check the new value against the new bounds.
    fn validate(&self, name: &str, value: f64, lower: f64, upper: f64) -> Result<usize> {
        let id = *self
            .by_name
            .get(name)
            .ok_or_else(|| DxlError::UnknownCostParam(name.to_string()))?;
        check_bounds(name, value, lower, upper)?;
        Ok(id)
    }

    fn commit(&mut self, id: usize, value: f64, lower: f64, upper: f64) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| DxlError::UnknownCostParam(format!("#{id}")))?;
        entry.value = value;
        entry.lower_bound = lower;
        entry.upper_bound = upper;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CostParamEntry> {
        self.by_name.get(name).and_then(|&id| self.entries.get(id))
    }

    #[must_use]
    pub fn get_by_id(&self, id: usize) -> Option<&CostParamEntry> {
        self.entries.get(id)
    }

    /// Current value of a parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|entry| entry.value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostParamEntry> {
        self.entries.iter()
    }
}
