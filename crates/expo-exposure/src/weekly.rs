//! `WeeklyCombiner`: day types and realisations into weekly statistics.
//!
//! # Two stages
//!
//! 1. **Per realisation.**  For each agent and variable the day-type values
//!    are averaged with the day-type weights:
//!    `Σ(wᵢ × vᵢ) / Σ wᵢ`.  Any missing day value makes the result missing.
//!    Decibel variables are then transformed once with `10 · log10(L)`; a
//!    non-positive linear average has no decibel value and is missing.
//! 2. **Across realisations.**  Each realisation's value is kept, and
//!    mean, std, var, min and max (population, ddof = 0) are computed over
//!    the realisations that have a value.  With none, every statistic is
//!    missing.
//!
//! Variables are matched by position: variable `i` of every day type feeds
//! weekly variable `i`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use expo_core::AgentId;

use crate::{ExposureError, ExposureResult};

/// Per-agent values of one day type (or one combined realisation), one
/// entry per variable.
pub type DayValues = BTreeMap<AgentId, Vec<Option<f64>>>;

// ── Configuration types ───────────────────────────────────────────────────────

/// How day-type values of a variable are combined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    #[default]
    Linear,
    /// Linear average, then `10 · log10`.
    Decibel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyVariable {
    pub name:        String,
    #[serde(default)]
    pub combination: Combination,
}

impl WeeklyVariable {
    pub fn linear(name: impl Into<String>) -> Self {
        Self { name: name.into(), combination: Combination::Linear }
    }

    pub fn decibel(name: impl Into<String>) -> Self {
        Self { name: name.into(), combination: Combination::Decibel }
    }

    /// `no2`, `pm25`, and `noise` (decibel).
    pub fn defaults() -> Vec<Self> {
        vec![Self::linear("no2"), Self::linear("pm25"), Self::decibel("noise")]
    }
}

/// A weighted day type, e.g. five workdays and two weekend days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayType {
    pub label:  String,
    pub weight: f64,
}

impl DayType {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self { label: label.into(), weight }
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Cross-realisation statistics of one agent and variable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stats {
    pub mean: f64,
    pub std:  f64,
    pub var:  f64,
    pub min:  f64,
    pub max:  f64,
}

impl Stats {
    /// Statistics over the present values; `None` if there are none.
    pub fn of(values: &[Option<f64>]) -> Option<Stats> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        let n = present.len() as f64;
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Stats { mean, std: var.sqrt(), var, min, max })
    }
}

/// One agent's row of a weekly table.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyRecord {
    pub agent:        AgentId,
    /// Value per realisation, in realisation order.
    pub realisations: Vec<Option<f64>>,
    pub stats:        Option<Stats>,
}

/// Weekly result for one variable.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyTable {
    pub variable: WeeklyVariable,
    pub records:  Vec<WeeklyRecord>,
}

// ── WeeklyCombiner ────────────────────────────────────────────────────────────

pub struct WeeklyCombiner {
    day_types:    Vec<DayType>,
    variables:    Vec<WeeklyVariable>,
    total_weight: f64,
}

impl WeeklyCombiner {
    /// # Errors
    ///
    /// [`ExposureError::InvalidCombination`] for no day types, no variables,
    /// a negative or non-finite weight, or weights summing to zero.
    pub fn new(day_types: Vec<DayType>, variables: Vec<WeeklyVariable>) -> ExposureResult<Self> {
        if day_types.is_empty() {
            return Err(ExposureError::InvalidCombination("no day types".into()));
        }
        if variables.is_empty() {
            return Err(ExposureError::InvalidCombination("no weekly variables".into()));
        }
        if let Some(bad) = day_types.iter().find(|d| !(d.weight.is_finite() && d.weight >= 0.0)) {
            return Err(ExposureError::InvalidCombination(format!(
                "day type {:?} has invalid weight {}",
                bad.label, bad.weight
            )));
        }
        let total_weight: f64 = day_types.iter().map(|d| d.weight).sum();
        if total_weight <= 0.0 {
            return Err(ExposureError::InvalidCombination("day-type weights sum to zero".into()));
        }
        Ok(Self { day_types, variables, total_weight })
    }

    pub fn day_types(&self) -> &[DayType] {
        &self.day_types
    }

    pub fn variables(&self) -> &[WeeklyVariable] {
        &self.variables
    }

    /// Combine one realisation's day types; `days[i]` belongs to
    /// `day_types()[i]`.
    ///
    /// Agents present in some day types but not others get missing values.
    pub fn combine(&self, days: &[&DayValues]) -> ExposureResult<DayValues> {
        if days.len() != self.day_types.len() {
            return Err(ExposureError::InvalidCombination(format!(
                "{} day types configured, {} supplied",
                self.day_types.len(),
                days.len()
            )));
        }
        for day in days {
            if let Some((agent, values)) = day.iter().find(|(_, v)| v.len() != self.variables.len()) {
                return Err(ExposureError::VariableCount {
                    agent:    agent.get(),
                    expected: self.variables.len(),
                    actual:   values.len(),
                });
            }
        }

        let agents: BTreeSet<AgentId> = days.iter().flat_map(|d| d.keys().copied()).collect();
        let mut out = DayValues::new();

        for agent in agents {
            let values = self
                .variables
                .iter()
                .enumerate()
                .map(|(i, var)| {
                    let mut acc = 0.0;
                    for (day, dt) in days.iter().zip(&self.day_types) {
                        acc += dt.weight * day.get(&agent)?.get(i).copied().flatten()?;
                    }
                    let linear = acc / self.total_weight;
                    match var.combination {
                        Combination::Linear => Some(linear),
                        Combination::Decibel if linear > 0.0 => Some(10.0 * linear.log10()),
                        Combination::Decibel => None,
                    }
                })
                .collect();
            out.insert(agent, values);
        }

        tracing::debug!(agents = out.len(), "realisation combined");
        Ok(out)
    }

    /// Tabulate combined realisations (in realisation order) per variable.
    pub fn summarise(&self, realisations: &[DayValues]) -> Vec<WeeklyTable> {
        let agents: BTreeSet<AgentId> =
            realisations.iter().flat_map(|r| r.keys().copied()).collect();

        self.variables
            .iter()
            .enumerate()
            .map(|(i, var)| {
                let records = agents
                    .iter()
                    .map(|&agent| {
                        let per: Vec<Option<f64>> = realisations
                            .iter()
                            .map(|r| r.get(&agent).and_then(|v| v.get(i).copied().flatten()))
                            .collect();
                        WeeklyRecord { agent, stats: Stats::of(&per), realisations: per }
                    })
                    .collect();
                WeeklyTable { variable: var.clone(), records }
            })
            .collect()
    }
}
