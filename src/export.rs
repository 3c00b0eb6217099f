//! Tabular (spreadsheet) view of a campaign collection.
//!
//! One row per depth over a fixed synthetic grid, one column per
//! (campaign date, record kind, field) triple, tab separated. A sample
//! that does not exist for a given triple renders as an empty cell.

use std::collections::BTreeMap;

use eyre::{bail, Result};
use itertools::Itertools;

use crate::model::{depth_key, CalcRecord, Document, RawRecord, STAMP_FMT};

pub const RAW_FIELDS: &[&str] = &["a_plus", "a_minus", "b_plus", "b_minus"];
pub const CALC_FIELDS: &[&str] = &[
    "dev_a",
    "dev_b",
    "incr_dev_a",
    "incr_dev_b",
    "abs_dev_a",
    "abs_dev_b",
    "desp_a",
    "desp_b",
];

/// Synthetic depth grid, metres.
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            start: 0.5,
            stop: 50.0,
            step: 0.5,
        }
    }
}

impl GridSpec {
    /// Checked construction: the step must be a positive finite length and
    /// the grid must not run upward.
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        if !start.is_finite() || !stop.is_finite() || !step.is_finite() || step <= 0.0 || stop < start
        {
            bail!("bad depth grid: start {start}, stop {stop}, step {step}");
        }
        Ok(GridSpec { start, stop, step })
    }

    pub fn depths(&self) -> impl Iterator<Item = f64> + '_ {
        let steps = ((self.stop - self.start) / self.step).round() as usize;
        (0..=steps).map(|i| self.start + i as f64 * self.step)
    }
}

fn raw_field(rec: &RawRecord, field: &str) -> Option<f64> {
    match field {
        "a_plus" => Some(rec.a_plus),
        "a_minus" => Some(rec.a_minus),
        "b_plus" => Some(rec.b_plus),
        "b_minus" => Some(rec.b_minus),
        _ => None,
    }
}

fn calc_field(rec: &CalcRecord, field: &str) -> Option<f64> {
    match field {
        "dev_a" => Some(rec.dev_a),
        "dev_b" => Some(rec.dev_b),
        "incr_dev_a" => rec.incr_dev_a,
        "incr_dev_b" => rec.incr_dev_b,
        "abs_dev_a" => rec.abs_dev_a,
        "abs_dev_b" => rec.abs_dev_b,
        "desp_a" => rec.desp_a,
        "desp_b" => rec.desp_b,
        _ => None,
    }
}

/// Render the whole collection as one TSV table.
pub fn render_table(doc: &Document, grid: &GridSpec) -> String {
    let mut header = vec!["depth".to_string()];
    for (stamp, _) in &doc.campaigns {
        let stamp = stamp.format(STAMP_FMT);
        for field in RAW_FIELDS {
            header.push(format!("{stamp} raw {field}"));
        }
        for field in CALC_FIELDS {
            header.push(format!("{stamp} calc {field}"));
        }
    }

    // depth-keyed lookup per campaign
    let raw_maps: Vec<BTreeMap<i64, &RawRecord>> = doc
        .campaigns
        .values()
        .map(|c| c.raw.iter().map(|r| (depth_key(r.depth), r)).collect())
        .collect();
    let calc_maps: Vec<BTreeMap<i64, &CalcRecord>> = doc
        .campaigns
        .values()
        .map(|c| c.calc.iter().map(|r| (depth_key(r.depth), r)).collect())
        .collect();

    let mut table = header.iter().join("\t");
    table.push('\n');

    for depth in grid.depths() {
        let key = depth_key(depth);
        let mut cells = vec![format!("{depth}")];
        for (raw_map, calc_map) in raw_maps.iter().zip(&calc_maps) {
            for field in RAW_FIELDS {
                cells.push(render_cell(raw_map.get(&key).and_then(|r| raw_field(r, field))));
            }
            for field in CALC_FIELDS {
                cells.push(render_cell(calc_map.get(&key).and_then(|r| calc_field(r, field))));
            }
        }
        table.push_str(&cells.iter().join("\t"));
        table.push('\n');
    }

    table
}

fn render_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => String::new(),
    }
}
