//! Typed records for the persisted campaign collection.
//!
//! The collection is one JSON document: campaign stamps as keys plus a
//! reserved `info` entry with collection-level metadata. Fields that these
//! tools do not produce are kept in flattened maps so a load/compute/save
//! cycle never drops them.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use eyre::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stamp format used for document keys and export headers.
pub const STAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Whole campaign collection, keys already parsed and ordered.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub info: Option<Value>,
    pub campaigns: BTreeMap<NaiveDateTime, Campaign>,
}

/// One survey event at a borehole.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub campaign_info: CampaignInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw: Vec<RawRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calc: Vec<CalcRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignInfo {
    /// May this campaign serve as a baseline for increment computation.
    #[serde(default)]
    pub reference: bool,
    /// Is this campaign eligible as a previous-reference anchor.
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for CampaignInfo {
    fn default() -> Self {
        CampaignInfo {
            reference: false,
            active: true,
            extra: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-depth probe readings as imported, one value per face pass.
/// Never touched by the increment computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub depth: f64,
    pub a_plus: f64,
    pub a_minus: f64,
    pub b_plus: f64,
    pub b_minus: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Per-depth computed record. `depth` is the join key correlating records
/// across campaigns; derived fields stay absent until a computation fills
/// them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalcRecord {
    pub depth: f64,
    pub dev_a: f64,
    pub dev_b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incr_dev_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incr_dev_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_dev_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_dev_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desp_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desp_b: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Join key for depth values, millimetre resolution.
pub fn depth_key(depth: f64) -> i64 {
    (depth * 1000.0).round() as i64
}

/// Parse a campaign stamp. Accepts a full ISO-8601 timestamp (`T` or space
/// separated) or a bare date, which maps to midnight.
pub fn parse_stamp(s: &str) -> Result<NaiveDateTime> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(s, STAMP_FMT) {
        return Ok(stamp);
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(stamp);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    bail!("malformed campaign stamp: {s:?}")
}
