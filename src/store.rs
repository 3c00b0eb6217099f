//! Whole-document JSON persistence for the campaign collection.
//!
//! Stamps are validated while loading; a key that does not parse as a date
//! aborts the load instead of surviving as an unreachable entry.

use std::collections::BTreeMap;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{parse_stamp, Campaign, Document, STAMP_FMT};

/// On-disk shape: the reserved `info` entry plus stamp-keyed campaigns.
#[derive(Serialize, Deserialize)]
struct RawDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    info: Option<Value>,
    #[serde(flatten)]
    campaigns: BTreeMap<String, Campaign>,
}

pub fn from_json(text: &str) -> Result<Document> {
    let raw: RawDocument = serde_json::from_str(text)?;
    let mut campaigns = BTreeMap::new();
    for (key, campaign) in raw.campaigns {
        let stamp = parse_stamp(&key).wrap_err_with(|| format!("campaign key {key:?}"))?;
        campaigns.insert(stamp, campaign);
    }
    Ok(Document {
        info: raw.info,
        campaigns,
    })
}

/// Serialize the document. Campaign keys are written in the canonical
/// stamp format, so a bare-date key read in (`2017-01-01`) comes back out
/// normalized (`2017-01-01T00:00:00`) even without a computation.
pub fn to_json(doc: &Document) -> Result<String> {
    let raw = RawDocument {
        info: doc.info.clone(),
        campaigns: doc
            .campaigns
            .iter()
            .map(|(stamp, campaign)| (stamp.format(STAMP_FMT).to_string(), campaign.clone()))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&raw)?)
}

pub fn load(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    from_json(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}

pub fn save(path: &Path, doc: &Document) -> Result<()> {
    std::fs::write(path, to_json(doc)?)
        .wrap_err_with(|| format!("writing {}", path.display()))
}
