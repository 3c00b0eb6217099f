//! Incremental-displacement computation between survey campaigns.
//!
//! A target campaign is compared against the most recent reference-flagged
//! campaign at or before it. Per-depth deviation increments come out of a
//! depth-keyed join; the cumulative profiles (`abs_dev_*`, `desp_*`) are
//! suffix sums from each depth down to the deepest measured point.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use eyre::{bail, Result};

use crate::model::{depth_key, CalcRecord, Document};

/// Most recent campaign at or before `target` flagged as a reference.
/// Equality with the target qualifies.
pub fn find_reference(doc: &Document, target: NaiveDateTime) -> Option<NaiveDateTime> {
    doc.campaigns
        .range(..=target)
        .rev()
        .find(|(_, campaign)| campaign.campaign_info.reference)
        .map(|(stamp, _)| *stamp)
}

/// Most recent campaign strictly before `reference` flagged active.
///
/// Reserved: the increment computation selects this anchor but does not
/// consume it yet (intended for double-reference correction).
pub fn find_prior_active(doc: &Document, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    doc.campaigns
        .range(..reference)
        .rev()
        .find(|(_, campaign)| campaign.campaign_info.active)
        .map(|(stamp, _)| *stamp)
}

/// Run the increment batch for the campaign at `target` and merge the
/// results back into the document. Re-running with unchanged input
/// reproduces the same output.
pub fn compute_increments(mut doc: Document, target: NaiveDateTime) -> Result<Document> {
    let mut working = match doc.campaigns.get(&target) {
        Some(campaign) => campaign.calc.clone(),
        None => bail!("no campaign recorded at {target}"),
    };
    working.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    // No qualifying baseline: the campaign is its own reference and the
    // increments stay absent.
    let reference = find_reference(&doc, target).unwrap_or(target);
    let prior_active = find_prior_active(&doc, reference);
    tracing::debug!(%target, %reference, ?prior_active, "resolved baseline campaigns");

    if reference != target {
        let baseline: BTreeMap<i64, &CalcRecord> = doc.campaigns[&reference]
            .calc
            .iter()
            .map(|rec| (depth_key(rec.depth), rec))
            .collect();
        for rec in &mut working {
            // missing depth in the baseline is tolerated, the record just
            // gets no increment
            if let Some(base) = baseline.get(&depth_key(rec.depth)) {
                rec.incr_dev_a = Some(rec.dev_a - base.dev_a);
                rec.incr_dev_b = Some(rec.dev_b - base.dev_b);
            } else {
                rec.incr_dev_a = None;
                rec.incr_dev_b = None;
            }
        }
    } else {
        // a campaign measured against itself carries no increments; drop
        // any stale ones from an earlier run against a since-withdrawn
        // baseline
        for rec in &mut working {
            rec.incr_dev_a = None;
            rec.incr_dev_b = None;
        }
    }

    // suffix sums, deepest record upward
    let (mut abs_a, mut abs_b) = (0.0, 0.0);
    let (mut desp_a, mut desp_b) = (0.0, 0.0);
    for rec in working.iter_mut().rev() {
        abs_a += rec.dev_a;
        abs_b += rec.dev_b;
        desp_a += rec.incr_dev_a.unwrap_or(0.0);
        desp_b += rec.incr_dev_b.unwrap_or(0.0);
        rec.abs_dev_a = Some(abs_a);
        rec.abs_dev_b = Some(abs_b);
        rec.desp_a = Some(desp_a);
        rec.desp_b = Some(desp_b);
    }

    if let Some(stored) = doc.campaigns.get_mut(&target) {
        merge_structural(&mut stored.calc, &working);
        merge_increments(&mut stored.calc, &working);
    }

    Ok(doc)
}

/// First merge pass: everything except the increment fields. Unmatched
/// depths append a fresh record.
fn merge_structural(stored: &mut Vec<CalcRecord>, computed: &[CalcRecord]) {
    for rec in computed {
        match stored
            .iter_mut()
            .find(|s| depth_key(s.depth) == depth_key(rec.depth))
        {
            Some(s) => {
                s.dev_a = rec.dev_a;
                s.dev_b = rec.dev_b;
                s.abs_dev_a = rec.abs_dev_a;
                s.abs_dev_b = rec.abs_dev_b;
                s.desp_a = rec.desp_a;
                s.desp_b = rec.desp_b;
            }
            None => stored.push(CalcRecord {
                incr_dev_a: None,
                incr_dev_b: None,
                ..rec.clone()
            }),
        }
    }
}

/// Second merge pass: increments only. Kept separate from the structural
/// pass so a stale copy from one pass cannot clobber the other.
fn merge_increments(stored: &mut Vec<CalcRecord>, computed: &[CalcRecord]) {
    for rec in computed {
        if let Some(s) = stored
            .iter_mut()
            .find(|s| depth_key(s.depth) == depth_key(rec.depth))
        {
            s.incr_dev_a = rec.incr_dev_a;
            s.incr_dev_b = rec.incr_dev_b;
        }
    }
}
