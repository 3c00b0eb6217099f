//! Parser for RST-style inclinometer survey logs.
//!
//! The vendor format is line oriented: `Key: value` header lines (date,
//! time, borehole, probe serial, reading interval), then a column header
//! starting with `DEPTH` and one row per depth with the four face readings
//! `A+ A- B+ B-`, whitespace or comma separated.

use chrono::{NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use eyre::{bail, eyre, Result, WrapErr};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::{parse_stamp, CalcRecord, Campaign, RawRecord};

/// What to do with a data row that does not parse.
///
/// The header block is exempt: a malformed date or interval always aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Fail on the first bad row.
    #[default]
    Abort,
    /// Parse the whole file, then report every bad row at once.
    Collect,
    /// Drop bad rows and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRow {
    pub depth: f64,
    pub a_plus: f64,
    pub a_minus: f64,
    pub b_plus: f64,
    pub b_minus: f64,
}

/// One parsed survey file.
#[derive(Debug, Clone)]
pub struct Survey {
    pub stamp: NaiveDateTime,
    pub borehole: Option<String>,
    pub probe: Option<String>,
    /// Reading interval in metres, `Interval` header, defaults to 0.5.
    pub interval: f64,
    pub rows: Vec<SurveyRow>,
}

pub fn parse_survey(text: &str, policy: ErrorPolicy) -> Result<Survey> {
    let mut date = None;
    let mut time = None;
    let mut borehole = None;
    let mut probe = None;
    let mut interval = 0.5_f64;

    let mut rows = Vec::new();
    let mut bad_rows = Vec::new();
    let mut in_data = false;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !in_data {
            if line.to_ascii_uppercase().starts_with("DEPTH") {
                in_data = true;
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim().to_ascii_lowercase().as_str() {
                    "date" => date = Some(parse_stamp(value).wrap_err("Date header")?.date()),
                    "time" => {
                        time = Some(
                            NaiveTime::parse_from_str(value, "%H:%M:%S")
                                .wrap_err("Time header")?,
                        )
                    }
                    "borehole" | "hole" => borehole = Some(value.to_string()),
                    "probe" | "probe serial" => probe = Some(value.to_string()),
                    "interval" => {
                        interval = value.parse().wrap_err("Interval header")?;
                    }
                    _ => {} // vendor headers we do not consume
                }
            }
            continue;
        }

        match parse_row(line) {
            Ok(row) => rows.push(row),
            Err(err) => match policy {
                ErrorPolicy::Abort => {
                    return Err(err.wrap_err(format!("line {}", idx + 1)));
                }
                ErrorPolicy::Collect => bad_rows.push(format!("line {}: {err}", idx + 1)),
                ErrorPolicy::Skip => {
                    tracing::warn!("skipping line {}: {err}", idx + 1);
                }
            },
        }
    }

    if !bad_rows.is_empty() {
        bail!("{} bad rows:\n{}", bad_rows.len(), bad_rows.iter().join("\n"));
    }

    let date = date.ok_or_else(|| eyre!("missing Date header"))?;
    let stamp = date.and_time(time.unwrap_or(NaiveTime::MIN));

    Ok(Survey {
        stamp,
        borehole,
        probe,
        interval,
        rows,
    })
}

fn parse_row(line: &str) -> Result<SurveyRow> {
    let fields: Vec<f64> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<f64>().map_err(|e| eyre!("{f:?}: {e}")))
        .try_collect()?;
    match fields[..] {
        [depth, a_plus, a_minus, b_plus, b_minus] => Ok(SurveyRow {
            depth,
            a_plus,
            a_minus,
            b_plus,
            b_minus,
        }),
        _ => bail!("expected 5 fields, got {}", fields.len()),
    }
}

impl Survey {
    /// Turn the survey into a campaign: face readings kept verbatim under
    /// `raw`, per-axis deviations seeded into `calc` as
    /// `(plus - minus) / 2 / constant * interval`.
    pub fn into_campaign(self, constant: f64) -> Campaign {
        let dev = |plus: f64, minus: f64| (plus - minus) / 2.0 / constant * self.interval;

        let mut campaign = Campaign::default();
        for row in &self.rows {
            campaign.raw.push(RawRecord {
                depth: row.depth,
                a_plus: row.a_plus,
                a_minus: row.a_minus,
                b_plus: row.b_plus,
                b_minus: row.b_minus,
                ..Default::default()
            });
            campaign.calc.push(CalcRecord {
                depth: row.depth,
                dev_a: dev(row.a_plus, row.a_minus),
                dev_b: dev(row.b_plus, row.b_minus),
                ..Default::default()
            });
        }
        if let Some(borehole) = self.borehole {
            campaign
                .extra
                .insert("borehole".into(), serde_json::Value::String(borehole));
        }
        if let Some(probe) = self.probe {
            campaign
                .extra
                .insert("probe".into(), serde_json::Value::String(probe));
        }
        campaign
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_stamp;

    const SAMPLE: &str = "\
RST INCLINOMETER SURVEY
Borehole: BH-1
Probe: 45821
Date: 2017-07-24
Time: 08:48:32
Interval: 0.5

DEPTH  A+     A-     B+     B-
0.5    123    -119   45     -43
1.0,  110,  -108,  40,  -38
";

    #[test]
    fn parses_headers_and_rows() {
        let survey = parse_survey(SAMPLE, ErrorPolicy::Abort).unwrap();
        assert_eq!(survey.stamp, parse_stamp("2017-07-24T08:48:32").unwrap());
        assert_eq!(survey.borehole.as_deref(), Some("BH-1"));
        assert_eq!(survey.probe.as_deref(), Some("45821"));
        assert_eq!(survey.rows.len(), 2);
        assert_eq!(survey.rows[1].depth, 1.0);
        assert_eq!(survey.rows[1].b_minus, -38.0);
    }

    #[test]
    fn missing_time_maps_to_midnight() {
        let text = "Date: 2017-07-24\nDEPTH A+ A- B+ B-\n0.5 1 -1 2 -2\n";
        let survey = parse_survey(text, ErrorPolicy::Abort).unwrap();
        assert_eq!(survey.stamp, parse_stamp("2017-07-24").unwrap());
        assert_eq!(survey.interval, 0.5);
    }

    #[test]
    fn missing_date_is_an_error() {
        let text = "DEPTH A+ A- B+ B-\n0.5 1 -1 2 -2\n";
        assert!(parse_survey(text, ErrorPolicy::Abort).is_err());
    }

    #[test]
    fn row_policies() {
        let text = "Date: 2017-07-24\nDEPTH A+ A- B+ B-\n0.5 1 -1 2 -2\nbad row here\n1.0 x -1 2 -2\n";

        assert!(parse_survey(text, ErrorPolicy::Abort).is_err());

        let err = parse_survey(text, ErrorPolicy::Collect).unwrap_err();
        assert!(err.to_string().contains("2 bad rows"));

        let survey = parse_survey(text, ErrorPolicy::Skip).unwrap();
        assert_eq!(survey.rows.len(), 1);
    }

    #[test]
    fn policy_parses_from_the_command_line() {
        use clap::ValueEnum;
        assert_eq!(
            ErrorPolicy::from_str("collect", true).unwrap(),
            ErrorPolicy::Collect
        );
        assert_eq!(ErrorPolicy::from_str("skip", true).unwrap(), ErrorPolicy::Skip);
        assert!(ErrorPolicy::from_str("ignore", true).is_err());
    }

    #[test]
    fn campaign_conversion_scales_deviations() {
        let survey = Survey {
            stamp: parse_stamp("2017-07-24").unwrap(),
            borehole: Some("BH-1".into()),
            probe: None,
            interval: 0.5,
            rows: vec![SurveyRow {
                depth: 0.5,
                a_plus: 123.0,
                a_minus: -119.0,
                b_plus: 45.0,
                b_minus: -43.0,
            }],
        };
        let campaign = survey.into_campaign(1.0);
        assert_eq!(campaign.raw.len(), 1);
        assert_eq!(campaign.calc[0].dev_a, 60.5);
        assert_eq!(campaign.calc[0].dev_b, 22.0);
        assert_eq!(campaign.extra["borehole"], "BH-1");
        // freshly imported campaigns are eligible anchors, not baselines
        assert!(campaign.campaign_info.active);
        assert!(!campaign.campaign_info.reference);
    }
}
