//! Time window handling and per-circuit PCM retrieval.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DurationRound, NaiveDateTime, TimeDelta, Utc};
use std::collections::HashMap;

use crate::client::ApiClient;
use crate::schema::{MetricsRequest, MetricsResponse};
use crate::stats::{DirectionStats, describe};

pub const RANGE_KEYWORD: &str = "RANGE";

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
// Accepts optional fractional seconds, e.g. 2025-01-01T00:00:00.250Z.
const BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// The query window: either "the last N hours" resolved at query time, or an
/// explicit range whose bounds are forwarded verbatim to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    Hours(i64),
    Range { start: String, end: String },
}

impl Window {
    /// Validate the CLI inputs before any network work happens.
    pub fn from_args(hours: &str, starttime: Option<&str>, endtime: Option<&str>) -> Result<Self> {
        if hours == RANGE_KEYWORD {
            let (Some(start), Some(end)) = (starttime, endtime) else {
                bail!(
                    "for a time range, provide both --starttime and --endtime in format YYYY-MM-DDTHH:MM:SSZ"
                );
            };
            parse_bound(start)?;
            parse_bound(end)?;
            Ok(Window::Range {
                start: start.to_string(),
                end: end.to_string(),
            })
        } else {
            let hours: i64 = hours
                .parse()
                .map_err(|_| anyhow!("invalid number of hours: {hours}"))?;
            if hours <= 0 {
                bail!("invalid number of hours: {hours}");
            }
            Ok(Window::Hours(hours))
        }
    }

    /// Serialized `(start, end)` bounds. Hours mode truncates "now" to the
    /// minute in UTC; range mode returns the user's strings untouched.
    pub fn bounds(&self) -> Result<(String, String)> {
        match self {
            Window::Hours(hours) => {
                let end = Utc::now()
                    .duration_trunc(TimeDelta::minutes(1))
                    .context("truncating window end to the minute")?;
                let start = end - TimeDelta::hours(*hours);
                Ok((
                    start.format(WIRE_FORMAT).to_string(),
                    end.format(WIRE_FORMAT).to_string(),
                ))
            }
            Window::Range { start, end } => Ok((start.clone(), end.clone())),
        }
    }
}

fn parse_bound(bound: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(bound, BOUND_FORMAT)
        .with_context(|| format!("parsing timestamp `{bound}` (expected YYYY-MM-DDTHH:MM:SSZ)"))
}

/// Query PathCapacity for one circuit and reduce each direction's series to
/// summary statistics. A failed call is reported and yields an empty map, so
/// the caller skips the circuit.
pub fn fetch_pcm(
    client: &ApiClient,
    window: &Window,
    site_id: &str,
    site_name: &str,
    circuit_id: &str,
) -> Result<HashMap<String, DirectionStats>> {
    let (start_time, end_time) = window.bounds()?;
    let request = MetricsRequest::path_capacity(start_time, end_time, site_id, circuit_id);

    let mut pcm = HashMap::new();
    let resp = client.post_json("v2.1/api/monitor/metrics", &request)?;
    if !resp.ok() {
        println!("ERR: Could not retrieve PCM data for {site_name}: {circuit_id}");
        resp.dump();
        return Ok(pcm);
    }

    let parsed: MetricsResponse = resp.parse()?;
    for metric in parsed.metrics {
        for series in metric.series {
            let direction = series.view.direction;
            let samples: Vec<f64> = series
                .data
                .first()
                .map(|data| data.datapoints.iter().filter_map(|p| p.value).collect())
                .unwrap_or_default();
            if samples.is_empty() {
                println!("\tWARN: No {direction} PCM data retrieved for {site_name}:{circuit_id}");
            }
            pcm.insert(direction, describe(&samples));
        }
    }

    Ok(pcm)
}
