// pcmctl - path capacity reporting for cloud-managed SD-WAN controllers
// Copyright (C) 2025 pcmctl authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Reference-data lookups, report-row construction and CSV output.

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::client::ApiClient;
use crate::metrics::{Window, fetch_pcm};
use crate::schema::{ItemsEnvelope, Site, WanInterface, WanInterfaceLabel, WanNetwork};
use crate::stats::DirectionStats;

pub const ALL_SITES: &str = "ALL_SITES";

/// Rendered in place of a statistic when a direction had no samples.
const NO_DATA: &str = "-";

/// Pause between per-circuit metrics queries to stay under API rate limits.
const CIRCUIT_QUERY_DELAY: Duration = Duration::from_millis(500);

/// Id/name lookup tables built once per run, before any circuit or metric
/// query. Row construction depends on them being populated.
#[derive(Debug, Default)]
pub struct Lookups {
    pub site_names: HashMap<String, String>,
    pub site_ids: HashMap<String, String>,
    pub label_names: HashMap<String, String>,
    pub network_names: HashMap<String, String>,
}

impl Lookups {
    /// Fetch sites, WAN interface labels and WAN networks. A failing endpoint
    /// is reported and leaves its table empty; there is no retry.
    pub fn load(client: &ApiClient) -> Result<Self> {
        let mut lookups = Self::default();

        let resp = client.get("v4.7/api/sites")?;
        if resp.ok() {
            let sites: ItemsEnvelope<Site> = resp.parse()?;
            for site in sites.items {
                lookups.site_names.insert(site.id.clone(), site.name.clone());
                lookups.site_ids.insert(site.name, site.id);
            }
        } else {
            println!("ERR: Could not retrieve Sites");
            resp.dump();
        }

        let resp = client.get("v2.0/api/waninterfacelabels")?;
        if resp.ok() {
            let labels: ItemsEnvelope<WanInterfaceLabel> = resp.parse()?;
            for label in labels.items {
                lookups.label_names.insert(label.id, label.name);
            }
        } else {
            println!("ERR: Could not retrieve WAN Interface Labels");
            resp.dump();
        }

        let resp = client.get("v2.0/api/wannetworks")?;
        if resp.ok() {
            let networks: ItemsEnvelope<WanNetwork> = resp.parse()?;
            for network in networks.items {
                lookups.network_names.insert(network.id, network.name);
            }
        } else {
            println!("ERR: Could not retrieve WAN Networks");
            resp.dump();
        }

        Ok(lookups)
    }

    /// Resolve the site filter to a list of site ids. `None` means the name
    /// is unknown and the run must stop.
    pub fn select_sites(&self, sitename: &str) -> Option<Vec<String>> {
        if sitename == ALL_SITES {
            return Some(self.site_names.keys().cloned().collect());
        }
        self.site_ids.get(sitename).map(|id| vec![id.clone()])
    }
}

/// One CSV row: circuit metadata plus both directions' statistics. Upstream
/// columns carry Egress statistics and downstream columns carry Ingress, the
/// inversion being relative to the measuring device.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportRow {
    site_name: String,
    site_id: String,
    circuit_name: String,
    circuit_id: String,
    circuit_label: String,
    wan_network: String,
    wan_network_type: String,
    upstream_bw_provisioned: f64,
    downstream_bw_provisioned: f64,
    bwc_enabled: bool,
    lqm_enabled: bool,
    upstream_bw_pcm_mean: String,
    upstream_bw_pcm_min: String,
    upstream_bw_pcm_max: String,
    upstream_bw_pcm_std: String,
    upstream_bw_pcm_25pct: String,
    upstream_bw_pcm_50pct: String,
    // header kept as 70pct for compatibility; the value is the 75th percentile
    upstream_bw_pcm_70pct: String,
    downstream_bw_pcm_mean: String,
    downstream_bw_pcm_min: String,
    downstream_bw_pcm_max: String,
    downstream_bw_pcm_std: String,
    downstream_bw_pcm_25pct: String,
    downstream_bw_pcm_50pct: String,
    downstream_bw_pcm_70pct: String,
}

impl ReportRow {
    pub fn new(
        site_id: &str,
        site_name: &str,
        circuit: &WanInterface,
        lookups: &Lookups,
        egress: &DirectionStats,
        ingress: &DirectionStats,
    ) -> Result<Self> {
        Ok(Self {
            site_name: site_name.to_string(),
            site_id: site_id.to_string(),
            circuit_name: circuit.name.clone(),
            circuit_id: circuit.id.clone(),
            circuit_label: resolve_name(&circuit.label_id, &lookups.label_names)
                .with_context(|| format!("circuit {}", circuit.id))?,
            wan_network: resolve_name(&circuit.network_id, &lookups.network_names)
                .with_context(|| format!("circuit {}", circuit.id))?,
            wan_network_type: circuit.circuit_type.clone(),
            upstream_bw_provisioned: circuit.link_bw_up,
            downstream_bw_provisioned: circuit.link_bw_down,
            bwc_enabled: circuit.bwc_enabled,
            lqm_enabled: circuit.lqm_enabled,
            upstream_bw_pcm_mean: stat_cell(egress.mean),
            upstream_bw_pcm_min: stat_cell(egress.min),
            upstream_bw_pcm_max: stat_cell(egress.max),
            upstream_bw_pcm_std: stat_cell(egress.std),
            upstream_bw_pcm_25pct: stat_cell(egress.p25),
            upstream_bw_pcm_50pct: stat_cell(egress.p50),
            upstream_bw_pcm_70pct: stat_cell(egress.p75),
            downstream_bw_pcm_mean: stat_cell(ingress.mean),
            downstream_bw_pcm_min: stat_cell(ingress.min),
            downstream_bw_pcm_max: stat_cell(ingress.max),
            downstream_bw_pcm_std: stat_cell(ingress.std),
            downstream_bw_pcm_25pct: stat_cell(ingress.p25),
            downstream_bw_pcm_50pct: stat_cell(ingress.p50),
            downstream_bw_pcm_70pct: stat_cell(ingress.p75),
        })
    }
}

fn stat_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NO_DATA.to_string(),
    }
}

fn resolve_name(id: &Option<String>, table: &HashMap<String, String>) -> Result<String> {
    match id {
        Some(id) => table
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("id {id} missing from lookup table")),
        None => Ok(String::new()),
    }
}

/// Walk every selected site's circuits, aggregate PCM per circuit, and
/// accumulate rows. A circuit whose metrics call failed is skipped entirely.
pub fn build_report(
    client: &ApiClient,
    lookups: &Lookups,
    site_ids: &[String],
    window: &Window,
) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();

    for site_id in site_ids {
        let site_name = lookups
            .site_names
            .get(site_id)
            .cloned()
            .unwrap_or_default();
        println!("{site_name}");

        let resp = client.get(&format!("v2.7/api/sites/{site_id}/waninterfaces"))?;
        if !resp.ok() {
            println!("ERR: Could not retrieve WAN Interfaces for {site_name}");
            resp.dump();
            continue;
        }
        let circuits: ItemsEnvelope<WanInterface> = resp.parse()?;
        println!("\tNum WAN Interfaces: {}", circuits.items.len());

        for circuit in &circuits.items {
            let pcm = fetch_pcm(client, window, site_id, &site_name, &circuit.id)?;
            let (Some(ingress), Some(egress)) = (pcm.get("Ingress"), pcm.get("Egress")) else {
                // nothing to extract for this circuit
                continue;
            };
            rows.push(ReportRow::new(
                site_id, &site_name, circuit, lookups, egress, ingress,
            )?);

            thread::sleep(CIRCUIT_QUERY_DELAY);
        }
    }

    Ok(rows)
}

/// Serialize the report to `<tenant>_pcmdata_<timestamp>.csv` in `dir` and
/// return the path. Header row comes from the field names; no index column.
pub fn write_csv(rows: &[ReportRow], tenant_name: &str, dir: &Path) -> Result<PathBuf> {
    let tenant: String = tenant_name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let stamp = Utc::now().format("%Y-%m-%d-%H-%M-%S");
    let path = dir.join(format!("{tenant}_pcmdata_{stamp}.csv"));
    println!("INFO: Saving PCM data to file {}", path.display());

    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {:?}", path))?;
    for row in rows {
        writer.serialize(row).context("writing report row")?;
    }
    writer.flush().context("flushing report")?;
    Ok(path)
}
