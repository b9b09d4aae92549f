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

//! Typed request/response payloads for the controller API.

use serde::{Deserialize, Serialize};

/// List endpoints wrap their results in an `items` array.
#[derive(Debug, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WanInterfaceLabel {
    pub id: String,
    pub name: String,
    // part of the wire shape; the report resolves circuits by label name only
    #[allow(dead_code)]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WanNetwork {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub network_type: String,
}

/// A WAN interface (circuit) scoped to a site. `label_id` and `network_id`
/// can be absent on private circuits.
#[derive(Debug, Clone, Deserialize)]
pub struct WanInterface {
    pub id: String,
    pub name: String,
    pub label_id: Option<String>,
    pub network_id: Option<String>,
    #[serde(rename = "type")]
    pub circuit_type: String,
    pub link_bw_up: f64,
    pub link_bw_down: f64,
    pub bwc_enabled: bool,
    pub lqm_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub x_auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Tenant {
    pub name: String,
}

/// Body for `POST monitor/metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsRequest {
    pub start_time: String,
    pub end_time: String,
    pub interval: String,
    pub view: MetricsView,
    pub filter: MetricsFilter,
    pub metrics: Vec<MetricDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct MetricsView {
    pub summary: bool,
    pub individual: String,
}

#[derive(Debug, Serialize)]
pub struct MetricsFilter {
    pub site: Vec<String>,
    pub path: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub statistics: Vec<String>,
    pub unit: String,
}

impl MetricsRequest {
    /// The fixed PCM query: PathCapacity in Mbps at 5-minute resolution,
    /// split per direction rather than summarized.
    pub fn path_capacity(
        start_time: String,
        end_time: String,
        site_id: &str,
        circuit_id: &str,
    ) -> Self {
        Self {
            start_time,
            end_time,
            interval: "5min".to_string(),
            view: MetricsView {
                summary: false,
                individual: "direction".to_string(),
            },
            filter: MetricsFilter {
                site: vec![site_id.to_string()],
                path: vec![circuit_id.to_string()],
            },
            metrics: vec![MetricDescriptor {
                name: "PathCapacity".to_string(),
                statistics: vec!["average".to_string()],
                unit: "Mbps".to_string(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsResponse {
    #[serde(default = "Vec::new")]
    pub metrics: Vec<MetricResult>,
}

#[derive(Debug, Deserialize)]
pub struct MetricResult {
    #[serde(default = "Vec::new")]
    pub series: Vec<MetricSeries>,
}

#[derive(Debug, Deserialize)]
pub struct MetricSeries {
    pub view: SeriesView,
    #[serde(default = "Vec::new")]
    pub data: Vec<SeriesData>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesView {
    pub direction: String,
}

#[derive(Debug, Deserialize)]
pub struct SeriesData {
    #[serde(default = "Vec::new")]
    pub datapoints: Vec<Datapoint>,
}

/// A single sample. The controller reports gaps as null values.
#[derive(Debug, Deserialize)]
pub struct Datapoint {
    pub time: Option<String>,
    pub value: Option<f64>,
}
