// CLI-level checks: argument surface, pre-network validation, and full runs
// against a mocked controller.

use assert_cmd::cargo::cargo_bin_cmd;
use httpmock::MockServer;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;

/// Stands up the session endpoints every logged-in run touches and returns
/// the logout mock so tests can assert the session was torn down.
fn mock_session<'a>(server: &'a MockServer) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path("/v2.0/api/profile");
        then.status(200).json_body(json!({"tenant_id": "t-1"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v2.0/api/tenants/t-1");
        then.status(200).json_body(json!({"name": "Acme Networks"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v4.7/api/sites");
        then.status(200)
            .json_body(json!({"items": [{"id": "site-1", "name": "Branch One"}]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v2.0/api/waninterfacelabels");
        then.status(200).json_body(
            json!({"items": [{"id": "lbl-1", "name": "Internet", "label": "public-1"}]}),
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/v2.0/api/wannetworks");
        then.status(200).json_body(
            json!({"items": [{"id": "wn-1", "name": "Carrier A", "type": "publicwan"}]}),
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/v2.0/api/logout");
        then.status(200).body("{}");
    })
}

fn wrote_csv(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).unwrap().any(|entry| {
        entry
            .unwrap()
            .file_name()
            .to_string_lossy()
            .contains("_pcmdata_")
    })
}

#[test]
fn help_lists_all_flags() {
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.arg("--help");
    let mut assert = cmd.assert().success();
    for flag in [
        "--controller",
        "--email",
        "--pass",
        "--sitename",
        "--hours",
        "--starttime",
        "--endtime",
    ] {
        assert = assert.stdout(predicates::str::contains(flag));
    }
}

#[test]
fn range_with_only_starttime_fails_before_any_network_call() {
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.args([
        "--hours",
        "RANGE",
        "--starttime",
        "2025-01-01T00:00:00Z",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("--starttime and --endtime"));
}

#[test]
fn zero_hours_is_rejected() {
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.args(["--hours", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid number of hours"));
}

#[test]
fn unknown_sitename_logs_out_and_writes_no_csv() {
    let server = MockServer::start();
    let logout = mock_session(&server);

    let cwd = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.current_dir(cwd.path())
        .env("PCMCTL_CONFIG_DIR", cwd.path().join("config"))
        .env("X_AUTH_TOKEN", "tok-123")
        .env_remove("AUTH_TOKEN")
        .args(["--controller", &server.base_url(), "--sitename", "No Such Site"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid site name"))
        .stdout(predicates::str::contains("Getting PCM Data").not());

    logout.assert();
    assert!(!wrote_csv(cwd.path()));
}

#[test]
fn named_site_run_saves_csv_and_logs_out() {
    let server = MockServer::start();
    let logout = mock_session(&server);
    server.mock(|when, then| {
        when.method(GET).path("/v2.7/api/sites/site-1/waninterfaces");
        then.status(200).json_body(json!({"items": [{
            "id": "swi-1",
            "name": "Primary Internet",
            "label_id": "lbl-1",
            "network_id": "wn-1",
            "type": "publicwan",
            "link_bw_up": 50.0,
            "link_bw_down": 200.0,
            "bwc_enabled": true,
            "lqm_enabled": false
        }]}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/v2.1/api/monitor/metrics");
        then.status(200).json_body(json!({"metrics": [{"series": [
            {
                "view": {"direction": "Ingress"},
                "data": [{"datapoints": [{"time": "t0", "value": 100.0}]}]
            },
            {
                "view": {"direction": "Egress"},
                "data": [{"datapoints": [{"time": "t0", "value": 40.0}]}]
            }
        ]}]}));
    });

    let cwd = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.current_dir(cwd.path())
        .env("PCMCTL_CONFIG_DIR", cwd.path().join("config"))
        .env("X_AUTH_TOKEN", "tok-123")
        .env_remove("AUTH_TOKEN")
        .args(["--controller", &server.base_url(), "--sitename", "Branch One"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("INFO: Getting PCM Data for Branch One"))
        .stdout(predicates::str::contains("INFO: Saving PCM data to file"))
        .stdout(predicates::str::contains("INFO: Logging Out"));

    logout.assert();
    assert!(wrote_csv(cwd.path()));
}

#[test]
fn unparsable_range_bound_is_rejected() {
    let mut cmd = cargo_bin_cmd!("pcmctl");
    cmd.args([
        "--hours",
        "RANGE",
        "--starttime",
        "yesterday",
        "--endtime",
        "2025-01-02T00:00:00Z",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("parsing timestamp"));
}
