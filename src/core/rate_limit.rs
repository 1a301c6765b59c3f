//! Stick-table based request and connection rate limiting.

use crate::config::models::Properties;
use crate::core::{CONFIG_DIR, Section};

/// Stick-table holder backends, emitted after the regular backends.
pub fn stick_table_sections(p: &Properties) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(limit) = &p.requests_rate_limit {
        let mut section = Section::new("backend st_http_req_rate");
        section.push(format!(
            "stick-table type ip size {} expire {} store http_req_rate({})",
            limit.table_size, limit.window_size, limit.window_size
        ));
        sections.push(section);
    }

    if let Some(limit) = &p.connections_rate_limit {
        let mut section = Section::new("backend st_tcp_conn_rate");
        section.push(format!(
            "stick-table type ip size {} expire {} store conn_rate({})",
            limit.table_size, limit.window_size, limit.window_size
        ));
        sections.push(section);
    }

    sections
}

/// Per-connection tracking and rejection lines for every frontend.
pub fn connection_tracking_lines(p: &Properties) -> Vec<String> {
    let limit = match &p.connections_rate_limit {
        Some(limit) => limit,
        None => return Vec::new(),
    };

    let mut lines = vec!["tcp-request connection track-sc0 src table st_tcp_conn_rate".to_string()];
    if limit.block {
        if let Some(connections) = limit.connections {
            let exclude = if limit.cidrs_to_exclude.is_empty() {
                String::new()
            } else {
                format!(" !{{ src -f {CONFIG_DIR}/cidrs_to_exclude_from_blocking.txt }}")
            };
            lines.push(format!(
                "tcp-request connection reject if {{ sc_conn_rate(0) gt {connections} }}{exclude}"
            ));
        }
    }
    lines
}

/// Per-request tracking lines for the HTTP frontends.
pub fn http_tracking_lines(p: &Properties) -> Vec<String> {
    let limit = match &p.requests_rate_limit {
        Some(limit) => limit,
        None => return Vec::new(),
    };

    let mut lines = vec!["tcp-request content track-sc1 src table st_http_req_rate".to_string()];
    if limit.block {
        if let Some(requests) = limit.requests {
            lines.push(format!(
                "http-request deny status 429 if {{ sc_http_req_rate(1) gt {requests} }}"
            ));
        }
    }
    lines
}
