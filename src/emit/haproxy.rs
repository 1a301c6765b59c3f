//! Assembly of the haproxy.config document.

use crate::config::models::ConfigMode;
use crate::core::{
    RUN_DIR, RenderContext, Section, backend, frontend, rate_limit, raw_blocks, render_sections,
};

/// Render the full config document. `raw_config` short-circuits everything;
/// `raw_blocks_only` keeps only operator-supplied blocks.
pub fn render(ctx: &RenderContext) -> String {
    let p = ctx.properties;
    if let Some(raw) = &p.raw_config {
        return format!("{raw}\n");
    }

    let mut sections: Vec<Section> = Vec::new();
    match p.config_mode {
        ConfigMode::RawBlocksOnly => {
            for kind in ["global", "defaults"] {
                if let Some(lines) = raw_blocks::top_level_lines(&p.raw_blocks, kind) {
                    let mut section = Section::new(kind);
                    section.extend(lines.iter().cloned());
                    sections.push(section);
                }
            }
        }
        ConfigMode::Classic => {
            sections.push(global_section(ctx));
            sections.push(defaults_section(ctx));

            if let Some(section) = frontend::http_in_section(ctx) {
                sections.push(section);
            }
            if let Some(section) = frontend::https_in_section(ctx) {
                sections.push(section);
            }
            if let Some(section) = frontend::wss_in_section(ctx) {
                sections.push(section);
            }
            sections.extend(frontend::tcp_frontend_sections(ctx));
            if let Some(section) = frontend::cf_tcp_routing_section(ctx) {
                sections.push(section);
            }

            sections.extend(backend::http_backend_sections(ctx));
            sections.extend(backend::routed_backend_sections(ctx));
            sections.extend(backend::tcp_backend_sections(ctx));
            sections.extend(rate_limit::stick_table_sections(p));

            if let Some(section) = frontend::stats_listener_section(ctx) {
                sections.push(section);
            }
            sections.extend(frontend::health_listener_sections(ctx));

            if let Some(section) = resolvers_section(ctx) {
                sections.push(section);
            }
        }
    }

    sections.extend(raw_blocks::grouped_sections(&p.raw_blocks));

    tracing::info!(
        sections = sections.len(),
        mode = ?p.config_mode,
        "assembled config document"
    );

    render_sections(&sections)
}

fn global_section(ctx: &RenderContext) -> Section {
    let p = ctx.properties;
    let mut section = Section::new("global");
    section.push("daemon");
    section.push("user vcap");
    section.push("group vcap");
    section.push("spread-checks 4");
    section.push("stats timeout 2m");
    section.push(format!(
        "log {} len {} format {} syslog {}",
        p.syslog_server, p.log_max_length, p.log_format, p.log_level
    ));

    if p.nbproc > 1 {
        section.push(format!("nbproc {}", p.nbproc));
        for i in 1..=p.nbproc {
            section.push(format!(
                "stats socket {RUN_DIR}/stats{i}.sock mode 600 expose-fd listeners level admin process {i}"
            ));
        }
    } else {
        section.push(format!(
            "stats socket {RUN_DIR}/stats.sock mode 600 expose-fd listeners level admin"
        ));
    }
    if let Some(nbthread) = p.nbthread {
        section.push(format!("nbthread {nbthread}"));
    }

    section.push(format!("maxconn {}", p.max_connections));
    section.push(format!("hard-stop-after {}", p.reload_hard_stop_after));

    for script in &p.lua_scripts {
        section.push(format!("lua-load {script}"));
    }
    for script in &p.lua_scripts_per_thread {
        section.push(format!("lua-load-per-thread {script}"));
    }

    section.push(format!("tune.ssl.default-dh-param {}", p.default_dh_param));
    section.push(format!("tune.bufsize {}", p.buffer_size_bytes));
    if let Some(max_rewrite) = p.max_rewrite {
        section.push(format!("tune.maxrewrite {max_rewrite}"));
    }

    let tls_options = tls_default_options(ctx);
    section.push(format!("ssl-default-server-options {tls_options}"));
    section.push(format!("ssl-default-bind-options {tls_options}"));
    section.push(format!("ssl-default-server-ciphers {}", p.ssl_ciphers));
    section.push(format!("ssl-default-bind-ciphers {}", p.ssl_ciphers));
    if let Some(suites) = &p.ssl_ciphersuites {
        section.push(format!("ssl-default-server-ciphersuites {suites}"));
        section.push(format!("ssl-default-bind-ciphersuites {suites}"));
    }

    if p.backend_match_http_protocol {
        section.push("set-var proc.h2_alpn_tag str(h2)");
    }

    if let Some(config) = &p.global_config {
        section.extend(crate::utils::config_lines(config));
    }
    if let Some(lines) = raw_blocks::top_level_lines(&p.raw_blocks, "global") {
        section.extend(lines.iter().cloned());
    }

    section
}

fn tls_default_options(ctx: &RenderContext) -> String {
    let p = ctx.properties;
    let mut options = String::from("no-sslv3");
    if p.disable_tls_10 {
        options.push_str(" no-tlsv10");
    }
    if p.disable_tls_11 {
        options.push_str(" no-tlsv11");
    }
    if p.disable_tls_12 {
        options.push_str(" no-tlsv12");
    }
    if p.disable_tls_13 {
        options.push_str(" no-tlsv13");
    }
    if p.disable_tls_tickets {
        options.push_str(" no-tls-tickets");
    }
    options
}

fn defaults_section(ctx: &RenderContext) -> Section {
    let p = ctx.properties;
    let mut section = Section::new("defaults");
    section.push("log global");
    section.push("option log-health-checks");
    section.push("option log-separate-errors");
    section.push("option http-server-close");
    section.push("option httplog");
    section.push("option forwardfor");
    section.push("option contstats");
    if p.backend_prefer_local_az {
        section.push("option allbackups");
    }
    section.push(format!("maxconn {}", p.max_connections));

    let timeouts = [
        ("connect", p.connect_timeout),
        ("client", p.client_timeout),
        ("server", p.server_timeout),
        ("tunnel", p.websocket_timeout),
        ("http-keep-alive", p.keepalive_timeout),
        ("http-request", p.request_timeout),
        ("queue", p.queue_timeout),
    ];
    for (name, seconds) in timeouts {
        let directive = format!("timeout {name}");
        section.push(format!("{directive:<24}{}ms", seconds * 1000));
    }

    if let Some(config) = &p.default_config {
        section.extend(crate::utils::config_lines(config));
    }
    if let Some(lines) = raw_blocks::top_level_lines(&p.raw_blocks, "defaults") {
        section.extend(lines.iter().cloned());
    }

    section
}

fn resolvers_section(ctx: &RenderContext) -> Option<Section> {
    let p = ctx.properties;
    if p.resolvers.is_empty() {
        return None;
    }
    let mut section = Section::new("resolvers default");
    for (name, address) in &p.resolvers {
        section.push(format!("nameserver {name} {address}:53"));
    }
    section.push(format!("hold valid {}", p.dns_hold));
    section.push(format!("timeout retry {}", p.resolve_retry_timeout));
    section.push(format!("resolve_retries {}", p.resolve_retries));
    Some(section)
}
