//! Backend section generation: HTTP router pools, path-routed pools and TCP
//! proxies.

use crate::config::models::{BackendSsl, RoutedBackend, TcpBackend};
use crate::core::{CONFIG_DIR, ERRORFILE_DIR, PoolServer, RenderContext, Section, naming};
use crate::utils::config_lines;

/// The `ssl ...` argument group for a server line, or "" when TLS toward the
/// backend is off.
fn ssl_argument(posture: BackendSsl, verifyhost: Option<&str>, alpn: &str) -> String {
    match posture {
        BackendSsl::Off => String::new(),
        BackendSsl::Noverify => format!("ssl verify none{alpn}"),
        BackendSsl::Verify => {
            let verifyhost = verifyhost
                .map(|host| format!(" verifyhost {host}"))
                .unwrap_or_default();
            format!(
                "ssl verify required ca-file {CONFIG_DIR}/backend-ca-certs.pem{verifyhost}{alpn}"
            )
        }
    }
}

/// HTTP router pool sections (`http-routers-http1` / `http-routers-http2`).
pub fn http_backend_sections(ctx: &RenderContext) -> Vec<Section> {
    let p = ctx.properties;
    let variants = ctx.pool_variants();
    let servers = ctx.http_pool_servers();

    let mut sections = Vec::new();
    if variants.http1 {
        sections.push(http_pool_section(
            ctx,
            "http-routers-http1",
            "http/1.1",
            &servers,
        ));
    }
    if variants.http2 {
        sections.push(http_pool_section(
            ctx,
            "http-routers-http2",
            "h2,http/1.1",
            &servers,
        ));
    }

    tracing::debug!(
        http1 = variants.http1,
        http2 = variants.http2,
        servers = servers.len(),
        backend_ssl = ?p.backend_ssl,
        "resolved http router pools"
    );

    sections
}

fn http_pool_section(
    ctx: &RenderContext,
    name: &str,
    alpn_protos: &str,
    servers: &[PoolServer],
) -> Section {
    let p = ctx.properties;
    let mut section = Section::new(format!("backend {name}"));
    section.push("mode http");
    section.push("balance roundrobin");

    if let Some(types) = &p.compress_types {
        section.push("compression algo gzip");
        section.push(format!("compression type {types}"));
    }

    if let Some(config) = &p.backend_config {
        section.extend(config_lines(config));
    }

    if p.backend_use_http_health {
        section.push(format!("option httpchk GET {}", p.backend_http_health_uri));
    }

    for (code, _) in &p.custom_http_error_files {
        section.push(format!(
            "errorfile {code} {ERRORFILE_DIR}/custom{code}.http"
        ));
    }

    let alpn = if p.backend_ssl == BackendSsl::Off {
        String::new()
    } else {
        format!(" alpn {alpn_protos}")
    };
    let ssl = ssl_argument(p.backend_ssl, p.backend_ssl_verifyhost.as_deref(), &alpn);

    for (i, server) in servers.iter().enumerate() {
        let mut base = format!("server node{i} {}:{}", server.address, p.backend_port);
        if ctx.use_resolvers() {
            base.push_str(" resolvers default");
        }
        if p.backend_crt.is_some() {
            base.push_str(&format!(" crt {CONFIG_DIR}/backend-crt.pem"));
        }
        base.push_str(" check inter 1000");
        if p.backend_use_http_health {
            base.push_str(&format!(
                " port {} fall {} rise {}",
                p.backend_http_health_port, p.backend_health_fall, p.backend_health_rise
            ));
        }
        let backup = if server.backup { "backup" } else { "" };
        section.push(format!("{base}  {ssl} {backup}").trim_end().to_string());
    }

    section
}

/// Path-routed pool sections, one per `routed_backend_servers` entry, in
/// declaration order.
pub fn routed_backend_sections(ctx: &RenderContext) -> Vec<Section> {
    ctx.properties
        .routed_backend_servers
        .iter()
        .map(|(path, entry)| routed_backend_section(ctx, path, entry))
        .collect()
}

fn routed_backend_section(ctx: &RenderContext, path: &str, entry: &RoutedBackend) -> Section {
    let p = ctx.properties;
    let mut section = Section::new(format!("backend {}", naming::routed_backend_name(path)));
    section.push("mode http");
    section.push("balance roundrobin");

    if entry.backend_use_http_health {
        section.push(format!(
            "option httpchk GET {}",
            entry.backend_http_health_uri
        ));
    }

    let alpn = if p.http2_backend_enabled() && entry.backend_ssl != BackendSsl::Off {
        " alpn h2,http/1.1"
    } else {
        ""
    };
    let ssl = ssl_argument(entry.backend_ssl, entry.backend_verifyhost.as_deref(), alpn);

    for (i, address) in entry.servers.iter().enumerate() {
        let mut base = format!("server node{i} {address}:{}", entry.port);
        if ctx.use_resolvers() {
            base.push_str(" resolvers default");
        }
        base.push_str(" check inter 1000");
        if entry.backend_use_http_health {
            let check_port = entry.backend_http_health_port.unwrap_or(entry.port);
            base.push_str(&format!(" port {check_port}"));
        }
        section.push(format!("{base}  {ssl}").trim_end().to_string());
    }

    section
}

/// TCP proxy backends: property-defined entries first, then the link-supplied
/// groups, then the TCP router pool.
pub fn tcp_backend_sections(ctx: &RenderContext) -> Vec<Section> {
    let mut sections: Vec<Section> = ctx
        .properties
        .tcp
        .iter()
        .map(|entry| tcp_entry_section(ctx, entry))
        .collect();

    sections.extend(tcp_link_sections(ctx));

    if let Some(section) = tcp_router_section(ctx) {
        sections.push(section);
    }

    sections
}

fn tcp_entry_section(ctx: &RenderContext, entry: &TcpBackend) -> Section {
    let p = ctx.properties;
    let mut section = Section::new(format!("backend {}", naming::tcp_backend_name(&entry.name)));
    section.push("mode tcp");
    if let Some(balance) = &entry.balance {
        section.push(format!("balance {balance}"));
    }
    if entry.health_check_http.is_some() {
        section.push("option httpchk GET /health");
    }

    let server_port = entry.backend_port.unwrap_or(entry.port);
    let check_port = p
        .tcp_link_check_port
        .or(entry.health_check_http)
        .or(entry.backend_port)
        .unwrap_or(entry.port);
    let ssl = ssl_argument(entry.backend_ssl, entry.backend_verifyhost.as_deref(), "");

    for (i, address) in entry.backend_servers.iter().enumerate() {
        let backup = match &entry.backend_servers_local {
            Some(local) if !local.contains(address) => "backup",
            _ => "",
        };
        let line = tcp_server_line(ctx, i, address, server_port, check_port, &ssl, backup);
        section.push(line);
    }

    section
}

/// Link-supplied TCP backends, grouped by instance name in arrival order.
fn tcp_link_sections(ctx: &RenderContext) -> Vec<Section> {
    let p = ctx.properties;
    let link = match &ctx.links.tcp_backend {
        Some(link) => link,
        None => return Vec::new(),
    };
    let port = match p.tcp_link_port {
        Some(port) => port,
        None => return Vec::new(),
    };
    let check_port = p.tcp_link_check_port.unwrap_or(port);

    let mut groups: Vec<(String, Vec<&crate::config::models::LinkInstance>)> = Vec::new();
    for instance in &link.instances {
        let name = instance.name.clone().unwrap_or_else(|| "tcp".to_string());
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(instance),
            None => groups.push((name, vec![instance])),
        }
    }

    groups
        .into_iter()
        .map(|(name, members)| {
            let mut section = Section::new(format!("backend {}", naming::tcp_backend_name(&name)));
            section.push("mode tcp");
            for (i, instance) in members.iter().enumerate() {
                let backup = match &instance.az {
                    Some(az) if az != ctx.az => "backup",
                    _ => "",
                };
                let line = tcp_server_line(ctx, i, &instance.address, port, check_port, "", backup);
                section.push(line);
            }
            section
        })
        .collect()
}

fn tcp_server_line(
    ctx: &RenderContext,
    index: usize,
    address: &str,
    port: u64,
    check_port: u64,
    ssl: &str,
    backup: &str,
) -> String {
    let mut base = format!("server node{index} {address}:{port}");
    if ctx.use_resolvers() {
        base.push_str(" resolvers default");
    }
    base.push_str(&format!(" check port {check_port} inter 1000"));
    format!("{base} {ssl} {backup}").trim_end().to_string()
}

/// Pool for the platform TCP router link; servers are health-checked over
/// HTTP on port 80 and addressed without a port.
fn tcp_router_section(ctx: &RenderContext) -> Option<Section> {
    let link = ctx.links.tcp_router.as_ref()?;
    let mut section = Section::new("backend cf_tcp_routers");
    section.push("mode tcp");
    section.push("option httpchk GET /health");
    if let Some(config) = &ctx.properties.tcp_backend_config {
        section.extend(config_lines(config));
    }
    for (i, instance) in link.instances.iter().enumerate() {
        section.push(format!(
            "server node{i} {} check port 80 inter 1000",
            instance.address
        ));
    }
    Some(section)
}
