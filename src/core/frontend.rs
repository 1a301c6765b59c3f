//! Frontend and listener sections: the HTTP/HTTPS entry points, custom TCP
//! frontends, the CF TCP routing frontend and the stats/health listeners.
//!
//! Line formats are kept byte-stable because operators diff rendered configs
//! across deploys. Internal multi-space padding is purposeful; trailing
//! whitespace is trimmed at render time by [`Section`].

use crate::config::models::{ForwardedClientCert, Properties};
use crate::core::naming::{route_hash, routed_backend_name, tcp_backend_name, tcp_frontend_name};
use crate::core::rate_limit;
use crate::core::{CONFIG_DIR, RenderContext, SSL_DIR, Section};

/// Plain HTTP entry point on port 80. Absent when `disable_http` is set.
pub fn http_in_section(ctx: &RenderContext) -> Option<Section> {
    let p = ctx.properties;
    if p.disable_http {
        return None;
    }

    let mut section = Section::new("frontend http-in");
    if let Some(grace) = grace_line(p) {
        section.push(grace);
    }
    section.push(
        format!(
            "bind {}:80{}{}",
            p.binding_ip,
            accept_proxy_part(p.accept_proxy),
            v4v6_part(p)
        )
        .trim_end()
        .to_string(),
    );
    push_expect_proxy(&mut section, p);
    section.push("capture request header Host len 256");
    push_config_lines(&mut section, p.frontend_config.as_deref());
    push_connection_filters(&mut section, ctx);
    push_request_policies(&mut section, p, "http");
    push_routed_backends(&mut section, p, false);
    push_websocket_exemption(&mut section, ctx);
    push_https_redirects(&mut section, p);
    section.push(format!("default_backend {}", ctx.default_http_backend()));
    Some(section)
}

/// TLS entry point on port 443. Absent without certificate material.
pub fn https_in_section(ctx: &RenderContext) -> Option<Section> {
    if !ctx.properties.has_tls_material() {
        return None;
    }
    Some(tls_frontend_section(ctx, "frontend https-in", 443))
}

/// Secondary TLS entry point on port 4443 for websocket clients behind
/// load balancers that time out idle connections on 443.
pub fn wss_in_section(ctx: &RenderContext) -> Option<Section> {
    if !ctx.properties.enable_4443 || !ctx.properties.has_tls_material() {
        return None;
    }
    Some(tls_frontend_section(ctx, "frontend wss-in", 4443))
}

fn tls_frontend_section(ctx: &RenderContext, header: &str, port: u64) -> Section {
    let p = ctx.properties;
    let mut section = Section::new(header);
    if let Some(grace) = grace_line(p) {
        section.push(grace);
    }
    section.push(tls_bind_line(p, port));
    push_expect_proxy(&mut section, p);
    section.push("capture request header Host len 256");
    push_config_lines(&mut section, p.frontend_config.as_deref());
    push_connection_filters(&mut section, ctx);
    push_request_policies(&mut section, p, "https");
    push_domain_fronting(&mut section, p);
    push_forwarded_client_cert(&mut section, p);
    push_hsts(&mut section, p);
    push_routed_backends(&mut section, p, true);
    push_websocket_exemption(&mut section, ctx);
    push_protocol_matching(&mut section, ctx);
    section.push(format!("default_backend {}", ctx.default_http_backend()));
    section
}

/// One `frontend tcp-frontend_{name}` per custom TCP backend, plus one per
/// link-fed group when `tcp_link_port` is set.
pub fn tcp_frontend_sections(ctx: &RenderContext) -> Vec<Section> {
    let p = ctx.properties;
    let accept = p.accept_proxy && !p.disable_tcp_accept_proxy;

    let mut sections: Vec<Section> = p
        .tcp
        .iter()
        .map(|entry| {
            let mut section = Section::new(format!("frontend {}", tcp_frontend_name(&entry.name)));
            section.push("mode tcp");
            section.push(format!(
                "bind {}:{}{}{}{}",
                p.binding_ip,
                entry.port,
                accept_proxy_part(accept),
                if entry.ssl { " ssl" } else { "" },
                v4v6_part(p)
            ));
            section.push(format!("default_backend {}", tcp_backend_name(&entry.name)));
            section
        })
        .collect();

    if let (Some(port), Some(link)) = (p.tcp_link_port, &ctx.links.tcp_backend) {
        let mut seen: Vec<&str> = Vec::new();
        for instance in &link.instances {
            let name = instance.name.as_deref().unwrap_or("tcp");
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            let mut section = Section::new(format!("frontend {}", tcp_frontend_name(name)));
            section.push("mode tcp");
            section.push(format!(
                "bind {}:{}{}{}",
                p.binding_ip,
                port,
                accept_proxy_part(accept),
                v4v6_part(p)
            ));
            section.push(format!("default_backend {}", tcp_backend_name(name)));
            sections.push(section);
        }
    }

    sections
}

/// CF TCP routing frontend over the configured port range. Requires the
/// tcp_router link.
pub fn cf_tcp_routing_section(ctx: &RenderContext) -> Option<Section> {
    ctx.links.tcp_router.as_ref()?;
    let p = ctx.properties;
    let mut section = Section::new("frontend cf_tcp_routing");
    section.push("mode tcp");
    section.push(format!(
        "bind {}:{}",
        p.binding_ip, p.tcp_routing.port_range
    ));
    section.push("default_backend cf_tcp_routers");
    Some(section)
}

/// Stats listener, restricted to the trusted CIDRs.
pub fn stats_listener_section(ctx: &RenderContext) -> Option<Section> {
    let p = ctx.properties;
    if !p.stats_enable {
        return None;
    }

    let mut section = Section::new("listen stats");
    section.push(format!("bind {}", p.stats_bind));
    section.push(format!("acl private src {}", p.trusted_stats_cidrs));
    section.push("http-request deny unless private");
    section.push("mode http");
    section.push("stats enable");
    section.push("stats hide-version");
    section.push("stats realm \"Haproxy Statistics\"");
    section.push(format!("stats uri /{}", p.stats_uri));
    if let Some(user) = p.stats_user.as_deref().filter(|user| !user.is_empty()) {
        section.push(format!(
            "stats auth {}:{}",
            user,
            p.stats_password.as_deref().unwrap_or("")
        ));
    }
    if p.stats_promex_enable {
        section.push(format!(
            "http-request use-service prometheus-exporter if {{ path {} }}",
            p.stats_promex_path.as_deref().unwrap_or("/metrics")
        ));
    }
    Some(section)
}

/// Monitor listeners reporting whether any HTTP router is still up. A
/// second accept-proxy listener on the next port serves proxy-protocol
/// health probes when `expect_proxy_cidrs` is configured.
pub fn health_listener_sections(ctx: &RenderContext) -> Vec<Section> {
    let p = ctx.properties;
    if !p.enable_health_check_http {
        return Vec::new();
    }

    let variants = ctx.pool_variants();
    let pool = if variants.http1 {
        "http-routers-http1"
    } else {
        "http-routers-http2"
    };

    let monitor_lines = |section: &mut Section| {
        section.push("mode http");
        section.push("option httpclose");
        section.push("monitor-uri /health");
        section.push(format!("acl http-routers_down nbsrv({pool}) eq 0"));
        section.push("monitor fail if http-routers_down");
    };

    let mut listener = Section::new("listen health_check_http_url");
    listener.push(format!("bind :{}", p.health_check_port));
    monitor_lines(&mut listener);
    let mut sections = vec![listener];

    if !p.expect_proxy_cidrs.is_empty() {
        let mut proxied = Section::new("listen health_check_http_url_proxy_protocol");
        proxied.push(format!("bind :{} accept-proxy", p.health_check_port + 1));
        monitor_lines(&mut proxied);
        sections.push(proxied);
    }

    sections
}

fn grace_line(p: &Properties) -> Option<String> {
    if !p.drain_enable {
        return None;
    }
    let grace_ms = p.drain_frontend_grace_time.unwrap_or(0) * 1000;
    Some(format!("grace {grace_ms}"))
}

fn accept_proxy_part(accept: bool) -> &'static str {
    if accept { " accept-proxy" } else { " " }
}

fn v4v6_part(p: &Properties) -> &'static str {
    if p.v4v6 { " v4v6" } else { "" }
}

fn tls_bind_line(p: &Properties, port: u64) -> String {
    let crt = if p.crt_list.is_some() {
        let strict = if p.strict_sni { " strict-sni" } else { "" };
        format!("crt-list {SSL_DIR}/crt-list{strict}")
    } else {
        format!("crt {SSL_DIR}")
    };

    let mtls = if p.client_cert {
        let mut part =
            String::from("  ca-file /etc/ssl/certs/ca-certificates.crt verify optional");
        if let Some(err) = &p.client_cert_ignore_err {
            part.push_str(&format!(" crt-ignore-err {err} ca-ignore-err {err}"));
        }
        if p.client_revocation_list.is_some() {
            part.push_str(&format!(" crl-file {CONFIG_DIR}/client-revocation-list.pem"));
        }
        part
    } else {
        String::from(" ")
    };

    let alpn = if p.enable_http2 { "  alpn h2,http/1.1" } else { "" };

    format!(
        "bind {}:{}{} ssl {}{}{}{}",
        p.binding_ip,
        port,
        accept_proxy_part(p.accept_proxy),
        crt,
        mtls,
        alpn,
        v4v6_part(p)
    )
}

fn push_expect_proxy(section: &mut Section, p: &Properties) {
    if !p.expect_proxy.is_empty() {
        section.push(format!(
            "tcp-request connection expect-proxy layer4 if {{ src -f {CONFIG_DIR}/expect_proxy_cidrs.txt }}"
        ));
    }
}

fn push_config_lines(section: &mut Section, config: Option<&str>) {
    if let Some(config) = config {
        section.extend(crate::utils::config_lines(config));
    }
}

/// Connection-level filtering: rate-limit tracking, CIDR allow/deny lists
/// and the full-stop switch.
fn push_connection_filters(section: &mut Section, ctx: &RenderContext) {
    let p = ctx.properties;
    section.extend(rate_limit::connection_tracking_lines(p));
    if !p.cidr_whitelist.is_empty() {
        section.push(format!(
            "acl whitelist src -f {CONFIG_DIR}/whitelist_cidrs.txt"
        ));
        section.push("tcp-request content accept if whitelist");
    }
    if !p.cidr_blacklist.is_empty() {
        section.push(format!(
            "acl blacklist src -f {CONFIG_DIR}/blacklist_cidrs.txt"
        ));
        section.push("tcp-request content reject if blacklist");
    }
    if p.block_all {
        section.push("tcp-request content reject");
    }
    section.extend(rate_limit::http_tracking_lines(p));
}

/// HTTP-level request policies shared by the plain and TLS entry points.
fn push_request_policies(section: &mut Section, p: &Properties, scheme: &str) {
    for condition in &p.http_request_deny_conditions {
        let mut guard = String::new();
        for acl in &condition.condition {
            section.push(format!("acl {} {}", acl.acl_name, acl.acl_rule));
            if !guard.is_empty() {
                guard.push(' ');
            }
            if acl.negate {
                guard.push('!');
            }
            guard.push_str(&acl.acl_name);
        }
        section.push(format!("http-request deny if {guard}"));
    }

    for header in &p.strip_headers {
        section.push(format!("http-request del-header {header}"));
    }
    for header in &p.headers {
        section.push(format!(
            "http-request add-header {} \"\"",
            header.replace(' ', "\\ ")
        ));
    }
    for header in &p.rsp_headers {
        section.push(format!(
            "http-response add-header {} \"\"",
            header.replace(' ', "\\ ")
        ));
    }

    if !p.internal_only_domains.is_empty() {
        section.push(format!(
            "acl private src -f {CONFIG_DIR}/trusted_domain_cidrs.txt"
        ));
        for domain in &p.internal_only_domains {
            section.push(format!("acl internal hdr(Host) -m sub {domain}"));
        }
        section.push("http-request deny if internal !private");
    }

    section.push("acl xfp_exists hdr_cnt(X-Forwarded-Proto) gt 0");
    section.push(format!(
        "http-request add-header X-Forwarded-Proto \"{scheme}\" if ! xfp_exists"
    ));
}

/// Routed-backend ACLs. The TLS frontends suffix every ACL from `_0`; the
/// plain frontend keeps the path ACL unsuffixed and numbers extra ACLs
/// from `_0`.
fn push_routed_backends(section: &mut Section, p: &Properties, suffixed: bool) {
    for (path, entry) in &p.routed_backend_servers {
        let hash = route_hash(path);
        let mut acl_names: Vec<String> = Vec::new();

        let base_acl = if suffixed {
            format!("routed_backend_{hash}_0")
        } else {
            format!("routed_backend_{hash}")
        };
        section.push(format!("acl {base_acl} path_beg {path}"));
        acl_names.push(base_acl);

        let offset = if suffixed { 1 } else { 0 };
        for (i, rule) in entry.additional_acls.iter().enumerate() {
            let name = format!("routed_backend_{hash}_{}", i + offset);
            section.push(format!("acl {name} {rule}"));
            acl_names.push(name);
        }

        section.push(format!(
            "use_backend {} if {}",
            routed_backend_name(path),
            acl_names.join(" ")
        ));
    }
}

fn push_websocket_exemption(section: &mut Section, ctx: &RenderContext) {
    if ctx.websocket_exemption() {
        section.push("acl is_websocket hdr(Upgrade) -i websocket");
        section.push("use_backend http-routers-http1 if is_websocket");
    }
}

fn push_https_redirects(section: &mut Section, p: &Properties) {
    if p.https_redirect_all {
        section.push("redirect scheme https code 301 if !{ ssl_fc }");
    } else {
        section.push(format!(
            "acl ssl_redirect hdr(host),lower,map_end({CONFIG_DIR}/ssl_redirect.map,false) -m str true"
        ));
        section.push("redirect scheme https code 301 if ssl_redirect");
    }
}

fn push_domain_fronting(section: &mut Section, p: &Properties) {
    use crate::config::models::DomainFronting;

    let extra_guard = match p.disable_domain_fronting {
        DomainFronting::Allow | DomainFronting::Invalid(_) => return,
        DomainFronting::Deny => "",
        DomainFronting::DenyMtlsOnly => "{ ssl_c_used } ",
    };
    section.push("http-request set-var(txn.host) hdr(host),host_only");
    section.push("acl ssl_sni_http_host_match ssl_fc_sni,lower,strcmp(txn.host) eq 0");
    section.push(format!(
        "http-request deny deny_status 421 if {{ ssl_fc_has_sni }} {extra_guard}!ssl_sni_http_host_match"
    ));
}

const MTLS_HEADERS: &[&str] = &[
    "X-Forwarded-Client-Cert",
    "X-SSL-Client",
    "X-SSL-Client-Session-ID",
    "X-SSL-Client-Verify",
    "X-SSL-Client-Subject-DN",
    "X-SSL-Client-Subject-CN",
    "X-SSL-Client-Issuer-DN",
    "X-SSL-Client-NotBefore",
    "X-SSL-Client-NotAfter",
    "X-SSL-Client-Root-CA-DN",
];

/// Forwarded-client-cert policy. Header names are padded to 23 columns and
/// fetch samples to 28 so the rendered block lines up.
fn push_forwarded_client_cert(section: &mut Section, p: &Properties) {
    match p.forwarded_client_cert {
        ForwardedClientCert::AlwaysForwardOnly => {}
        ForwardedClientCert::ForwardOnly => {
            if p.client_cert {
                push_del_headers(section, Some("if ! { ssl_c_used }"));
            } else {
                push_del_headers(section, None);
            }
        }
        ForwardedClientCert::SanitizeSet => {
            push_del_headers(section, None);
        }
        ForwardedClientCert::ForwardOnlyIfRouteService => {
            section.push("acl route_service_request hdr(X-Cf-Proxy-Signature) -m found");
            push_del_headers(section, Some("if !route_service_request"));
        }
    }

    if p.forwarded_client_cert != ForwardedClientCert::AlwaysForwardOnly && p.client_cert {
        push_set_headers(section, p.legacy_xfcc_header_mapping);
    }
}

fn push_del_headers(section: &mut Section, guard: Option<&str>) {
    for header in MTLS_HEADERS {
        match guard {
            Some(guard) => {
                section.push(format!("http-request del-header {header:<23} {guard}"));
            }
            None => section.push(format!("http-request del-header {header}")),
        }
    }
}

fn push_set_headers(section: &mut Section, legacy_xfcc: bool) {
    let dn_suffix = if legacy_xfcc { "" } else { ",base64" };
    let samples: [(&str, String); 10] = [
        ("X-Forwarded-Client-Cert", "%[ssl_c_der,base64]".to_string()),
        ("X-SSL-Client", "%[ssl_c_used]".to_string()),
        ("X-SSL-Client-Session-ID", "%[ssl_fc_session_id,hex]".to_string()),
        ("X-SSL-Client-Verify", "%[ssl_c_verify]".to_string()),
        ("X-SSL-Client-NotBefore", "%{+Q}[ssl_c_notbefore]".to_string()),
        ("X-SSL-Client-NotAfter", "%{+Q}[ssl_c_notafter]".to_string()),
        (
            "X-SSL-Client-Subject-DN",
            format!("%{{+Q}}[ssl_c_s_dn{dn_suffix}]"),
        ),
        (
            "X-SSL-Client-Subject-CN",
            format!("%{{+Q}}[ssl_c_s_dn(cn){dn_suffix}]"),
        ),
        (
            "X-SSL-Client-Issuer-DN",
            format!("%{{+Q}}[ssl_c_i_dn{dn_suffix}]"),
        ),
        (
            "X-SSL-Client-Root-CA-DN",
            format!("%{{+Q}}[ssl_c_r_dn{dn_suffix}]"),
        ),
    ];
    for (header, sample) in samples {
        section.push(format!(
            "http-request set-header {header:<23} {sample:<28} if {{ ssl_c_used }}"
        ));
    }
}

fn push_hsts(section: &mut Section, p: &Properties) {
    if !p.hsts_enable {
        return;
    }
    let mut value = format!("max-age={};", p.hsts_max_age);
    if p.hsts_include_subdomains {
        value.push_str("\\ includeSubDomains;");
    }
    if p.hsts_preload {
        value.push_str("\\ preload;");
    }
    section.push(format!(
        "http-response set-header Strict-Transport-Security {value}"
    ));
}

fn push_protocol_matching(section: &mut Section, ctx: &RenderContext) {
    use crate::config::models::BackendSsl;

    let p = ctx.properties;
    if !p.backend_match_http_protocol || p.backend_ssl == BackendSsl::Off {
        return;
    }
    section.push("acl is_http2 ssl_fc_alpn,lower,strcmp(proc.h2_alpn_tag) eq 0");
    section.push("use_backend http-routers-http1 if ! is_http2");
    section.push("use_backend http-routers-http2 if is_http2");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{
        BackendSsl, DenyAcl, DenyCondition, DomainFronting, Link, LinkInstance, Links,
        RoutedBackend, SslPem, TcpBackend,
    };
    use pretty_assertions::assert_eq;

    fn ctx<'a>(p: &'a Properties, links: &'a Links) -> RenderContext<'a> {
        RenderContext::new(p, links, "z1")
    }

    fn with_tls(mut p: Properties) -> Properties {
        p.ssl_pem = Some(SslPem::from_text("ssl pem contents"));
        p
    }

    fn lines_of(section: Section) -> Vec<String> {
        section.lines
    }

    #[test]
    fn test_http_in_default_shape() {
        let p = Properties::default();
        let links = Links::default();
        let section = http_in_section(&ctx(&p, &links)).unwrap();
        assert_eq!(section.header, "frontend http-in");
        let lines = lines_of(section);
        assert_eq!(
            lines,
            vec![
                "bind :80",
                "capture request header Host len 256",
                "acl xfp_exists hdr_cnt(X-Forwarded-Proto) gt 0",
                "http-request add-header X-Forwarded-Proto \"http\" if ! xfp_exists",
                "acl ssl_redirect hdr(host),lower,map_end(/var/vcap/jobs/haproxy/config/ssl_redirect.map,false) -m str true",
                "redirect scheme https code 301 if ssl_redirect",
                "default_backend http-routers-http1",
            ]
        );
    }

    #[test]
    fn test_http_in_disabled() {
        let mut p = Properties::default();
        p.disable_http = true;
        let links = Links::default();
        assert!(http_in_section(&ctx(&p, &links)).is_none());
    }

    #[test]
    fn test_http_in_binding_variants() {
        let mut p = Properties::default();
        p.binding_ip = "1.2.3.4".to_string();
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(lines.contains("\n  bind 1.2.3.4:80\n"));

        p.binding_ip = "::".to_string();
        p.v4v6 = true;
        let lines = http_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(lines.contains("\n  bind :::80  v4v6\n"));

        p.binding_ip = String::new();
        p.v4v6 = false;
        p.accept_proxy = true;
        let lines = http_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(lines.contains("\n  bind :80 accept-proxy\n"));
    }

    #[test]
    fn test_http_in_grace_period() {
        let mut p = Properties::default();
        p.drain_enable = true;
        let links = Links::default();
        let section = http_in_section(&ctx(&p, &links)).unwrap();
        assert_eq!(section.lines[0], "grace 0");

        p.drain_frontend_grace_time = Some(12);
        let section = http_in_section(&ctx(&p, &links)).unwrap();
        assert_eq!(section.lines[0], "grace 12000");
    }

    #[test]
    fn test_http_in_redirect_all() {
        let mut p = Properties::default();
        p.https_redirect_all = true;
        let links = Links::default();
        let section = http_in_section(&ctx(&p, &links)).unwrap();
        assert!(
            section
                .lines
                .contains(&"redirect scheme https code 301 if !{ ssl_fc }".to_string())
        );
        assert!(!section.lines.iter().any(|l| l.starts_with("acl ssl_redirect")));
    }

    #[test]
    fn test_http_in_cidr_filters_and_block_all() {
        let mut p = Properties::default();
        p.cidr_whitelist = crate::config::models::CidrList::from_entries(vec!["10.0.0.0/8"]);
        p.cidr_blacklist = crate::config::models::CidrList::from_entries(vec!["172.168.4.1/32"]);
        p.block_all = true;
        let links = Links::default();
        let section = http_in_section(&ctx(&p, &links)).unwrap();
        let lines = section.lines;
        assert!(lines.contains(
            &"acl whitelist src -f /var/vcap/jobs/haproxy/config/whitelist_cidrs.txt".to_string()
        ));
        assert!(lines.contains(&"tcp-request content accept if whitelist".to_string()));
        assert!(lines.contains(
            &"acl blacklist src -f /var/vcap/jobs/haproxy/config/blacklist_cidrs.txt".to_string()
        ));
        assert!(lines.contains(&"tcp-request content reject if blacklist".to_string()));
        assert!(lines.contains(&"tcp-request content reject".to_string()));
    }

    #[test]
    fn test_http_in_deny_conditions() {
        let mut p = Properties::default();
        p.http_request_deny_conditions = vec![DenyCondition {
            condition: vec![
                DenyAcl {
                    acl_name: "block_host".to_string(),
                    acl_rule: "hdr_beg(host) -i login".to_string(),
                    negate: false,
                },
                DenyAcl {
                    acl_name: "whitelist_ips".to_string(),
                    acl_rule: "src 5.22.5.11 5.22.5.12".to_string(),
                    negate: true,
                },
            ],
        }];
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"acl block_host hdr_beg(host) -i login".to_string()));
        assert!(lines.contains(&"acl whitelist_ips src 5.22.5.11 5.22.5.12".to_string()));
        assert!(lines.contains(&"http-request deny if block_host !whitelist_ips".to_string()));
    }

    #[test]
    fn test_http_in_header_rewrites() {
        let mut p = Properties::default();
        p.strip_headers = vec!["X-Internal".to_string()];
        p.headers = vec!["X-Application-ID: my-custom-header".to_string()];
        p.rsp_headers = vec!["X-Served-By: haproxy".to_string()];
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"http-request del-header X-Internal".to_string()));
        assert!(lines.contains(
            &"http-request add-header X-Application-ID:\\ my-custom-header \"\"".to_string()
        ));
        assert!(lines
            .contains(&"http-response add-header X-Served-By:\\ haproxy \"\"".to_string()));
    }

    #[test]
    fn test_http_in_internal_only_domains() {
        let mut p = Properties::default();
        p.internal_only_domains = vec!["bosh.internal".to_string()];
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"acl private src -f /var/vcap/jobs/haproxy/config/trusted_domain_cidrs.txt"
                .to_string()
        ));
        assert!(lines.contains(&"acl internal hdr(Host) -m sub bosh.internal".to_string()));
        assert!(lines.contains(&"http-request deny if internal !private".to_string()));
    }

    #[test]
    fn test_http_in_routed_backend_acls() {
        let mut p = Properties::default();
        p.routed_backend_servers = vec![(
            "/images".to_string(),
            RoutedBackend {
                servers: vec!["10.0.0.1".to_string()],
                additional_acls: vec!["method GET".to_string(), "path_end /foo".to_string()],
                ..RoutedBackend::default()
            },
        )];
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"acl routed_backend_9c1bb7 path_beg /images".to_string()));
        assert!(lines.contains(&"acl routed_backend_9c1bb7_0 method GET".to_string()));
        assert!(lines.contains(&"acl routed_backend_9c1bb7_1 path_end /foo".to_string()));
        assert!(lines.contains(
            &"use_backend http-routed-backend-9c1bb7 if routed_backend_9c1bb7 routed_backend_9c1bb7_0 routed_backend_9c1bb7_1"
                .to_string()
        ));
    }

    #[test]
    fn test_http_in_websocket_exemption() {
        let mut p = Properties::default();
        p.backend_servers = vec!["10.0.0.1".to_string()];
        p.disable_backend_http2_websockets = true;
        let links = Links::default();
        let lines = http_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"acl is_websocket hdr(Upgrade) -i websocket".to_string()));
        assert!(lines.contains(&"use_backend http-routers-http1 if is_websocket".to_string()));
    }

    #[test]
    fn test_https_in_requires_tls_material() {
        let p = Properties::default();
        let links = Links::default();
        assert!(https_in_section(&ctx(&p, &links)).is_none());
    }

    #[test]
    fn test_https_in_bind_variants() {
        let p = with_tls(Properties::default());
        let links = Links::default();
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains("\n  bind :443  ssl crt /var/vcap/jobs/haproxy/config/ssl\n"));

        let mut p = with_tls(Properties::default());
        p.accept_proxy = true;
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(
            rendered
                .contains("\n  bind :443 accept-proxy ssl crt /var/vcap/jobs/haproxy/config/ssl\n")
        );

        let mut p = with_tls(Properties::default());
        p.binding_ip = "::".to_string();
        p.v4v6 = true;
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(
            rendered
                .contains("\n  bind :::443  ssl crt /var/vcap/jobs/haproxy/config/ssl  v4v6\n")
        );

        let mut p = with_tls(Properties::default());
        p.enable_http2 = true;
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains(
            "\n  bind :443  ssl crt /var/vcap/jobs/haproxy/config/ssl   alpn h2,http/1.1\n"
        ));
    }

    #[test]
    fn test_https_in_mutual_tls_bind() {
        let mut p = with_tls(Properties::default());
        p.client_cert = true;
        let links = Links::default();
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains(
            "\n  bind :443  ssl crt /var/vcap/jobs/haproxy/config/ssl  ca-file /etc/ssl/certs/ca-certificates.crt verify optional\n"
        ));

        p.client_cert_ignore_err = Some("all".to_string());
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains(
            "ca-file /etc/ssl/certs/ca-certificates.crt verify optional crt-ignore-err all ca-ignore-err all\n"
        ));

        p.client_cert_ignore_err = None;
        p.client_revocation_list = Some("crl contents".to_string());
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains(
            "verify optional crl-file /var/vcap/jobs/haproxy/config/client-revocation-list.pem\n"
        ));
    }

    #[test]
    fn test_https_in_crt_list_bind() {
        let mut p = Properties::default();
        p.crt_list = Some(Vec::new());
        p.strict_sni = true;
        let links = Links::default();
        let rendered = https_in_section(&ctx(&p, &links)).unwrap().render();
        assert!(rendered.contains(
            "\n  bind :443  ssl crt-list /var/vcap/jobs/haproxy/config/ssl/crt-list strict-sni\n"
        ));
    }

    #[test]
    fn test_https_in_expect_proxy() {
        let mut p = with_tls(Properties::default());
        p.expect_proxy =
            crate::config::models::CidrList::from_entries(vec!["127.0.0.1/8"]);
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"tcp-request connection expect-proxy layer4 if { src -f /var/vcap/jobs/haproxy/config/expect_proxy_cidrs.txt }"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_domain_fronting_deny() {
        let mut p = with_tls(Properties::default());
        p.disable_domain_fronting = DomainFronting::Deny;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"http-request set-var(txn.host) hdr(host),host_only".to_string()));
        assert!(lines.contains(
            &"acl ssl_sni_http_host_match ssl_fc_sni,lower,strcmp(txn.host) eq 0".to_string()
        ));
        assert!(lines.contains(
            &"http-request deny deny_status 421 if { ssl_fc_has_sni } !ssl_sni_http_host_match"
                .to_string()
        ));

        p.disable_domain_fronting = DomainFronting::DenyMtlsOnly;
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-request deny deny_status 421 if { ssl_fc_has_sni } { ssl_c_used } !ssl_sni_http_host_match"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_sanitizes_mtls_headers_by_default() {
        let p = with_tls(Properties::default());
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"http-request del-header X-Forwarded-Client-Cert".to_string()));
        assert!(lines.contains(&"http-request del-header X-SSL-Client-Root-CA-DN".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("http-request set-header X-SSL")));
    }

    #[test]
    fn test_https_in_sets_mtls_headers_with_client_cert() {
        let mut p = with_tls(Properties::default());
        p.client_cert = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-request set-header X-Forwarded-Client-Cert %[ssl_c_der,base64]          if { ssl_c_used }"
                .to_string()
        ));
        assert!(lines.contains(
            &"http-request set-header X-SSL-Client            %[ssl_c_used]                if { ssl_c_used }"
                .to_string()
        ));
        assert!(lines.contains(
            &"http-request set-header X-SSL-Client-Subject-CN %{+Q}[ssl_c_s_dn(cn),base64] if { ssl_c_used }"
                .to_string()
        ));
        assert!(lines.contains(
            &"http-request set-header X-SSL-Client-Root-CA-DN %{+Q}[ssl_c_r_dn,base64]     if { ssl_c_used }"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_legacy_xfcc_mapping() {
        let mut p = with_tls(Properties::default());
        p.client_cert = true;
        p.legacy_xfcc_header_mapping = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-request set-header X-SSL-Client-Subject-DN %{+Q}[ssl_c_s_dn]            if { ssl_c_used }"
                .to_string()
        ));
        assert!(lines.contains(
            &"http-request set-header X-SSL-Client-Issuer-DN  %{+Q}[ssl_c_i_dn]            if { ssl_c_used }"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_forward_only_guards_deletes() {
        let mut p = with_tls(Properties::default());
        p.forwarded_client_cert = ForwardedClientCert::ForwardOnly;
        p.client_cert = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-request del-header X-Forwarded-Client-Cert if ! { ssl_c_used }".to_string()
        ));
        assert!(lines.contains(
            &"http-request del-header X-SSL-Client            if ! { ssl_c_used }".to_string()
        ));
    }

    #[test]
    fn test_https_in_forward_only_if_route_service() {
        let mut p = with_tls(Properties::default());
        p.forwarded_client_cert = ForwardedClientCert::ForwardOnlyIfRouteService;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"acl route_service_request hdr(X-Cf-Proxy-Signature) -m found".to_string()
        ));
        assert!(lines.contains(
            &"http-request del-header X-SSL-Client            if !route_service_request"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_always_forward_only_leaves_headers() {
        let mut p = with_tls(Properties::default());
        p.forwarded_client_cert = ForwardedClientCert::AlwaysForwardOnly;
        p.client_cert = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(!lines.iter().any(|l| l.starts_with("http-request del-header X-")));
        assert!(!lines.iter().any(|l| l.starts_with("http-request set-header X-SSL")));
    }

    #[test]
    fn test_https_in_hsts() {
        let mut p = with_tls(Properties::default());
        p.hsts_enable = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-response set-header Strict-Transport-Security max-age=31536000;".to_string()
        ));

        p.hsts_include_subdomains = true;
        p.hsts_preload = true;
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"http-response set-header Strict-Transport-Security max-age=31536000;\\ includeSubDomains;\\ preload;"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_routed_backend_acls_are_suffixed() {
        let mut p = with_tls(Properties::default());
        p.routed_backend_servers = vec![(
            "/images".to_string(),
            RoutedBackend {
                servers: vec!["10.0.0.1".to_string()],
                additional_acls: vec!["method GET".to_string(), "path_end /foo".to_string()],
                ..RoutedBackend::default()
            },
        )];
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(&"acl routed_backend_9c1bb7_0 path_beg /images".to_string()));
        assert!(lines.contains(&"acl routed_backend_9c1bb7_1 method GET".to_string()));
        assert!(lines.contains(&"acl routed_backend_9c1bb7_2 path_end /foo".to_string()));
        assert!(lines.contains(
            &"use_backend http-routed-backend-9c1bb7 if routed_backend_9c1bb7_0 routed_backend_9c1bb7_1 routed_backend_9c1bb7_2"
                .to_string()
        ));
    }

    #[test]
    fn test_https_in_protocol_matching() {
        let mut p = with_tls(Properties::default());
        p.backend_match_http_protocol = true;
        p.backend_ssl = BackendSsl::Verify;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(lines.contains(
            &"acl is_http2 ssl_fc_alpn,lower,strcmp(proc.h2_alpn_tag) eq 0".to_string()
        ));
        assert!(lines.contains(&"use_backend http-routers-http1 if ! is_http2".to_string()));
        assert!(lines.contains(&"use_backend http-routers-http2 if is_http2".to_string()));
        assert!(lines.contains(&"default_backend http-routers-http1".to_string()));
    }

    #[test]
    fn test_https_in_no_protocol_matching_without_backend_tls() {
        let mut p = with_tls(Properties::default());
        p.backend_match_http_protocol = true;
        let links = Links::default();
        let lines = https_in_section(&ctx(&p, &links)).unwrap().lines;
        assert!(!lines.iter().any(|l| l.starts_with("use_backend http-routers")));
    }

    #[test]
    fn test_wss_in_requires_enable_4443() {
        let p = with_tls(Properties::default());
        let links = Links::default();
        assert!(wss_in_section(&ctx(&p, &links)).is_none());

        let mut p = with_tls(Properties::default());
        p.enable_4443 = true;
        p.disable_backend_http2_websockets = true;
        let section = wss_in_section(&ctx(&p, &links)).unwrap();
        assert_eq!(section.header, "frontend wss-in");
        assert!(
            section
                .render()
                .contains("\n  bind :4443  ssl crt /var/vcap/jobs/haproxy/config/ssl\n")
        );
        assert!(section
            .lines
            .contains(&"use_backend http-routers-http1 if is_websocket".to_string()));
    }

    #[test]
    fn test_tcp_frontends() {
        let mut p = Properties::default();
        p.tcp = vec![
            TcpBackend {
                name: "redis".to_string(),
                port: 6379,
                backend_servers: vec!["10.0.0.1".to_string()],
                ssl: true,
                ..TcpBackend::default()
            },
            TcpBackend {
                name: "mysql".to_string(),
                port: 3306,
                backend_servers: vec!["11.0.0.1".to_string()],
                ..TcpBackend::default()
            },
        ];
        let links = Links::default();
        let sections = tcp_frontend_sections(&ctx(&p, &links));
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].header, "frontend tcp-frontend_redis");
        assert!(sections[0].render().contains("\n  bind :6379  ssl\n"));
        assert!(sections[0].lines.contains(&"mode tcp".to_string()));
        assert!(sections[0].lines.contains(&"default_backend tcp-redis".to_string()));
        assert!(sections[1].render().contains("\n  bind :3306\n"));
    }

    #[test]
    fn test_tcp_frontend_accept_proxy_can_be_disabled() {
        let mut p = Properties::default();
        p.accept_proxy = true;
        p.tcp = vec![TcpBackend {
            name: "redis".to_string(),
            port: 6379,
            backend_servers: vec!["10.0.0.1".to_string()],
            ssl: true,
            ..TcpBackend::default()
        }];
        let links = Links::default();
        let sections = tcp_frontend_sections(&ctx(&p, &links));
        assert!(sections[0].render().contains("\n  bind :6379 accept-proxy ssl\n"));

        p.disable_tcp_accept_proxy = true;
        let sections = tcp_frontend_sections(&ctx(&p, &links));
        assert!(sections[0].render().contains("\n  bind :6379  ssl\n"));
    }

    #[test]
    fn test_tcp_frontend_from_link() {
        let mut p = Properties::default();
        p.tcp_link_port = Some(5432);
        let links = Links {
            tcp_backend: Some(Link {
                instances: vec![LinkInstance {
                    address: "postgres.backend.com".to_string(),
                    az: None,
                    name: Some("postgres".to_string()),
                }],
            }),
            ..Links::default()
        };
        let sections = tcp_frontend_sections(&ctx(&p, &links));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].header, "frontend tcp-frontend_postgres");
        assert!(sections[0].render().contains("\n  bind :5432\n"));
        assert!(sections[0].lines.contains(&"default_backend tcp-postgres".to_string()));
    }

    #[test]
    fn test_cf_tcp_routing_frontend() {
        let p = Properties::default();
        let links = Links {
            tcp_router: Some(Link {
                instances: vec![LinkInstance {
                    address: "tcp.cf.com".to_string(),
                    az: None,
                    name: None,
                }],
            }),
            ..Links::default()
        };
        let section = cf_tcp_routing_section(&ctx(&p, &links)).unwrap();
        assert_eq!(section.header, "frontend cf_tcp_routing");
        assert_eq!(
            section.lines,
            vec!["mode tcp", "bind :1024-1123", "default_backend cf_tcp_routers"]
        );

        assert!(cf_tcp_routing_section(&ctx(&p, &Links::default())).is_none());
    }

    #[test]
    fn test_stats_listener() {
        let mut p = Properties::default();
        p.stats_enable = true;
        p.stats_user = Some("admin".to_string());
        p.stats_password = Some("secret".to_string());
        p.stats_uri = "foo".to_string();
        let links = Links::default();
        let section = stats_listener_section(&ctx(&p, &links)).unwrap();
        assert_eq!(
            section.lines,
            vec![
                "bind *:9000",
                "acl private src 0.0.0.0/32",
                "http-request deny unless private",
                "mode http",
                "stats enable",
                "stats hide-version",
                "stats realm \"Haproxy Statistics\"",
                "stats uri /foo",
                "stats auth admin:secret",
            ]
        );
    }

    #[test]
    fn test_stats_listener_without_auth_and_with_promex() {
        let mut p = Properties::default();
        p.stats_enable = true;
        p.stats_user = Some(String::new());
        p.stats_promex_enable = true;
        p.stats_promex_path = Some("/foo".to_string());
        let links = Links::default();
        let lines = stats_listener_section(&ctx(&p, &links)).unwrap().lines;
        assert!(!lines.iter().any(|l| l.starts_with("stats auth")));
        assert!(lines.contains(
            &"http-request use-service prometheus-exporter if { path /foo }".to_string()
        ));
    }

    #[test]
    fn test_health_listener() {
        let mut p = Properties::default();
        p.enable_health_check_http = true;
        let links = Links::default();
        let sections = health_listener_sections(&ctx(&p, &links));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].header, "listen health_check_http_url");
        assert_eq!(
            sections[0].lines,
            vec![
                "bind :8080",
                "mode http",
                "option httpclose",
                "monitor-uri /health",
                "acl http-routers_down nbsrv(http-routers-http1) eq 0",
                "monitor fail if http-routers_down",
            ]
        );
    }

    #[test]
    fn test_health_listener_tracks_http2_only_pool() {
        let mut p = Properties::default();
        p.enable_health_check_http = true;
        p.enable_http2 = true;
        p.backend_ssl = BackendSsl::Verify;
        let links = Links::default();
        let sections = health_listener_sections(&ctx(&p, &links));
        assert!(sections[0]
            .lines
            .contains(&"acl http-routers_down nbsrv(http-routers-http2) eq 0".to_string()));
    }

    #[test]
    fn test_health_listener_proxy_protocol_variant() {
        let mut p = Properties::default();
        p.enable_health_check_http = true;
        p.expect_proxy_cidrs =
            crate::config::models::CidrList::from_entries(vec!["10.0.0.0/8"]);
        let links = Links::default();
        let sections = health_listener_sections(&ctx(&p, &links));
        assert_eq!(sections.len(), 2);
        assert_eq!(
            sections[1].header,
            "listen health_check_http_url_proxy_protocol"
        );
        assert_eq!(sections[1].lines[0], "bind :8081 accept-proxy");
    }
}
