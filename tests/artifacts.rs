//! Full artifact set rendering and filesystem output.

use std::io::Write;

use pretty_assertions::assert_eq;
use proxyforge::{
    config::{loader::load_input, models::RenderInput},
    emit::{render_all, write_to_dir},
};
use tempfile::NamedTempFile;

fn load_yaml(yaml: &str) -> RenderInput {
    let mut file = NamedTempFile::with_suffix(".yml").unwrap();
    write!(file, "{yaml}").unwrap();
    load_input(file.path().to_str().unwrap()).unwrap()
}

fn artifact<'a>(
    artifacts: &'a [proxyforge::Artifact],
    name: &str,
) -> &'a proxyforge::Artifact {
    artifacts
        .iter()
        .find(|a| a.name == name)
        .unwrap_or_else(|| panic!("missing artifact {name}"))
}

#[test]
fn whole_file_set_is_rendered_even_when_empty() {
    let input = load_yaml("ha_proxy: {}\n");
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);

    for name in [
        "haproxy.config",
        "bpm.yml",
        "certs.ttar",
        "whitelist_cidrs.txt",
        "blacklist_cidrs.txt",
        "blocklist_cidrs_tcp.txt",
        "cidrs_to_exclude_from_blocking.txt",
        "trusted_domain_cidrs.txt",
        "expect_proxy_cidrs.txt",
        "proxies_cidrs.txt",
        "ssl_redirect.map",
        "backend-ca-certs.pem",
        "backend-crt.pem",
        "client-revocation-list.pem",
        "drain",
        "pre-start",
    ] {
        artifact(&artifacts, name);
    }

    // unset inputs produce empty files, not missing files
    assert_eq!(artifact(&artifacts, "whitelist_cidrs.txt").contents, "");
    assert_eq!(artifact(&artifacts, "ssl_redirect.map").contents, "");
    assert_eq!(artifact(&artifacts, "backend-crt.pem").contents, "");
    // the tcp blocklist keeps its header even when empty
    assert_eq!(
        artifact(&artifacts, "blocklist_cidrs_tcp.txt").contents,
        "# generated from blocklist_cidrs_tcp.txt.erb\n\n# This list contains CIDRs that are blocked immediately after TCP connection setup.\n\n"
    );
}

#[test]
fn pem_and_map_artifacts_carry_the_configured_material() {
    let input = load_yaml(
        r#"
ha_proxy:
  client_cert: true
  client_revocation_list: "crl contents"
  backend_ca_file: "backend ca"
  backend_crt: "backend cert"
  https_redirect_domains:
    - google.com
    - bing.com
"#,
    );
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);

    assert_eq!(
        artifact(&artifacts, "backend-ca-certs.pem").contents,
        "\nbackend ca\n\n"
    );
    assert_eq!(
        artifact(&artifacts, "backend-crt.pem").contents,
        "\nbackend cert\n\n"
    );
    assert_eq!(
        artifact(&artifacts, "client-revocation-list.pem").contents,
        "\ncrl contents\n\n"
    );
    assert_eq!(
        artifact(&artifacts, "ssl_redirect.map").contents,
        "\ngoogle.com\ttrue\n\nbing.com\ttrue\n\n"
    );
}

#[test]
fn cidr_artifacts_follow_their_framed_formats() {
    let input = load_yaml(
        r#"
ha_proxy:
  cidr_whitelist:
    - 10.0.0.0/8
  expect_proxy:
    - 127.0.0.1/8
"#,
    );
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);

    assert_eq!(
        artifact(&artifacts, "whitelist_cidrs.txt").contents,
        "# generated from whitelist_cidrs.txt.erb\n\n\
         # BEGIN whitelist cidrs\n\
         # detected cidrs provided as array in cleartext format\n\
         10.0.0.0/8\n\n\
         # END whitelist cidrs\n\n"
    );
    assert_eq!(
        artifact(&artifacts, "expect_proxy_cidrs.txt").contents,
        "# generated from expect_proxy_cidrs.txt.erb\n\n\
         # BEGIN expect_proxy_cidrs\n\
         127.0.0.1/8\n\
         # END expect_proxy_cidrs\n"
    );
    assert_eq!(
        artifact(&artifacts, "proxies_cidrs.txt").contents,
        "# generated from proxies_cidrs.txt.erb\n\n\
         # BEGIN proxies cidrs\n\
         # detected cidrs provided as array in cleartext format\n\
         \x20 127.0.0.1/8\n\
         # END proxies cidrs\n\n"
    );
}

#[test]
fn custom_error_files_become_their_own_artifacts() {
    let input = load_yaml(
        r#"
ha_proxy:
  custom_http_error_files:
    "503": "HTTP/1.0 503 Service Unavailable"
"#,
    );
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);
    assert_eq!(
        artifact(&artifacts, "custom503.http").contents,
        "HTTP/1.0 503 Service Unavailable"
    );
    assert!(
        artifact(&artifacts, "haproxy.config")
            .contents
            .contains("errorfile 503 /var/vcap/jobs/haproxy/errorfiles/custom503.http")
    );
}

#[test]
fn drain_and_pre_start_scripts_follow_the_lifecycle_settings() {
    let input = load_yaml(
        r#"
ha_proxy:
  drain_enable: true
  drain_timeout: 123
  enable_health_check_http: true
  pre_start_script: "echo hook"
  haproxy_feature_version: "2.8"
"#,
    );
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);

    let drain = &artifact(&artifacts, "drain").contents;
    assert!(drain.contains("drain_timeout=123"));
    assert!(drain.contains("disable frontend health_check_http_url"));
    assert!(drain.contains("/var/vcap/sys/log/haproxy/drain.log"));

    let pre_start = &artifact(&artifacts, "pre-start").contents;
    assert!(pre_start.contains("HAPROXY_FEATURE_VERSION='2.8'"));
    assert!(pre_start.contains("# ha_proxy.pre_start_script {{{\necho hook\n# }}}"));
}

#[test]
fn write_to_dir_materializes_every_artifact() {
    let input = load_yaml("ha_proxy:\n  ssl_pem: \"cert contents\"\n");
    let artifacts = render_all(&input.ha_proxy, &input.links, &input.az);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("generated");
    write_to_dir(&artifacts, &target).unwrap();

    for a in &artifacts {
        let written = std::fs::read_to_string(target.join(&a.name)).unwrap();
        assert_eq!(written, a.contents, "{}", a.name);
    }

    let ttar = std::fs::read_to_string(target.join("certs.ttar")).unwrap();
    assert!(ttar.contains("/var/vcap/jobs/haproxy/config/ssl/cert-0.pem"));
    assert!(ttar.contains("cert contents"));
}
