//! Artifact rendering. Every generated file is produced as an in-memory
//! [`Artifact`] first; writing to disk is a separate, fallible step.

pub mod bpm;
pub mod certs;
pub mod cidrs;
pub mod haproxy;
pub mod redirect_map;
pub mod scripts;

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};

use crate::config::models::{Links, Properties};
use crate::core::RenderContext;

/// One generated file: its name inside the output directory and its full
/// contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub contents: String,
}

impl Artifact {
    fn new(name: impl Into<String>, contents: String) -> Self {
        Artifact {
            name: name.into(),
            contents,
        }
    }
}

/// Render every artifact for one deployment. Empty files are kept so that
/// stale content from a previous render never survives a redeploy.
pub fn render_all(properties: &Properties, links: &Links, az: &str) -> Vec<Artifact> {
    let ctx = RenderContext::new(properties, links, az);
    let p = properties;

    let mut artifacts = vec![
        Artifact::new("haproxy.config", haproxy::render(&ctx)),
        Artifact::new("bpm.yml", bpm::render(p)),
        Artifact::new("certs.ttar", certs::certs_ttar(p)),
        Artifact::new("whitelist_cidrs.txt", cidrs::whitelist(p)),
        Artifact::new("blacklist_cidrs.txt", cidrs::blacklist(p)),
        Artifact::new("blocklist_cidrs_tcp.txt", cidrs::blocklist_tcp(p)),
        Artifact::new(
            "cidrs_to_exclude_from_blocking.txt",
            cidrs::exclude_from_blocking(p),
        ),
        Artifact::new("trusted_domain_cidrs.txt", cidrs::trusted_domain(p)),
        Artifact::new("expect_proxy_cidrs.txt", cidrs::expect_proxy(p)),
        Artifact::new("proxies_cidrs.txt", cidrs::proxies(p)),
        Artifact::new("ssl_redirect.map", redirect_map::render(p)),
        Artifact::new(
            "backend-ca-certs.pem",
            certs::pem_file(p.backend_ca_file.as_deref()),
        ),
        Artifact::new("backend-crt.pem", certs::pem_file(p.backend_crt.as_deref())),
        Artifact::new(
            "client-revocation-list.pem",
            certs::pem_file(p.client_revocation_list.as_deref()),
        ),
        Artifact::new("drain", scripts::drain(p)),
        Artifact::new("pre-start", scripts::pre_start(p)),
    ];

    for (code, body) in &p.custom_http_error_files {
        artifacts.push(Artifact::new(format!("custom{code}.http"), body.clone()));
    }

    artifacts
}

/// Write the artifacts into `dir`, creating it if needed.
pub fn write_to_dir(artifacts: &[Artifact], dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create output directory {}", dir.display()))?;
    for artifact in artifacts {
        let path = dir.join(&artifact.name);
        fs::write(&path, &artifact.contents)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(file = %path.display(), bytes = artifact.contents.len(), "wrote artifact");
    }
    Ok(())
}
