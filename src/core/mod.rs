//! Config synthesis core: naming, section assembly, backend resolution and
//! frontend composition.

pub mod backend;
pub mod document;
pub mod frontend;
pub mod naming;
pub mod rate_limit;
pub mod raw_blocks;

use crate::config::models::{BackendSsl, Links, Properties};

pub use document::{Section, render_sections};

/// Job directory layout on the deployed instance.
pub const CONFIG_DIR: &str = "/var/vcap/jobs/haproxy/config";
pub const SSL_DIR: &str = "/var/vcap/jobs/haproxy/config/ssl";
pub const ERRORFILE_DIR: &str = "/var/vcap/jobs/haproxy/errorfiles";
pub const RUN_DIR: &str = "/var/vcap/sys/run/haproxy";
pub const LOG_DIR: &str = "/var/vcap/sys/log/haproxy";

/// Which HTTP pool variants exist for the current protocol switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolVariants {
    pub http1: bool,
    pub http2: bool,
}

/// Everything the generators need for one render run.
pub struct RenderContext<'a> {
    pub properties: &'a Properties,
    pub links: &'a Links,
    pub az: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn new(properties: &'a Properties, links: &'a Links, az: &'a str) -> Self {
        RenderContext {
            properties,
            links,
            az,
        }
    }

    /// Server lines reference the resolvers section when one is configured.
    pub fn use_resolvers(&self) -> bool {
        !self.properties.resolvers.is_empty()
    }

    /// HTTP pool variants. Without backend TLS only plain HTTP/1.1 is
    /// possible; with it the variants follow the protocol switches.
    pub fn pool_variants(&self) -> PoolVariants {
        let p = self.properties;
        if p.backend_ssl == BackendSsl::Off {
            return PoolVariants {
                http1: true,
                http2: false,
            };
        }
        let http2 = p.enable_http2 || p.backend_match_http_protocol;
        let http1 = !(p.enable_http2
            && !p.backend_match_http_protocol
            && !p.disable_backend_http2_websockets);
        PoolVariants { http1, http2 }
    }

    /// Pool the HTTP frontends fall back to when no ACL picked a backend.
    pub fn default_http_backend(&self) -> &'static str {
        if self.pool_variants().http2 && !self.properties.backend_match_http_protocol {
            "http-routers-http2"
        } else {
            "http-routers-http1"
        }
    }

    /// Websocket traffic is pinned to the HTTP/1.1 pool when HTTP/2
    /// websockets are disabled.
    pub fn websocket_exemption(&self) -> bool {
        self.properties.disable_backend_http2_websockets
    }

    /// HTTP pool membership: explicit `backend_servers` win over the
    /// link-supplied instances.
    pub fn http_pool_servers(&self) -> Vec<PoolServer> {
        let p = self.properties;
        if !p.backend_servers.is_empty() {
            return p
                .backend_servers
                .iter()
                .map(|address| PoolServer {
                    address: address.clone(),
                    backup: false,
                })
                .collect();
        }

        let instances = match &self.links.http_backend {
            Some(link) => &link.instances,
            None => return Vec::new(),
        };

        instances
            .iter()
            .filter_map(|instance| {
                let local = instance.az.as_deref() == Some(self.az) || instance.az.is_none();
                if !local && p.backend_only_local_az {
                    return None;
                }
                Some(PoolServer {
                    address: instance.address.clone(),
                    backup: !local && p.backend_prefer_local_az,
                })
            })
            .collect()
    }
}

/// One resolved HTTP pool member.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolServer {
    pub address: String,
    pub backup: bool,
}
