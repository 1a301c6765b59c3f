//! Input data structures for proxyforge.
//!
//! These types map directly to YAML (also JSON / TOML) input documents. They are
//! intentionally serde‑friendly and include defaults so that minimal manifests remain
//! concise. Scalar fields tolerate string-typed numbers and booleans because operator
//! manifests quote them inconsistently.
use std::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, SeqAccess, Visitor},
};

use crate::utils::{config_lines, decode_gzip_base64};

/// Root input document for a render run: the property bag, the link-supplied
/// server inventories, and the availability zone of the rendering instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderInput {
    #[serde(default)]
    pub ha_proxy: Properties,
    #[serde(default)]
    pub links: Links,
    /// Availability zone of the instance this render targets.
    #[serde(default)]
    pub az: String,
}

/// Server inventories supplied by collaborating deployments rather than
/// properties.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub http_backend: Option<Link>,
    #[serde(default)]
    pub tcp_backend: Option<Link>,
    #[serde(default)]
    pub tcp_router: Option<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub instances: Vec<LinkInstance>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LinkInstance {
    pub address: String,
    #[serde(default)]
    pub az: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// The `ha_proxy.*` property bag. Every field is optional in the input;
/// defaults mirror the shipped property defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Properties {
    // Logging
    pub syslog_server: String,
    #[serde(deserialize_with = "de_flex_u64")]
    pub log_max_length: u64,
    pub log_format: String,
    pub log_level: String,

    // Process model
    #[serde(deserialize_with = "de_flex_u64")]
    pub nbproc: u64,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub nbthread: Option<u64>,
    #[serde(deserialize_with = "de_flex_u64")]
    pub max_connections: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub max_open_files: u64,
    pub reload_hard_stop_after: String,
    pub lua_scripts: Vec<String>,
    pub lua_scripts_per_thread: Vec<String>,

    // TLS defaults
    #[serde(deserialize_with = "de_flex_u64")]
    pub default_dh_param: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub buffer_size_bytes: u64,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub max_rewrite: Option<u64>,
    pub ssl_ciphers: String,
    pub ssl_ciphersuites: Option<String>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tls_10: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tls_11: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tls_12: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tls_13: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tls_tickets: bool,

    // Raw config escape hatches
    pub global_config: Option<String>,
    pub default_config: Option<String>,
    pub frontend_config: Option<String>,
    pub backend_config: Option<String>,
    pub tcp_backend_config: Option<String>,
    pub raw_config: Option<String>,
    pub config_mode: ConfigMode,
    pub raw_blocks: RawBlocks,

    // Timeouts (seconds)
    #[serde(deserialize_with = "de_flex_u64")]
    pub connect_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub client_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub server_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub websocket_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub keepalive_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub request_timeout: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub queue_timeout: u64,

    // Frontends
    pub binding_ip: String,
    #[serde(deserialize_with = "de_flex_bool")]
    pub v4v6: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub accept_proxy: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_tcp_accept_proxy: bool,
    pub expect_proxy: CidrList,
    pub expect_proxy_cidrs: CidrList,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_http: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub enable_4443: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub https_redirect_all: bool,
    pub https_redirect_domains: Vec<String>,
    pub cidr_whitelist: CidrList,
    pub cidr_blacklist: CidrList,
    pub cidr_blocklist_tcp: CidrList,
    #[serde(deserialize_with = "de_flex_bool")]
    pub block_all: bool,
    pub strip_headers: Vec<String>,
    pub headers: Vec<String>,
    pub rsp_headers: Vec<String>,
    pub internal_only_domains: Vec<String>,
    pub trusted_domain_cidrs: CidrList,
    pub http_request_deny_conditions: Vec<DenyCondition>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub hsts_enable: bool,
    #[serde(deserialize_with = "de_flex_u64")]
    pub hsts_max_age: u64,
    #[serde(deserialize_with = "de_flex_bool")]
    pub hsts_include_subdomains: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub hsts_preload: bool,
    pub disable_domain_fronting: DomainFronting,
    #[serde(deserialize_with = "de_flex_bool")]
    pub client_cert: bool,
    pub client_cert_ignore_err: Option<String>,
    pub client_ca_file: Option<String>,
    pub client_revocation_list: Option<String>,
    pub forwarded_client_cert: ForwardedClientCert,
    #[serde(deserialize_with = "de_flex_bool")]
    pub legacy_xfcc_header_mapping: bool,

    // Draining and health probes
    #[serde(deserialize_with = "de_flex_bool")]
    pub drain_enable: bool,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub drain_frontend_grace_time: Option<u64>,
    #[serde(deserialize_with = "de_flex_u64")]
    pub drain_timeout: u64,
    #[serde(deserialize_with = "de_flex_bool")]
    pub enable_health_check_http: bool,
    #[serde(deserialize_with = "de_flex_u64")]
    pub health_check_port: u64,

    // Certificates
    pub ssl_pem: Option<SslPem>,
    pub crt_list: Option<Vec<CrtListEntry>>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub ext_crt_list: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub strict_sni: bool,

    // HTTP backends
    pub backend_servers: Vec<String>,
    #[serde(deserialize_with = "de_flex_u64")]
    pub backend_port: u64,
    pub backend_ssl: BackendSsl,
    pub backend_ssl_verifyhost: Option<String>,
    pub backend_ca_file: Option<String>,
    pub backend_crt: Option<String>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub enable_http2: bool,
    #[serde(deserialize_with = "de_opt_flex_bool")]
    pub enable_http2_backend: Option<bool>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub disable_backend_http2_websockets: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub backend_match_http_protocol: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub backend_use_http_health: bool,
    pub backend_http_health_uri: String,
    #[serde(deserialize_with = "de_flex_u64")]
    pub backend_http_health_port: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub backend_health_fall: u64,
    #[serde(deserialize_with = "de_flex_u64")]
    pub backend_health_rise: u64,
    #[serde(deserialize_with = "de_flex_bool")]
    pub backend_prefer_local_az: bool,
    #[serde(deserialize_with = "de_flex_bool")]
    pub backend_only_local_az: bool,
    pub compress_types: Option<String>,
    #[serde(deserialize_with = "de_ordered_map")]
    pub custom_http_error_files: Vec<(String, String)>,
    #[serde(deserialize_with = "de_ordered_map")]
    pub routed_backend_servers: Vec<(String, RoutedBackend)>,

    // TCP proxying
    pub tcp: Vec<TcpBackend>,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub tcp_link_port: Option<u64>,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub tcp_link_check_port: Option<u64>,
    pub tcp_routing: TcpRouting,

    // DNS resolution
    #[serde(deserialize_with = "de_resolver_list")]
    pub resolvers: Vec<(String, String)>,
    pub dns_hold: String,
    pub resolve_retry_timeout: String,
    #[serde(deserialize_with = "de_flex_u64")]
    pub resolve_retries: u64,

    // Rate limiting
    pub requests_rate_limit: Option<RequestsRateLimit>,
    pub connections_rate_limit: Option<ConnectionsRateLimit>,

    // Stats listener
    #[serde(deserialize_with = "de_flex_bool")]
    pub stats_enable: bool,
    pub stats_bind: String,
    pub stats_user: Option<String>,
    pub stats_password: Option<String>,
    pub stats_uri: String,
    pub trusted_stats_cidrs: String,
    #[serde(deserialize_with = "de_flex_bool")]
    pub stats_promex_enable: bool,
    pub stats_promex_path: Option<String>,

    // Process descriptor and lifecycle scripts
    pub additional_unrestricted_volumes: Vec<serde_json::Value>,
    pub pre_start_script: Option<String>,
    pub haproxy_feature_version: Option<String>,
}

impl Default for Properties {
    fn default() -> Self {
        Properties {
            syslog_server: "stdout".to_string(),
            log_max_length: 1024,
            log_format: "raw".to_string(),
            log_level: "info".to_string(),
            nbproc: 1,
            nbthread: None,
            max_connections: 64_000,
            max_open_files: 256_000,
            reload_hard_stop_after: "5m".to_string(),
            lua_scripts: Vec::new(),
            lua_scripts_per_thread: Vec::new(),
            default_dh_param: 2048,
            buffer_size_bytes: 16_384,
            max_rewrite: None,
            ssl_ciphers: DEFAULT_SSL_CIPHERS.to_string(),
            ssl_ciphersuites: None,
            disable_tls_10: false,
            disable_tls_11: false,
            disable_tls_12: false,
            disable_tls_13: false,
            disable_tls_tickets: true,
            global_config: None,
            default_config: None,
            frontend_config: None,
            backend_config: None,
            tcp_backend_config: None,
            raw_config: None,
            config_mode: ConfigMode::Classic,
            raw_blocks: RawBlocks::default(),
            connect_timeout: 5,
            client_timeout: 30,
            server_timeout: 30,
            websocket_timeout: 3600,
            keepalive_timeout: 6,
            request_timeout: 5,
            queue_timeout: 30,
            binding_ip: String::new(),
            v4v6: false,
            accept_proxy: false,
            disable_tcp_accept_proxy: false,
            expect_proxy: CidrList::default(),
            expect_proxy_cidrs: CidrList::default(),
            disable_http: false,
            enable_4443: false,
            https_redirect_all: false,
            https_redirect_domains: Vec::new(),
            cidr_whitelist: CidrList::default(),
            cidr_blacklist: CidrList::default(),
            cidr_blocklist_tcp: CidrList::default(),
            block_all: false,
            strip_headers: Vec::new(),
            headers: Vec::new(),
            rsp_headers: Vec::new(),
            internal_only_domains: Vec::new(),
            trusted_domain_cidrs: CidrList::default(),
            http_request_deny_conditions: Vec::new(),
            hsts_enable: false,
            hsts_max_age: 31_536_000,
            hsts_include_subdomains: false,
            hsts_preload: false,
            disable_domain_fronting: DomainFronting::Allow,
            client_cert: false,
            client_cert_ignore_err: None,
            client_ca_file: None,
            client_revocation_list: None,
            forwarded_client_cert: ForwardedClientCert::SanitizeSet,
            legacy_xfcc_header_mapping: false,
            drain_enable: false,
            drain_frontend_grace_time: None,
            drain_timeout: 30,
            enable_health_check_http: false,
            health_check_port: 8080,
            ssl_pem: None,
            crt_list: None,
            ext_crt_list: false,
            strict_sni: false,
            backend_servers: Vec::new(),
            backend_port: 80,
            backend_ssl: BackendSsl::Off,
            backend_ssl_verifyhost: None,
            backend_ca_file: None,
            backend_crt: None,
            enable_http2: false,
            enable_http2_backend: None,
            disable_backend_http2_websockets: false,
            backend_match_http_protocol: false,
            backend_use_http_health: false,
            backend_http_health_uri: "/health".to_string(),
            backend_http_health_port: 8080,
            backend_health_fall: 3,
            backend_health_rise: 2,
            backend_prefer_local_az: false,
            backend_only_local_az: false,
            compress_types: None,
            custom_http_error_files: Vec::new(),
            routed_backend_servers: Vec::new(),
            tcp: Vec::new(),
            tcp_link_port: None,
            tcp_link_check_port: None,
            tcp_routing: TcpRouting::default(),
            resolvers: Vec::new(),
            dns_hold: "10s".to_string(),
            resolve_retry_timeout: "1s".to_string(),
            resolve_retries: 3,
            requests_rate_limit: None,
            connections_rate_limit: None,
            stats_enable: false,
            stats_bind: "*:9000".to_string(),
            stats_user: None,
            stats_password: None,
            stats_uri: "haproxy_stats".to_string(),
            trusted_stats_cidrs: "0.0.0.0/32".to_string(),
            stats_promex_enable: false,
            stats_promex_path: None,
            additional_unrestricted_volumes: Vec::new(),
            pre_start_script: None,
            haproxy_feature_version: None,
        }
    }
}

impl Properties {
    /// HTTP/2 toward backends follows `enable_http2_backend` when set,
    /// otherwise the frontend `enable_http2` switch.
    pub fn http2_backend_enabled(&self) -> bool {
        self.enable_http2_backend.unwrap_or(self.enable_http2)
    }

    /// Whether the HTTPS frontend exists at all.
    pub fn has_tls_material(&self) -> bool {
        self.ssl_pem.is_some() || self.crt_list.is_some()
    }
}

/// Shipped default for `ssl_ciphers`.
pub const DEFAULT_SSL_CIPHERS: &str = "ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:DHE-RSA-AES128-GCM-SHA256:DHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-AES128-SHA256:ECDHE-RSA-AES128-SHA256:ECDHE-ECDSA-AES128-SHA:ECDHE-RSA-AES256-SHA384:ECDHE-RSA-AES128-SHA:ECDHE-ECDSA-AES256-SHA384:ECDHE-ECDSA-AES256-SHA:ECDHE-RSA-AES256-SHA:DHE-RSA-AES128-SHA256:DHE-RSA-AES128-SHA:DHE-RSA-AES256-SHA256:DHE-RSA-AES256-SHA:ECDHE-ECDSA-DES-CBC3-SHA:ECDHE-RSA-DES-CBC3-SHA:EDH-RSA-DES-CBC3-SHA:AES128-GCM-SHA256:AES256-GCM-SHA384:AES128-SHA256:AES256-SHA256:AES128-SHA:AES256-SHA:DES-CBC3-SHA:!DSS";

/// How the generated document is assembled.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigMode {
    #[default]
    Classic,
    RawBlocksOnly,
}

/// TLS posture toward backend servers.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendSsl {
    #[default]
    Off,
    Noverify,
    Verify,
}

/// Client certificate header forwarding policy.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForwardedClientCert {
    AlwaysForwardOnly,
    ForwardOnly,
    #[default]
    SanitizeSet,
    ForwardOnlyIfRouteService,
}

/// Domain-fronting policy. Accepts `true`, `false` or `"mtls_only"`; any
/// other value is kept verbatim so validation can report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DomainFronting {
    #[default]
    Allow,
    Deny,
    DenyMtlsOnly,
    Invalid(String),
}

impl<'de> Deserialize<'de> for DomainFronting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DomainFrontingVisitor;

        impl Visitor<'_> for DomainFrontingVisitor {
            type Value = DomainFronting;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("true, false or 'mtls_only'")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v {
                    DomainFronting::Deny
                } else {
                    DomainFronting::Allow
                })
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(match v {
                    "true" => DomainFronting::Deny,
                    "false" => DomainFronting::Allow,
                    "mtls_only" => DomainFronting::DenyMtlsOnly,
                    other => DomainFronting::Invalid(other.to_string()),
                })
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(DomainFronting::Allow)
            }
        }

        deserializer.deserialize_any(DomainFrontingVisitor)
    }
}

/// A list of CIDRs that may arrive as a literal array, as cleartext, or as
/// base64-encoded gzipped text. The decoded text is retained because the
/// rendered list files reproduce it byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CidrList {
    pub entries: Vec<String>,
    /// True when the input was a literal array rather than an encoded string.
    pub from_array: bool,
    /// Decoded gzip text, kept verbatim including any trailing newline.
    pub decoded: Option<String>,
}

impl CidrList {
    pub fn from_entries<S: Into<String>>(entries: Vec<S>) -> Self {
        CidrList {
            entries: entries.into_iter().map(Into::into).collect(),
            from_array: true,
            decoded: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The body slot for rendered list files: decoded text verbatim, or the
    /// entries newline-joined with a trailing newline.
    pub fn body(&self) -> String {
        match &self.decoded {
            Some(text) => text.clone(),
            None if self.entries.is_empty() => String::new(),
            None => format!("{}\n", self.entries.join("\n")),
        }
    }
}

impl<'de> Deserialize<'de> for CidrList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CidrListVisitor;

        impl<'de> Visitor<'de> for CidrListVisitor {
            type Value = CidrList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of CIDRs or an encoded CIDR string")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(CidrList::default())
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                match decode_gzip_base64(v) {
                    Some(text) => Ok(CidrList {
                        entries: text.split_whitespace().map(str::to_string).collect(),
                        from_array: false,
                        decoded: Some(text),
                    }),
                    None => Ok(CidrList {
                        entries: v.split_whitespace().map(str::to_string).collect(),
                        from_array: false,
                        decoded: None,
                    }),
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = seq.next_element::<String>()? {
                    entries.push(entry);
                }
                Ok(CidrList {
                    entries,
                    from_array: true,
                    decoded: None,
                })
            }
        }

        deserializer.deserialize_any(CidrListVisitor)
    }
}

/// One certificate slot: a chain, optionally paired with its private key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PemEntry {
    pub cert_chain: String,
    pub private_key: Option<String>,
}

impl PemEntry {
    /// The concatenated PEM text written to disk.
    pub fn pem_text(&self) -> String {
        match &self.private_key {
            Some(key) => format!("{}\n{}", self.cert_chain, key),
            None => self.cert_chain.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for PemEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PemEntryVisitor;

        impl<'de> Visitor<'de> for PemEntryVisitor {
            type Value = PemEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a PEM string or a {cert_chain, private_key} object")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(PemEntry {
                    cert_chain: v.to_string(),
                    private_key: None,
                })
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entry = PemEntry::default();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "cert_chain" => entry.cert_chain = map.next_value()?,
                        "private_key" => entry.private_key = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(entry)
            }
        }

        deserializer.deserialize_any(PemEntryVisitor)
    }
}

/// `ssl_pem`: a single PEM string, a list of PEM strings, or a list of
/// chain/key objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SslPem(pub Vec<PemEntry>);

impl SslPem {
    pub fn from_text<S: Into<String>>(pem: S) -> Self {
        SslPem(vec![PemEntry {
            cert_chain: pem.into(),
            private_key: None,
        }])
    }
}

impl<'de> Deserialize<'de> for SslPem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SslPemVisitor;

        impl<'de> Visitor<'de> for SslPemVisitor {
            type Value = SslPem;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a PEM string or a list of PEM entries")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(SslPem(vec![PemEntry {
                    cert_chain: v.to_string(),
                    private_key: None,
                }]))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = seq.next_element::<PemEntry>()? {
                    entries.push(entry);
                }
                Ok(SslPem(entries))
            }
        }

        deserializer.deserialize_any(SslPemVisitor)
    }
}

/// One `crt_list` entry: a certificate plus its bind annotations.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrtListEntry {
    pub ssl_pem: Option<PemEntry>,
    pub client_ca_file: Option<String>,
    pub client_revocation_list: Option<String>,
    pub verify: Option<String>,
    #[serde(deserialize_with = "de_opt_string_or_list")]
    pub snifilter: Option<Vec<String>>,
    pub ssl_ciphers: Option<String>,
    pub ssl_ciphersuites: Option<String>,
    pub ssl_min_version: Option<String>,
    pub ssl_max_version: Option<String>,
}

/// One path-routed backend pool.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutedBackend {
    pub servers: Vec<String>,
    #[serde(deserialize_with = "de_flex_u64")]
    pub port: u64,
    #[serde(deserialize_with = "de_flex_bool")]
    pub backend_use_http_health: bool,
    pub backend_http_health_uri: String,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub backend_http_health_port: Option<u64>,
    pub backend_ssl: BackendSsl,
    pub backend_verifyhost: Option<String>,
    pub additional_acls: Vec<String>,
}

impl Default for RoutedBackend {
    fn default() -> Self {
        RoutedBackend {
            servers: Vec::new(),
            port: 80,
            backend_use_http_health: false,
            backend_http_health_uri: "/health".to_string(),
            backend_http_health_port: None,
            backend_ssl: BackendSsl::Off,
            backend_verifyhost: None,
            additional_acls: Vec::new(),
        }
    }
}

/// One custom TCP proxy defined through properties.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpBackend {
    pub name: String,
    #[serde(deserialize_with = "de_flex_u64")]
    pub port: u64,
    pub backend_servers: Vec<String>,
    /// When present, servers not in this list become backups.
    pub backend_servers_local: Option<Vec<String>>,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub backend_port: Option<u64>,
    pub balance: Option<String>,
    /// TLS termination on the frontend bind.
    #[serde(deserialize_with = "de_flex_bool")]
    pub ssl: bool,
    pub backend_ssl: BackendSsl,
    pub backend_verifyhost: Option<String>,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub health_check_http: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpRouting {
    pub port_range: String,
}

impl Default for TcpRouting {
    fn default() -> Self {
        TcpRouting {
            port_range: "1024-1123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RequestsRateLimit {
    pub window_size: String,
    pub table_size: String,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub requests: Option<u64>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub block: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionsRateLimit {
    pub window_size: String,
    pub table_size: String,
    #[serde(deserialize_with = "de_opt_flex_u64")]
    pub connections: Option<u64>,
    #[serde(deserialize_with = "de_flex_bool")]
    pub block: bool,
    pub cidrs_to_exclude: CidrList,
}

/// One `http_request_deny_conditions` entry: a conjunction of ACLs.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DenyCondition {
    pub condition: Vec<DenyAcl>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DenyAcl {
    pub acl_name: String,
    pub acl_rule: String,
    #[serde(deserialize_with = "de_flex_bool")]
    pub negate: bool,
}

/// `raw_blocks`: ordered map of section kind to either direct lines
/// (`global`, `defaults`) or named sub-blocks (`frontend`, `backend`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBlocks(pub Vec<(String, RawBlockValue)>);

#[derive(Debug, Clone, PartialEq)]
pub enum RawBlockValue {
    Lines(Vec<String>),
    Named(Vec<(String, Vec<String>)>),
}

impl<'de> Deserialize<'de> for RawBlocks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawBlocksVisitor;

        impl<'de> Visitor<'de> for RawBlocksVisitor {
            type Value = RawBlocks;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of raw config blocks")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(RawBlocks::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut blocks = Vec::new();
                while let Some((kind, value)) = map.next_entry::<String, RawBlockValue>()? {
                    blocks.push((kind, value));
                }
                Ok(RawBlocks(blocks))
            }
        }

        deserializer.deserialize_any(RawBlocksVisitor)
    }
}

impl<'de> Deserialize<'de> for RawBlockValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawBlockValueVisitor;

        impl<'de> Visitor<'de> for RawBlockValueVisitor {
            type Value = RawBlockValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("config lines or a map of named raw blocks")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RawBlockValue::Lines(config_lines(v)))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut lines = Vec::new();
                while let Some(line) = seq.next_element::<String>()? {
                    let line = line.trim();
                    if !line.is_empty() {
                        lines.push(line.to_string());
                    }
                }
                Ok(RawBlockValue::Lines(lines))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut named = Vec::new();
                while let Some((id, value)) = map.next_entry::<String, RawBlockValue>()? {
                    match value {
                        RawBlockValue::Lines(lines) => named.push((id, lines)),
                        RawBlockValue::Named(_) => {
                            return Err(serde::de::Error::custom(
                                "raw blocks may only be nested one level deep",
                            ));
                        }
                    }
                }
                Ok(RawBlockValue::Named(named))
            }
        }

        deserializer.deserialize_any(RawBlockValueVisitor)
    }
}

// --- flexible scalar deserializers -----------------------------------------

struct FlexBoolVisitor;

impl Visitor<'_> for FlexBoolVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean or a 'true'/'false' string")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match v {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(E::custom(format!("invalid boolean: {other}"))),
        }
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(false)
    }
}

pub(crate) fn de_flex_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlexBoolVisitor)
}

struct OptFlexBoolVisitor;

impl Visitor<'_> for OptFlexBoolVisitor {
    type Value = Option<bool>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean, a 'true'/'false' string, or null")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        FlexBoolVisitor.visit_str(v).map(Some)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

pub(crate) fn de_opt_flex_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptFlexBoolVisitor)
}

struct FlexU64Visitor;

impl Visitor<'_> for FlexU64Visitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a numeric string")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        u64::try_from(v).map_err(|_| E::custom(format!("negative value: {v}")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid number: {v}")))
    }
}

pub(crate) fn de_flex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlexU64Visitor)
}

struct OptFlexU64Visitor;

impl Visitor<'_> for OptFlexU64Visitor {
    type Value = Option<u64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer, a numeric string, or null")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        FlexU64Visitor.visit_i64(v).map(Some)
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        FlexU64Visitor.visit_str(v).map(Some)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

pub(crate) fn de_opt_flex_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptFlexU64Visitor)
}

pub(crate) fn de_opt_string_or_list<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptVisitor;

    impl<'de> Visitor<'de> for OptVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, a list of strings, or null")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(vec![v.to_string()]))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(Some(items))
        }
    }

    deserializer.deserialize_any(OptVisitor)
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for OrderedMapVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Vec<(String, T)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            entries.push((key, value));
        }
        Ok(entries)
    }
}

/// Deserialize a map into key/value pairs preserving declaration order.
pub(crate) fn de_ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
}

/// Deserialize `resolvers`: a list of `{name: address}` maps.
pub(crate) fn de_resolver_list<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Entry(Vec<(String, String)>);

    impl<'de> Deserialize<'de> for Entry {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            de_ordered_map(deserializer).map(Entry)
        }
    }

    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of {name: address} maps")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut resolvers = Vec::new();
            while let Some(Entry(pairs)) = seq.next_element::<Entry>()? {
                resolvers.extend(pairs);
            }
            Ok(resolvers)
        }
    }

    deserializer.deserialize_any(ListVisitor)
}
