//! Proxyforge - deterministic HAProxy configuration and artifact synthesis.
//!
//! Proxyforge turns one declarative input document (the `ha_proxy` property bag
//! plus link-supplied server inventories) into the complete set of files an
//! HAProxy job needs on disk: the main `haproxy.config`, the BPM process
//! descriptor, a `certs.ttar` archive, CIDR list files, the SSL redirect map,
//! PEM material and the drain / pre-start lifecycle scripts. Rendering is a
//! pure function of the input; the same document always produces byte-identical
//! artifacts.
//!
//! # Quick Example
//! ```no_run
//! use proxyforge::config::{loader::load_input, validation::PropertiesValidator};
//!
//! # fn main() -> eyre::Result<()> {
//! let input = load_input("manifest.yml")?;
//! PropertiesValidator::validate(&input.ha_proxy)?;
//! let artifacts = proxyforge::emit::render_all(&input.ha_proxy, &input.links, &input.az);
//! proxyforge::emit::write_to_dir(&artifacts, std::path::Path::new("out"))?;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! `config` holds the input model, loader and validation; `core` the synthesis
//! logic (naming, section assembly, backend and frontend composition); `emit`
//! the per-artifact renderers. End users should prefer the re-exports below
//! instead of reaching into internal modules directly.
//!
//! # Error Handling
//! All fallible APIs return `eyre::Result<T>` or a domain specific error type. A custom error
//! context is always attached using `WrapErr` for debuggability.
//!
//! # License
//! Licensed under Apache-2.0.
pub mod config;
pub mod tracing_setup;
pub mod utils;

pub mod core;
pub mod emit;

// Re-export the specific types needed by the binary crate
pub use crate::{
    config::models::{Links, Properties, RenderInput},
    core::RenderContext,
    emit::{Artifact, render_all, write_to_dir},
};
