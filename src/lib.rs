//! Keeps an AppStream metainfo releases file in sync with a project's GitHub releases.
//!
//! The tool fetches published releases through the GitHub CLI, renders their Markdown notes into the restricted
//! markup subset allowed in metainfo descriptions, classifies downloadable artifacts by platform and merges the
//! result into the existing releases document, which is rewritten once at the end of the run.

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod model;
pub mod process;
pub mod service;
pub mod utils;
pub mod xml;
