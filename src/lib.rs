//! Trawl - translation tooling for Kirby projects
//!
//! Trawl is a CLI tool and library that extracts translation strings from
//! PHP templates and YAML blueprints, reconciles them against per-language
//! catalogs, and migrates translation keys across a project.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments and commands)
//! - `config`: Configuration file loading and parsing
//! - `scanner`: Include/exclude pattern resolution
//! - `extract`: PHP and blueprint extractors
//! - `catalog`: Catalog reconciliation and the two file codecs
//! - `migrate`: Key migration engine
//! - `report`: Terminal output helpers

pub mod catalog;
pub mod cli;
pub mod config;
pub mod extract;
pub mod migrate;
pub mod report;
pub mod scanner;
