//! jetpalm: layered configuration resolution for a command-line program
//!
//! Merges command-line flags, `STING_*` environment variables and a
//! `jetpalm.yaml` config file into one typed [`config::Config`].

pub mod cli;
pub mod config;
