//! CLI subcommand modules.
//!
//! This module contains the implementations for all lectura CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod buckets;
pub(crate) mod quarters;
