//! CLI commands

pub mod unpack;
