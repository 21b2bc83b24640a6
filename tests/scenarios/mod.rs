//! Scenario-based tests for provision

mod cluster_creation;
mod config_pipeline;
mod halt_on_failure;
