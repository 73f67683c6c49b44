//! bladeup - Update resolution and self-update engine for the blade CLI
//!
//! This library provides the core functionality for keeping blade current:
//! - Version parsing and comparison, including snapshot builds
//! - Release and snapshot resolution against a Maven-layout repository
//! - MD5 integrity comparison of the installed binary
//! - Update decisions, reporting and platform-specific installation

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod installer;
pub mod integrity;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod update;
