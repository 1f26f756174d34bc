//! Configuration module for the fulfillment workflow service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the fulfillment service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Workflow engine tunables.
	#[serde(default)]
	pub workflow: WorkflowConfig,
	/// Configuration for the storage backend.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Workflow engine tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
	/// Tax rate applied when generating invoices, as a decimal fraction.
	/// Defaults to zero; tax handling is owned by the finance team.
	#[serde(default)]
	pub tax_rate: Decimal,
	/// Days until a generated invoice falls due.
	#[serde(default = "default_invoice_due_days")]
	pub invoice_due_days: i64,
}

fn default_invoice_due_days() -> i64 {
	30
}

impl Default for WorkflowConfig {
	fn default() -> Self {
		Self {
			tax_rate: Decimal::ZERO,
			invoice_due_days: default_invoice_due_days(),
		}
	}
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use.
	#[serde(default = "default_storage_backend")]
	pub backend: String,
}

fn default_storage_backend() -> String {
	"memory".to_string()
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_storage_backend(),
		}
	}
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to listen on.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_enabled() -> bool {
	true
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

impl Config {
	/// Loads configuration from a TOML file at the given path.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates that the configuration contains all required values.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation(
				"Service ID cannot be empty".to_string(),
			));
		}
		if self.workflow.tax_rate < Decimal::ZERO || self.workflow.tax_rate > Decimal::ONE {
			return Err(ConfigError::Validation(
				"Tax rate must be between 0 and 1".to_string(),
			));
		}
		if self.workflow.invoice_due_days <= 0 {
			return Err(ConfigError::Validation(
				"Invoice due days must be positive".to_string(),
			));
		}
		if self.storage.backend != "memory" {
			return Err(ConfigError::Validation(format!(
				"Unknown storage backend: {}",
				self.storage.backend
			)));
		}
		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation(
					"API port cannot be 0".to_string(),
				));
			}
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}
