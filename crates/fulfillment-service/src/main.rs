//! Main entry point for the fulfillment workflow service.
//!
//! This binary wires the storage backend, permission gate and workflow
//! orchestrator together and exposes them over an HTTP API. All domain
//! decisions live in the lower crates; this layer only does assembly.

use clap::Parser;
use fulfillment_access::PermissionGate;
use fulfillment_config::Config;
use fulfillment_core::{WorkflowOrchestrator, WorkflowSettings};
use fulfillment_storage::implementations::memory::MemoryStore;
use fulfillment_types::{Role, UserAccount};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

mod server;

/// Command-line arguments for the fulfillment service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started fulfillment service");

	// Load configuration
	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	// Assemble the storage backend. Only the in-memory implementation is
	// wired today; config validation already rejected anything else.
	let store = Arc::new(MemoryStore::new());

	// A fresh store has no accounts; seed a bootstrap admin so the system
	// is administrable from the first request.
	let bootstrap = UserAccount::new(Uuid::new_v4(), "bootstrap-admin", Role::Admin);
	store.add_user(bootstrap.clone()).await;
	tracing::info!(user_id = %bootstrap.id, "Seeded bootstrap admin account");

	let gate = PermissionGate::new(store.clone());
	let settings = WorkflowSettings {
		tax_rate: config.workflow.tax_rate,
		invoice_due_days: config.workflow.invoice_due_days,
	};
	let orchestrator = Arc::new(WorkflowOrchestrator::new(
		store.clone(),
		store.clone(),
		store.clone(),
		gate,
		settings,
	));

	match &config.api {
		Some(api) if api.enabled => {
			server::start_server(api.clone(), orchestrator, store).await?;
		}
		_ => {
			tracing::warn!("API server disabled; nothing to serve");
		}
	}

	tracing::info!("Stopped fulfillment service");
	Ok(())
}
