//! Last Mile CLI - Database migrations and shipment operations.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lm-cli migrate
//!
//! # Create a shipment and print it (including its OTP)
//! lm-cli shipment create --customer-name "Alice"
//!
//! # Look up, dispatch, or deliver a shipment
//! lm-cli shipment track SHIP-...
//! lm-cli shipment dispatch SHIP-...
//! lm-cli shipment deliver SHIP-... --otp 048213
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `shipment` - Operate on shipments directly against the database

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lm-cli")]
#[command(author, version, about = "Last Mile CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Operate on shipments
    Shipment {
        #[command(subcommand)]
        action: ShipmentAction,
    },
}

#[derive(Subcommand)]
enum ShipmentAction {
    /// Create a new shipment
    Create {
        /// Name of the receiving customer
        #[arg(short, long)]
        customer_name: String,
    },
    /// Show a shipment
    Track {
        /// Shipment ID (`SHIP-...`)
        shipment_id: String,
    },
    /// Mark a pending shipment as in transit
    Dispatch {
        /// Shipment ID (`SHIP-...`)
        shipment_id: String,
    },
    /// Confirm delivery with the customer's OTP
    Deliver {
        /// Shipment ID (`SHIP-...`)
        shipment_id: String,

        /// One-time password given to the customer
        #[arg(short, long)]
        otp: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Shipment { action } => match action {
            ShipmentAction::Create { customer_name } => {
                commands::shipment::create(&customer_name).await?;
            }
            ShipmentAction::Track { shipment_id } => {
                commands::shipment::track(&shipment_id).await?;
            }
            ShipmentAction::Dispatch { shipment_id } => {
                commands::shipment::dispatch(&shipment_id).await?;
            }
            ShipmentAction::Deliver { shipment_id, otp } => {
                commands::shipment::deliver(&shipment_id, &otp).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deliver() {
        let cli = Cli::try_parse_from([
            "lm-cli", "shipment", "deliver", "SHIP-abc", "--otp", "048213",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Shipment {
                action: ShipmentAction::Deliver { ref shipment_id, ref otp }
            }) if shipment_id == "SHIP-abc" && otp == "048213"
        ));
    }

    #[test]
    fn test_parse_create_requires_customer_name() {
        assert!(Cli::try_parse_from(["lm-cli", "shipment", "create"]).is_err());
    }
}
