use clap::{Parser, Subcommand, ValueEnum};
use dishanveshi_core::PlaceKind;
use std::path::PathBuf;

/// Terminal client for the Dishanveshi travel-itinerary assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the config file (defaults to ~/.config/dishanveshi/config.toml)
    #[arg(long, env = "DISHANVESHI_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL, overriding config and environment
    #[arg(long)]
    pub api_base: Option<String>,

    /// Map provider API key, overriding config and environment
    #[arg(long)]
    pub maps_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether you are logged in and which API is used
    Status,
    /// Generate an itinerary
    Plan {
        /// Destination (defaults to the configured fallback)
        destination: Option<String>,
        /// Save the generated itinerary to your account
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Ask the assistant for a recommendation
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// List saved itineraries
    Saved,
    /// Find restaurants or hotels around a coordinate
    Places {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, value_enum, default_value_t = Kind::Food)]
        kind: Kind,
    },
    /// Check that the API is reachable
    Health,
    /// Interactive session: chat, plan and manage your account in one place
    Shell,
    /// Inspect or edit the config file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Persist the API base URL
    SetBaseUrl { url: String },
    /// Persist the map provider key
    SetMapsKey { key: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Food,
    Stay,
}

impl From<Kind> for PlaceKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Food => PlaceKind::Food,
            Kind::Stay => PlaceKind::Stay,
        }
    }
}
