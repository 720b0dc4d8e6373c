use clap::{Args, Parser, Subcommand};

/// Operator CLI for the TPABridge gateway.
#[derive(Parser)]
#[command(name = "tpabridge", version, about = "TPA integration gateway CLI")]
pub struct Cli {
    /// Path to the registry TOML (defaults to ./tpabridge.toml, then the
    /// built-in roster)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// JSON file with demo hospital rows, keyed by table name
    #[arg(long, global = true)]
    pub hospital_data: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured providers
    Providers,
    /// Intimate a claim with a provider
    Intimate(IntimateArgs),
    /// Fetch a member's e-card
    Ecard(EcardArgs),
    /// Search a provider's network hospitals
    Hospitals(HospitalsArgs),
    /// Show the hospital-search facets for a provider
    Facets(FacetsArgs),
}

#[derive(Args)]
pub struct IntimateArgs {
    /// Provider id from the registry
    #[arg(long)]
    pub provider: u16,
    #[arg(long)]
    pub policy: String,
    #[arg(long)]
    pub uhid: String,
    #[arg(long)]
    pub patient: String,
    #[arg(long, default_value = "self")]
    pub relation: String,
    #[arg(long)]
    pub diagnosis: String,
    /// Admission date, YYYY-MM-DD
    #[arg(long)]
    pub admission: String,
    /// Discharge date, YYYY-MM-DD
    #[arg(long)]
    pub discharge: Option<String>,
    #[arg(long)]
    pub hospital: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub pincode: String,
    #[arg(long)]
    pub amount: f64,
    #[arg(long)]
    pub mobile: String,
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct EcardArgs {
    #[arg(long)]
    pub provider: u16,
    #[arg(long)]
    pub policy: String,
    #[arg(long)]
    pub member: String,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
}

#[derive(Args)]
pub struct HospitalsArgs {
    #[arg(long)]
    pub provider: u16,
    #[arg(long)]
    pub policy: String,
    #[arg(long)]
    pub pincode: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
}

#[derive(Args)]
pub struct FacetsArgs {
    #[arg(long)]
    pub provider: u16,
    #[arg(long)]
    pub policy: String,
}
