mod cli;
mod output;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use time::Date;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;

use tpabridge_config::{RegistryConfig, load_registry};
use tpabridge_core::{
    ClaimContact, ClaimHospital, ClaimIntimationRequest, ECardRequest, HospitalQuery, ProviderId,
    SearchFacets,
};
use tpabridge_gateway::{HospitalRow, MemoryHospitalSource, TpaGateway};

use cli::{Cli, Commands};
use output::{print_error, print_hospitals, print_success};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_registry(cli.config.as_deref()).context("loading registry")?;
    if config.providers.is_empty() {
        config = RegistryConfig::with_default_roster();
    }
    let settings = config.gateway.clone();
    let registry = config.into_registry().context("building registry")?;

    let mut gateway = TpaGateway::new(registry, settings);
    if let Some(path) = &cli.hospital_data {
        gateway = gateway.with_hospital_source(Arc::new(load_hospital_rows(path)?));
    }

    match &cli.command {
        Commands::Providers => providers(&gateway, cli.json),
        Commands::Intimate(args) => intimate(&gateway, args, cli.json).await,
        Commands::Ecard(args) => ecard(&gateway, args, cli.json).await,
        Commands::Hospitals(args) => hospitals(&gateway, args, cli.json).await,
        Commands::Facets(args) => facets(&gateway, args, cli.json).await,
    }
}

fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// Demo hospital rows: `{ "table_name": [ { "Column": "value", ... } ] }`.
fn load_hospital_rows(path: &str) -> Result<MemoryHospitalSource> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading hospital data from {path}"))?;
    let tables: HashMap<String, Vec<HospitalRow>> =
        serde_json::from_str(&raw).context("parsing hospital data")?;
    let mut source = MemoryHospitalSource::new();
    for (table, rows) in tables {
        source = source.with_table(table, rows);
    }
    Ok(source)
}

fn providers(gateway: &TpaGateway, json: bool) -> Result<()> {
    if json {
        let list: Vec<serde_json::Value> = gateway
            .registry()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "id": p.id,
                    "name": p.name,
                    "auth": p.auth,
                    "hospitalTable": p.hospital_table.as_ref().map(|m| &m.table),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }
    for profile in gateway.registry().iter() {
        println!(
            "{:>3}  {}  {}",
            profile.id.to_string().cyan(),
            profile.name.bold(),
            format!("({:?})", profile.auth).dimmed()
        );
    }
    Ok(())
}

async fn intimate(gateway: &TpaGateway, args: &cli::IntimateArgs, json: bool) -> Result<()> {
    let request = ClaimIntimationRequest {
        provider_id: ProviderId(args.provider),
        policy_number: args.policy.clone(),
        member_uhid: args.uhid.clone(),
        patient_name: args.patient.clone(),
        relation_to_proposer: args.relation.clone(),
        diagnosis: args.diagnosis.clone(),
        admission_date: parse_date(&args.admission)?,
        discharge_date: args.discharge.as_deref().map(parse_date).transpose()?,
        hospital: ClaimHospital {
            name: args.hospital.clone(),
            city: args.city.clone(),
            state: args.state.clone(),
            pincode: args.pincode.clone(),
        },
        claim_amount: args.amount,
        contact: ClaimContact {
            mobile: args.mobile.clone(),
            email: args.email.clone(),
        },
    };

    let result = gateway.intimate_claim(&request).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if result.success {
        print_success(&format!(
            "claim intimated, reference {}",
            result.reference_number.unwrap_or_default().bold()
        ));
    } else {
        anyhow::bail!(
            "claim intimation failed: {}",
            result.error_message.unwrap_or_else(|| "unknown".into())
        );
    }
    Ok(())
}

async fn ecard(gateway: &TpaGateway, args: &cli::EcardArgs, json: bool) -> Result<()> {
    let request = ECardRequest {
        provider_id: ProviderId(args.provider),
        policy_number: args.policy.clone(),
        member_code: args.member.clone(),
        dob: args.dob.as_deref().map(parse_date).transpose()?,
        uhid: None,
        policy_start_date: None,
        policy_end_date: None,
    };

    let result = gateway.fetch_ecard(&request).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    match (result.success, result.document) {
        (true, Some(document)) => {
            print_success(&format!("e-card resolved ({:?})", document.kind));
            println!("{}", document.value);
        }
        _ => anyhow::bail!(
            "e-card fetch failed: {}",
            result.error_message.unwrap_or_else(|| "unknown".into())
        ),
    }
    Ok(())
}

async fn hospitals(gateway: &TpaGateway, args: &cli::HospitalsArgs, json: bool) -> Result<()> {
    let query = HospitalQuery {
        provider_id: ProviderId(args.provider),
        policy_id: args.policy.clone(),
        pincode: args.pincode.clone(),
        state: args.state.clone(),
        city: args.city.clone(),
    };

    let records = gateway.search_hospitals(&query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    print_hospitals(&records);
    Ok(())
}

async fn facets(gateway: &TpaGateway, args: &cli::FacetsArgs, json: bool) -> Result<()> {
    let facets = gateway
        .list_search_facets(ProviderId(args.provider), &args.policy)
        .await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&facets)?);
        return Ok(());
    }
    match facets {
        SearchFacets::PincodeOnly => {
            println!("This provider's network is searchable by pincode only.");
        }
        SearchFacets::StateCity { states } => {
            for facet in states {
                println!("{}", facet.state.bold());
                for city in facet.cities {
                    println!("  {city}");
                }
            }
        }
    }
    Ok(())
}
