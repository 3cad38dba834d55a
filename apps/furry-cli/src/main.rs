//! Furry CLI - command-line front end for Furry Friends.
//!
//! Drives the core services without a UI: resolve a ZIP from the configured
//! location, search for adoptable pets, and manage the theme preference.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use furry_core::api::SearchResponse;
use furry_core::location::{ConfiguredLocationProvider, StaticPermission};
use furry_core::services::settings_service::message_for;
use furry_core::{
    bootstrap_services, dial_uri, format_pet_name, normalize_web_url, share_message,
    BootstrappedServices, JsonSettingsStore, Platform, ResolutionResult, ShareListing, Species,
};
use tokio::signal;

use crate::config::CliConfig;

/// Furry CLI - find adoptable pets near you.
#[derive(Parser, Debug)]
#[command(name = "furry")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "FURRY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Data directory for persistent settings.
    #[arg(short = 'd', long, env = "FURRY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current ZIP code from the configured location.
    Locate,

    /// Search adoptable pets with pictures near a ZIP code.
    Search {
        /// cats, dogs, rabbits or turtles.
        species: Species,

        /// ZIP code to search around.
        #[arg(long)]
        zip: String,

        /// Print a shareable message for each listing.
        #[arg(long)]
        share: bool,
    },

    /// List available cats near a ZIP code, retrying network failures.
    Find {
        /// ZIP code to search around.
        #[arg(long)]
        zip: String,
    },

    /// Show or change the dark-theme setting.
    Theme {
        /// New value; omit to show the current one.
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeMode {
    On,
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Furry CLI v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    let data_dir = furry_core::state::resolve_data_dir(config.data_dir.as_deref());
    log::info!("Using data directory: {}", data_dir.display());

    let platform = Platform {
        permission: Arc::new(StaticPermission(config.location_permission)),
        provider: Arc::new(ConfiguredLocationProvider::new(config.coordinate())),
        store: Arc::new(JsonSettingsStore::new(data_dir)),
    };

    let services = bootstrap_services(&config.to_core_config(), platform)
        .context("Failed to bootstrap services")?;

    match args.command {
        Command::Locate => locate(&services).await,
        Command::Search {
            species,
            zip,
            share,
        } => search(&services, species, &zip, share).await,
        Command::Find { zip } => find(&services, &zip).await,
        Command::Theme { mode } => theme(&services, mode).await,
    }
}

/// Resolves the ZIP, cancelling cleanly on Ctrl+C.
async fn locate(services: &BootstrappedServices) -> Result<()> {
    let Some(handle) = services.settings.fetch_zip_from_location() else {
        bail!(
            "{}",
            services
                .settings
                .state()
                .message
                .unwrap_or_else(|| "Location unavailable.".to_string())
        );
    };

    let result = tokio::select! {
        result = handle.join() => result,
        _ = signal::ctrl_c() => {
            log::info!("Interrupted, cancelling location request");
            services.settings.cancel_location_request();
            ResolutionResult::Unavailable(furry_core::location::CANCELLED_REASON.to_string())
        }
    };

    match result {
        ResolutionResult::Success(zip) => {
            println!("{zip}");
            Ok(())
        }
        other => bail!("{}", message_for(&other).unwrap_or("Location request cancelled.")),
    }
}

async fn search(
    services: &BootstrappedServices,
    species: Species,
    zip: &str,
    share: bool,
) -> Result<()> {
    services.search.update_zip_input(zip);
    services.search.select_species(species);

    let response = match services.search.search_pets(species).await {
        Ok(response) => response,
        Err(e) => {
            if services.search.zip_state().borrow().invalid_zip_provided {
                bail!("{zip} is not a ZIP code the listing service recognizes");
            }
            return Err(e).context("Search failed");
        }
    };

    if response.data.is_empty() {
        println!("No {species} with pictures found near {zip}.");
        return Ok(());
    }

    for animal in &response.data {
        print_animal(&response, animal, share);
    }
    Ok(())
}

fn print_animal(response: &SearchResponse, animal: &furry_core::api::ResourceItem, share: bool) {
    let attributes = &animal.attributes;
    let name = format_pet_name(attributes.name.as_deref());
    let breed = attributes.breed_primary.as_deref().unwrap_or("Unknown breed");
    let age = attributes.age_string.as_deref().unwrap_or("age unknown");
    println!("{name} - {breed}, {age}");

    let org = response.organization_for(animal).map(|org| &org.attributes);
    if let Some(org) = org {
        let place = org.citystate.as_deref().or(org.city.as_deref()).unwrap_or("");
        println!("  {} {}", org.name.as_deref().unwrap_or("Unknown organization"), place);
        if let Some(url) = org.url.as_deref() {
            println!("  Web:   {}", normalize_web_url(url));
        }
        if let Some(phone) = org.phone.as_deref() {
            println!("  Phone: {}", dial_uri(phone));
        }
    }

    if share {
        let adoption_url = org
            .and_then(|org| org.adoption_url.as_deref())
            .map(normalize_web_url);
        let listing = ShareListing {
            pet_name: Some(name.as_str()),
            pet_breed: attributes.breed_primary.as_deref(),
            picture_url: attributes.picture_thumbnail_url.as_deref(),
            ..ShareListing::new(adoption_url.as_deref())
        };
        match share_message(&listing) {
            Some(message) => println!("\n{message}\n"),
            None => println!("  (no adoption link to share)"),
        }
    }
}

async fn find(services: &BootstrappedServices, zip: &str) -> Result<()> {
    let response = services
        .find
        .get_pet_data(zip)
        .await
        .context("Listing fetch failed")?;

    for animal in response.data.iter().flatten() {
        let attributes = &animal.attributes;
        println!(
            "{} - {}, {}",
            format_pet_name(attributes.name.as_deref()),
            attributes.breed_primary.as_deref().unwrap_or("Unknown breed"),
            attributes.age_string.as_deref().unwrap_or("age unknown"),
        );
    }
    Ok(())
}

async fn theme(services: &BootstrappedServices, mode: Option<ThemeMode>) -> Result<()> {
    if let Some(mode) = mode {
        services
            .settings
            .set_dark_theme_enabled(matches!(mode, ThemeMode::On))
            .await;
    }
    let enabled = services.settings.state().dark_theme_enabled;
    println!("dark theme: {}", if enabled { "on" } else { "off" });
    Ok(())
}
