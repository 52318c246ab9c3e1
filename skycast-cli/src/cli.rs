use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};

use skycast_core::export;
use skycast_core::geocode;
use skycast_core::icons::DESTINATIONS;
use skycast_core::{Config, GeoData, HttpFetcher, ProviderId, Query, Session, Units};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Multi-provider weather reports with normalized icons")]
pub struct Cli {
    /// Verbose diagnostics on stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show weather for a city.
    Show {
        /// City name, optionally with a country suffix ("Berlin, DE").
        city: Vec<String>,

        /// Provider: "msn", "openmeteo" or "openweather".
        #[arg(short, long)]
        mode: Option<String>,

        /// API key (openweather only; overrides the configured key).
        #[arg(short, long)]
        apikey: Option<String>,

        /// Units: "metric" or "imperial".
        #[arg(short, long)]
        units: Option<String>,

        /// Language scheme, e.g. "de-de".
        #[arg(short, long)]
        scheme: Option<String>,

        /// Write the raw provider payload as JSON.
        #[arg(short = 'j', long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Write the reduced report as JSON.
        #[arg(short = 'r', long, value_name = "FILE")]
        reduced: Option<PathBuf>,

        /// Write the XML markup tree (msn mode only).
        #[arg(short = 'x', long, value_name = "FILE")]
        xml: Option<PathBuf>,

        /// Deprecated openweather city id, instead of a city name.
        #[arg(short = 'i', long, value_name = "CITYID")]
        id: Option<String>,

        /// No text output; the first matching city is used.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Configure a provider (API key, default selection).
    Configure {
        /// Provider short name, e.g. "openweather".
        provider: String,
    },

    /// Show iconcode descriptions and conversion rules.
    Codes,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Show { city, mode, apikey, units, scheme, json, reduced, xml, id, quiet } => {
                show(ShowArgs { city, mode, apikey, units, scheme, json, reduced, xml, id, quiet })
                    .await
            }
            Command::Configure { provider } => configure(&provider),
            Command::Codes => codes(),
        }
    }
}

struct ShowArgs {
    city: Vec<String>,
    mode: Option<String>,
    apikey: Option<String>,
    units: Option<String>,
    scheme: Option<String>,
    json: Option<PathBuf>,
    reduced: Option<PathBuf>,
    xml: Option<PathBuf>,
    id: Option<String>,
    quiet: bool,
}

async fn show(args: ShowArgs) -> Result<()> {
    let config = Config::load()?;

    let mode = match &args.mode {
        Some(mode) => ProviderId::try_from(mode.as_str())?,
        None => config.default_provider_id()?,
    };
    let api_key = args.apikey.or_else(|| config.provider_api_key(mode).map(str::to_string));
    let units = match &args.units {
        Some(units) => Units::try_from(units.as_str())?,
        None => config.default_units()?,
    };
    let scheme =
        args.scheme.unwrap_or_else(|| config.default_scheme().to_string()).to_lowercase();

    let cityname = args.city.join(" ").trim().to_string();
    if args.id.is_none() && cityname.len() < 3 {
        bail!("City name is missing or too short, please use at least 3 letters");
    }
    if args.id.is_some() && mode != ProviderId::OpenWeather {
        bail!("City ids are only supported in mode 'openweather'");
    }

    let fetcher = HttpFetcher::new();
    let geodata = match &args.id {
        Some(city_id) => {
            let key = api_key
                .as_deref()
                .ok_or_else(|| anyhow!("No API key configured for provider '{mode}'"))?;
            geocode::city_by_id(&fetcher, key, city_id).await?
        }
        None => {
            let matches =
                geocode::city_lookup(&fetcher, mode, api_key.as_deref(), &cityname, &scheme)
                    .await?;
            pick_city(matches, args.quiet)?
        }
    };
    if !args.quiet {
        println!(
            "Using city/area: {} [lon={}, lat={}]",
            geodata.name, geodata.longitude, geodata.latitude
        );
    }

    let mut session = Session::new();
    session.set_mode(mode, api_key.as_deref())?;
    let mut query = Query::new(geodata).with_units(units).with_scheme(scheme);
    if let Some(city_id) = args.id {
        query = query.with_city_id(city_id);
    }

    let report = session.start(&query).await?;
    if !args.quiet {
        print_report(&report);
    }

    if let Some(path) = &args.json {
        let payload = session.raw_payload().context("no raw payload available")?;
        export::write_raw_json(path, &payload)?;
        success(args.quiet, path);
    }
    if let Some(path) = &args.reduced {
        export::write_reduced_json(path, &report)?;
        success(args.quiet, path);
    }
    if let Some(path) = &args.xml {
        if mode != ProviderId::Msn {
            bail!("XML is only supported in mode 'msn'. File '{}' was not created", path.display());
        }
        let payload = session.raw_payload().context("no raw payload available")?;
        export::write_msn_xml(path, &payload, &query)?;
        success(args.quiet, path);
    }

    Ok(())
}

fn success(quiet: bool, path: &std::path::Path) {
    if !quiet {
        println!("File '{}' was successfully created.", path.display());
    }
}

fn pick_city(mut matches: Vec<GeoData>, quiet: bool) -> Result<GeoData> {
    if matches.len() == 1 || quiet {
        return matches
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No city found on the server. Try another wording."));
    }

    let labels: Vec<String> = matches
        .iter()
        .map(|city| format!("{} [lon={}, lat={}]", city.name, city.longitude, city.latitude))
        .collect();
    let picked = Select::new("Found the following cities/areas:", labels.clone())
        .prompt()
        .context("city selection aborted")?;
    let idx = labels.iter().position(|l| *l == picked).unwrap_or(0);
    Ok(matches.swap_remove(idx))
}

fn print_report(report: &skycast_core::ReducedReport) {
    let current = &report.current;
    println!("\n{} — {}", report.source, report.name);
    let mut now_line = format!(
        "  Now: {} {} (feels like {} {})",
        current.temp, report.tempunit, current.feels_like, report.tempunit
    );
    if let Some(text) = &current.text {
        now_line.push_str(&format!(", {text}"));
    }
    now_line.push_str(&format!(
        ", wind {} {} {}, humidity {} %",
        current.wind_speed, report.windunit, current.wind_dir_sign, current.humidity
    ));
    println!("{now_line}");

    for day in &report.forecast {
        println!(
            "  {}  {:>4}/{:<4} {}  {:>3} {}  {}",
            day.short_day,
            day.min_temp,
            day.max_temp,
            report.tempunit,
            day.precipitation,
            report.precunit,
            day.text.as_deref().unwrap_or_default()
        );
    }
}

fn configure(provider: &str) -> Result<()> {
    let provider = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if provider.requires_api_key() {
        let api_key = Text::new(&format!("API key for '{provider}':"))
            .prompt()
            .context("configuration aborted")?;
        if api_key.trim().is_empty() {
            bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(provider, api_key.trim().to_string());
    }
    config.set_default_provider(provider);
    config.save()?;

    println!("Provider '{provider}' configured and set as default.");
    Ok(())
}

fn codes() -> Result<()> {
    let sources: Vec<&str> = ProviderId::all().iter().map(|id| id.as_str()).collect();

    for vocab in sources.iter().chain(DESTINATIONS) {
        print!("\n{}", export::describe_table(vocab)?);
    }
    for source in &sources {
        for dest in DESTINATIONS {
            print!("\n{}", export::conversion_rules(source, dest)?);
        }
    }
    Ok(())
}
