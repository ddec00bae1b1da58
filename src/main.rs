use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use actix_multipart::form::MultipartFormConfig;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::info;

mod archive;
mod clf;
mod config;
mod coverage;
mod error;
mod geometry;
mod ingest;
mod kml;
mod layer;
mod model;
mod normalize;
mod points;
mod registry;
mod sector;
mod server;
mod style;

use crate::{
    config::Config, coverage::Converter, geometry::GeometryTable, points::PointStyle,
    style::Palette,
};

/// Turns cell dumps into coverage maps
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accept uploads over HTTP
    Serve { port: Option<u16> },
    /// Build a coverage map from a cell dump
    Coverage {
        /// Csv file, stdin if omitted
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the bare KML document instead of a KMZ archive
        #[arg(long)]
        kml: bool,
    },
    /// Build a map with one marker per row
    Points {
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "ff00ff00")]
        color: String,
        #[arg(long, default_value_t = 1.0)]
        size: f64,
        #[arg(long, default_value = "placemark_circle")]
        icon: String,
    },
    /// Convert a cell dump to CLF
    Clf {
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

fn write_output(path: Option<PathBuf>, name: &str, extension: &str, data: &[u8]) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(format!("{name}.{extension}")));
    fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}

fn converter(config: &Config) -> Result<Converter> {
    let table = GeometryTable::with_overrides(&config.geometry)?;
    Converter::new(table, Palette::default(), config.workers)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match config::locate(cli.config.as_deref()) {
        Some(path) => config::load(&path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Serve { port } => {
            let converter = web::Data::new(converter(&config)?);
            let port = port.unwrap_or(config.http_port);
            let limit = config.upload_limit;
            info!(
                "listening on port {port} with {} workers",
                converter.workers()
            );

            HttpServer::new(move || {
                App::new()
                    .app_data(converter.clone())
                    .app_data(web::PayloadConfig::new(limit))
                    .app_data(
                        MultipartFormConfig::default()
                            .total_limit(limit)
                            .memory_limit(limit),
                    )
                    .configure(server::routes)
            })
            .bind(("0.0.0.0", port))?
            .run()
            .await?;
        }

        Command::Coverage { input, output, kml } => {
            let data = read_input(input.as_deref())?;
            let converter = converter(&config)?;
            let name = coverage::coverage_name(Local::now());
            if kml {
                let map = converter.coverage_kml(&data, &name)?;
                write_output(output, &name, "kml", &map.kml)?;
            } else {
                let kmz = converter.coverage_kmz(&data, &name)?;
                write_output(output, &name, "kmz", &kmz)?;
            }
        }

        Command::Points {
            input,
            output,
            color,
            size,
            icon,
        } => {
            let data = read_input(input.as_deref())?;
            let style = PointStyle { color, size, icon };
            let name = points::points_name(Local::now());
            let kml = points::render(&data, &style, &name)?;
            let kmz = archive::kmz(archive::KML_ENTRY, &kml)?;
            write_output(output, &name, "kmz", &kmz)?;
        }

        Command::Clf { input, output } => {
            let data = read_input(input.as_deref())?;
            let name = clf::clf_name(Local::now());
            let text = clf::convert(&data)?;
            write_output(output, &name, "clf", text.as_bytes())?;
        }
    };

    Ok(())
}
