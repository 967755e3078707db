use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::domain::hash::RowMark;
use crate::form::{ROW_COUNTER_ATTRIBUTE, TRACK_HASH_ATTRIBUTE, TrackForm, scan::scan};
use crate::provider::{ProviderRegistry, fetch::UreqTransport};
use crate::widget::{FillReport, Widget};

#[derive(Parser)]
#[command(name = "playlister")]
#[command(version = "0.1")]
#[command(about = "Fill a station tracklist form from streaming service links")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Base URL of the metadata API, overrides the config file
    #[arg(long, env = "PLAYLISTER_API_BASE")]
    pub api_base: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill empty rows of a form snapshot with the tracks behind a URL
    Fill {
        /// Playlist, album or track URL
        url: String,
        /// Form snapshot JSON file
        #[arg(short, long)]
        form: PathBuf,
        /// Where to write the updated snapshot, defaults to the input file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show which provider and API endpoint a URL resolves to
    Resolve { url: String },
    /// List supported providers
    Providers,
    /// Show how the rows of a form snapshot are classified
    Scan {
        /// Form snapshot JSON file
        #[arg(short, long)]
        form: PathBuf,
    },
    /// Write a form snapshot with blank rows
    Init {
        /// Form snapshot JSON file to create
        #[arg(short, long)]
        form: PathBuf,
        /// Number of rows
        #[arg(short, long, default_value_t = 20)]
        rows: usize,
    },
    /// Run http server for page integrations
    Serve,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(api_base) = cli.api_base {
        cfg.api.base_url = api_base;
    }

    match cli.command {
        Commands::Fill { url, form, output } => {
            let widget = build_widget(&cfg);
            let output = output.unwrap_or_else(|| form.clone());
            let report = fill_file(&widget, &url, &form, &output)?;
            println!("{}", report.message);
        }

        Commands::Resolve { url } => {
            let registry = ProviderRegistry::default();
            match registry.resolve(url.trim()) {
                Some(handle) => {
                    println!("Provider: {}", handle.provider);
                    println!("Kind: {}", handle.kind);
                    println!("Id: {}", handle.id);
                    println!("API: {}", handle.api_url(&cfg.api.base_url));
                }
                None => bail!("{}", crate::feedback::UNSUPPORTED_URL),
            }
        }

        Commands::Providers => {
            for provider in ProviderRegistry::default().providers() {
                let kinds: Vec<String> = provider
                    .supported_kinds()
                    .iter()
                    .map(|kind| kind.to_string())
                    .collect();
                println!("{} ({})", provider.identifier(), kinds.join(", "));
            }
        }

        Commands::Scan { form } => {
            let mut snapshot = TrackForm::load(&form)
                .with_context(|| format!("Failed to load form {}", form.to_string_lossy()))?;
            let index = scan(&mut snapshot, &cfg.form.field_names());

            for row in &snapshot.rows {
                let (Some(mark), Some(counter)) = (
                    row.attribute(TRACK_HASH_ATTRIBUTE),
                    row.attribute(ROW_COUNTER_ATTRIBUTE),
                ) else {
                    continue;
                };
                match RowMark::from_attribute(mark) {
                    RowMark::Empty => println!("  row {counter}: empty"),
                    RowMark::Track(token) => match token.decode() {
                        Ok(fields) => println!(
                            "  row {counter}: {} - {} ({})",
                            fields.artist, fields.title, fields.album
                        ),
                        Err(_) => println!("  row {counter}: {token}"),
                    },
                }
            }
            println!(
                "{} rows, {} empty",
                index.row_count(),
                index.empty_count()
            );
        }

        Commands::Init { form, rows } => {
            if form.exists() {
                bail!("{} already exists", form.to_string_lossy());
            }
            TrackForm::blank(&cfg.form.field_names(), rows)
                .save(&form)
                .with_context(|| format!("Failed to write form {}", form.to_string_lossy()))?;
            println!("Wrote {rows} blank rows to {}", form.to_string_lossy());
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let http_server =
                crate::http::server::HttpServer::new(build_widget(&cfg), cfg.http.clone());

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }
    Ok(())
}

fn build_widget(cfg: &config::Config) -> Widget {
    Widget::new(
        ProviderRegistry::default(),
        Box::new(UreqTransport::new(&cfg.api)),
        &cfg.api.base_url,
        cfg.form.field_names(),
    )
}

/// Loads a snapshot, runs one submission on it and saves the result.
///
/// Nothing is written when the submission fails.
fn fill_file(widget: &Widget, url: &str, form: &Path, output: &Path) -> anyhow::Result<FillReport> {
    let mut snapshot = TrackForm::load(form)
        .with_context(|| format!("Failed to load form {}", form.to_string_lossy()))?;

    let report = match widget.process_input(url, &mut snapshot) {
        Ok(report) => report,
        Err(err) => {
            log::error!("{err}");
            bail!("{}", err.user_message());
        }
    };

    snapshot
        .save(output)
        .with_context(|| format!("Failed to write form {}", output.to_string_lossy()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{form::FieldNames, provider::fetch::testing::FakeTransport};
    use tempfile::tempdir;

    fn widget(transport: FakeTransport) -> Widget {
        Widget::new(
            ProviderRegistry::default(),
            Box::new(transport),
            "http://api.test",
            FieldNames::default(),
        )
    }

    #[test]
    fn fill_file_writes_updated_snapshot() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("form.json");
        let output = dir.path().join("filled.json");
        TrackForm::blank(&FieldNames::default(), 2).save(&input)?;
        let widget = widget(FakeTransport::default().with_body(
            "http://api.test/spotify/track/abc123",
            r#"{"artist":"A","track":"T","album":"Alb","isNew":false,"isSingle":true}"#,
        ));

        let report = fill_file(&widget, "https://open.spotify.com/track/abc123", &input, &output)?;

        assert_eq!(report.counts.success, 1);
        let filled = TrackForm::load(&output)?;
        assert_eq!(
            filled.read_fields(&FieldNames::default(), 0).map(|f| f.album),
            Some("Single".to_string())
        );
        Ok(())
    }

    #[test]
    fn failed_fill_writes_nothing() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("form.json");
        let output = dir.path().join("filled.json");
        TrackForm::blank(&FieldNames::default(), 2).save(&input)?;
        let widget = widget(FakeTransport::default());

        let err = fill_file(&widget, "https://open.spotify.com/album/gone", &input, &output)
            .unwrap_err();

        assert_eq!(err.to_string(), crate::feedback::ERROR_NOTIFICATION);
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn cli_parses_fill_command() {
        let cli = Cli::parse_from([
            "playlister",
            "--api-base",
            "http://other:9000",
            "fill",
            "https://open.spotify.com/track/abc123",
            "--form",
            "form.json",
        ]);

        assert_eq!(cli.api_base.as_deref(), Some("http://other:9000"));
        assert!(matches!(
            cli.command,
            Commands::Fill { ref form, output: None, .. } if form == Path::new("form.json")
        ));
    }
}
