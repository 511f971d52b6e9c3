use anyhow::Context;
use clap::Parser;
use inhibitor::config::Config;
use inhibitor::Tags;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::PathBuf;

/// Command-line arguments for the inhibition query tool
#[derive(Parser, Debug)]
#[command(
    name = "inhibitor",
    about = "Check whether an alert is suppressed by the configured inhibition rules",
    long_about = "Loads inhibition rules from a TOML rule file into an in-memory registry \
                  and reports whether the given alert name and tag set are currently inhibited."
)]
struct Cli {
    /// Path to the rule file
    #[arg(short, long, value_name = "FILE", help = "Inhibition rule file (TOML format)")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    /// Print the verdict as JSON
    #[arg(long)]
    json: bool,

    /// Tags attached to the alert
    #[arg(
        short,
        long = "tag",
        value_name = "KEY=VALUE",
        value_parser = parse_tag,
        help = "Alert tag, may be repeated"
    )]
    tags: Vec<(String, String)>,

    /// Alert name to check
    name: String,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Alert name must not be empty".to_string());
        }

        if let Some(ref config_path) = self.config {
            if config_path.exists() && !config_path.is_file() {
                return Err(format!(
                    "Configuration path is not a file: {}",
                    config_path.display()
                ));
            }

            if let Some(extension) = config_path.extension() {
                if extension != "toml" {
                    warn!(
                        "Rule file does not have .toml extension: {}",
                        config_path.display()
                    );
                }
            }
        }

        Ok(())
    }

    /// Collect the repeated `--tag` arguments into a tag set; later values win
    fn tag_set(&self) -> Tags {
        self.tags.iter().cloned().collect()
    }
}

/// Parse a `key=value` tag argument
///
/// The value may be empty or contain further `=` characters; the key may not be empty.
fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("Tag '{}' has an empty key", raw)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("Tag '{}' must have the form KEY=VALUE", raw)),
    }
}

/// Verdict printed with `--json`
#[derive(Debug, Serialize)]
struct Verdict<'a> {
    name: &'a str,
    tags: &'a Tags,
    inhibited: bool,
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load inhibition rules")?;
    let (registry, rules) = config.build_registry();
    debug!(
        "Registry seeded with {} rule(s), {} active",
        rules.len(),
        rules.iter().filter(|rule| rule.is_active()).count()
    );

    let tags = cli.tag_set();
    let inhibited = registry.is_inhibited(&cli.name, &tags);
    info!("Alert '{}' inhibited: {}", cli.name, inhibited);

    if cli.json {
        let verdict = Verdict {
            name: &cli.name,
            tags: &tags,
            inhibited,
        };
        println!(
            "{}",
            serde_json::to_string(&verdict).context("Failed to encode verdict")?
        );
    } else if inhibited {
        println!("inhibited");
    } else {
        println!("not inhibited");
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
