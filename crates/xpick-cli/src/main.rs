//! xpick: pick a node in an HTML file, get ranked XPath selectors

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use xpick_engine::{CandidatePath, DynamicClassifier, EngineConfig, SelectorGenerator};
use xpick_html::{Document, HtmlParser};

#[derive(Parser)]
#[command(name = "xpick")]
#[command(about = "Stable XPath selector synthesis", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank selectors for the first node an XPath locator finds
    Pick {
        /// HTML file
        file: PathBuf,

        /// XPath locating the target node
        locator: String,

        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Show at most this many candidates
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print how many nodes an expression matches
    Test {
        file: PathBuf,
        expression: String,
    },

    /// Report which values the dynamic-value classifier rejects
    Classify {
        #[arg(required = true)]
        values: Vec<String>,

        /// TOML engine configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Pick {
            file,
            locator,
            config,
            json,
            limit,
        } => pick(&file, &locator, config.as_deref(), json, limit),
        Command::Test { file, expression } => test(&file, &expression),
        Command::Classify { values, config } => classify(&values, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let html = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let url = format!("file://{}", path.display());
    let doc = HtmlParser::new()
        .parse_with_url(&html, &url)
        .with_context(|| format!("parsing {}", path.display()))?;
    debug!("parsed {} ({} nodes)", doc.url(), doc.tree().len());
    Ok(doc)
}

fn pick(file: &Path, locator: &str, config: Option<&Path>, json: bool, limit: Option<usize>) -> Result<()> {
    let config = load_config(config)?;
    let doc = load_document(file)?;
    let matches = xpick_xpath::evaluate(&doc, locator).with_context(|| format!("evaluating locator {}", locator))?;
    let Some(&target) = matches.first() else {
        bail!("locator {} matches nothing in {}", locator, file.display());
    };
    if matches.len() > 1 {
        info!("locator matches {} nodes, using the first", matches.len());
    }

    let mut generator = SelectorGenerator::new(&config).context("invalid engine configuration")?;
    let mut candidates = generator.generate(&doc, target);
    if candidates.is_empty() {
        bail!("no selector survived validation");
    }
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else {
        print_table(&candidates);
    }
    Ok(())
}

fn print_table(candidates: &[CandidatePath]) {
    println!("{:<5} {:>5}  {:<22} EXPRESSION", "CONF", "COUNT", "STRATEGY");
    for c in candidates {
        println!("{:<5.2} {:>5}  {:<22} {}", c.confidence, c.match_count, c.strategy, c.expression);
        if let Some(warning) = &c.warning {
            println!("{:<35}! {}", "", warning);
        }
    }
}

fn test(file: &Path, expression: &str) -> Result<()> {
    let doc = load_document(file)?;
    let count = xpick_xpath::count(&doc, expression).with_context(|| format!("evaluating {}", expression))?;
    println!("{}", count);
    Ok(())
}

fn classify(values: &[String], config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let classifier = DynamicClassifier::new(&config.dynamic_patterns).context("invalid dynamic patterns")?;
    for value in values {
        let verdict = match (
            classifier.is_dynamic_value(value),
            classifier.contains_dynamic_content(value),
        ) {
            (true, true) => "dynamic value, dynamic content",
            (true, false) => "dynamic value",
            (false, true) => "dynamic content",
            (false, false) => "stable",
        };
        println!("{:?}: {}", value, verdict);
    }
    Ok(())
}
