//! Riskscreen CLI - terminal front-end for disease risk screening

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use riskscreen::client::DEFAULT_BASE_URL;
use riskscreen::{
    field_key, Assessment, ClientConfig, DiseaseId, FieldValue, Mode, Outcome, PredictionClient,
    Session, Severity,
};

#[derive(Parser)]
#[command(name = "riskscreen")]
#[command(author, version, about = "Disease risk screening CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Scoring service base URL
    #[arg(long, env = "RISKSCREEN_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds (no timeout if omitted)
    #[arg(long)]
    timeout: Option<u64>,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one disease
    Predict {
        /// Disease name, e.g. "Heart Disease"
        #[arg(short, long)]
        disease: DiseaseId,

        /// Field value as FIELD=VALUE; repeatable. Missing fields are sent as 0.
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Screen every disease in one request
    Screen {
        /// Field value as "<Disease>-<Field>=VALUE"; repeatable
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List diseases and their input fields
    Diseases,
}

/// JSON output of a submission
#[derive(Serialize)]
struct Report<'a> {
    assessed_at: DateTime<Utc>,
    mode: Mode,
    results: Vec<&'a Assessment>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::INFO } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout,
        ..Default::default()
    };

    if cli.interactive {
        println!(
            "{}",
            format!("Riskscreen CLI v{}", env!("CARGO_PKG_VERSION"))
                .cyan()
                .bold()
        );
        println!();
        run_interactive(config)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Predict {
                disease,
                values,
                json,
            } => {
                let mut session = Session::new();
                session.set_selected_disease(Some(disease))?;
                apply_values(&mut session, &values)?;
                run_submission(&mut session, config, json)?;
            }
            Commands::Screen { values, json } => {
                let mut session = Session::new();
                session.set_mode(Mode::Multi);
                apply_values(&mut session, &values)?;
                run_submission(&mut session, config, json)?;
            }
            Commands::Diseases => list_diseases(),
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

/// Parse `KEY=VALUE`. Only the first `=` splits, keys may contain spaces.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn apply_values(session: &mut Session, values: &[(String, String)]) -> Result<()> {
    for (key, value) in values {
        session
            .set_field(key, value)
            .with_context(|| format!("Cannot set '{}'", key))?;
    }
    Ok(())
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Submit the session once and print the outcome.
fn run_submission(session: &mut Session, config: ClientConfig, json: bool) -> Result<()> {
    let rt = build_runtime()?;
    let client = PredictionClient::new(config).context("Failed to create HTTP client")?;

    let pb = (!json).then(|| spinner("Contacting scoring service..."));
    rt.block_on(session.submit(&client));
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(err) = session.error() {
        return Err(anyhow!(err.user_message()));
    }

    if let Some(outcome) = session.outcome() {
        if json {
            print_json(session.form().mode(), outcome)?;
        } else {
            render_outcome(outcome);
        }
    }
    Ok(())
}

fn print_json(mode: Mode, outcome: &Outcome) -> Result<()> {
    let results = match outcome {
        Outcome::Single(a) => vec![a],
        Outcome::Multi(list) => list.iter().collect(),
    };
    let report = Report {
        assessed_at: Utc::now(),
        mode,
        results,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn severity_colored(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::AtRisk => text.red().bold(),
        Severity::Clear => text.green().bold(),
        Severity::Indeterminate => text.yellow().bold(),
    }
}

fn render_assessment(a: &Assessment) {
    let title = match a.disease {
        Some(d) => format!("{} [{}]", d, a.severity),
        None => format!("Prediction [{}]", a.severity),
    };
    println!("{}", severity_colored(&title, a.severity));
    println!("  {:<16} {}", "Result:", a.message);
    println!("  {:<16} {}", "Confidence:", a.confidence_text);
    println!(
        "  {:<16} {}",
        "Raw Prob (Has):",
        a.raw_prob_text.as_str().dimmed()
    );
}

fn render_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Single(a) => render_assessment(a),
        Outcome::Multi(list) => {
            println!("{}", "Screening Results (Ranked by Risk)".yellow().bold());
            println!("{}", "-".repeat(50));
            for a in list {
                render_assessment(a);
            }
        }
    }
}

fn list_diseases() {
    for disease in DiseaseId::ALL {
        println!(
            "{} ({} fields)",
            disease.as_str().yellow().bold(),
            disease.fields().len()
        );
        for (i, f) in disease.fields().iter().enumerate() {
            println!("  {:>2}. {}", i + 1, f.name);
        }
    }
}

fn format_value(value: Option<FieldValue>) -> String {
    match value.and_then(|v| v.as_number()) {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Prompt for every field of one disease. Blank input is allowed.
fn enter_fields(session: &mut Session, disease: DiseaseId, theme: &ColorfulTheme) -> Result<()> {
    let mode = session.form().mode();
    println!(
        "{} {}",
        "Enter details for".green(),
        disease.as_str().bold()
    );
    println!("{}", "(leave blank to send 0)".dimmed());

    for f in disease.fields() {
        let key = field_key(mode, disease, f.name);
        let current = format_value(session.form().value(&key));
        let raw: String = Input::with_theme(theme)
            .with_prompt(f.name)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;

        session.set_field(&key, &raw)?;
        if !raw.trim().is_empty() && session.form().value(&key) == Some(FieldValue::Empty) {
            println!("{}", format!("'{}' is not a number, it will be sent as 0", raw).yellow());
        }
    }
    Ok(())
}

fn select_disease(theme: &ColorfulTheme, prompt: &str) -> Result<DiseaseId> {
    let names: Vec<&str> = DiseaseId::ALL.iter().map(|d| d.as_str()).collect();
    let idx = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&names)
        .default(0)
        .interact()?;
    Ok(DiseaseId::ALL[idx])
}

fn run_interactive(config: ClientConfig) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Choose 'Quit' to exit.\n");

    let theme = ColorfulTheme::default();
    let rt = build_runtime()?;
    let client = PredictionClient::new(config).context("Failed to create HTTP client")?;
    let mut session = Session::new();

    loop {
        let mode = session.form().mode();
        let header = match (mode, session.form().selected_disease()) {
            (Mode::Single, Some(d)) => format!("Single disease: {}", d),
            (Mode::Single, None) => "Single disease: none selected".to_string(),
            (Mode::Multi, _) => "Multi-screen (all diseases)".to_string(),
        };
        println!("{}", header.cyan());

        let submit_label = match mode {
            Mode::Single => "Predict",
            Mode::Multi => "Screen all",
        };
        let options = [
            "Switch mode",
            "Select disease / section",
            "Enter details",
            submit_label,
            "Clear",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(2)
            .interact()?;

        match selection {
            0 => {
                let next = match mode {
                    Mode::Single => Mode::Multi,
                    Mode::Multi => Mode::Single,
                };
                session.set_mode(next);
            }
            1 => {
                if mode == Mode::Single {
                    let disease = select_disease(&theme, "Select disease")?;
                    session.set_selected_disease(Some(disease))?;
                } else {
                    let disease = select_disease(&theme, "Section to fill in")?;
                    enter_fields(&mut session, disease, &theme)?;
                }
            }
            2 => match (mode, session.form().selected_disease()) {
                (Mode::Single, Some(d)) => enter_fields(&mut session, d, &theme)?,
                (Mode::Single, None) => println!("{}", "Select a disease first.".yellow()),
                (Mode::Multi, _) => {
                    for d in DiseaseId::ALL {
                        enter_fields(&mut session, d, &theme)?;
                    }
                }
            },
            3 => {
                let pb = spinner("Contacting scoring service...");
                rt.block_on(session.submit(&client));
                pb.finish_and_clear();

                println!();
                if let Some(err) = session.error() {
                    println!("{}", err.user_message().red());
                } else if let Some(outcome) = session.outcome() {
                    render_outcome(outcome);
                }
            }
            4 => {
                session.reset();
                println!("{}", "Form cleared.".green());
            }
            5 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
        println!();
    }

    Ok(())
}
