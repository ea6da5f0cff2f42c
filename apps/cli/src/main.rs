use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing_subscriber::EnvFilter;

use scriptalchemy_core::{
    HttpLlmClient, OutputLanguage, Provider, convert_freeform, format_analysis_readable,
    format_template_readable,
};

use crate::{
    queue::{QueueEvent, generate_template, process_queue},
    store::{ProcessingStatus, ScriptFile, Settings, Store, default_store_dir},
};

mod queue;
mod store;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliProvider {
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliLanguage {
    En,
    Vi,
}

impl From<CliLanguage> for OutputLanguage {
    fn from(cli: CliLanguage) -> Self {
        match cli {
            CliLanguage::En => OutputLanguage::En,
            CliLanguage::Vi => OutputLanguage::Vi,
        }
    }
}

#[derive(Parser)]
#[command(name = "scriptalchemy")]
#[command(
    about = "Analyze video script transcripts with AI and synthesize a master template"
)]
struct Cli {
    /// Directory holding queued files, the last template and settings
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Settings that can be overridden for a single run or saved with `config`
#[derive(Args, Default)]
struct SettingsArgs {
    /// AI provider
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Model name (defaults to the provider's model)
    #[arg(short, long)]
    model: Option<String>,

    /// Output language for analyses and templates
    #[arg(short, long)]
    lang: Option<CliLanguage>,

    /// Only analyze the first N minutes (0 = whole transcript)
    #[arg(long)]
    limit: Option<u32>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.provider.is_none() && self.model.is_none() && self.lang.is_none() && self.limit.is_none()
    }

    /// Layer the flags over `base`. Switching provider without naming a model
    /// falls back to the new provider's default model.
    fn apply(&self, base: &Settings) -> Settings {
        let mut settings = base.clone();
        if let Some(provider) = self.provider {
            let provider = Provider::from(provider);
            if provider != settings.provider {
                settings.model = None;
            }
            settings.provider = provider;
        }
        if let Some(model) = &self.model {
            let model = model.trim();
            settings.model = (!model.is_empty()).then(|| model.to_string());
        }
        if let Some(lang) = self.lang {
            settings.output_language = lang.into();
        }
        if let Some(limit) = self.limit {
            settings.analysis_limit = limit;
        }
        settings
    }
}

#[derive(Subcommand)]
enum Command {
    /// Parse transcript files and queue them for analysis
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Convert a freeform "[m:ss]" transcript to indexed subtitle text on stdout
    Convert { path: PathBuf },
    /// List queued and analyzed files
    List,
    /// Print the analysis of a file (defaults to the active file)
    Show { id: Option<String> },
    /// Remove a file
    Remove { id: String },
    /// Analyze every queued file
    Analyze {
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Queue a failed file again
    Retry { id: String },
    /// Build a master template from all completed analyses
    Template {
        /// Discard the saved template
        #[arg(long, conflicts_with = "show")]
        clear: bool,

        /// Print the saved template without regenerating it
        #[arg(long)]
        show: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Show or change saved settings
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn short_id(file: &ScriptFile) -> String {
    file.id.to_string()[..8].to_string()
}

fn resolve(store: &Store, query: &str) -> Result<uuid::Uuid> {
    match store.resolve(query) {
        Some(id) => Ok(id),
        None => bail!("no single file matches id '{query}'"),
    }
}

fn client_for(settings: &Settings) -> HttpLlmClient {
    match HttpLlmClient::new(settings.provider) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn add_files(store: &mut Store, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;

        match store.add_file(filename.clone(), content) {
            Ok(file) => println!(
                "{} Queued {} {}",
                style("✓").green().bold(),
                filename,
                style(format!("({} segments)", file.parsed_segments.len())).dim()
            ),
            Err(e) => println!("{} {}: {}", style("✗").red().bold(), filename, e),
        }
    }
    store.save().await
}

async fn convert(path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    match convert_freeform(&raw) {
        Some(converted) => {
            print!("{converted}");
            Ok(())
        }
        None => bail!("no timestamp markers like [0:00] found in {}", path.display()),
    }
}

fn list(store: &Store) {
    if store.files.is_empty() {
        println!("{}", style("No files. Add some with `scriptalchemy add`.").dim());
        return;
    }

    for file in &store.files {
        let marker = if store.active_id == Some(file.id) { "*" } else { " " };
        let status = match file.status {
            ProcessingStatus::Completed => style(file.status.as_str()).green(),
            ProcessingStatus::Error => style(file.status.as_str()).red(),
            ProcessingStatus::Processing => style(file.status.as_str()).yellow(),
            ProcessingStatus::Queued => style(file.status.as_str()).dim(),
        };
        let detail = file
            .error
            .as_deref()
            .or(file.processing_progress.as_deref())
            .unwrap_or_default();
        println!(
            "{} {}  {:<10}  {}  {} {}",
            marker,
            style(short_id(file)).cyan(),
            status,
            file.filename,
            style(format!("({} segments)", file.parsed_segments.len())).dim(),
            style(detail).dim()
        );
    }
}

async fn show(store: &mut Store, id: Option<&str>) -> Result<()> {
    if let Some(query) = id {
        let id = resolve(store, query)?;
        store.set_active(id);
        store.save().await?;
    }
    let Some(file) = store.active_file() else {
        bail!("no active file, pass an id");
    };

    println!(
        "\n{}  {}\n",
        style(&file.filename).cyan().bold(),
        style(file.status.as_str()).dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    match (&file.analysis, file.status) {
        (Some(analysis), ProcessingStatus::Completed) => {
            println!("{}", format_analysis_readable(analysis));
        }
        (_, ProcessingStatus::Error) => {
            println!(
                "{} {}",
                style("Error:").red().bold(),
                file.error.as_deref().unwrap_or("AI processing failed")
            );
        }
        _ => println!(
            "{}",
            style("Not analyzed yet. Run `scriptalchemy analyze`.").dim()
        ),
    }
    Ok(())
}

async fn remove(store: &mut Store, query: &str) -> Result<()> {
    let id = resolve(store, query)?;
    if let Some(file) = store.remove_file(id) {
        store.save().await?;
        println!("{} Removed {}", style("✓").green().bold(), file.filename);
    }
    Ok(())
}

async fn analyze(store: &mut Store, args: &SettingsArgs) -> Result<()> {
    if store.next_queued().is_none() {
        println!("{}", style("Nothing queued.").dim());
        return Ok(());
    }

    let settings = args.apply(&store.settings);
    let client = client_for(&settings);
    let config = settings.analysis_config();

    println!(
        "\n{}  {}\n",
        style("scriptalchemy").cyan().bold(),
        style(format!(
            "{} · {} · {}",
            settings.provider.name(),
            config.model,
            config.language.display_name()
        ))
        .dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let mut step_start = Instant::now();
    let mut spinner: Option<ProgressBar> = None;

    let summary = process_queue(store, &client, &config, |event| match event {
        QueueEvent::Started { filename } => {
            step_start = Instant::now();
            spinner = Some(create_spinner(&format!("{filename}: Initializing...")));
        }
        QueueEvent::Progress { filename, message } => {
            if let Some(pb) = &spinner {
                pb.set_message(format!("{filename}: {message}"));
            }
        }
        QueueEvent::Completed { filename, analysis } => {
            if let Some(pb) = spinner.take() {
                pb.finish_with_message(format!(
                    "{} {} {} {}",
                    style("✓").green().bold(),
                    filename,
                    style(format!(
                        "pacing {}/100, hook {}/100",
                        analysis.pacing_score, analysis.hook_score
                    ))
                    .yellow(),
                    style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
                ));
            }
        }
        QueueEvent::Failed { filename, error } => {
            if let Some(pb) = spinner.take() {
                pb.finish_with_message(format!(
                    "{} {}: {}",
                    style("✗").red().bold(),
                    filename,
                    error
                ));
            }
        }
    })
    .await?;

    println!(
        "\n{} {} completed, {} failed in {}\n",
        style("Done:").dim(),
        style(summary.completed).green().bold(),
        style(summary.failed).red().bold(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    Ok(())
}

async fn retry(store: &mut Store, query: &str) -> Result<()> {
    let id = resolve(store, query)?;
    if !store.retry(id) {
        bail!("only files in the error state can be retried");
    }
    store.save().await?;
    println!(
        "{} Queued again. Run `scriptalchemy analyze`.",
        style("✓").green().bold()
    );
    Ok(())
}

async fn template(store: &mut Store, clear: bool, show: bool, args: &SettingsArgs) -> Result<()> {
    if clear {
        if store.clear_template() {
            store.save().await?;
        }
        println!("{} Template cleared", style("✓").green().bold());
        return Ok(());
    }

    if show {
        match &store.template {
            Some(template) => println!("{}", format_template_readable(template)),
            None => println!("{}", style("No saved template.").dim()),
        }
        return Ok(());
    }

    let count = store.completed_analyses().len();
    if count == 0 {
        println!(
            "{}",
            style("No completed analyses to aggregate. Run `scriptalchemy analyze` first.").dim()
        );
        return Ok(());
    }

    let settings = args.apply(&store.settings);
    let client = client_for(&settings);
    let model = settings.effective_model();

    let step_start = Instant::now();
    let spinner = create_spinner(&format!(
        "Synthesizing master template from {count} scripts with {}...",
        settings.provider.name()
    ));
    let result = generate_template(store, &client, &model, settings.output_language).await;
    spinner.finish_and_clear();

    let Some(template) = result? else {
        return Ok(());
    };
    println!(
        "{} Template generated {}",
        style("✓").green().bold(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_template_readable(&template));
    Ok(())
}

async fn config(store: &mut Store, args: &SettingsArgs) -> Result<()> {
    if !args.is_empty() {
        store.settings = args.apply(&store.settings);
        store.save().await?;
        println!("{} Settings saved", style("✓").green().bold());
    }

    let settings = &store.settings;
    let limit = match settings.analysis_limit {
        0 => "whole transcript".to_string(),
        n => format!("first {n} minutes"),
    };
    println!("{} {}", style("Provider:").dim(), settings.provider.name());
    println!("{} {}", style("Model:   ").dim(), settings.effective_model());
    println!(
        "{} {}",
        style("Language:").dim(),
        settings.output_language.display_name()
    );
    println!("{} {}", style("Limit:   ").dim(), limit);
    println!("{} {}", style("Store:   ").dim(), store.root().display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let root = cli.store_dir.unwrap_or_else(default_store_dir);
    let mut store = Store::open(root).await?;

    match cli.command {
        Command::Add { paths } => add_files(&mut store, &paths).await,
        Command::Convert { path } => convert(&path).await,
        Command::List => {
            list(&store);
            Ok(())
        }
        Command::Show { id } => show(&mut store, id.as_deref()).await,
        Command::Remove { id } => remove(&mut store, &id).await,
        Command::Analyze { settings } => analyze(&mut store, &settings).await,
        Command::Retry { id } => retry(&mut store, &id).await,
        Command::Template {
            clear,
            show,
            settings,
        } => template(&mut store, clear, show, &settings).await,
        Command::Config { settings } => config(&mut store, &settings).await,
    }
}
