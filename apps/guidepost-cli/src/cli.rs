use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use guidepost_config::{load_or_default, load_scenario_config, CONFIG_FILE_NAME};
use guidepost_core::navigation;
use guidepost_core::session::DisplaySurface;
use guidepost_core::types::{StepId, TerminalId};
use guidepost_render::{
    render_step, send_text_uri, wrap_page, FileStepSource, MarkdownPresenter, StepSource,
    RELOAD_PAGE_COMMAND,
};
use guidepost_runtime::{
    CommandRegistry, HtmlFileDisplay, NullDisplay, RecordingTerminal, SessionBuilder,
    ShellTerminal,
};

#[derive(Debug, Parser)]
#[command(name = "guidepost", about = "Guidepost scenario runner")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a scenario step and run its on-load commands
    Run(RunArgs),
    /// Render one step to HTML
    Render(RenderArgs),
    /// Validate a scenario's configuration
    Check(CheckArgs),
}

#[derive(Debug, Args, Clone)]
struct RunArgs {
    /// Scenario directory (markdown steps plus optional guidepost.json)
    #[arg(long, default_value = ".")]
    scenario: PathBuf,
    /// Step to load
    #[arg(long, default_value = "intro")]
    step: String,
    /// Send commands to a real child shell instead of recording them
    #[arg(long)]
    shell: bool,
    /// Trigger the Nth executable block after loading (repeatable)
    #[arg(long = "click", value_name = "INDEX")]
    clicks: Vec<usize>,
    /// Reload the step after loading it
    #[arg(long)]
    reload: bool,
    /// Write the rendered page to this file
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Args, Clone)]
struct RenderArgs {
    #[arg(long, default_value = ".")]
    scenario: PathBuf,
    #[arg(long)]
    step: String,
    /// Write the page here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct CheckArgs {
    #[arg(long, default_value = ".")]
    scenario: PathBuf,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run(args) => {
                init_tracing(args.verbose);
                run_scenario(args).await
            }
            Command::Render(args) => {
                init_tracing(false);
                render_one(args).await
            }
            Command::Check(args) => {
                init_tracing(false);
                check(args)
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", if verbose { "debug" } else { "info" });
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

async fn run_scenario(args: RunArgs) -> anyhow::Result<()> {
    let config = load_or_default(&args.scenario)
        .with_context(|| format!("loading scenario at {}", args.scenario.display()))?;

    let display: Arc<dyn DisplaySurface> = match &args.out {
        Some(path) => Arc::new(HtmlFileDisplay::new(path)),
        None => Arc::new(NullDisplay),
    };
    let presenter = Arc::new(MarkdownPresenter::new(
        Arc::new(FileStepSource::new(&args.scenario)),
        display.clone(),
    ));

    let mut builder = SessionBuilder::new(config.clone())
        .presenter(presenter)
        .display(display);

    let mut recorders: Vec<(TerminalId, Arc<RecordingTerminal>)> = Vec::new();
    for spec in &config.layout.terminals {
        if args.shell {
            let terminal = ShellTerminal::spawn("sh")
                .with_context(|| format!("spawning shell for terminal '{}'", spec.id))?;
            builder = builder.terminal(spec.id.as_str(), Arc::new(terminal));
        } else {
            let terminal = Arc::new(RecordingTerminal::new());
            recorders.push((TerminalId::from(spec.id.as_str()), terminal.clone()));
            builder = builder.terminal(spec.id.as_str(), terminal);
        }
    }

    let session = builder.build()?;
    let step = StepId::from(args.step.as_str());
    navigation::load_step(&step, &session).await?;
    tracing::info!(step = %step, "step loaded");

    let registry = CommandRegistry::with_builtins();
    if !args.clicks.is_empty() {
        // Re-render to recover the clickable block payloads, then route
        // each requested click through the command registry like a real
        // action trigger would.
        let markdown = FileStepSource::new(&args.scenario).load(&step).await?;
        let rendered = render_step(&step, &markdown);
        for index in &args.clicks {
            match rendered.blocks.get(*index) {
                Some(block) => {
                    registry
                        .dispatch_uri(&send_text_uri(block), &session)
                        .await?;
                }
                None => tracing::warn!(index = *index, "no such code block on this step"),
            }
        }
    }
    if args.reload {
        registry
            .invoke(RELOAD_PAGE_COMMAND, serde_json::Value::Null, &session)
            .await?;
    }

    for (id, terminal) in &recorders {
        let transcript = terminal.transcript();
        if transcript.is_empty() {
            println!("[{}] (no commands)", id);
        } else {
            for line in transcript {
                println!("[{}] {}", id, line);
            }
        }
    }
    Ok(())
}

async fn render_one(args: RenderArgs) -> anyhow::Result<()> {
    let source = FileStepSource::new(&args.scenario);
    let step = StepId::from(args.step.as_str());
    let markdown = source
        .load(&step)
        .await
        .with_context(|| format!("loading step '{}'", step))?;

    let rendered = render_step(&step, &markdown);
    let page = wrap_page(&rendered.html);
    match args.out {
        Some(path) => {
            tokio::fs::write(&path, page)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => println!("{}", page),
    }
    Ok(())
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    let path = args.scenario.join(CONFIG_FILE_NAME);
    if path.is_file() {
        let config = load_scenario_config(&path)?;
        println!(
            "{}: ok ({} terminal(s), {} step(s) with on-load commands)",
            path.display(),
            config.layout.terminals.len(),
            config.navigation.on_load_commands.len()
        );
    } else {
        println!("{}: not found, defaults apply", path.display());
    }
    Ok(())
}
