use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use adsage_contracts::analysis::{Audience, Platform};
use adsage_contracts::session::{SessionContext, SessionStore, DEFAULT_TTL_SECS};
use adsage_engine::capture::{CaptureController, CaptureError, ImageUpload};
use adsage_engine::follow_up::ButtonState;
use adsage_engine::orchestrator::Phase;
use adsage_engine::presenter::{Cue, Presenter, View, ViewEvent};
use adsage_engine::projector::{DashboardState, StrategyColumn, SummaryBlock};
use adsage_engine::transport::{self, ClientConfig, HttpTransport, DEFAULT_API_BASE};
use adsage_engine::DashboardController;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

const EXIT_OK: i32 = 0;
const EXIT_FAILED: i32 = 1;
const EXIT_REFUSED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "adsage", version, about = "Ad creative analysis client")]
struct Cli {
    #[arg(long, global = true, env = "ADSAGE_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
    #[arg(long, global = true, env = "ADSAGE_STORE", default_value = ".adsage/session.json")]
    store: PathBuf,
    #[arg(long, global = true, default_value_t = DEFAULT_TTL_SECS)]
    ttl_secs: i64,
    /// Skip the loader fade and bar animation delays.
    #[arg(long, global = true)]
    no_animate: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture input and hand it to the dashboard.
    #[command(subcommand)]
    Capture(CaptureInput),
    /// Analyze the captured input and show the results.
    Dashboard(DashboardArgs),
    /// Capture and analyze in one go.
    Run(RunArgs),
    /// Check that the analysis service is up.
    Health,
}

#[derive(Debug, Clone, Subcommand)]
enum CaptureInput {
    /// Analyze a published post by URL.
    Post(PostArgs),
    /// Predict the reception of an image and caption.
    Pre(PreArgs),
}

#[derive(Debug, Clone, Parser)]
struct PostArgs {
    /// Prompted for on stdin when omitted.
    #[arg(long)]
    url: Option<String>,
}

#[derive(Debug, Clone, Parser)]
struct PreArgs {
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value = "")]
    text: String,
    #[arg(long, value_enum, default_value_t = PlatformArg::Linkedin)]
    platform: PlatformArg,
    #[arg(long, value_enum, default_value_t = AudienceArg::All)]
    target: AudienceArg,
}

#[derive(Debug, Parser)]
struct DashboardArgs {
    /// Apply the suggestions once results are shown.
    #[arg(long)]
    apply: bool,
}

#[derive(Debug, Parser)]
struct RunArgs {
    #[arg(long)]
    apply: bool,
    #[command(subcommand)]
    input: CaptureInput,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Linkedin,
    Instagram,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Linkedin => Platform::LinkedIn,
            PlatformArg::Instagram => Platform::Instagram,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AudienceArg {
    All,
    Youth,
    Adult,
}

impl From<AudienceArg> for Audience {
    fn from(value: AudienceArg) -> Self {
        match value {
            AudienceArg::All => Audience::All,
            AudienceArg::Youth => Audience::Youth,
            AudienceArg::Adult => Audience::Adult,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("adsage error: {err:#}");
            std::process::exit(EXIT_FAILED);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let store = SessionStore::new(&cli.store).with_ttl(chrono::Duration::seconds(cli.ttl_secs));
    let mut presenter = TerminalPresenter::new(!cli.no_animate);
    match &cli.command {
        Command::Capture(input) => {
            match capture(&store, input, &mut presenter)? {
                Some((view, _)) => {
                    println!("Saved. Next view: {}", view_name(view));
                    Ok(EXIT_OK)
                }
                None => Ok(EXIT_REFUSED),
            }
        }
        Command::Dashboard(args) => {
            let context = store
                .take_context()
                .with_context(|| format!("failed reading {}", store.path().display()))?;
            run_dashboard(&cli, context, args.apply, &mut presenter)
        }
        Command::Run(args) => match capture(&store, &args.input, &mut presenter)? {
            // Drop the stored copy; a later `dashboard` must not replay it.
            Some((_, context)) => {
                store.take_context()?;
                run_dashboard(&cli, context, args.apply, &mut presenter)
            }
            None => Ok(EXIT_REFUSED),
        },
        Command::Health => {
            let transport = HttpTransport::new(ClientConfig::new(&cli.api_base))?;
            println!("{}", transport::health(&transport)?);
            Ok(EXIT_OK)
        }
    }
}

/// Runs the capture view. `None` means the input was refused and a cue shown.
fn capture(
    store: &SessionStore,
    input: &CaptureInput,
    presenter: &mut TerminalPresenter,
) -> Result<Option<(View, SessionContext)>> {
    let controller = CaptureController::new(store.clone());
    let submitted = match input {
        CaptureInput::Post(args) => {
            let url = match &args.url {
                Some(url) => url.clone(),
                None => prompt_line("Post URL: ")?,
            };
            controller.submit_post(&url)
        }
        CaptureInput::Pre(args) => {
            let upload = match args.image.as_deref().map(ImageUpload::from_path).transpose() {
                Ok(upload) => upload,
                Err(err) => return refuse(err, presenter),
            };
            controller.submit_pre(
                upload.as_ref(),
                &args.text,
                args.platform.into(),
                args.target.into(),
            )
        }
    };
    match submitted {
        Ok(handoff) => Ok(Some(handoff)),
        Err(err) => refuse(err, presenter),
    }
}

fn refuse(err: CaptureError, presenter: &mut TerminalPresenter) -> Result<Option<(View, SessionContext)>> {
    log::info!("capture refused: {err}");
    presenter.show(ViewEvent::Cue(err.cue()));
    Ok(None)
}

/// Enter submits; the trailing newline is dropped before validation trims.
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn run_dashboard(
    cli: &Cli,
    context: SessionContext,
    apply: bool,
    presenter: &mut TerminalPresenter,
) -> Result<i32> {
    let transport = HttpTransport::new(ClientConfig::new(&cli.api_base))?;
    let mut controller = DashboardController::new(transport, context);
    match controller.load(presenter)? {
        Phase::Error(_) => return Ok(EXIT_FAILED),
        Phase::Success(outcome) if outcome.strategy.is_none() => {
            println!("(no analysis data returned)");
        }
        _ => {}
    }
    if apply {
        controller.apply_suggestions(presenter)?;
    }
    Ok(EXIT_OK)
}

fn view_name(view: View) -> &'static str {
    match view {
        View::Capture => "capture",
        View::Dashboard => "dashboard (run `adsage dashboard`)",
    }
}

struct TerminalPresenter {
    animate: bool,
}

impl TerminalPresenter {
    fn new(animate: bool) -> Self {
        Self { animate }
    }

    fn pause(&self, duration: Duration) {
        if self.animate {
            thread::sleep(duration);
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Loading { mode } => println!("Analyzing ({mode})..."),
            ViewEvent::LoaderFadeOut { duration } => self.pause(duration),
            ViewEvent::LoaderHidden | ViewEvent::ResultsRevealed | ViewEvent::Entrance => {}
            ViewEvent::Rendered(state) => print!("{}", format_dashboard(&state)),
            ViewEvent::AudienceBars { delay, split } => {
                self.pause(delay);
                println!("Audience");
                println!("  18-30  {}", bar(f64::from(split.youth)));
                println!("  30-50  {}", bar(f64::from(split.adult)));
                println!("  50+    {}", bar(f64::from(split.senior)));
            }
            ViewEvent::ErrorPanel(panel) => {
                eprintln!("{}", panel.headline());
                eprintln!("{}", panel.note);
                eprintln!("Try Again: adsage capture post|pre");
            }
            ViewEvent::ApplyButton(state) => {
                if state == ButtonState::Working || state == ButtonState::Retry {
                    println!("[{}]", state.label());
                }
            }
            ViewEvent::AppliedRevealed(applied) => {
                println!();
                println!("New content");
                println!("  {}", applied.new_content);
                println!("New image prompt");
                println!("  {}", applied.new_image_prompt);
            }
            ViewEvent::Cue(Cue::Alert(message)) => eprintln!("{message}"),
            ViewEvent::Cue(Cue::Shake(field)) => eprintln!("missing {field}"),
        }
    }
}

fn format_dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    if let Some(verdict) = &state.verdict {
        out.push_str(&format!("Verdict\n  {verdict}\n"));
    }
    if let Some(items) = &state.suggestions {
        out.push_str("Improvements\n");
        for item in items {
            out.push_str(&format!(
                "  {} {} [{}]\n      {}\n",
                icon_glyph(item.icon),
                item.title,
                item.badge,
                item.description
            ));
        }
    }
    match &state.summary {
        Some(SummaryBlock::KeyStrengths(points)) => {
            out.push_str("Key Strengths Analyzed:\n");
            for point in points {
                out.push_str(&format!("  ✓ {point}\n"));
            }
        }
        Some(SummaryBlock::Text(text)) => out.push_str(&format!("Summary\n  {text}\n")),
        None => {}
    }
    if let Some(tone) = &state.tone {
        out.push_str(&format!(
            "Tone\n  {} {}\n  {}\n",
            tone.label,
            tone.score_text(),
            bar(tone.bar_width)
        ));
    }
    if let Some(engagement) = &state.engagement {
        out.push_str(&format!(
            "Engagement\n  score {} ({})\n  virality {} (Predicted)\n",
            engagement.score, engagement.explanation, engagement.virality
        ));
    }
    if let Some(title) = state.strategy_column.title() {
        out.push_str(&format!("{title}\n"));
    }
    match &state.strategy_column {
        StrategyColumn::ProsCons { pros, cons } => {
            for pro in pros {
                out.push_str(&format!("  + {pro}\n"));
            }
            for con in cons {
                out.push_str(&format!("  - {con}\n"));
            }
        }
        StrategyColumn::Hashtags {
            trending,
            niche,
            insight,
        } => {
            out.push_str(&format!("  hot: {}\n", trending.join(" ")));
            out.push_str(&format!("  niche: {}\n", niche.join(" ")));
            out.push_str(&format!("  {insight}\n"));
        }
        StrategyColumn::Empty => {}
    }
    out
}

fn icon_glyph(icon: adsage_engine::projector::Icon) -> &'static str {
    use adsage_engine::projector::Icon;
    match icon {
        Icon::Star => "★",
        Icon::TrendUp => "↗",
        Icon::Lightbulb => "•",
    }
}

/// Twenty-cell bar for a percentage.
fn bar(percent: f64) -> String {
    let filled = (percent.clamp(0.0, 100.0) / 5.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}
