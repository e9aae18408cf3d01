use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scenekit_controls::Action;
use scenekit_demos::{Demo, DemoKind, FrameLoop};
use scenekit_render::{DebugTextRenderer, RenderSettings, Viewport};
use scenekit_tools::{SceneInspector, StatsMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenekit-cli", about = "Run the scene demos without a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// List the available demos and their panel actions
    List,
    /// Animate a demo and print each frame as text
    Run {
        #[command(flatten)]
        demo: DemoArgs,
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Print only the last frame
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the demo's scene graph as JSON
    Dump {
        #[command(flatten)]
        demo: DemoArgs,
    },
}

#[derive(Args)]
struct DemoArgs {
    /// Demo to build: basic, camera, transform or objects
    #[arg(short, long, default_value = "basic")]
    demo: DemoKind,
    /// Seed for demos that place objects randomly
    #[arg(short, long, default_value = "42")]
    seed: u64,
    /// Surface width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,
    /// Surface height in pixels
    #[arg(long, default_value = "720")]
    height: u32,
    /// JSON file with the demo's controls state
    #[arg(long)]
    controls: Option<PathBuf>,
    /// Panel action to run before the first frame (repeatable)
    #[arg(short, long = "action", value_parser = parse_action)]
    actions: Vec<Action>,
}

fn parse_action(label: &str) -> Result<Action, String> {
    Action::from_label(label).ok_or_else(|| {
        let known: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
        format!("unknown action {label:?} (expected one of {})", known.join(", "))
    })
}

impl DemoArgs {
    fn build(&self) -> anyhow::Result<Box<dyn Demo>> {
        let settings = RenderSettings::new(Viewport::new(self.width, self.height));
        let mut demo = self.demo.build(settings, self.seed)?;
        if let Some(path) = &self.controls {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading controls from {}", path.display()))?;
            demo.load_controls(&json)?;
            tracing::info!(path = %path.display(), "controls loaded");
        }
        for action in &self.actions {
            demo.invoke(*action)
                .with_context(|| format!("running action {action}"))?;
        }
        Ok(demo)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("scenekit-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", scenekit_render::crate_info());
            println!("tools: {}", scenekit_tools::crate_info());
            println!("demos: {}", DemoKind::ALL.len());
        }
        Commands::List => {
            for kind in DemoKind::ALL {
                let mut demo = kind.build(RenderSettings::default(), 0)?;
                let actions: Vec<&str> = demo.actions().iter().map(|a| a.label()).collect();
                println!("{:<10} {}", kind.name(), kind.title());
                if !actions.is_empty() {
                    println!("{:<10} actions: {}", "", actions.join(", "));
                }
            }
        }
        Commands::Run {
            demo,
            frames,
            quiet,
        } => {
            let mut demo = demo.build()?;
            let mut renderer = DebugTextRenderer::new();
            let mut frame_loop = FrameLoop::new(StatsMode::Ms);
            let mut last = String::new();
            frame_loop.run(demo.as_mut(), &mut renderer, frames, |_, text| {
                if quiet {
                    last = text;
                } else {
                    print!("{text}");
                }
            })?;
            if quiet {
                print!("{last}");
            }
            println!("{}", SceneInspector::summary(&demo.context().scene));
            println!("controls: {}", demo.controls_json()?);
            tracing::info!(frames, stats = %frame_loop.stats().label(), "run finished");
        }
        Commands::Dump { demo } => {
            let demo = demo.build()?;
            let scene = &demo.context().scene;
            eprintln!("{}", SceneInspector::summary(scene));
            println!("{}", SceneInspector::to_json(scene)?);
        }
    }

    Ok(())
}
