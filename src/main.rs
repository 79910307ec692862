use clap::Parser;
use selph::{driver, logging};
use selph_agent::{AgentConfig, AgentFacade, Heartbeat};
use selph_core::FixedClock;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Parser)]
#[command(name = "selph", about = "Agent state & messaging core — stimuli in, presence records out")]
struct Cli {
    /// Path to config file (TOML)
    #[arg(long, default_value = "selph.toml")]
    config: PathBuf,

    /// Dump default config as TOML and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,

    /// Seed the jitter source (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Pin the hour of day used for mode selection (0-23)
    #[arg(long)]
    hour: Option<u32>,

    /// JSON-lines stimulus file, or "-" for stdin
    #[arg(long)]
    input: Option<String>,

    /// Run this many heartbeat ticks instead of reading stimuli
    #[arg(long)]
    heartbeat: Option<u64>,

    /// Run an evolution check after every stimulus
    #[arg(long, default_value_t = false)]
    auto_evolve: bool,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.dump_config {
        println!("{}", AgentConfig::default().to_toml());
        return Ok(());
    }

    let _guard = logging::init(cli.log_dir.as_deref());

    let mut config = AgentConfig::load(&cli.config);
    if cli.seed.is_some() {
        config.runtime.seed = cli.seed;
    }

    let mut agent = AgentFacade::from_config(&config)?;
    if let Some(hour) = cli.hour {
        agent = agent.with_clock(Box::new(FixedClock::at_hour(hour)));
    }

    if let Some(ticks) = cli.heartbeat {
        let shared = Arc::new(Mutex::new(agent));
        let heartbeat = Heartbeat::new(Duration::from_millis(config.runtime.heartbeat_ms))
            .with_max_ticks(ticks);
        heartbeat
            .run(shared, |presence| {
                if let Ok(line) = serde_json::to_string(presence) {
                    println!("{}", line);
                }
            })
            .await?;
        return Ok(());
    }

    let stdout = io::stdout().lock();
    let steps = match cli.input.as_deref() {
        None | Some("-") => driver::run_lines(&mut agent, io::stdin().lock(), stdout, cli.auto_evolve)?,
        Some(path) => {
            let file = File::open(path)?;
            driver::run_lines(&mut agent, BufReader::new(file), stdout, cli.auto_evolve)?
        }
    };

    let stats = agent.stats();
    tracing::info!(
        "Processed {} stimuli; {} v{} after {} mutations",
        steps,
        stats.identity,
        stats.version,
        stats.mutation_count
    );
    Ok(())
}
