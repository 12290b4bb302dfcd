mod agents;
mod config;
mod crew;
mod format;
mod llm_client;
mod web;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, BufRead, Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::AppConfig;
use crew::{Crew, CrewOutput};
use format::Reflow;
use llm_client::{build_llm_client, EchoLlmClient, SharedLlmClient};
use tracing::{error, info};
use web::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "medcrew",
    about = "Resident doctor, doctor and report writer agents that turn a topic into a medical report"
)]
struct Cli {
    /// One-shot topic (e.g. "Diabetes Management"); if omitted the CLI enters interactive mode.
    #[arg(short, long)]
    topic: Option<String>,

    /// Wrap reports at this many columns.
    #[arg(short, long, global = true)]
    width: Option<usize>,

    /// Answer with the offline echo client instead of calling the LLM backend.
    #[arg(long, default_value_t = false)]
    echo: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the topic form and JSON API over HTTP.
    Serve {
        /// Address to bind; defaults to MEDCREW_BIND_ADDR or 127.0.0.1:8501.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Reflow stdin to the wrap width and print it.
    Reflow {
        /// Collapse runs of spaces inside wrapped lines.
        #[arg(long, default_value_t = false)]
        collapse_spaces: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if let Some(width) = cli.width {
        config = config.with_wrap_width(width)?;
    }

    if let Some(Commands::Reflow { collapse_spaces }) = cli.command {
        return run_reflow(config.wrap_width, collapse_spaces);
    }

    let llm_client: SharedLlmClient = if cli.echo {
        EchoLlmClient::shared()
    } else {
        build_llm_client(&config.llm, false).context("LLM client initialization failed")?
    };
    info!(model = llm_client.model(), "LLM backend ready");

    let crew = Arc::new(Crew::medical(llm_client.clone()).context("Invalid crew definition")?);
    info!(
        tasks = ?crew.tasks().iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "Crew assembled"
    );

    if let Some(Commands::Serve { addr }) = cli.command {
        let addr = addr.unwrap_or(config.server.bind_addr);
        let state = AppState::new(crew, config.wrap_width, llm_client.model())
            .with_search_configured(config.serper_api_key.is_some());
        return web::serve(Arc::new(state), addr).await;
    }

    let wrapper = Reflow::new(config.wrap_width);
    if let Some(topic) = cli.topic {
        run_single(&crew, &wrapper, topic, &mut io::stdout()).await?;
        return Ok(());
    }

    run_repl(&crew, &wrapper, io::stdin().lock(), &mut io::stdout()).await
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

async fn run_single<W: Write>(
    crew: &Crew,
    wrapper: &Reflow,
    topic: String,
    out: &mut W,
) -> anyhow::Result<()> {
    let inputs = BTreeMap::from([("topic".to_string(), topic)]);
    let output = crew.kickoff(&inputs).await.map_err(|err| {
        error!(?err, "Crew run failed");
        err
    })?;

    write!(out, "{}", render_run_summary(&output, wrapper)?)?;
    out.flush()?;
    Ok(())
}

/// One line per finished task, the crew's wall time, then the reflowed report.
fn render_run_summary(output: &CrewOutput, wrapper: &Reflow) -> anyhow::Result<String> {
    let total = output.tasks_output.len();
    let mut summary = String::from("\n");
    for (step, task) in output.tasks_output.iter().enumerate() {
        writeln!(
            summary,
            "[{}/{total}] {} ({}) done, {} chars",
            step + 1,
            task.task,
            task.agent,
            task.output.chars().count()
        )?;
    }

    let elapsed = output.finished_at - output.started_at;
    writeln!(summary, "Crew finished in {} ms", elapsed.num_milliseconds())?;
    write!(
        summary,
        "\nDiagnosis and Report:\n{}\n\n",
        wrapper.apply(&output.raw)?
    )?;
    Ok(summary)
}

/// Read topics line by line until EOF or `exit`. A failed run is reported and
/// the loop moves on to the next topic.
async fn run_repl<R: BufRead, W: Write>(
    crew: &Crew,
    wrapper: &Reflow,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(
        out,
        "Medical report crew ready. Enter a patient condition/topic, or 'exit' to quit.\n"
    )?;

    loop {
        write!(out, "Topic > ")?;
        out.flush()?;

        let mut buffer = String::new();
        if input.read_line(&mut buffer)? == 0 {
            break;
        }
        let trimmed = buffer.trim();

        if trimmed.eq_ignore_ascii_case("exit") {
            info!("User exited CLI");
            break;
        }

        if trimmed.is_empty() {
            writeln!(out, "Please enter a valid topic.")?;
            continue;
        }

        if let Err(err) = run_single(crew, wrapper, trimmed.to_owned(), out).await {
            writeln!(out, "Report failed: {err}\n")?;
        }
    }

    Ok(())
}

fn run_reflow(width: usize, collapse_spaces: bool) -> anyhow::Result<()> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;

    let policy = if collapse_spaces {
        format::SpacePolicy::Collapse
    } else {
        format::SpacePolicy::Preserve
    };
    let wrapped = Reflow::new(width).spaces(policy).apply(&text)?;
    print!("{wrapped}");
    io::stdout().flush()?;
    Ok(())
}
