mod cmd;
mod editor;
mod formatter;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cmd::{Cli, Command, OutputFormat};
use runboard_runtime::{RunboardConfig, RunboardRuntime, RunboardRuntimeBuilder};
use runboard_sdk::command::CommandContext;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunboardConfig {
        api_server: cli.api_server.clone(),
        token: cli.token.clone(),
        ..Default::default()
    };

    let client = config.api_client()?;
    let runtime = RunboardRuntimeBuilder::new(Arc::new(client), config).build();

    let interrupted = CancellationToken::new();
    watch_interrupts(interrupted.clone());

    let (edit, submit) = match &cli.command {
        Command::Rerun(args) => (args.edit, args.submit),
        _ => (false, false),
    };

    let mut context = cli.command.into_context()?;
    let result = execute(&runtime, &mut context, &interrupted).await?;

    let Some(result) = result else {
        return Ok(());
    };

    if context.command_name != "rerun" {
        return formatter::print_output(&result, cli.output, cli.pretty);
    }

    let kind = result["kind"].as_str().unwrap_or_default().to_string();
    let mut document = result["document"].as_str()
        .context("Re-run result has no document")?
        .to_string();

    if edit {
        document = tokio::task::spawn_blocking(move || editor::edit(&document))
            .await
            .context("Editor task failed")??;
    }

    if interrupted.is_cancelled() {
        anyhow::bail!("Interrupted");
    }

    if submit {
        let mut create = cmd::create_context(&kind, document);
        let created = execute(&runtime, &mut create, &interrupted).await?.unwrap_or(Value::Null);
        return formatter::print_output(&created, cli.output, cli.pretty);
    }

    match cli.output {
        OutputFormat::Standard => formatter::print_output(&Value::String(document), cli.output, cli.pretty),
        _ => {
            let mut result = result;
            result["document"] = Value::String(document);
            formatter::print_output(&result, cli.output, cli.pretty)
        }
    }
}

/// Cancels the running command on Ctrl-C. A second Ctrl-C exits at once.
fn watch_interrupts(interrupted: CancellationToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupted.is_cancelled() {
                std::process::exit(130);
            }

            tracing::warn!("Interrupted, cancelling");
            interrupted.cancel();
        }
    });
}

/// Runs a command until it finishes or the user interrupts it.
async fn execute(
    runtime: &RunboardRuntime,
    context: &mut CommandContext,
    interrupted: &CancellationToken,
) -> anyhow::Result<Option<Value>> {
    context.cancellation_token = interrupted.child_token();
    let token = context.cancellation_token.clone();
    let name = context.command_name.clone();

    tokio::select! {
        result = runtime.execute(context) => result,
        _ = token.cancelled() => anyhow::bail!("Command '{}' was cancelled", name),
    }
}
