// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context as _;
use std::env;
use std::io::Cursor;
use the_pipewood::config::{load_and_validate_config, RuntimeBuilder};
use the_pipewood::Context;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries nothing but pipeline output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <pipeline.yaml> [input_text]", args[0]);
        eprintln!("       without input_text, stdin is streamed through the pipeline");
        eprintln!("Example: {} configs/shout.yaml \"hello world\"", args[0]);
        eprintln!("Example: cat notes.txt | {} configs/shout.yaml", args[0]);
        std::process::exit(1);
    }

    // Exit explicitly: a blocked stdin read would otherwise hold up runtime shutdown.
    match run(&args[1], args.get(2).cloned()).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(config_file: &str, input_text: Option<String>) -> anyhow::Result<()> {
    let config = load_and_validate_config(config_file)
        .with_context(|| format!("failed to load {}", config_file))?;
    let flow = RuntimeBuilder::from_config(&config)
        .with_context(|| format!("failed to build pipeline from {}", config_file))?;

    let ctx = Context::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let stdout = tokio::io::stdout();
    match input_text {
        Some(text) => {
            flow.run_streaming(&ctx, Cursor::new(text.into_bytes()), stdout)
                .await
        }
        None => flow.run_streaming(&ctx, tokio::io::stdin(), stdout).await,
    }
    .context("pipeline execution failed")?;

    Ok(())
}
