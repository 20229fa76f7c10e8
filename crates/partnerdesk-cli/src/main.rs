// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use partnerdesk_app::AppState;
use partnerdesk_db::{PartnerStore, SqliteStore, StoreTarget};
use runtime::DbRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `partnerdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let target = if options.demo {
        StoreTarget::Memory
    } else {
        config.store_target()?
    };
    if options.print_db_path {
        println!("{}", describe_target(&target));
        return Ok(());
    }

    init_logging(&config)?;
    info!(target = %describe_target(&target), demo = options.demo, "starting partnerdesk");

    let store = open_store(&target, options.demo)?;
    if options.check_only {
        let rows = store.list_request_summaries().context("list requests")?;
        info!(rows = rows.len(), "startup check passed");
        return Ok(store.close()?);
    }

    let mut state = AppState::default();
    let ui_result = {
        let mut runtime = DbRuntime::new(store.as_ref());
        partnerdesk_tui::run_app(&mut state, &mut runtime)
    };
    if let Err(error) = store.close() {
        warn!(error = %error, "closing the database failed");
    }
    info!("partnerdesk stopped");
    ui_result
}

fn open_store(target: &StoreTarget, demo: bool) -> Result<Box<dyn PartnerStore>> {
    if demo {
        let store = SqliteStore::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data()?;
        return Ok(Box::new(store));
    }
    partnerdesk_db::connect(target).with_context(|| {
        format!(
            "open database {} -- if this is wrong, fix [database] in the config or set PARTNERDESK_DB_PATH",
            describe_target(target)
        )
    })
}

fn describe_target(target: &StoreTarget) -> String {
    match target {
        StoreTarget::Sqlite(path) => path.display().to_string(),
        StoreTarget::Memory => ":memory:".to_owned(),
        StoreTarget::MySql(options) => format!(
            "mysql://{}@{}:{}/{}",
            options.user, options.host, options.port, options.database
        ),
    }
}

/// The UI owns the terminal, so logs go to a file.
fn init_logging(config: &Config) -> Result<()> {
    if !config.logging_enabled() {
        return Ok(());
    }
    let path = config.log_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| {
            format!(
                "open log file {} -- set [logging].path to a writable file or [logging].enabled = false",
                path.display()
            )
        })?;
    let filter = match env::var("PARTNERDESK_LOG") {
        Ok(directives) => EnvFilter::try_new(directives).context("parse PARTNERDESK_LOG")?,
        Err(_) => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("parse [logging].level {:?}", config.log_level()))?,
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-path" => options.print_db_path = true,
            "--print-example-config" => options.print_example = true,
            "--demo" => options.demo = true,
            "--check" => options.check_only = true,
            "--help" | "-h" => options.show_help = true,
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("partnerdesk: partner requests for a flooring supplier");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database location");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Open the database, load requests, then exit");
    println!("  --help                   Show this help");
}
