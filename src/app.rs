use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{CliArgs, LogFormat};
use crate::cli::validation;
use crate::config::{self, ConfigFile, Settings};
use crate::controller::Controller;
use crate::events::{self, Command, EventDispatcher, EventParseError, PageEvent};
use crate::filter::FilterType;
use crate::load::Loader;
use crate::output::{self, OutputFormat, RenderedList};
use crate::page::{Geometry, MemoryPage, Page};
use crate::utils;

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: String,
    events: Option<String>,
    timeout: u64,
    settings: Settings,
    geometry: Geometry,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    log_format: LogFormat,
    verbose: u8,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let source = config::expand_tilde_string(
        args.source
            .or(cfg.source)
            .unwrap_or_else(|| config::HOSTS_LOAD_URL.to_string())
            .trim(),
    );
    let events = args
        .events
        .or(cfg.events)
        .map(|p| config::expand_tilde_string(p.trim()));
    let timeout = args.timeout.or(cfg.timeout);
    validation::validate_timeout(timeout)?;
    let timeout = timeout.unwrap_or(config::LOAD_TIMEOUT_SECS);

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(config::PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }
    let scroll_timeout = args.scroll_timeout.or(cfg.scroll_timeout);
    validation::validate_scroll_timeout(scroll_timeout)?;
    let scroll_timeout = scroll_timeout
        .map(Duration::from_millis)
        .unwrap_or(config::SCROLL_TIMEOUT);
    let default_filter = match args.filter.or(cfg.default_filter) {
        Some(raw) => raw
            .parse::<FilterType>()
            .map_err(|e| format!("invalid default filter '{raw}': {e}"))?,
        None => config::DEFAULT_FILTER,
    };

    let defaults = Geometry::default();
    let viewport_height = args.viewport_height.or(cfg.viewport_height);
    let row_height = args.row_height.or(cfg.row_height);
    validation::validate_length("viewport_height", viewport_height)?;
    validation::validate_length("row_height", row_height)?;
    let geometry = Geometry {
        viewport_height: viewport_height.unwrap_or(defaults.viewport_height),
        row_height: row_height.unwrap_or(defaults.row_height),
        ..defaults
    };

    let output = args.output.or(cfg.output).map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => Some(
            OutputFormat::parse(&raw)
                .ok_or_else(|| format!("invalid output format '{raw}'"))?,
        ),
        None => None,
    };
    let log_format = match args.log_format {
        Some(f) => f,
        None => match cfg.log_format {
            Some(raw) => {
                LogFormat::parse(&raw).ok_or_else(|| format!("invalid log format '{raw}'"))?
            }
            None => LogFormat::default(),
        },
    };

    Ok(RunConfig {
        source,
        events,
        timeout,
        settings: Settings {
            page_size,
            scroll_timeout,
            default_filter,
            ..Settings::default()
        },
        geometry,
        output,
        output_format,
        log_format,
        verbose: args.verbose,
        no_color: args.no_color || cfg.no_color.unwrap_or(false),
    })
}

fn init_tracing(verbose: u8, format: LogFormat) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr);

    // a subscriber may already be installed when embedded
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

enum CommandSource {
    Script(std::vec::IntoIter<Command>),
    Stdin {
        lines: Lines<BufReader<Stdin>>,
        line_no: usize,
    },
}

impl CommandSource {
    async fn open(events: Option<&str>) -> Result<Self, String> {
        match events {
            Some(path) => {
                let contents = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| format!("failed to read events file {path}: {e}"))?;
                let commands = events::parse_script(&contents)
                    .map_err(|e| format!("invalid events file {path}: {e}"))?;
                Ok(Self::Script(commands.into_iter()))
            }
            None => Ok(Self::Stdin {
                lines: BufReader::new(tokio::io::stdin()).lines(),
                line_no: 0,
            }),
        }
    }

    async fn next(&mut self) -> Option<Result<Command, EventParseError>> {
        match self {
            Self::Script(commands) => commands.next().map(Ok),
            Self::Stdin { lines, line_no } => loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(error = %e, "failed to read events from stdin");
                        return None;
                    }
                };
                *line_no += 1;
                match events::parse_command(*line_no, &line) {
                    Ok(Some(command)) => return Some(Ok(command)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            },
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending::<()>().await,
    }
}

/// Echoes what changed on the page since the last call.
#[derive(Debug, Default)]
struct Echo {
    clear_count: usize,
    shown: usize,
}

impl Echo {
    fn print(&mut self, controller: &Controller<MemoryPage>) {
        let page = controller.page();
        if page.clear_count() != self.clear_count {
            self.clear_count = page.clear_count();
            self.shown = 0;
            let label = controller
                .active_filter()
                .map(|ft| format!("{} ({})", ft.label(), ft.id()))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{} {} {}",
                "::".bold(),
                label.bold().cyan(),
                format!("{} hosts", controller.filtered_hosts().len()).dimmed()
            );
        }
        for (idx, element) in page.rendered().iter().enumerate().skip(self.shown) {
            println!("{} {}", format!("{:>4}", idx + 1).dimmed(), element.text);
        }
        self.shown = page.rendered_count();
    }
}

fn apply_command(
    dispatcher: &mut EventDispatcher<MemoryPage>,
    command: Command,
) -> Result<(), String> {
    let now = Instant::now();
    let event = match command {
        Command::Click { id } => PageEvent::Click {
            target: dispatcher.controller().page().event_target(&id),
        },
        Command::Key { key, id } => PageEvent::KeyDown {
            target: dispatcher.controller().page().event_target(&id),
            key,
        },
        Command::Scroll { dy } => {
            dispatcher.controller_mut().page_mut().scroll_by(dy);
            PageEvent::Scroll
        }
        Command::Wait { .. } | Command::Quit => return Ok(()),
    };
    let outcome = dispatcher
        .dispatch(event, now)
        .map_err(|e| format!("page misconfigured: {e}"))?;
    debug!(?outcome, "event handled");
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    format_kv_line("Source", &run.source);
    format_kv_line("Page size", &run.settings.page_size.to_string());
    format_kv_line(
        "Scroll",
        &format!("{}ms", run.settings.scroll_timeout.as_millis()),
    );
    format_kv_line("Filter", run.settings.default_filter.id());
    println!();

    let page = MemoryPage::with_filter_controls(run.geometry, &run.settings.filter_class);
    let mut controller = Controller::new(page, run.settings.clone())
        .map_err(|e| format!("page misconfigured: {e}"))?;

    let loader = Loader::from_source(&run.source)
        .map_err(|e| e.to_string())?
        .with_timeout(Duration::from_secs(run.timeout));

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("loading {}", loader.source().describe()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let loaded = loader
        .load(|hosts| controller.on_hosts_loaded(hosts))
        .await;
    spinner.finish_and_clear();

    match loaded {
        Some(result) => result.map_err(|e| format!("page misconfigured: {e}"))?,
        None => return Err(format!("no hosts loaded from {}", run.source)),
    }

    let mut echo = Echo::default();
    echo.print(&controller);

    let mut dispatcher = EventDispatcher::new(controller);
    let mut commands = CommandSource::open(run.events.as_deref()).await?;

    loop {
        let next = tokio::select! {
            next = commands.next() => next,
            _ = wait_for(dispatcher.next_deadline()) => {
                dispatcher.flush(Instant::now());
                echo.print(dispatcher.controller());
                continue;
            }
        };
        let command = match next {
            None => break,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                eprintln!("{} {e}", "error:".red().bold());
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Wait { duration } => {
                tokio::time::sleep(duration).await;
                dispatcher.flush(Instant::now());
            }
            other => apply_command(&mut dispatcher, other)?,
        }
        echo.print(dispatcher.controller());
    }

    // let a pending trailing scroll land before reporting
    if let Some(deadline) = dispatcher.next_deadline() {
        wait_for(Some(deadline)).await;
        dispatcher.flush(Instant::now());
        echo.print(dispatcher.controller());
    }

    let controller = dispatcher.into_controller();
    let list = RenderedList {
        active_filter: controller.active_filter(),
        hosts: controller.rendered_hosts(),
        elements: controller.page().rendered(),
        total: controller.filtered_hosts().len(),
    };

    if let Some(outfile_path) = run.output.as_ref() {
        let output_format = run
            .output_format
            .or_else(|| output::infer_format_from_path(outfile_path))
            .unwrap_or(OutputFormat::Text);
        let rendered = output::render(output_format, &list);

        let mut outfile = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(outfile_path)
            .await
            .map_err(|e| format!("failed to open output file: {e}"))?;
        outfile
            .write_all(&rendered)
            .await
            .map_err(|e| format!("failed to write output file: {e}"))?;
    }

    println!();
    println!(
        ":: Shown :: {} of {} hosts, page {} of {} ::",
        list.elements.len(),
        list.total,
        controller.page_number(),
        utils::page_count(list.total, controller.settings().page_size)
    );
    Ok(())
}

fn resolve_config_path(args: &CliArgs) -> Option<(PathBuf, bool)> {
    match args.config.as_deref() {
        Some(p) => Some((config::expand_tilde(p), false)),
        None => config::default_config_path().map(|p| (p, true)),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let config_path = resolve_config_path(&args);
    if args.init_config {
        let (path, _) = config_path.ok_or_else(|| "no config path available".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }
    let cfg = match config_path.as_ref() {
        Some((path, allow_missing)) => config::load_config(path, *allow_missing)?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;
    init_tracing(run.verbose, run.log_format);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
