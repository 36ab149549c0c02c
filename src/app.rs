use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderName;
use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::render::{MountPrefix, Renderer, RendererConfig};
use crate::rpc::{HttpConfigClient, RpcClientOptions};
use crate::server::{self, AppState, MountSettings};

fn print_banner() {
    println!(
        "{} {}",
        "configweb".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label.bold(), value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "info,configweb=debug,tower_http=debug",
        _ => "trace",
    }
}

#[derive(Clone, Debug)]
struct Settings {
    listen: SocketAddr,
    workers: usize,
    rpc: RpcClientOptions,
    renderer: RendererConfig,
    mount_header: HeaderName,
    base_path: MountPrefix,
    log_filter: String,
    no_color: bool,
}

fn build_settings(args: CliArgs, cfg: ConfigFile) -> Result<Settings, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let listen_raw = args
        .listen
        .or(cfg.listen)
        .unwrap_or_else(|| "0.0.0.0:8082".to_string());
    let listen = crate::utils::parse_listen_addr(&listen_raw)
        .map_err(|e| format!("invalid listen '{listen_raw}': {e}"))?;

    let workers = args.workers.or(cfg.workers).unwrap_or(4);
    if workers == 0 {
        return Err("invalid workers, expected positive integer".to_string());
    }

    let rpc_address = args
        .rpc_address
        .or(cfg.rpc_address)
        .unwrap_or_else(|| RpcClientOptions::default().address);
    crate::utils::parse_http_url(&rpc_address)
        .map_err(|e| format!("invalid rpc_address '{rpc_address}': {e}"))?;
    let rpc_service = args
        .rpc_service
        .or(cfg.rpc_service)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| RpcClientOptions::default().service);
    let rpc_timeout = args.rpc_timeout.or(cfg.rpc_timeout).unwrap_or(10);
    if rpc_timeout == 0 {
        return Err("invalid rpc_timeout, expected positive integer".to_string());
    }

    let template_dir = config::expand_tilde(
        args.templates
            .or(cfg.templates)
            .unwrap_or_else(|| "./templates".to_string())
            .as_str(),
    );
    let layout = args
        .layout
        .or(cfg.layout)
        .unwrap_or_else(|| "layout".to_string());
    let reload = if args.no_reload {
        false
    } else {
        cfg.reload_templates.unwrap_or(true)
    };

    let mount_header_raw = args
        .mount_header
        .or(cfg.mount_header)
        .unwrap_or_else(|| "X-Forwarded-Prefix".to_string());
    let mount_header = crate::utils::parse_header_name(&mount_header_raw)
        .map_err(|e| format!("invalid mount_header '{mount_header_raw}': {e}"))?;

    let base_path_raw = args
        .base_path
        .or(cfg.base_path)
        .unwrap_or_else(|| "/".to_string());
    let base_path = crate::utils::parse_base_path(&base_path_raw)
        .map_err(|e| format!("invalid base_path '{base_path_raw}': {e}"))?;

    let log_filter = args
        .log_filter
        .or(cfg.log_filter)
        .unwrap_or_else(|| verbosity_filter(args.verbose).to_string());

    Ok(Settings {
        listen,
        workers,
        rpc: RpcClientOptions {
            address: rpc_address,
            service: rpc_service,
            timeout_seconds: rpc_timeout,
        },
        renderer: RendererConfig {
            template_dir,
            layout,
            reload,
        },
        mount_header,
        base_path,
        log_filter,
        no_color,
    })
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!settings.no_color)
        .compact()
        .try_init();
}

fn print_summary(settings: &Settings) {
    format_kv_line("Listen", &settings.listen.to_string());
    format_kv_line("Workers", &settings.workers.to_string());
    format_kv_line("RPC", &settings.rpc.address);
    format_kv_line("Service", &settings.rpc.service);
    format_kv_line(
        "Templates",
        &settings.renderer.template_dir.display().to_string(),
    );
    format_kv_line("Reload", format_bool(settings.renderer.reload));
    format_kv_line(
        "Mount",
        &format!("{} (fallback {})", settings.mount_header, settings.base_path),
    );
    println!();
}

async fn run_async(settings: Settings) -> Result<(), String> {
    let client = HttpConfigClient::new(&settings.rpc).map_err(|e| e.to_string())?;
    let renderer = Renderer::new(settings.renderer.clone()).map_err(|e| e.to_string())?;

    let state = Arc::new(AppState {
        renderer,
        service: Arc::new(client),
        mount: MountSettings {
            header: settings.mount_header.clone(),
            base_path: settings.base_path.clone(),
        },
    });

    server::serve(settings.listen, state)
        .await
        .map_err(|e| e.to_string())
}

fn resolve_config(args: &CliArgs) -> Result<(Option<PathBuf>, ConfigFile), String> {
    match args.config.as_deref() {
        Some(path) => {
            let path = config::expand_tilde(path);
            let cfg = config::load_config(&path, false)?;
            Ok((Some(path), cfg))
        }
        None => match config::default_config_path() {
            Some(path) => {
                let cfg = config::load_config(&path, true)?;
                Ok((Some(path), cfg))
            }
            None => Ok((None, ConfigFile::default())),
        },
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.no_color {
        colored::control::set_override(false);
    }

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let (config_path, cfg) = resolve_config(&args)?;
    let settings = build_settings(args, cfg)?;
    if settings.no_color {
        colored::control::set_override(false);
    }

    init_tracing(&settings);
    print_banner();
    if let Some(path) = config_path.filter(|p| p.exists()) {
        format_kv_line("Config", &path.display().to_string());
    }
    print_summary(&settings);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(settings.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(settings))
}
