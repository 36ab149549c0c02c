use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "configweb",
    version,
    about = "read-only dashboard for the config service",
    long_about = "configweb serves an audit trail and search UI for a configuration change service.\n\nExamples:\n  configweb -a http://127.0.0.1:8080\n  configweb -l 127.0.0.1:8082 -T ./templates --no-reload\n  configweb --config ~/.configweb/config.yml\n\nTip: Use --init-config to write a commented default config file."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        long = "lf",
        visible_alias = "log-filter",
        value_name = "FILTER",
        help_heading = "Output",
        help = "Tracing filter directive (e.g. configweb=debug,tower_http=info)."
    )]
    pub log_filter: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.configweb/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'l',
        long = "ls",
        visible_alias = "listen",
        value_name = "ADDR",
        help_heading = "Server",
        help = "Address to listen on (e.g. 0.0.0.0:8082)."
    )]
    pub listen: Option<String>,

    #[arg(
        short = 'w',
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Server",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        long = "mh",
        visible_alias = "mount-header",
        value_name = "HEADER",
        help_heading = "Server",
        help = "Request header carrying the reverse proxy mount prefix."
    )]
    pub mount_header: Option<String>,

    #[arg(
        long = "bp",
        visible_alias = "base-path",
        value_name = "PATH",
        help_heading = "Server",
        help = "Mount prefix to assume when the header is absent."
    )]
    pub base_path: Option<String>,

    #[arg(
        short = 'a',
        long = "ra",
        visible_alias = "rpc-address",
        value_name = "URL",
        help_heading = "RPC",
        help = "Base URL of the micro API gateway."
    )]
    pub rpc_address: Option<String>,

    #[arg(
        long = "rs",
        visible_alias = "rpc-service",
        value_name = "NAME",
        help_heading = "RPC",
        help = "Service name of the config service."
    )]
    pub rpc_service: Option<String>,

    #[arg(
        short = 't',
        long = "to",
        visible_alias = "rpc-timeout",
        value_name = "SECONDS",
        help_heading = "RPC",
        help = "Per-call RPC timeout in seconds."
    )]
    pub rpc_timeout: Option<u64>,

    #[arg(
        short = 'T',
        long = "tpl",
        visible_alias = "templates",
        value_name = "DIR",
        help_heading = "Templates",
        help = "Template directory."
    )]
    pub templates: Option<String>,

    #[arg(
        long = "lay",
        visible_alias = "layout",
        value_name = "NAME",
        help_heading = "Templates",
        help = "Layout template name that views extend (without .html)."
    )]
    pub layout: Option<String>,

    #[arg(
        long = "nr",
        visible_alias = "no-reload",
        help_heading = "Templates",
        help = "Load templates once instead of re-reading them on every request."
    )]
    pub no_reload: bool,
}
