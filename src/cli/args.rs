use clap::{ArgAction, Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hostlist",
    version,
    about = "paginated, filterable host listing",
    long_about = "hostlist loads a JSON array of hosts, shows them through a filter, and renders them page by page as the viewport scrolls.\n\nPage events are read one per line from --events or stdin:\n  click <filter-id>        activate a filter control\n  key <Enter|Space|..> <id> press a key on a control\n  scroll <dy>              scroll the viewport by dy pixels\n  wait <ms>                let time pass (trailing scroll runs fire)\n  quit\n\nExamples:\n  hostlist -s data/hosts.json\n  printf 'scroll 400\\nclick filter-top-rated\\n' | hostlist -s https://example.com/hosts.json -o hosts.html"
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        long = "lf",
        visible_alias = "log-format",
        value_enum,
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Log line format written to stderr."
    )]
    pub log_format: Option<LogFormat>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the hosts shown at exit to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from the file extension by default)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 's',
        long = "src",
        visible_alias = "source",
        value_name = "URL|FILE",
        help_heading = "Input",
        help = "Hosts data source (defaults to data/hosts.json)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.hostlist/config.yml when present)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file to the config path and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'e',
        long = "ev",
        visible_alias = "events",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read page events from a file instead of stdin."
    )]
    pub events: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Timeout for loading the data source over HTTP."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Rendering",
        help = "Hosts rendered per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "st",
        visible_alias = "scroll-timeout",
        value_name = "MS",
        help_heading = "Rendering",
        help = "Minimum interval between scroll-triggered renders."
    )]
    pub scroll_timeout: Option<u64>,

    #[arg(
        short = 'f',
        long = "flt",
        visible_alias = "filter",
        value_name = "FILTER",
        help_heading = "Rendering",
        help = "Filter shown after load: filter-all, filter-cheapest, filter-top-rated, filter-five-stars."
    )]
    pub filter: Option<String>,

    #[arg(
        long = "vh",
        visible_alias = "viewport-height",
        value_name = "PX",
        help_heading = "Rendering",
        help = "Height of the simulated viewport."
    )]
    pub viewport_height: Option<f64>,

    #[arg(
        long = "rh",
        visible_alias = "row-height",
        value_name = "PX",
        help_heading = "Rendering",
        help = "Height of one rendered host row."
    )]
    pub row_height: Option<f64>,
}
