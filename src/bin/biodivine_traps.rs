use biodivine_algo_threshold_traps::network::Network;
use biodivine_algo_threshold_traps::pipeline::{TrapSpaceConfig, find_trap_spaces};
use biodivine_algo_threshold_traps::reachability::ReachabilityConfig;
use biodivine_lib_param_bn::BooleanNetwork;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::path::Path;

#[derive(Parser)]
#[command(name = "biodivine_traps")]
#[command(about = "Enumerate non-redundant trap spaces of a Boolean network")]
struct Args {
    /// Path to a Boolean network file (.aeon, .bnet, or `name*=expression` text)
    #[arg(value_name = "FILE")]
    file: String,

    /// Input format (auto = decide by file extension)
    #[arg(long, default_value = "auto", require_equals = true)]
    format: Format,

    /// Force a variable to be fixed in every trap space (can be repeated)
    #[arg(long = "static", value_name = "NAME", require_equals = true)]
    static_variables: Vec<String>,

    /// Remove every trap space included in a larger one without checking reachability
    #[arg(long)]
    no_verify: bool,

    /// Largest number of relevant variables of a reachability check
    #[arg(long, require_equals = true)]
    max_variables: Option<usize>,

    /// Fold holes only when the network has more state variables than this
    #[arg(long, require_equals = true)]
    hole_threshold: Option<usize>,

    /// Logging verbosity (use -v for info, or -v=LEVEL for specific level)
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Clone, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Auto,
    Aeon,
    Bnet,
    Text,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

impl Format {
    fn resolve(self, path: &str) -> Format {
        if self != Format::Auto {
            return self;
        }
        match Path::new(path).extension().and_then(|it| it.to_str()) {
            Some("aeon") => Format::Aeon,
            Some("bnet") => Format::Bnet,
            _ => Format::Text,
        }
    }
}

fn load(path: &str, format: Format) -> Result<Network, String> {
    match format.resolve(path) {
        Format::Text => Network::from_file(path).map_err(|e| e.to_string()),
        Format::Aeon | Format::Bnet | Format::Auto => {
            let bn = BooleanNetwork::try_from_file(path)?;
            Network::try_from(&bn).map_err(|e| e.to_string())
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = match args.verbose {
        None => LevelFilter::Off,
        Some(None) => LevelFilter::Info,
        Some(Some(level)) => level.into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    let mut network = load(&args.file, args.format.clone()).unwrap_or_else(|e| {
        eprintln!("Failed to load network file {}: {}", args.file, e);
        std::process::exit(1);
    });

    for name in &args.static_variables {
        network.set_static(name).unwrap_or_else(|e| {
            eprintln!("Cannot mark `{}` as static: {}", name, e);
            std::process::exit(1);
        });
    }

    let mut config = TrapSpaceConfig::new();
    if let Some(threshold) = args.hole_threshold {
        config.reduction.hole_reduction_threshold = threshold;
    }
    if args.no_verify {
        config.reachability = ReachabilityConfig::without_verification();
    }
    if let Some(max_variables) = args.max_variables {
        config.reachability.max_variables = max_variables;
    }

    let result = find_trap_spaces(network, &config).unwrap_or_else(|e| {
        eprintln!("Trap space computation failed: {}", e);
        std::process::exit(1);
    });

    for line in result.describe_all() {
        println!("{}", line);
    }
    println!("{}", result.summary.describe());
}
