use clap::{Parser, Subcommand};
use friedlite::cli as prog_cli;
use friedlite::config::QueryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AppConfig {
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_config: Option<PathBuf>,
    #[serde(default)]
    query: QueryConfig,
}

fn config_paths(cli_cfg: Option<&PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_cfg {
        paths.push(p.clone());
    }
    if let Ok(p) = std::env::var("FRIEDLITE_CONFIG") {
        paths.push(PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join("friedlite.toml"));
    }
    paths
}

fn load_config(cli: &Cli) -> AppConfig {
    // Precedence: CLI > env > config file > defaults
    let mut cfg = AppConfig::default();
    if let Some(p) = config_paths(cli.config.as_ref()).into_iter().find(|p| p.exists()) {
        match std::fs::read_to_string(&p).map_err(|e| e.to_string()).and_then(|s| {
            toml::from_str::<AppConfig>(&s).map_err(|e| e.to_string())
        }) {
            Ok(file_cfg) => cfg = file_cfg,
            Err(e) => eprintln!("warning: ignoring config {}: {e}", p.display()),
        }
    }
    cfg.query.apply_env();
    if let Ok(s) = std::env::var("FRIEDLITE_LOG_DIR") {
        cfg.log_dir = Some(PathBuf::from(s));
    }
    if let Ok(s) = std::env::var("FRIEDLITE_LOG_LEVEL") {
        cfg.log_level = Some(s);
    }
    if let Some(id) = &cli.id_field {
        cfg.query.id_field.clone_from(id);
    }
    if cli.log_level.is_some() {
        cfg.log_level.clone_from(&cli.log_level);
    }
    cfg
}

#[derive(Parser, Debug)]
#[command(
    name = "friedlite",
    version,
    about = "Mongo-style queries over NDJSON documents",
    long_about = None
)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Config file (TOML); defaults to FRIEDLITE_CONFIG or ./friedlite.toml")]
    config: Option<PathBuf>,
    #[arg(long, help = "Name of the document id field (default _id)")]
    id_field: Option<String>,
    #[arg(long, help = "Log level: off|error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Find documents matching a filter; prints NDJSON to stdout")]
    Find {
        #[arg(help = "NDJSON file with one document per line")]
        file: PathBuf,
        #[arg(default_value = "{}", help = "Filter JSON (e.g., {\"age\": {\"$gte\": 21}})")]
        filter: String,
        #[arg(long, help = "Sort: a field name, or JSON pairs like [[\"age\",-1],[\"name\",1]]")]
        sort: Option<String>,
        #[arg(long, help = "Skip N results (page start)")]
        skip: Option<usize>,
        #[arg(long, help = "Limit results (page size)")]
        limit: Option<usize>,
    },
    #[command(about = "Count documents matching a filter")]
    Count {
        #[arg(help = "NDJSON file with one document per line")]
        file: PathBuf,
        #[arg(default_value = "{}", help = "Filter JSON")]
        filter: String,
    },
    #[command(about = "Print the parsed filter tree and the compiled predicate")]
    Compile {
        #[arg(help = "Filter JSON")]
        filter: String,
    },
}

fn init_logging(cfg: &AppConfig) {
    let res = match &cfg.log_config {
        Some(path) => friedlite::logger::init_path(path),
        None if cfg.log_dir.is_some() || cfg.log_level.is_some() => {
            let (dir, level) = (cfg.log_dir.as_deref(), cfg.log_level.as_deref());
            friedlite::logger::configure_logging(dir, level, None)
        }
        None => Ok(()),
    };
    if let Err(e) = res {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn main() {
    let cli = Cli::parse();
    let cfg = load_config(&cli);
    init_logging(&cfg);
    if let Err(e) = cfg.query.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }
    let cmd = match cli.command {
        Commands::Find { file, filter, sort, skip, limit } => {
            prog_cli::Command::Find { file, filter_json: filter, sort, skip, limit }
        }
        Commands::Count { file, filter } => prog_cli::Command::Count { file, filter_json: filter },
        Commands::Compile { filter } => prog_cli::Command::Compile { filter_json: filter },
    };
    let stdout = std::io::stdout();
    if let Err(e) = prog_cli::run(cmd, &cfg.query, &mut stdout.lock()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
