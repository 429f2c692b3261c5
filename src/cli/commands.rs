use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "bdmetrics", version, about = "Black Duck remediation and policy violation metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect metrics and write reports
    Report(ReportArgs),
    /// Inspect or clear the project cache
    Cache(CacheArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Default)]
pub struct ReportArgs {
    /// Black Duck server URL (or BD_URL)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Black Duck API token (or BD_TOKEN)
    #[arg(short, long)]
    pub token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Only projects matching this name
    #[arg(long, conflicts_with = "project_group")]
    pub project: Option<String>,

    /// Every project under this project group
    #[arg(long)]
    pub project_group: Option<String>,

    /// Only versions with exactly this name
    #[arg(long)]
    pub version: Option<String>,

    /// Comma-separated version phases, e.g. RELEASED,DEVELOPMENT
    #[arg(long, value_delimiter = ',')]
    pub phases: Option<Vec<String>>,

    /// Comma-separated version distributions, e.g. EXTERNAL,SAAS
    #[arg(long, value_delimiter = ',')]
    pub distributions: Option<Vec<String>>,

    /// Days without a scan after which a version is dormant [default: 30]
    #[arg(long)]
    pub since_days: Option<i64>,

    /// Reuse and update the project cache
    #[arg(long)]
    pub cache: bool,

    /// Empty the cache before the run (also without --cache)
    #[arg(long)]
    pub cache_truncate: bool,

    /// Cache file, relative paths resolve under --dir [default: bd_remediation_db.sqlite]
    #[arg(long)]
    pub db_file: Option<String>,

    /// Report output directory [default: .]
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Write a JSON report
    #[arg(long)]
    pub json: bool,

    /// Write a CSV report
    #[arg(long)]
    pub csv: bool,

    /// Write an HTML summary
    #[arg(long)]
    pub html: bool,

    /// Renew the session after this many projects [default: 200]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconnect_every: Option<u64>,

    /// HTTP timeout in seconds [default: 60]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,

    /// Cache file
    #[arg(long, default_value = "bd_remediation_db.sqlite", global = true)]
    pub db_file: String,
}

#[derive(Subcommand, Clone)]
pub enum CacheAction {
    /// List cached projects
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the cached record of a project
    Show {
        /// Project ID (last segment of the project URL)
        project_id: String,
    },
    /// Remove every cached project
    Truncate,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args_parse_lists() {
        let cli = Cli::try_parse_from([
            "bdmetrics", "report", "--url", "https://bd", "--phases", "released,DEVELOPMENT", "--cache",
        ]).unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.phases, Some(vec!["released".to_string(), "DEVELOPMENT".to_string()]));
                assert!(args.cache);
                assert!(args.distributions.is_none());
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_project_and_group_conflict() {
        let result = Cli::try_parse_from([
            "bdmetrics", "report", "--project", "a", "--project-group", "g",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_show_parses() {
        let cli = Cli::try_parse_from(["bdmetrics", "cache", "show", "abc", "--db-file", "x.sqlite"]).unwrap();
        match cli.command {
            Commands::Cache(args) => {
                assert_eq!(args.db_file, "x.sqlite");
                assert!(matches!(args.action, CacheAction::Show { ref project_id } if project_id == "abc"));
            }
            _ => panic!("expected cache"),
        }
    }
}
