use std::path::PathBuf;

use chrono::{DateTime, Local};
use crate::cli::commands::ReportArgs;
use crate::cli::output::{render_banner, render_run_summary};
use crate::config::{self, credentials::{mask_token, resolve_credential}, MetricsConfig, ReportFormat};
use crate::errors::MetricsError;
use crate::fetcher::{BlackDuckClient, ProjectScope, ServerSettings};
use crate::metrics::VersionFilter;
use crate::pipeline::state::{DEFAULT_DB_FILE, DEFAULT_RECONNECT_EVERY, DEFAULT_SINCE_DAYS, DEFAULT_TIMEOUT_SECS};
use crate::pipeline::{prepare_cache, CacheSettings, RunConfig, RunOrchestrator, RunSummary};
use crate::reporting::formatter::format_text_summary;
use crate::reporting::{write_reports, ReportMetadata};
use tracing::info;

pub async fn handle_report(args: ReportArgs, quiet: bool) -> Result<(), MetricsError> {
    let file_config = if let Some(config_path) = &args.config {
        Some(config::parse_config(&PathBuf::from(config_path)).await?)
    } else {
        None
    };

    let run_config = build_run_config(&args, file_config.as_ref(), |key| std::env::var(key).ok())?;

    if !quiet {
        println!("{}", render_banner());
    }
    info!(
        url = %run_config.server.url,
        token = %mask_token(&run_config.server.token),
        scope = %run_config.scope,
        "Connecting to Black Duck"
    );

    let client = BlackDuckClient::connect(run_config.server.clone()).await?;
    let cache = match &run_config.cache {
        Some(settings) => prepare_cache(settings)?,
        None => None,
    };

    let orchestrator = RunOrchestrator::new(run_config.clone(), client, cache).with_progress(!quiet);
    let Some(summary) = orchestrator.run().await? else {
        println!("No projects found!");
        return Ok(());
    };

    if !quiet {
        print!("{}", render_run_summary(&summary));
    }

    for path in finish_run(&summary, &run_config, quiet, Local::now()).await? {
        println!("Report written: {}", path.display());
    }
    Ok(())
}

/// Post-run step: prints the console summary and writes the selected report
/// formats. Nothing is written when the run found no vulnerable component.
pub async fn finish_run(
    summary: &RunSummary,
    run_config: &RunConfig,
    quiet: bool,
    now: DateTime<Local>,
) -> Result<Vec<PathBuf>, MetricsError> {
    if summary.instance.vulnerabilities.total == 0 {
        println!("No vulnerable components found!");
        return Ok(Vec::new());
    }

    if !quiet {
        print!("{}", format_text_summary(&summary.instance));
    }

    if run_config.formats.is_empty() {
        info!("No report format selected (use --json, --csv or --html)");
        return Ok(Vec::new());
    }

    let metadata = ReportMetadata::from_run(run_config, now);
    write_reports(&run_config.output_dir, &run_config.formats, &summary.instance, &metadata).await
}

/// Merges command-line arguments, the optional config file and the
/// environment (in that order of precedence) into run settings.
pub fn build_run_config<E>(
    args: &ReportArgs,
    file_config: Option<&MetricsConfig>,
    env: E,
) -> Result<RunConfig, MetricsError>
where
    E: Fn(&str) -> Option<String>,
{
    let server_file = file_config.and_then(|c| c.server.as_ref());
    let scope_file = file_config.and_then(|c| c.scope.as_ref());
    let filters_file = file_config.and_then(|c| c.filters.as_ref());
    let cache_file = file_config.and_then(|c| c.cache.as_ref());
    let output_file = file_config.and_then(|c| c.output.as_ref());
    let run_file = file_config.and_then(|c| c.run.as_ref());

    let url = args.url.clone()
        .or_else(|| server_file.and_then(|s| s.url.clone()))
        .or_else(|| env("BD_URL"))
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| MetricsError::Config("Black Duck URL is required (--url, server.url or BD_URL)".into()))?;

    let token = args.token.clone()
        .or_else(|| server_file.and_then(|s| s.token.as_deref()).map(|t| resolve_credential(t, &env)))
        .or_else(|| env("BD_TOKEN"))
        .filter(|t| !t.is_empty() && !t.starts_with('$'))
        .ok_or_else(|| MetricsError::Config("Black Duck API token is required (--token, server.token or BD_TOKEN)".into()))?;

    let server = ServerSettings {
        url,
        token,
        insecure: args.insecure || server_file.and_then(|s| s.insecure).unwrap_or(false),
        timeout_secs: args.timeout_secs
            .or_else(|| server_file.and_then(|s| s.timeout_secs))
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
    };

    let scope = if let Some(project) = &args.project {
        ProjectScope::Named(project.clone())
    } else if let Some(group) = &args.project_group {
        ProjectScope::Group(group.clone())
    } else if let Some(project) = scope_file.and_then(|s| s.project.clone()) {
        ProjectScope::Named(project)
    } else if let Some(group) = scope_file.and_then(|s| s.project_group.clone()) {
        ProjectScope::Group(group)
    } else {
        ProjectScope::All
    };

    let filter = VersionFilter::new(
        args.version.clone().or_else(|| scope_file.and_then(|s| s.version.clone())),
        args.phases.clone().or_else(|| filters_file.and_then(|f| f.phases.clone())),
        args.distributions.clone().or_else(|| filters_file.and_then(|f| f.distributions.clone())),
    );

    let since_days = args.since_days
        .or_else(|| filters_file.and_then(|f| f.since_days))
        .unwrap_or(DEFAULT_SINCE_DAYS);
    if since_days < 0 {
        return Err(MetricsError::Config(format!("--since-days must not be negative (got {})", since_days)));
    }

    let output_dir = PathBuf::from(
        args.dir.clone()
            .or_else(|| output_file.and_then(|o| o.directory.clone()))
            .unwrap_or_else(|| ".".to_string()),
    );

    // The store lives next to the reports unless given an absolute path.
    let enabled = args.cache || cache_file.and_then(|c| c.enabled).unwrap_or(false);
    let truncate = args.cache_truncate || cache_file.and_then(|c| c.truncate).unwrap_or(false);
    let cache = (enabled || truncate).then(|| CacheSettings {
        db_file: output_dir.join(
            args.db_file.clone()
                .or_else(|| cache_file.and_then(|c| c.db_file.clone()))
                .unwrap_or_else(|| DEFAULT_DB_FILE.to_string()),
        ),
        enabled,
        truncate,
    });

    let mut formats: Vec<ReportFormat> = [
        (args.json, ReportFormat::Json),
        (args.csv, ReportFormat::Csv),
        (args.html, ReportFormat::Html),
    ]
    .into_iter()
    .filter_map(|(on, format)| on.then_some(format))
    .collect();
    if formats.is_empty() {
        formats = output_file.and_then(|o| o.formats.clone()).unwrap_or_default();
    }

    let reconnect_every = args.reconnect_every
        .map(|n| n as usize)
        .or_else(|| run_file.and_then(|r| r.reconnect_every))
        .unwrap_or(DEFAULT_RECONNECT_EVERY)
        .max(1);

    Ok(RunConfig {
        server,
        scope,
        filter,
        since_days,
        cache,
        output_dir,
        formats,
        reconnect_every,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parser::parse_config_str, ScopeConfig};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args() -> ReportArgs {
        ReportArgs {
            url: Some("https://bd.example.com/".into()),
            token: Some("secret-token".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_and_trailing_slash() {
        let config = build_run_config(&args(), None, no_env).unwrap();
        assert_eq!(config.server.url, "https://bd.example.com");
        assert_eq!(config.scope, ProjectScope::All);
        assert!(config.filter.is_unfiltered());
        assert_eq!(config.since_days, 30);
        assert!(config.cache.is_none());
        assert_eq!(config.reconnect_every, 200);
        assert!(config.formats.is_empty());
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let args = ReportArgs { token: Some("t".into()), ..Default::default() };
        assert!(matches!(build_run_config(&args, None, no_env), Err(MetricsError::Config(_))));
    }

    #[test]
    fn test_environment_is_last_resort() {
        let env = |key: &str| match key {
            "BD_URL" => Some("https://env.example.com".to_string()),
            "BD_TOKEN" => Some("env-token".to_string()),
            _ => None,
        };
        let config = build_run_config(&ReportArgs::default(), None, env).unwrap();
        assert_eq!(config.server.url, "https://env.example.com");
        assert_eq!(config.server.token, "env-token");

        let config = build_run_config(&args(), None, env).unwrap();
        assert_eq!(config.server.url, "https://bd.example.com");
    }

    #[test]
    fn test_file_token_resolves_through_env() {
        let file = parse_config_str("server:\n  url: https://bd.example.com\n  token: $BD_API_TOKEN\n").unwrap();
        let env = |key: &str| (key == "BD_API_TOKEN").then(|| "from-env".to_string());
        let config = build_run_config(&ReportArgs::default(), Some(&file), env).unwrap();
        assert_eq!(config.server.token, "from-env");

        assert!(matches!(
            build_run_config(&ReportArgs::default(), Some(&file), no_env),
            Err(MetricsError::Config(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_config_str(
            "scope:\n  project_group: Team\n\
             filters:\n  phases: [released]\n  since_days: 7\n\
             cache:\n  enabled: true\n  db_file: /tmp/cache.sqlite\n\
             output:\n  formats: [html]\n",
        ).unwrap();

        let config = build_run_config(&args(), Some(&file), no_env).unwrap();
        assert_eq!(config.scope, ProjectScope::Group("Team".into()));
        assert_eq!(config.filter.phases, Some(vec!["RELEASED".to_string()]));
        assert_eq!(config.since_days, 7);
        assert_eq!(config.cache.unwrap().db_file, PathBuf::from("/tmp/cache.sqlite"));
        assert_eq!(config.formats, vec![ReportFormat::Html]);

        let overridden = ReportArgs {
            project: Some("App".into()),
            since_days: Some(0),
            json: true,
            ..args()
        };
        let config = build_run_config(&overridden, Some(&file), no_env).unwrap();
        assert_eq!(config.scope, ProjectScope::Named("App".into()));
        assert_eq!(config.since_days, 0);
        assert_eq!(config.formats, vec![ReportFormat::Json]);
    }

    #[test]
    fn test_relative_db_file_lives_in_output_dir() {
        let args = ReportArgs {
            cache: true,
            dir: Some("out".into()),
            db_file: Some("bd.sqlite".into()),
            ..args()
        };
        let cache = build_run_config(&args, None, no_env).unwrap().cache.unwrap();
        assert_eq!(cache.db_file, PathBuf::from("out").join("bd.sqlite"));
        assert!(cache.enabled);

        let defaults = ReportArgs { cache: true, ..self::args() };
        let cache = build_run_config(&defaults, None, no_env).unwrap().cache.unwrap();
        assert_eq!(cache.db_file, PathBuf::from(".").join("bd_remediation_db.sqlite"));
    }

    #[test]
    fn test_truncate_without_cache_still_targets_store() {
        let args = ReportArgs { cache_truncate: true, ..args() };
        let cache = build_run_config(&args, None, no_env).unwrap().cache.unwrap();
        assert!(cache.truncate);
        assert!(!cache.enabled);
    }

    #[test]
    fn test_negative_since_days_rejected() {
        let args = ReportArgs { since_days: Some(-5), ..args() };
        assert!(build_run_config(&args, None, no_env).is_err());
    }

    #[test]
    fn test_scope_version_from_file() {
        let file = MetricsConfig {
            scope: Some(ScopeConfig { version: Some("1.2".into()), ..Default::default() }),
            ..Default::default()
        };
        let config = build_run_config(&args(), Some(&file), no_env).unwrap();
        assert_eq!(config.filter.version_name.as_deref(), Some("1.2"));
    }
}
