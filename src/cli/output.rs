use console::style;
use crate::db::CachedProjectSummary;
use crate::pipeline::RunSummary;
use crate::utils::formatting::format_duration;

/// Tool name, version and build information.
pub fn render_banner() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let build_ts = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");

    format!(
        "{} {} {}",
        style(env!("CARGO_PKG_NAME")).cyan().bold(),
        style(version).white().bold(),
        style(format!("({} {})", git_hash, build_ts)).dim(),
    )
}

/// Elapsed time and cache usage of a finished run.
pub fn render_run_summary(summary: &RunSummary) -> String {
    let elapsed_ms = summary.elapsed.as_millis() as u64;
    let average_ms = summary.average_per_project().as_millis() as u64;
    let mut out = format!(
        "  {} {}\n  {} {}\n  {} {} versions, {} dormant\n",
        style("Elapsed:").dim(),
        format_duration(elapsed_ms),
        style("Average per project:").dim(),
        format_duration(average_ms),
        style("Projects:").dim(),
        summary.instance.project_total_version_count,
        summary.instance.dormant_project_count(),
    );
    let tally = &summary.tally;
    if tally.inserted + tally.refreshed + tally.reused > 0 {
        out.push_str(&format!(
            "  {} {} reused, {} refreshed, {} new\n",
            style("Cache:").dim(),
            tally.reused,
            tally.refreshed,
            tally.inserted,
        ));
    }
    out
}

pub fn render_cache_list(rows: &[CachedProjectSummary]) -> String {
    if rows.is_empty() {
        return "Cache is empty.\n".to_string();
    }
    let mut out = format!("{:<38} {:<30} {}\n", "PROJECT ID", "NAME", "UPDATED AT");
    for row in rows {
        out.push_str(&format!("{:<38} {:<30} {}\n", row.project_id, row.project_name, row.updated_at));
    }
    out.push_str(&format!("{} cached projects\n", rows.len()));
    out
}
