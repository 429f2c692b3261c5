use crate::models::{InstanceRecord, PolicyCategory, PolicySeverity, RemediationStatus, Severity};
use crate::utils::formatting::format_count;
use super::metadata::ReportMetadata;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Plain-text status by severity table for the console.
pub fn format_text_summary(instance: &InstanceRecord) -> String {
    let mut out = format!(
        "{:<22}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}\n",
        "STATUS", "CRITICAL", "HIGH", "MEDIUM", "LOW", "NONE", "TOTAL"
    );
    for status in RemediationStatus::ALL {
        let counts = instance.vulnerabilities.status(status);
        if counts.total == 0 {
            continue;
        }
        out.push_str(&format!(
            "{:<22}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}\n",
            status.as_str(),
            counts.critical,
            counts.high,
            counts.medium,
            counts.low,
            counts.none,
            counts.total
        ));
    }
    out.push_str(&format!("{:<22}{:>60}\n", "TOTAL", instance.vulnerabilities.total));
    out
}

/// Static HTML summary of a run.
pub fn format_html_report(instance: &InstanceRecord, metadata: &ReportMetadata) -> String {
    let mut status_rows = String::new();
    for status in RemediationStatus::ALL {
        let counts = instance.vulnerabilities.status(status);
        let cells: String = Severity::ALL
            .iter()
            .map(|s| format!("<td>{}</td>", counts.get(*s)))
            .collect();
        status_rows.push_str(&format!(
            "<tr><td>{}</td>{}<td><b>{}</b></td></tr>\n",
            status.as_str(),
            cells,
            counts.total
        ));
    }

    let mut policy_rows = String::new();
    for category in PolicyCategory::ALL {
        let counts = instance.policy_violations.category(category);
        let cells: String = PolicySeverity::ALL
            .iter()
            .map(|s| format!("<td>{}</td>", counts.get(*s)))
            .collect();
        policy_rows.push_str(&format!(
            "<tr><td>{}</td>{}<td><b>{}</b></td></tr>\n",
            category.as_str(),
            cells,
            counts.total
        ));
    }

    let mut breakdown_rows = String::new();
    for (category, policies) in &instance.policy_breakdown {
        for (name, total) in policies {
            breakdown_rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                category.as_str(),
                escape_html(name),
                total
            ));
        }
    }

    let mut project_rows = String::new();
    for project in &instance.projects {
        let marker = if project.is_dormant { "&#9888; " } else { "" };
        project_rows.push_str(&format!(
            "<tr><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            marker,
            escape_html(&project.project_name),
            project.project_version_count,
            project.vulnerabilities.total,
            project.policy_violations.total(),
            project.snippets.total
        ));
    }

    let severity_headers: String = Severity::ALL.iter().map(|s| format!("<th>{}</th>", s.as_str())).collect();
    let policy_headers: String = PolicySeverity::ALL.iter().map(|s| format!("<th>{}</th>", s.as_str())).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Black Duck Remediation Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        h1 {{ color: #333; }}
        table {{ border-collapse: collapse; width: 100%; margin-bottom: 24px; }}
        th, td {{ border: 1px solid #ddd; padding: 6px; text-align: left; }}
        th {{ background-color: #f2f2f2; }}
        tr:nth-child(even) {{ background-color: #f9f9f9; }}
    </style>
</head>
<body>
    <h1>Black Duck Remediation Report</h1>
    <p>Server: {url}<br>Report time: {time}<br>Scope: {scope}<br>Dormant after: {since_days} days</p>
    <p>Projects: {projects} ({dormant} dormant) | Versions: {versions} | Vulnerable components: {total} | Snippets unreviewed: {unreviewed}</p>
    <h2>Vulnerable components by remediation status</h2>
    <table>
        <tr><th>Status</th>{severity_headers}<th>Total</th></tr>
        {status_rows}
    </table>
    <h2>Policy violations by category</h2>
    <table>
        <tr><th>Category</th>{policy_headers}<th>Total</th></tr>
        {policy_rows}
    </table>
    <h2>Policy breakdown</h2>
    <table>
        <tr><th>Category</th><th>Policy</th><th>Violations</th></tr>
        {breakdown_rows}
    </table>
    <h2>Projects</h2>
    <table>
        <tr><th>Project</th><th>Versions</th><th>Vulnerable components</th><th>Policy violations</th><th>Snippets</th></tr>
        {project_rows}
    </table>
    <p><small>{generator}</small></p>
</body>
</html>
"#,
        url = escape_html(&metadata.url),
        time = metadata.report_time,
        scope = escape_html(&metadata.scope),
        since_days = metadata.since_days,
        projects = instance.project_total_count,
        dormant = instance.dormant_project_count(),
        versions = instance.project_total_version_count,
        total = format_count(instance.vulnerabilities.total),
        unreviewed = format_count(instance.snippets.unreviewed),
        severity_headers = severity_headers,
        status_rows = status_rows,
        policy_headers = policy_headers,
        policy_rows = policy_rows,
        breakdown_rows = breakdown_rows,
        project_rows = project_rows,
        generator = escape_html(&metadata.generator),
    )
}
