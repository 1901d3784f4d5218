//! HTML rendering of the dashboard view model

use chrono::{DateTime, NaiveDateTime};

use crate::model::{Finding, PullRequest, Repository, Scan};
use crate::notifier::AlertRecord;
use crate::view::ViewModel;

const CELL: &str = "padding: 0.5rem;";
const HEAD_CELL: &str = "padding: 0.5rem; text-align: left;";
const ROW: &str = "border-bottom: 1px solid #dee2e6;";
const HEAD_ROW: &str = "border-bottom: 2px solid #dee2e6;";
const TABLE: &str = "width: 100%; border-collapse: collapse;";
const EMPTY: &str = "padding: 0.75rem; text-align: center; color: #6c757d;";

/// Render the full dashboard page
pub fn render_page(view: &ViewModel, now_ms: u64, reload_seconds: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Remedy Operations Center</title>
    {reload}
</head>
<body style="font-family: system-ui, sans-serif; max-width: 1100px; margin: 0 auto; padding: 1rem;">
    <header style="display: flex; justify-content: space-between; align-items: center;">
        <div>
            <h1>Remedy Operations Center</h1>
            <p style="color: #6c757d;">Scans, findings, and automated pull requests.</p>
        </div>
        <form method="post" action="/actions/refresh">
            <span>Last refresh: <strong>{last_refresh}</strong></span>
            <button type="submit">Refresh now</button>
        </form>
    </header>
    {banners}
    {metrics}
    {onboarding}
    {scans}
    {findings}
    {pull_requests}
    {alerts}
    {toast}
</body>
</html>"#,
        reload = reload_script(reload_seconds),
        last_refresh = format_relative(view.last_refreshed_epoch_ms, now_ms),
        banners = banners(view),
        metrics = metric_cards(view),
        onboarding = onboarding(view),
        scans = scan_section(&view.scans, view.selected_scan_id.as_deref()),
        findings = finding_section(&view.findings),
        pull_requests = pull_request_section(&view.pull_requests),
        alerts = alert_section(&view.alerts),
        toast = toast(view),
    )
}

/// Reload the page every `reload_seconds`, skipping ticks while a URL is
/// being typed into the onboarding form
fn reload_script(reload_seconds: u64) -> String {
    format!(
        r#"<script>
        setInterval(function () {{
            const input = document.querySelector('input[name="url"]');
            if (input && (input.value !== '' || document.activeElement === input)) {{
                return;
            }}
            window.location.reload();
        }}, {});
    </script>"#,
        reload_seconds.max(1) * 1000
    )
}

fn banners(view: &ViewModel) -> String {
    let mut html = String::new();
    if let Some(error) = &view.error {
        html.push_str(&format!(
            r#"<div role="alert" style="padding: 0.75rem; margin: 1rem 0; color: #721c24; background-color: #f8d7da;"><strong>Failed to load data:</strong> {}</div>"#,
            escape(error)
        ));
    }
    if view.loading {
        html.push_str(
            r#"<div style="padding: 0.75rem; margin: 1rem 0; color: #0c5460; background-color: #d1ecf1;">Loading latest scan data…</div>"#,
        );
    }
    html
}

fn metric_cards(view: &ViewModel) -> String {
    let m = &view.metrics;
    let scope = view.selected_repo_name.as_deref().unwrap_or("All workspaces");
    let findings_scope = if view.selected_scan_id.is_some() {
        "Focused scan"
    } else {
        "Latest data"
    };
    let cards = [
        ("Registered repositories", m.repositories, escape(scope)),
        (
            "Active scans",
            m.active_scans,
            format!("{} total runs", m.total_scans),
        ),
        (
            "Findings prioritised",
            m.findings,
            format!("Scope: {}", findings_scope),
        ),
        (
            "Remedy PRs",
            m.pull_requests,
            format!("{} open for review", m.open_pull_requests),
        ),
    ];

    let body: String = cards
        .iter()
        .map(|(label, value, hint)| {
            format!(
                r#"<div style="flex: 1; padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
                    <div style="color: #6c757d;">{}</div>
                    <strong style="font-size: 2rem;">{}</strong>
                    <div style="color: #6c757d; font-size: 0.85em;">{}</div>
                </div>"#,
                label, value, hint
            )
        })
        .collect();

    format!(r#"<section style="display: flex; gap: 1rem; margin: 1rem 0;">{}</section>"#, body)
}

fn onboarding(view: &ViewModel) -> String {
    let button = if view.registering {
        r#"<button type="submit" disabled>Starting…</button>"#
    } else {
        r#"<button type="submit">Add &amp; Scan</button>"#
    };
    let message = view
        .action_message
        .as_deref()
        .map(|m| format!(r#"<span style="margin-left: 0.5rem;">{}</span>"#, escape(m)))
        .unwrap_or_default();

    format!(
        r#"<section>
        <h2>Repository onboarding</h2>
        <form method="post" action="/actions/register">
            <input type="url" name="url" placeholder="https://github.com/organization/project" aria-label="Repository URL" style="width: 60%;">
            {button}
        </form>
        <div style="margin-top: 0.5rem;">
            <form method="post" action="/actions/select-repo" style="display: inline;">
                <label for="repo-filter">Focus repository</label>
                <select id="repo-filter" name="repo_id" onchange="this.form.submit()">{options}</select>
            </form>
            <form method="post" action="/actions/scan" style="display: inline;">
                <button type="submit">Start new scan</button>
            </form>
            {message}
        </div>
    </section>"#,
        button = button,
        options = repo_options(&view.repos, view.selected_repo_id.as_deref()),
        message = message,
    )
}

/// `<option>`s for the repository filter, "All repositories" first
pub fn repo_options(repos: &[Repository], selected: Option<&str>) -> String {
    let mut html = option("", "All repositories", selected.is_none());
    for repo in repos {
        html.push_str(&option(&repo.id, &repo.name, selected == Some(repo.id.as_str())));
    }
    html
}

/// Scan timeline: a filter select plus the table of runs
pub fn scan_section(scans: &[Scan], selected: Option<&str>) -> String {
    let mut options = option("", "Latest scans", selected.is_none());
    for scan in scans {
        let label = format!(
            "{} · {}",
            scan.kind.to_uppercase(),
            format_timestamp(&scan.created_at)
        );
        options.push_str(&option(&scan.id, &label, selected == Some(scan.id.as_str())));
    }

    let rows = if scans.is_empty() {
        empty_row(4, "No scans yet. Kick one off to showcase the workflow.")
    } else {
        scans
            .iter()
            .map(|scan| {
                let highlight = if selected == Some(scan.id.as_str()) {
                    " background-color: #fff3cd;"
                } else {
                    ""
                };
                format!(
                    r#"<tr style="{ROW}{highlight}">
                    <td style="{CELL}"><code>{}</code></td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                </tr>"#,
                    escape(short_id(&scan.id)),
                    escape(&scan.kind.to_uppercase()),
                    status_chip(&scan.status),
                    escape(&format_timestamp(&scan.created_at)),
                )
            })
            .collect()
    };

    format!(
        r#"<section>
        <h2>Scan timeline</h2>
        <form method="post" action="/actions/select-scan">
            <select name="scan_id" onchange="this.form.submit()">{options}</select>
        </form>
        <table style="{TABLE}">
            <thead>
                <tr style="{HEAD_ROW}">
                    <th style="{HEAD_CELL}">Scan</th>
                    <th style="{HEAD_CELL}">Type</th>
                    <th style="{HEAD_CELL}">Status</th>
                    <th style="{HEAD_CELL}">Started</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    </section>"#
    )
}

/// Findings triage list
pub fn finding_section(findings: &[Finding]) -> String {
    let items = if findings.is_empty() {
        format!(
            r#"<p style="{EMPTY}">No findings yet. Queue a scan or adjust the filters.</p>"#
        )
    } else {
        findings
            .iter()
            .map(|finding| {
                format!(
                    r#"<article style="display: flex; gap: 1rem; padding: 0.75rem 0; {ROW}">
                    <div>{}</div>
                    <div>
                        <h3 style="margin: 0; font-size: 1rem;"><code>{}</code></h3>
                        <p style="margin: 0.25rem 0;">{}</p>
                        <small>Rule: {} · Line: {}</small>
                    </div>
                </article>"#,
                    severity_badge(&finding.severity),
                    escape(&finding.path),
                    escape(
                        finding
                            .description
                            .as_deref()
                            .unwrap_or("Remedy prioritised this issue for review.")
                    ),
                    escape(finding.rule_id.as_deref().unwrap_or("—")),
                    finding
                        .line
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "—".to_string()),
                )
            })
            .collect()
    };

    format!(r#"<section><h2>AI findings triage</h2>{items}</section>"#)
}

/// Automated pull request table
pub fn pull_request_section(pull_requests: &[PullRequest]) -> String {
    let rows = if pull_requests.is_empty() {
        empty_row(5, "Remedy has not created any pull requests yet.")
    } else {
        pull_requests
            .iter()
            .map(|pr| {
                let link = match &pr.pr_url {
                    Some(url) => format!(
                        r#"<a href="{}" target="_blank" rel="noreferrer">View PR</a>"#,
                        escape(url)
                    ),
                    None => "—".to_string(),
                };
                format!(
                    r#"<tr style="{ROW}">
                    <td style="{CELL}"><code>{}</code></td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                </tr>"#,
                    escape(&pr.branch),
                    status_chip(&pr.status),
                    escape(pr.summary.as_deref().unwrap_or("Remedy automated fix")),
                    link,
                    escape(&format_timestamp(&pr.created_at)),
                )
            })
            .collect()
    };

    format!(
        r#"<section>
        <h2>Automated pull requests</h2>
        <table style="{TABLE}">
            <thead>
                <tr style="{HEAD_ROW}">
                    <th style="{HEAD_CELL}">Branch</th>
                    <th style="{HEAD_CELL}">Status</th>
                    <th style="{HEAD_CELL}">Summary</th>
                    <th style="{HEAD_CELL}">Link</th>
                    <th style="{HEAD_CELL}">Created</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    </section>"#
    )
}

fn alert_section(alerts: &[AlertRecord]) -> String {
    if alerts.is_empty() {
        return String::new();
    }
    let rows: String = alerts
        .iter()
        .map(|a| {
            let status = if a.success { "OK" } else { "Failed" };
            format!(
                r#"<tr style="{ROW}">
                    <td style="{CELL}"><code>{}</code></td>
                    <td style="{CELL}">{}</td>
                    <td style="{CELL}">{}</td>
                </tr>"#,
                escape(&a.branch),
                escape(&a.notifier_type),
                status
            )
        })
        .collect();

    format!(
        r#"<section>
        <h2>Recent remediations</h2>
        <table style="{TABLE}">
            <thead>
                <tr style="{HEAD_ROW}">
                    <th style="{HEAD_CELL}">Branch</th>
                    <th style="{HEAD_CELL}">Notifier</th>
                    <th style="{HEAD_CELL}">Status</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    </section>"#
    )
}

fn toast(view: &ViewModel) -> String {
    let Some(toast) = &view.toast else {
        return String::new();
    };
    let link = toast
        .url
        .as_deref()
        .map(|url| {
            format!(
                r#"<a href="{}" target="_blank" rel="noreferrer">Open pull request</a>"#,
                escape(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div role="status" data-toast-id="{id}" style="position: fixed; right: 1rem; bottom: 1rem; padding: 1rem; border-left: 4px solid #28a745; background: #fff; box-shadow: 0 2px 8px rgba(0,0,0,.2);">
        <strong>New remediation shipped</strong>
        <p>{message}</p>
        {link}
    </div>
    {cue}"#,
        id = toast.id,
        message = escape(&toast.message),
        link = link,
        cue = toast_cue(toast.id),
    )
}

/// Short ping in the browser, played once per toast across page reloads
fn toast_cue(toast_id: u64) -> String {
    format!(
        r#"<script>
        (function () {{
            if (sessionStorage.getItem('remedy-toast') === '{toast_id}') {{
                return;
            }}
            sessionStorage.setItem('remedy-toast', '{toast_id}');
            const Context = window.AudioContext || window.webkitAudioContext;
            if (!Context) {{
                return;
            }}
            const ctx = new Context();
            const osc = ctx.createOscillator();
            const gain = ctx.createGain();
            osc.frequency.value = 880;
            gain.gain.setValueAtTime(0.2, ctx.currentTime);
            gain.gain.exponentialRampToValueAtTime(0.001, ctx.currentTime + 0.4);
            osc.connect(gain).connect(ctx.destination);
            osc.start();
            osc.stop(ctx.currentTime + 0.4);
        }})();
    </script>"#
    )
}

/// Colored badge for a finding severity
pub fn severity_badge(severity: &str) -> String {
    let label = crate::model::severity_label(severity);
    let (color, bg) = match label {
        "critical" => ("#ffffff", "#721c24"),
        "high" => ("#721c24", "#f8d7da"),
        "medium" => ("#856404", "#fff3cd"),
        "low" => ("#0c5460", "#d1ecf1"),
        _ => ("#383d41", "#e2e3e5"),
    };
    format!(
        r#"<span class="severity severity--{}" style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>"#,
        label,
        color,
        bg,
        escape(&severity.to_uppercase())
    )
}

/// Colored chip for a scan or pull request status
pub fn status_chip(status: &str) -> String {
    let class = status.to_lowercase();
    let (color, bg) = match class.as_str() {
        "completed" | "merged" => ("#155724", "#d4edda"),
        "failed" | "closed" => ("#721c24", "#f8d7da"),
        "running" | "open" => ("#004085", "#cce5ff"),
        _ => ("#383d41", "#e2e3e5"),
    };
    format!(
        r#"<span class="status-chip status-chip--{}" style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; color: {}; background-color: {};">{}</span>"#,
        escape(&class),
        color,
        bg,
        escape(status)
    )
}

/// Human-friendly age of the last refresh
pub fn format_relative(then_ms: Option<u64>, now_ms: u64) -> String {
    let Some(then_ms) = then_ms else {
        return "never".to_string();
    };
    let seconds = now_ms.saturating_sub(then_ms) / 1000;
    if seconds < 5 {
        return "just now".to_string();
    }
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

/// Format a server timestamp for display; unparsable input is shown as-is
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(DISPLAY).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(DISPLAY).to_string();
    }
    raw.to_string()
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map(|(i, _)| &id[..i]).unwrap_or(id)
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

fn empty_row(columns: usize, message: &str) -> String {
    format!(r#"<tr><td colspan="{columns}" style="{EMPTY}">{message}</td></tr>"#)
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
