//! Render the due-for-release list for people and for machines

use crate::error::{PlanningError, Result};
use crate::types::ReleaseCandidate;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

/// File name of the HTML report
pub const HTML_REPORT: &str = "ModulesRelease.html";

/// File name of the JSON report
pub const JSON_REPORT: &str = "ModulesRelease.json";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One terminal line per due module
pub fn summary_lines(due: &[ReleaseCandidate]) -> Vec<String> {
    due.iter()
        .map(|c| {
            let mut line = format!(
                "{} is due for release. Last release was tagged on {} and there have been {} commits since then.",
                c.repo,
                c.date.format(DATE_FORMAT),
                c.commits
            );
            if let Some(maintenance) = c.maintenance_commits {
                line.push_str(&format!(" {} of them are maintenance commits.", maintenance));
            }
            line
        })
        .collect()
}

/// Machine-readable dump of the due modules
pub fn render_json(due: &[ReleaseCandidate]) -> Result<String> {
    Ok(serde_json::to_string_pretty(due)?)
}

/// Sortable, searchable HTML table of the due modules
pub fn render_html<W: Write>(due: &[ReleaseCandidate], html: &mut W) -> fmt::Result {
    let with_maintenance = due.iter().any(|c| c.maintenance_commits.is_some());
    let with_downloads = due.iter().any(|c| c.downloads.is_some());

    html.write_str("<!DOCTYPE html>\n<html>\n<head>\n")?;
    html.write_str("<meta charset=\"utf-8\">\n<title>Modules Requiring Release</title>\n")?;
    html.write_str("<script src=\"https://ajax.googleapis.com/ajax/libs/jquery/3.4.1/jquery.min.js\"></script>\n")?;
    html.write_str("<script src=\"https://cdn.datatables.net/1.10.20/js/jquery.dataTables.js\"></script>\n")?;
    html.write_str("<link rel=\"stylesheet\" href=\"https://cdn.datatables.net/1.10.20/css/jquery.dataTables.css\">\n")?;
    html.write_str("<script>$(document).ready(function () { $('#id_table').DataTable(); });</script>\n")?;
    html.write_str("</head>\n<body>\n<h2>Modules Requiring Release</h2>\n")?;
    html.write_str("<table id=\"id_table\" class=\"display\" style=\"width:100%\">\n<thead>\n<tr>\n")?;
    html.write_str("<th>Module Name</th>\n<th>Last Release Tag Date</th>\n<th>Commits Since Then</th>\n")?;
    if with_maintenance {
        html.write_str("<th>Maintenance Commits</th>\n")?;
    }
    if with_downloads {
        html.write_str("<th>Number of Downloads</th>\n")?;
    }
    html.write_str("</tr>\n</thead>\n<tbody>\n")?;

    for c in due {
        write!(
            html,
            "<tr>\n<td>{}</td>\n<td>{}</td>\n<td align=\"center\">{}</td>\n",
            escape_html(&c.repo),
            c.date.format(DATE_FORMAT),
            c.commits
        )?;
        if with_maintenance {
            let maintenance = optional(c.maintenance_commits);
            writeln!(html, "<td align=\"center\">{}</td>", maintenance)?;
        }
        if with_downloads {
            writeln!(html, "<td align=\"center\">{}</td>", optional(c.downloads))?;
        }
        html.write_str("</tr>\n")?;
    }

    html.write_str("</tbody>\n</table>\n</body>\n</html>\n")
}

/// Outcome of writing one report artifact
#[derive(Debug)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub result: Result<()>,
}

/// Write the HTML and JSON reports into `dir`.
///
/// Each artifact is attempted on its own; one failing does not stop the other.
pub fn write_reports(due: &[ReleaseCandidate], dir: &Path) -> Vec<WrittenReport> {
    let html_path = dir.join(HTML_REPORT);
    let json_path = dir.join(JSON_REPORT);

    let mut html = String::new();
    let html_result = render_html(due, &mut html)
        .map_err(PlanningError::from)
        .and_then(|()| write_artifact(&html_path, &html));
    let json_result = render_json(due).and_then(|json| write_artifact(&json_path, &json));

    vec![
        WrittenReport {
            path: html_path,
            result: html_result,
        },
        WrittenReport {
            path: json_path,
            result: json_result,
        },
    ]
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| PlanningError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
