//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::summary::{to_mb, to_mib, ResourceSummary};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Application information for list display
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub name: String,
    pub kind: String,
    pub replicas: Option<i32>,
    pub containers: Vec<String>,
    pub images: Vec<String>,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn cores(value: f64) -> String {
    format!("{:.2}", value)
}

fn mebibytes(bytes: f64) -> String {
    format!("{:.2} MiB", to_mib(bytes))
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render applications as a formatted table
    pub fn render_apps_list(&self, env: &str, namespace: &str, apps: &[AppInfo]) -> String {
        if apps.is_empty() {
            return format!("No applications found in environment '{}'", env);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("APPLICATION").set_alignment(CellAlignment::Left),
                Cell::new("KIND").set_alignment(CellAlignment::Left),
                Cell::new("REPLICAS").set_alignment(CellAlignment::Center),
                Cell::new("CONTAINERS").set_alignment(CellAlignment::Left),
                Cell::new("IMAGES").set_alignment(CellAlignment::Left),
            ]);

        for app in apps {
            table.add_row(vec![
                Cell::new(&app.name),
                Cell::new(&app.kind),
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::get_replica_icon(app.replicas),
                    StatusIcon::get_replica_text(app.replicas)
                ))
                .fg(self.theme.get_replica_color(app.replicas))
                .set_alignment(CellAlignment::Center),
                Cell::new(app.containers.join("\n")),
                Cell::new(app.images.join("\n")).fg(self.theme.image),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} ({}) {} ─╮\n",
            env,
            namespace,
            format!("[{} applications]", apps.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Running  {} Downscaled  {} Default replicas\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::DOWNSCALED.yellow(),
            StatusIcon::UNKNOWN.bright_black()
        ));

        output
    }

    /// Render per-container requests and limits followed by the totals
    pub fn render_summary(&self, summary: &ResourceSummary) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("APPLICATION").set_alignment(CellAlignment::Left),
                Cell::new("CONTAINER").set_alignment(CellAlignment::Left),
                Cell::new("CPU (min)").set_alignment(CellAlignment::Right),
                Cell::new("(max)").set_alignment(CellAlignment::Right),
                Cell::new("MEM (min)").set_alignment(CellAlignment::Right),
                Cell::new("(max)").set_alignment(CellAlignment::Right),
            ]);

        let request = self.theme.request;
        let limit = self.theme.limit;
        for row in &summary.rows {
            table.add_row(vec![
                Cell::new(&row.app),
                Cell::new(&row.container),
                Cell::new(cores(row.cpu_request))
                    .fg(request)
                    .set_alignment(CellAlignment::Right),
                Cell::new(cores(row.cpu_limit))
                    .fg(limit)
                    .set_alignment(CellAlignment::Right),
                Cell::new(mebibytes(row.memory_request))
                    .fg(request)
                    .set_alignment(CellAlignment::Right),
                Cell::new(mebibytes(row.memory_limit))
                    .fg(limit)
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        let mut totals = Table::new();
        totals
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["TOTAL", "REQUEST", "LIMIT"]);
        totals.add_row(vec![
            Cell::new("Memory [MiB]"),
            Cell::new(format!("{:.2}", to_mib(summary.memory_request))).fg(request),
            Cell::new(format!("{:.2}", to_mib(summary.memory_limit))).fg(limit),
        ]);
        totals.add_row(vec![
            Cell::new("Memory [MB]"),
            Cell::new(format!("{:.2}", to_mb(summary.memory_request))).fg(request),
            Cell::new(format!("{:.2}", to_mb(summary.memory_limit))).fg(limit),
        ]);
        totals.add_row(vec![
            Cell::new("CPU [cores]"),
            Cell::new(cores(summary.cpu_request)).fg(request),
            Cell::new(cores(summary.cpu_limit)).fg(limit),
        ]);

        let mut output = String::new();
        output.push_str(&format!("{}\n", "Table of resources (summary)".yellow()));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&totals.to_string());
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::ContainerUsage;

    #[test]
    fn test_render_empty_apps() {
        let renderer = TableRenderer::new();
        let output = renderer.render_apps_list("qa", "tsm-qa", &[]);
        assert!(output.contains("No applications found"));
    }

    #[test]
    fn test_render_single_app() {
        let renderer = TableRenderer::new();
        let apps = vec![AppInfo {
            name: "tsm-api".to_string(),
            kind: "Deployment".to_string(),
            replicas: Some(2),
            containers: vec!["api".to_string()],
            images: vec!["registry/api:1.0".to_string()],
        }];

        let output = renderer.render_apps_list("qa", "tsm-qa", &apps);
        assert!(output.contains("tsm-api"));
        assert!(output.contains("Deployment"));
        assert!(output.contains("registry/api:1.0"));
    }

    #[test]
    fn test_render_summary_totals() {
        let summary = ResourceSummary {
            rows: vec![ContainerUsage {
                app: "tsm-api".to_string(),
                container: "api".to_string(),
                cpu_request: 0.25,
                cpu_limit: 1.0,
                memory_request: 256.0 * 1024.0 * 1024.0,
                memory_limit: 512.0 * 1024.0 * 1024.0,
            }],
            cpu_request: 0.25,
            cpu_limit: 1.0,
            memory_request: 256.0 * 1024.0 * 1024.0,
            memory_limit: 512.0 * 1024.0 * 1024.0,
        };

        let output = TableRenderer::new().render_summary(&summary);
        assert!(output.contains("256.00 MiB"));
        assert!(output.contains("512.00"));
        assert!(output.contains("0.25"));
        assert!(output.contains("Memory [MB]"));
    }
}
