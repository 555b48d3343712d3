//! Output formatting for analysis results

use crate::error::{Error, Result};
use crate::model::{PluginInfo, SiteInfo};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL,
};
use std::io::Write;
use std::str::FromStr;

/// Placeholder for unknown values in tables
const UNKNOWN: &str = "-";

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable table output
    #[default]
    Human,
    /// JSON output
    Json,
    /// No output (silent mode)
    None,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "none" => Ok(Self::None),
            _ => Err(Error::InvalidOutputFormat(s.to_string())),
        }
    }
}

/// Output the analysis results
pub fn output_site_info<W: Write>(
    site: &SiteInfo,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Human => output_human(site, writer),
        OutputFormat::Json => output_json(site, writer),
        OutputFormat::None => Ok(()),
    }
}

/// Output JSON format
fn output_json<W: Write>(site: &SiteInfo, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, site)?;
    writeln!(writer).map_err(Error::OutputFailed)?;
    Ok(())
}

/// Output human-readable table format
fn output_human<W: Write>(site: &SiteInfo, writer: &mut W) -> Result<()> {
    let mut summary = new_table(&["Property", "Value"]);
    summary.add_row(vec![Cell::new("URL"), Cell::new(&site.url)]);
    summary.add_row(vec![Cell::new("WordPress"), yes_no(site.is_wordpress)]);

    if !site.is_wordpress {
        writeln!(writer, "{}", summary).map_err(Error::OutputFailed)?;
        return write_duration(site, writer);
    }

    let version = site
        .wordpress_version
        .as_ref()
        .map(|v| format!("{} (from {})", v.version, v.detected_from))
        .unwrap_or_else(|| UNKNOWN.to_string());
    summary.add_row(vec![Cell::new("Version"), Cell::new(version)]);

    match &site.theme {
        Some(theme) => {
            let version = theme.version.as_deref().unwrap_or(UNKNOWN);
            summary.add_row(vec![
                Cell::new("Theme"),
                Cell::new(format!("{} ({}) {}", theme.name, theme.slug, version)),
            ]);
            if let Some(author) = &theme.author {
                summary.add_row(vec![Cell::new("Theme author"), Cell::new(author)]);
            }
        }
        None => {
            summary.add_row(vec![Cell::new("Theme"), Cell::new(UNKNOWN)]);
        }
    }

    if let Some(server) = &site.server_info {
        if let Some(software) = &server.server {
            summary.add_row(vec![Cell::new("Server"), Cell::new(software)]);
        }
        if let Some(php) = &server.php_version {
            summary.add_row(vec![Cell::new("PHP"), Cell::new(&php.version)]);
        }
    }

    if let Some(security) = &site.security_info {
        summary.add_row(vec![Cell::new("XML-RPC enabled"), flag(security.xmlrpc_enabled)]);
        summary.add_row(vec![Cell::new("REST API exposed"), flag(security.wp_json_exposed)]);
        summary.add_row(vec![
            Cell::new("readme.html accessible"),
            flag(security.readme_accessible),
        ]);
        summary.add_row(vec![Cell::new("Directory listing"), flag(security.directory_listing)]);
    }

    if let Some(title) = site.metadata.as_ref().and_then(|m| m.title.as_ref()) {
        summary.add_row(vec![Cell::new("Title"), Cell::new(title)]);
    }

    writeln!(writer, "{}", summary).map_err(Error::OutputFailed)?;

    let mut plugins = new_table(&["Plugin", "Name", "Version", "Description"]);
    if site.plugins.is_empty() {
        plugins.add_row(vec![UNKNOWN, UNKNOWN, UNKNOWN, UNKNOWN]);
    } else {
        for plugin in &site.plugins {
            add_plugin_row(&mut plugins, plugin);
        }
    }
    writeln!(writer, "{}", plugins).map_err(Error::OutputFailed)?;

    write_duration(site, writer)
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    table
}

fn add_plugin_row(table: &mut Table, plugin: &PluginInfo) {
    table.add_row(vec![
        Cell::new(&plugin.slug),
        Cell::new(&plugin.name),
        Cell::new(plugin.version.as_deref().unwrap_or(UNKNOWN)),
        Cell::new(plugin.description.as_deref().unwrap_or(UNKNOWN)),
    ]);
}

fn yes_no(value: bool) -> Cell {
    if value {
        Cell::new("Yes").fg(Color::Green)
    } else {
        Cell::new("No").fg(Color::DarkGrey)
    }
}

/// Security flag; `true` is the exposed (worse) state
fn flag(exposed: bool) -> Cell {
    let cell = if exposed {
        Cell::new("Yes").fg(Color::Yellow)
    } else {
        Cell::new("No").fg(Color::Green)
    };
    cell.set_alignment(CellAlignment::Center)
}

fn write_duration<W: Write>(site: &SiteInfo, writer: &mut W) -> Result<()> {
    if let Some(ms) = site.scan_duration_ms {
        writeln!(writer, "Scan took {} ms", ms).map_err(Error::OutputFailed)?;
    }
    Ok(())
}
