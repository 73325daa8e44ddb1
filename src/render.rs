use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::reading_list::{Link, ReadingList, View};

pub const TABLE_TITLE: &str = "Bejeweled Reading List";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Csv,
    Jsonl,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub view: View,
    pub show_ids: bool,
    pub include_header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            view: View::Unread,
            show_ids: false,
            include_header: true,
        }
    }
}

/// One output line. Field order is the JSON key order.
#[derive(Debug, Serialize)]
struct Row<'a> {
    number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    status: &'static str,
    title: &'a str,
    url: &'a str,
}

impl<'a> Row<'a> {
    fn new(number: usize, link: &'a Link, show_ids: bool) -> Self {
        Self {
            number,
            id: show_ids.then_some(link.id.as_str()),
            status: if link.is_read() { "read" } else { "unread" },
            title: &link.title,
            url: &link.url,
        }
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.number.to_string()];
        if let Some(id) = self.id {
            cells.push(id.to_string());
        }
        cells.push(self.status.to_string());
        cells.push(self.title.to_string());
        cells.push(self.url.to_string());
        cells
    }
}

fn header(show_ids: bool, names: [&'static str; 5]) -> Vec<String> {
    let [no, id, status, title, url] = names;
    let mut cells = vec![no];
    if show_ids {
        cells.push(id);
    }
    cells.extend([status, title, url]);
    cells.into_iter().map(str::to_string).collect()
}

pub fn render_links<W: Write>(
    out: &mut W,
    list: &ReadingList,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<()> {
    let rows: Vec<Row<'_>> = list
        .numbered(options.view)
        .into_iter()
        .map(|(number, link)| Row::new(number, link, options.show_ids))
        .collect();

    match format {
        OutputFormat::Table => write_table(out, &rows, options),
        OutputFormat::Tsv => write_delimited(out, &rows, options, '\t'),
        OutputFormat::Csv => write_delimited(out, &rows, options, ','),
        OutputFormat::Jsonl => write_jsonl(out, &rows),
    }
}

fn write_table<W: Write>(out: &mut W, rows: &[Row<'_>], options: RenderOptions) -> Result<()> {
    let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    if options.include_header {
        lines.push(header(options.show_ids, ["No", "ID", "Status", "Title", "URL"]));
    }
    lines.extend(
        rows.iter()
            .map(|row| row.cells().iter().map(|c| single_line(c)).collect::<Vec<String>>()),
    );

    let columns = lines.first().map(Vec::len).unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            lines
                .iter()
                .map(|line| line[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    if options.include_header {
        writeln!(out, "{}", TABLE_TITLE)?;
    }
    for line in &lines {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        writeln!(out, "{}", padded.join("  ").trim_end())?;
    }
    Ok(())
}

fn write_delimited<W: Write>(
    out: &mut W,
    rows: &[Row<'_>],
    options: RenderOptions,
    delimiter: char,
) -> Result<()> {
    let encode = |cell: &str| -> String {
        if delimiter == ',' {
            csv_field(cell)
        } else {
            single_line(cell)
        }
    };

    if options.include_header {
        let names = header(options.show_ids, ["no", "id", "status", "title", "url"]);
        writeln!(out, "{}", names.join(&delimiter.to_string()))?;
    }
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| encode(c.as_str())).collect();
        writeln!(out, "{}", cells.join(&delimiter.to_string()))?;
    }
    Ok(())
}

fn write_jsonl<W: Write>(out: &mut W, rows: &[Row<'_>]) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Tabs and line breaks would split a tsv/table row.
fn single_line(cell: &str) -> String {
    cell.replace(['\t', '\r', '\n'], " ")
}

fn csv_field(cell: &str) -> String {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
