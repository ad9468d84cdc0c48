//! Plain-text rendering of view state.

use chrono::NaiveDate;

use crate::models::{Course, Entity, Student};
use crate::sort::{SortIcon, SortState};
use crate::views::{DeleteView, Editable, ListBody, ListState, UpdateView};

/// Display format of local dates.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Table layout of an entity.
pub trait Columns: Entity {
    /// Header label and, for sortable columns, the sort field.
    const COLUMNS: &'static [(&'static str, Option<&'static str>)];
    const TITLE: &'static str;

    fn cells(&self) -> Vec<String>;

    /// Label/value pairs of the detail view.
    fn details(&self) -> Vec<(&'static str, String)>;
}

fn id_cell(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

impl Columns for Course {
    const COLUMNS: &'static [(&'static str, Option<&'static str>)] = &[
        ("ID", Some("id")),
        ("Course Name", Some("course_name")),
        ("Start Date", Some("start_date")),
        ("End Date", Some("end_date")),
        ("Student", None),
    ];
    const TITLE: &'static str = "Courses";

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.course_name.clone().unwrap_or_default(),
            format_date(self.start_date),
            format_date(self.end_date),
            self.student_label().to_string(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_cell(self.id)),
            ("Course Name", self.course_name.clone().unwrap_or_default()),
            ("Start Date", format_date(self.start_date)),
            ("End Date", format_date(self.end_date)),
            ("Student", self.student_label().to_string()),
        ]
    }
}

impl Columns for Student {
    const COLUMNS: &'static [(&'static str, Option<&'static str>)] = &[
        ("ID", Some("id")),
        ("Reg No", Some("reg_no")),
        ("Student Name", Some("student_name")),
    ];
    const TITLE: &'static str = "Students";

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.reg_no.clone().unwrap_or_default(),
            self.student_name.clone().unwrap_or_default(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", id_cell(self.id)),
            ("Reg No", self.reg_no.clone().unwrap_or_default()),
            ("Student Name", self.student_name.clone().unwrap_or_default()),
        ]
    }
}

fn sort_marker(icon: SortIcon) -> &'static str {
    match icon {
        SortIcon::Neutral => "-",
        SortIcon::Ascending => "^",
        SortIcon::Descending => "v",
    }
}

fn header_label(label: &str, field: Option<&str>, sort: &SortState) -> String {
    match field {
        Some(field) => format!("{} [{}]", label, sort_marker(sort.icon(field))),
        None => label.to_string(),
    }
}

pub fn render_list<E: Columns>(state: &ListState<E>) -> String {
    let refresh = if state.can_refresh() {
        "[Refresh List]"
    } else {
        "[Refreshing...]"
    };
    let mut lines = vec![format!("{}  {}", E::TITLE, refresh)];
    if let Some(error) = &state.error {
        lines.push(format!("! {}", error));
    }

    match state.body() {
        ListBody::Pending => {}
        ListBody::NotFound => lines.push(format!("No {} found", E::TITLE)),
        ListBody::Table(entities) => {
            let header: Vec<String> = E::COLUMNS
                .iter()
                .map(|(label, field)| header_label(label, *field, &state.sort))
                .collect();
            let rows: Vec<Vec<String>> = entities.iter().map(|e| e.cells()).collect();
            lines.extend(table_lines(&header, &rows));
        }
    }
    join_lines(lines)
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn table_lines(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(header)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| line(row.as_slice())));
    lines
}

fn detail_lines<E: Columns>(entity: &E) -> impl Iterator<Item = String> {
    entity
        .details()
        .into_iter()
        .map(|(label, value)| format!("{:<14}{}", format!("{}:", label), value))
}

pub fn render_detail<E: Columns>(entity: &E) -> String {
    let mut lines = vec![E::TITLE.to_string()];
    lines.extend(detail_lines(entity));
    join_lines(lines)
}

pub fn render_form<E: Editable + Columns>(view: &UpdateView<E>) -> String {
    let mut lines = vec![format!("Create or edit a {}", E::TITLE)];
    if view.is_loading() {
        lines.push("Loading...".to_string());
        return join_lines(lines);
    }
    if !view.is_new() {
        lines.extend(detail_lines(view.entity()));
    }
    let options = E::selector_options(view.choices());
    if !options.is_empty() {
        lines.push("Options:".to_string());
        lines.extend(
            options
                .iter()
                .filter(|(value, _)| !value.is_empty())
                .map(|(value, label)| format!("  {} = {}", value, label)),
        );
    }
    join_lines(lines)
}

pub fn render_delete<E: Entity>(view: &DeleteView<E>) -> String {
    format!("Confirm delete operation\n{}\n[Cancel] [Delete]\n", view.question())
}
