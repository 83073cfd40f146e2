//! Layout and rendering for the terminal dashboard.
//!
//! Top to bottom: title, progress chart, task and worker tables side by side,
//! status line.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::{Dashboard, ProgressChart, TaskTable, WorkerTable};
use crate::poller::PollCounts;

const PROGRESS_COLOR: Color = Color::Rgb(0x4C, 0xAF, 0x50);

/// Everything the status line shows that does not live on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub source: String,
    pub counts: PollCounts,
    pub in_flight: usize,
}

pub fn draw(f: &mut Frame, dashboard: &Dashboard, status: &StatusLine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(5), // Progress chart
            Constraint::Min(0),    // Tables
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_title(f, chunks[0]);
    draw_progress(f, &dashboard.progress, chunks[1]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    draw_tasks(f, &dashboard.tasks, tables[0]);
    draw_workers(f, &dashboard.workers, tables[1]);

    draw_status_bar(f, dashboard.rendered_at(), status, chunks[3]);
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " taskboard ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  job queue dashboard   "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

fn draw_progress(f: &mut Frame, chart: &ProgressChart, area: Rect) {
    let bar = Bar::default()
        .label(Line::from(chart.label()))
        .value(chart.bar_value())
        .text_value(format!("{}%", format_progress(chart.value())))
        .style(Style::default().fg(PROGRESS_COLOR))
        .value_style(Style::default().fg(Color::Black).bg(PROGRESS_COLOR));

    let widget = BarChart::default()
        .block(
            Block::default()
                .title(format!(" {} ", chart.dataset_label()))
                .borders(Borders::ALL),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(chart.max() as u64)
        .data(BarGroup::default().bars(&[bar]));
    f.render_widget(widget, area);
}

fn header(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn draw_tasks(f: &mut Frame, tasks: &TaskTable, area: Rect) {
    let rows = tasks.rows().iter().map(|task| {
        Row::new(vec![
            Cell::from(task.id.clone()),
            Cell::from(task.kind.clone()),
            Cell::from(task.status.clone()).style(Style::default().fg(status_color(&task.status))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(12),
        ],
    )
    .header(header(&["ID", "Type", "Status"]))
    .block(
        Block::default()
            .title(format!(" Tasks ({}) ", tasks.len()))
            .borders(Borders::ALL),
    );
    f.render_widget(table, area);
}

fn draw_workers(f: &mut Frame, workers: &WorkerTable, area: Rect) {
    let rows = workers.rows().iter().map(|worker| {
        Row::new(vec![
            Cell::from(worker.id.clone()),
            Cell::from(worker.tasks_assigned.clone()),
        ])
    });

    let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(16)])
        .header(header(&["ID", "Tasks Assigned"]))
        .block(
            Block::default()
                .title(format!(" Workers ({}) ", workers.len()))
                .borders(Borders::ALL),
        );
    f.render_widget(table, area);
}

fn draw_status_bar(
    f: &mut Frame,
    rendered_at: Option<DateTime<Utc>>,
    status: &StatusLine,
    area: Rect,
) {
    let updated = match rendered_at {
        Some(at) => at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "never".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", status.source),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("| updated {updated} ")),
        Span::raw(format!(
            "| ok {} failed {} ",
            status.counts.rendered, status.counts.failed
        )),
    ];
    if status.counts.skipped > 0 {
        spans.push(Span::raw(format!("skipped {} ", status.counts.skipped)));
    }
    if status.in_flight > 0 {
        spans.push(Span::styled(
            format!("| {} in flight", status.in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

/// Whole numbers print without a fraction, everything else with one decimal.
pub fn format_progress(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn status_color(status: &str) -> Color {
    match status {
        "done" | "completed" => Color::Green,
        "in-progress" | "running" => Color::Yellow,
        "failed" => Color::Red,
        _ => Color::Gray,
    }
}
