//! Frame rendering
//!
//! Layout: header (view tabs + job badge), body (active view), footer
//! (latest notice + key hints).

use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};

use crate::console::{Console, NoticeLevel, View};
use crate::model::{ConfigField, Side};
use crate::ui::present::{self, ResultDisplay, Tone};
use crate::ui::state::UiState;

/// Log lines shown in the transfer view
const LOG_TAIL: usize = 200;

pub fn render<B: Backend>(
    terminal: &mut Terminal<B>,
    console: &Console,
    ui: &UiState,
) -> std::io::Result<()> {
    terminal.draw(|f| draw(f, console, ui))?;
    Ok(())
}

/// Draw one frame
pub fn draw(f: &mut Frame, console: &Console, ui: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, console, chunks[0]);
    match console.view() {
        View::Transfer => render_transfer(f, console, ui, chunks[1]),
        View::Query => render_query(f, console, chunks[1]),
        View::Audit => render_audit(f, console, ui, chunks[1]),
    }
    render_footer(f, console, chunks[2]);
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Success => Style::default().fg(Color::Green),
        Tone::Error => Style::default().fg(Color::Red),
        Tone::Warning => Style::default().fg(Color::Yellow),
        Tone::Neutral => Style::default().fg(Color::Gray),
    }
}

fn label_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn render_header(f: &mut Frame, console: &Console, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(20)])
        .split(area);

    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("F{} {}", i + 1, view.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(console.view().index())
        .block(Block::default().borders(Borders::ALL).title(" HashBridge "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let progress = console.transfer().progress();
    let badge = Paragraph::new(Line::from(Span::styled(
        present::status_badge(progress).to_uppercase(),
        tone_style(present::status_badge_tone(progress)).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Job "));
    f.render_widget(badge, chunks[1]);
}

fn render_footer(f: &mut Frame, console: &Console, area: Rect) {
    let hints = match console.view() {
        View::Transfer => {
            "Tab/↑↓ field · ^S start · ^T test · ^X stop poll · ^W resume · ^D report · ^Q quit"
        }
        View::Query => "Enter newline · ^E/F5 run · ^O target · ^Q quit",
        View::Audit => "^R refresh · ↑↓ scroll · ^Q quit",
    };
    let notice = match console.latest_notice() {
        Some(notice) => {
            let style = match notice.level {
                NoticeLevel::Info => Style::default(),
                NoticeLevel::Warn => tone_style(Tone::Warning),
                NoticeLevel::Error => tone_style(Tone::Error),
            };
            Line::from(vec![
                Span::styled(notice.at.format("%H:%M:%S ").to_string(), label_style()),
                Span::styled(notice.text.clone(), style),
            ])
        }
        None => Line::from(""),
    };
    let footer = Paragraph::new(vec![notice, Line::from(Span::styled(hints, label_style()))]);
    f.render_widget(footer, area);
}

// ---- transfer view ----

fn render_transfer(f: &mut Frame, console: &Console, ui: &UiState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    render_endpoint_form(f, console, ui, Side::Source, form[0]);
    render_endpoint_form(f, console, ui, Side::Destination, form[1]);
    render_test_result(f, console, form[2]);
    render_progress(f, console, columns[1]);
}

fn render_endpoint_form(f: &mut Frame, console: &Console, ui: &UiState, side: Side, area: Rect) {
    let focused = ui.focused_field();
    let lines: Vec<Line> = ConfigField::ALL
        .iter()
        .filter(|field| field.side == side)
        .map(|field| {
            let text = console.config().text(*field);
            let shown = if field.is_secret() {
                "•".repeat(text.chars().count())
            } else {
                text
            };
            let is_focused = *field == focused;
            let value_style = if is_focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = if is_focused { "▏" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<13}", field.field.label()), label_style()),
                Span::styled(shown, value_style),
                Span::styled(cursor, value_style),
            ])
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", side.label()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_test_result(f: &mut Frame, console: &Console, area: Rect) {
    let line = match console.tester().result() {
        Some(result) => Line::from(Span::styled(
            result.message.clone(),
            tone_style(present::test_result_tone(result)),
        )),
        None => Line::from(Span::styled("^T to test both connections", label_style())),
    };
    let block = Block::default().borders(Borders::ALL).title(" Connection Test ");
    f.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_progress(f: &mut Frame, console: &Console, area: Rect) {
    let transfer = console.transfer();
    let mut lines = Vec::new();

    match transfer.progress() {
        Some(progress) => {
            lines.push(Line::from(vec![
                Span::styled("Step: ", label_style()),
                Span::raw(progress.current_step.clone()),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            "No transfer observed yet. ^S to start.",
            label_style(),
        ))),
    }

    let polling = if transfer.is_submitting() {
        "submitting".to_string()
    } else if transfer.is_polling() {
        "active".to_string()
    } else {
        match transfer.last_stop() {
            Some(reason) => format!("stopped ({})", reason.describe()),
            None => "idle".to_string(),
        }
    };
    lines.push(Line::from(vec![
        Span::styled("Polling: ", label_style()),
        Span::raw(polling),
    ]));

    if let Some(summary) = present::transfer_summary(transfer.progress()) {
        let (verdict, tone) = if summary.integrity_passed {
            ("integrity check passed", Tone::Success)
        } else {
            ("integrity check FAILED", Tone::Error)
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            verdict,
            tone_style(tone).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::styled("Hash before: ", label_style()),
            Span::raw(summary.hash_before),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Hash after:  ", label_style()),
            Span::raw(summary.hash_after),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Report: ", label_style()),
            Span::raw(console.report().url()),
            Span::styled(" (^D to save)", label_style()),
        ]));
    }

    if let Some(progress) = transfer.progress() {
        lines.push(Line::from(""));
        let skip = progress.logs.len().saturating_sub(LOG_TAIL);
        for log in progress.logs.iter().skip(skip) {
            let style = if log.starts_with("ERROR") {
                tone_style(Tone::Error)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(log.clone(), style)));
        }
    }

    // Keep the newest log lines in view
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let block = Block::default().borders(Borders::ALL).title(" Transfer Progress ");
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

// ---- query view ----

fn render_query(f: &mut Frame, console: &Console, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let query = console.query();
    let title = format!(
        " SQL → {}{} ",
        query.target().label(),
        if query.is_loading() { " · running..." } else { "" }
    );
    let editor = Paragraph::new(format!("{}▏", query.query()))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(editor, chunks[0]);

    let block = Block::default().borders(Borders::ALL).title(" Result ");
    let Some(outcome) = query.outcome() else {
        f.render_widget(
            Paragraph::new(Span::styled("^E or F5 to run the statement", label_style()))
                .block(block),
            chunks[1],
        );
        return;
    };

    match present::present_outcome(outcome) {
        ResultDisplay::Error(message) => f.render_widget(
            Paragraph::new(Span::styled(message, tone_style(Tone::Error)))
                .block(block)
                .wrap(Wrap { trim: false }),
            chunks[1],
        ),
        ResultDisplay::NoRecords => f.render_widget(
            Paragraph::new(present::NO_RECORDS).block(block),
            chunks[1],
        ),
        ResultDisplay::Table { header, rows } => {
            let widths = vec![Constraint::Fill(1); header.len()];
            let header = Row::new(header.into_iter().map(Cell::from))
                .style(Style::default().add_modifier(Modifier::BOLD));
            let rows = rows
                .into_iter()
                .map(|row| Row::new(row.into_iter().map(Cell::from)));
            let title = format!(" Result ({} rows) ", rows.len());
            f.render_widget(
                Table::new(rows, widths)
                    .header(header)
                    .block(Block::default().borders(Borders::ALL).title(title)),
                chunks[1],
            );
        }
        ResultDisplay::Structured(text) => f.render_widget(
            Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
            chunks[1],
        ),
    }
}

// ---- audit view ----

fn render_audit(f: &mut Frame, console: &Console, ui: &UiState, area: Rect) {
    let audit = console.audit();
    let mut title = String::from(" Audit Trail");
    if let Some(report) = audit.chain() {
        title.push_str(&format!(" · {}", report.summary()));
    }
    if audit.is_loading() {
        title.push_str(" · loading...");
    }
    title.push(' ');

    let mut block = Block::default().borders(Borders::ALL).title(title);
    if let Some(err) = audit.last_error() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" refresh failed: {} ", err),
            tone_style(Tone::Warning),
        )));
    }

    if audit.entries().is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No audit entries yet.", label_style())).block(block),
            area,
        );
        return;
    }

    let header = Row::new(["Timestamp", "Status", "Current hash", "Previous hash"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = audit
        .entries()
        .iter()
        .skip(ui.audit_offset(audit.entries().len()))
        .map(|entry| {
            let row = present::audit_row(entry);
            Row::new(vec![
                Cell::from(row.timestamp),
                Cell::from(Span::styled(row.status, tone_style(row.tone))),
                Cell::from(row.current_hash),
                Cell::from(row.previous_hash),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(19),
        Constraint::Length(8),
        Constraint::Length(64),
        Constraint::Length(19),
    ];
    f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
