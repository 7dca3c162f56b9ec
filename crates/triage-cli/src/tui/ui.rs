//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  GC-FL  #/            Home · Dashboard · ...  │
//! ├──────────────────────┬───────────────────────┤
//! │  Federated ...       │  Loss           AUC   │
//! │  Try the prototype   │   \__               •  │
//! │  Image path: _       │      \____  ___/      │
//! │  No result yet.      │  Synthetic metrics    │
//! ├──────────────────────┴───────────────────────┤
//! │  F1 home  F2 dashboard ...  Enter submit      │
//! └──────────────────────────────────────────────┘
//!
//! The chart pane replays the core's draw operations onto a braille canvas.
//! Chart coordinates grow downward, canvas coordinates grow upward, so every
//! y is flipped against the logical height.

use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::{prelude::*, widgets::*};
use triage_core::DrawOp;
use triage_core::chart::Curve;

use super::app::App;
use crate::commands::{nav_key, view_lines};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title + nav
            Constraint::Min(10),   // main
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_status(f, rows[2], app);
    draw_keys(f, rows[3]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let core = app.core();
    let mut spans = vec![
        Span::styled(" GC-FL ", Style::default().bold().fg(Color::Cyan)),
        Span::styled(
            format!(" {} ", core.fragment()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("   "),
    ];
    for link in triage_core::nav_links(core.is_authenticated()) {
        spans.push(Span::styled(
            format!("{} ", nav_key(*link)),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(format!("{}   ", link.label())));
    }
    if let Some(session) = core.session() {
        spans.push(Span::styled(
            session.user.email.clone(),
            Style::default().fg(Color::Green),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(spans));
    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    if view.has_chart() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);
        draw_view(f, cols[0], app);
        draw_chart(f, cols[1], app);
    } else {
        draw_view(f, area, app);
    }
}

fn draw_view(f: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    let lines = view_lines(&view);
    let mut text: Vec<Line> = Vec::with_capacity(lines.len() + app.fields().len() * 2);

    let mut iter = lines.into_iter();
    if let Some(title) = iter.next() {
        text.push(Line::from(Span::styled(
            title,
            Style::default().bold().fg(Color::White),
        )));
    }
    for line in iter {
        let style = if line.starts_with("  !") {
            Style::default().fg(Color::Red)
        } else if line.contains("[Gastric cancer]") {
            Style::default().fg(Color::Magenta).bold()
        } else {
            Style::default()
        };
        text.push(Line::from(Span::styled(line, style)));
    }

    if !app.fields().is_empty() {
        text.push(Line::raw(""));
        for (i, field) in app.fields().iter().enumerate() {
            let focused = i == app.focus();
            let pointer = if focused { "▸" } else { " " };
            let style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            let cursor = if focused { "_" } else { "" };
            text.push(Line::from(vec![
                Span::styled(format!("{pointer} {:<17}", field.label), style),
                Span::raw(format!("{}{cursor}", field.display())),
            ]));
        }
    }

    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn curve_color(curve: Curve) -> Color {
    match curve {
        Curve::Loss => Color::Cyan,
        Curve::Score => Color::Green,
    }
}

/// Replay one draw operation onto the canvas, flipping y against `h`.
fn paint_op(ctx: &mut Context, op: &DrawOp, h: f64) {
    match op {
        DrawOp::Clear { .. } => {}
        DrawOp::GridLine { from, to } => ctx.draw(&CanvasLine::new(
            from.x,
            h - from.y,
            to.x,
            h - to.y,
            Color::DarkGray,
        )),
        DrawOp::Area { curve: _, polygon } => {
            // Last two vertices close the shape along the baseline.
            let Some(base) = polygon.last() else {
                return;
            };
            let edge = polygon.len().saturating_sub(2);
            for p in &polygon[..edge] {
                ctx.draw(&CanvasLine::new(
                    p.x,
                    h - p.y,
                    p.x,
                    h - base.y,
                    Color::Rgb(20, 60, 80),
                ));
            }
        }
        DrawOp::Stroke { curve, points } => {
            for pair in points.windows(2) {
                ctx.draw(&CanvasLine::new(
                    pair[0].x,
                    h - pair[0].y,
                    pair[1].x,
                    h - pair[1].y,
                    curve_color(*curve),
                ));
            }
        }
        DrawOp::Marker { curve, at, radius } => ctx.draw(&Circle {
            x: at.x,
            y: h - at.y,
            radius: *radius,
            color: curve_color(*curve),
        }),
        DrawOp::Text { text, at } => {
            ctx.print(at.x, h - at.y, Span::styled(*text, Style::default().fg(Color::Gray)))
        }
    }
}

fn draw_chart(f: &mut Frame, area: Rect, app: &App) {
    let Some(chart) = app.core().chart() else {
        return;
    };
    let geo = chart.geometry();
    let (w, h) = (geo.width(), geo.height());
    let ops = chart.surface().ops();

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} · {}/{} ",
            triage_core::view::CHART_HELP,
            chart.visible(),
            geo.steps()
        )))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(move |ctx| {
            for op in ops {
                // Fills sit beneath the strokes.
                if matches!(op, DrawOp::Area { .. }) {
                    paint_op(ctx, op, h);
                    ctx.layer();
                }
            }
            for op in ops {
                if !matches!(op, DrawOp::Area { .. }) {
                    paint_op(ctx, op, h);
                }
            }
        });
    f.render_widget(canvas, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.status() {
        Some(s) => s.to_string(),
        None if app.core().is_busy() => triage_core::view::STATUS_RUNNING.to_string(),
        None => String::new(),
    };
    let p = Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::Yellow));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(
        " F1 home  F2 dashboard  F3 login  F4 signup  F5 privacy  F6 result  F10 logout   Tab field   Enter submit   Esc quit",
    )
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
