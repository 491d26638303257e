use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear},
    Frame,
};
use subtrack_core::motion::Clock;

use super::{ColumnChartWidget, DonutChartWidget};
use crate::app::{App, SheetTab};

/// Share of the content area the open sheet covers
const SHEET_HEIGHT_RATIO: f64 = 0.8;

pub struct StatsSheetWidget;

impl StatsSheetWidget {
    pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let Some(sheet_area) = sheet_rect(area, app.sheet.translate_y_fraction()) else {
            return;
        };
        let theme = &app.theme;

        let mut block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg1));

        // Header chrome waits until the sheet has fully arrived
        if app.sheet.is_fully_open() {
            block = block.title(header(app));
        }

        let inner = block.inner(sheet_area);
        frame.render_widget(Clear, sheet_area);
        frame.render_widget(block, sheet_area);

        match app.tab {
            SheetTab::All => {
                ColumnChartWidget::render(frame, inner, &app.summary_items(), &app.bars, theme);
            }
            SheetTab::ByCategory => {
                let halves = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(inner);
                DonutChartWidget::render(
                    frame,
                    halves[0],
                    &app.donut,
                    &app.summary.formatted_total(),
                    theme,
                );
                ColumnChartWidget::render(
                    frame,
                    halves[1],
                    &app.category_items(),
                    &app.category_bars,
                    theme,
                );
            }
        }
    }
}

fn header<C: Clock>(app: &App<C>) -> Line<'static> {
    let theme = &app.theme;
    let tab = |label: &'static str, active: bool| {
        let style = if active {
            Style::default().fg(theme.bg0).bg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.grey1)
        };
        Span::styled(label, style)
    };
    Line::from(vec![
        Span::styled(" Statistics ", Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD)),
        tab(" 1 All ", app.tab == SheetTab::All),
        Span::raw(" "),
        tab(" 2 By category ", app.tab == SheetTab::ByCategory),
        Span::styled(
            format!("  {} · {} ", app.period.label(), app.category_label()),
            Style::default().fg(theme.grey1),
        ),
    ])
}

/// Bottom-anchored sheet rect slid down by `translate` of its height
fn sheet_rect(area: Rect, translate: f64) -> Option<Rect> {
    let full = ((f64::from(area.height) * SHEET_HEIGHT_RATIO).round() as u16).min(area.height);
    let hidden = (f64::from(full) * translate.clamp(0.0, 1.0)).round() as u16;
    let visible = full.saturating_sub(hidden);
    if visible == 0 {
        return None;
    }
    Some(Rect {
        x: area.x,
        y: area.y + area.height - visible,
        width: area.width,
        height: visible,
    })
}
