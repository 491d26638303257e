use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use subtrack_core::motion::{fill_at, Clock, ConicStop, CoverageTweener, Fill};

use crate::theme::Theme;

/// Inner radius as a fraction of the outer radius
const HOLE_RATIO: f64 = 0.55;

pub struct DonutChartWidget;

impl DonutChartWidget {
    /// Draw the ring as currently revealed, with `caption` in the hole
    pub fn render<C: Clock>(
        frame: &mut Frame,
        area: Rect,
        donut: &CoverageTweener<C>,
        caption: &str,
        theme: &Theme,
    ) {
        let Some(ring) = ring_rect(area) else {
            return;
        };
        let stops = donut.conic_stops();

        let lines: Vec<Line> = (0..ring.height)
            .map(|y| {
                let spans: Vec<Span> = (0..ring.width)
                    .map(|x| match cell_fill(&stops, x, y, ring.width, ring.height) {
                        Some(fill) => Span::styled("█", Style::default().fg(fill_color(theme, fill))),
                        None => Span::raw(" "),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), ring);

        let middle = Rect {
            x: ring.x,
            y: ring.y + ring.height / 2,
            width: ring.width,
            height: 1,
        };
        let label = Paragraph::new(Line::from(Span::styled(
            caption.to_string(),
            Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(label, middle);
    }
}

/// Largest roughly circular rect centred in `area`
///
/// Cells are about twice as tall as they are wide, so the rect is twice as
/// wide as it is high.
fn ring_rect(area: Rect) -> Option<Rect> {
    let height = area.height.min(area.width / 2);
    if height < 3 {
        return None;
    }
    let width = height * 2;
    Some(Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    })
}

/// Fill under cell `(x, y)` of a `width` by `height` ring, or `None` off the ring
fn cell_fill(stops: &[ConicStop], x: u16, y: u16, width: u16, height: u16) -> Option<&Fill> {
    let half_w = f64::from(width) / 2.0;
    let half_h = f64::from(height) / 2.0;
    let dx = (f64::from(x) + 0.5 - half_w) / half_w;
    let dy = (f64::from(y) + 0.5 - half_h) / half_h;
    let radius = (dx * dx + dy * dy).sqrt();
    if !(HOLE_RATIO..=1.0).contains(&radius) {
        return None;
    }
    // Clockwise from twelve o'clock
    let deg = dx.atan2(-dy).to_degrees().rem_euclid(360.0);
    fill_at(stops, deg)
}

fn fill_color(theme: &Theme, fill: &Fill) -> ratatui::style::Color {
    match fill {
        Fill::Category(hex) => theme.chart_color(hex),
        Fill::Neutral => theme.neutral,
    }
}
