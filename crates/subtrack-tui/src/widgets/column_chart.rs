use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use subtrack_core::motion::{Clock, KeyedTweener};
use subtrack_core::stats::ChartItem;

use crate::theme::Theme;

/// Partial block glyphs, one eighth to seven eighths
const EIGHTHS: [char; 7] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇'];

const MIN_COLUMN_WIDTH: usize = 3;

pub struct ColumnChartWidget;

impl ColumnChartWidget {
    /// Draw one bar per item, heights taken from the tweener's displayed values
    pub fn render<C: Clock>(
        frame: &mut Frame,
        area: Rect,
        items: &[ChartItem],
        bars: &KeyedTweener<C>,
        theme: &Theme,
    ) {
        if area.height < 3 || area.width < MIN_COLUMN_WIDTH as u16 {
            return;
        }
        if items.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No spend in this period",
                Style::default().fg(theme.grey1),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(empty, area);
            return;
        }

        let width = area.width as usize;
        let capacity = (width + 1) / (MIN_COLUMN_WIDTH + 1);
        let shown = &items[..items.len().min(capacity.max(1))];
        let column = ((width + 1) / shown.len()).saturating_sub(1).max(1);

        // Value row on top, labels at the bottom
        let bar_rows = area.height as usize - 2;
        let fractions: Vec<f64> = shown.iter().map(|item| bars.fraction(&item.key)).collect();

        let mut lines = Vec::with_capacity(area.height as usize);
        lines.push(Line::from(columns(shown, column, |item, _| {
            let text = fit(&format!("{:.0}", bars.value(&item.key)), column);
            (text, Style::default().fg(theme.grey1))
        })));
        for row in 0..bar_rows {
            let level = bar_rows - row;
            lines.push(Line::from(columns(shown, column, |item, index| {
                let glyph = bar_glyph(fractions[index], bar_rows, level);
                (
                    glyph.to_string().repeat(column),
                    Style::default().fg(theme.chart_color(&item.color)),
                )
            })));
        }
        lines.push(Line::from(columns(shown, column, |item, _| {
            (fit(&item.label, column), Style::default().fg(theme.fg1))
        })));

        frame.render_widget(Paragraph::new(lines), area);
    }
}

/// Lay out one cell per item, separated by single spaces
fn columns<'a, F>(items: &'a [ChartItem], column: usize, mut cell: F) -> Vec<Span<'static>>
where
    F: FnMut(&'a ChartItem, usize) -> (String, Style),
{
    let mut spans = Vec::with_capacity(items.len() * 2);
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        let (text, style) = cell(item, index);
        spans.push(Span::styled(text, style));
    }
    spans
}

/// Glyph for row `level` (1 = bottom) of a bar filled to `fraction`
fn bar_glyph(fraction: f64, rows: usize, level: usize) -> char {
    let filled_eighths = (fraction.clamp(0.0, 1.0) * rows as f64 * 8.0).round() as usize;
    let below = (level - 1) * 8;
    if filled_eighths >= below + 8 {
        '█'
    } else if filled_eighths > below {
        EIGHTHS[filled_eighths - below - 1]
    } else {
        ' '
    }
}

/// Centre `text` in exactly `width` columns, cutting it if needed
fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{:^width$}", cut, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_glyphs() {
        // Four rows, half full: two full rows then nothing
        assert_eq!(bar_glyph(0.5, 4, 1), '█');
        assert_eq!(bar_glyph(0.5, 4, 2), '█');
        assert_eq!(bar_glyph(0.5, 4, 3), ' ');

        // One row, three eighths
        assert_eq!(bar_glyph(0.375, 1, 1), '▃');
        assert_eq!(bar_glyph(0.0, 1, 1), ' ');
        assert_eq!(bar_glyph(1.5, 2, 2), '█');
    }

    #[test]
    fn test_fit_centres_and_cuts() {
        assert_eq!(fit("ab", 4), " ab ");
        assert_eq!(fit("abcdef", 3), "abc");
    }
}
