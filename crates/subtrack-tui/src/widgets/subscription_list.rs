use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use subtrack_core::motion::{Clock, SwipeRowState};
use subtrack_core::stats::SubscriptionRow;
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::theme::Theme;

pub struct SubscriptionListWidget;

impl SubscriptionListWidget {
    pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &mut App<C>) {
        app.list_area = area;
        let inner_height = area.height.saturating_sub(2) as usize;
        app.ensure_visible(inner_height);

        let block = Block::default()
            .title(format!(" Subscriptions · {} ", app.category_label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.grey0))
            .style(Style::default().bg(app.theme.bg0));
        let width = block.inner(area).width as usize;

        if app.subscriptions.is_empty() {
            let hint = Line::from(Span::styled(
                " No subscriptions yet",
                Style::default().fg(app.theme.grey1),
            ));
            frame.render_widget(Paragraph::new(hint).block(block), area);
            return;
        }

        let cell_width = app.config.ui.cell_width_px.max(1.0);
        let lines: Vec<Line> = app
            .subscriptions
            .iter()
            .enumerate()
            .skip(app.list_offset)
            .take(inner_height)
            .map(|(index, sub)| {
                let state = app.swipe.row(sub.id).map(|row| row.state()).unwrap_or(SwipeRowState {
                    offset_px: 0.0,
                    open: false,
                    dragging: false,
                });
                row_line(&app.theme, sub, &state, index == app.selected, width, cell_width)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// One list row, translated left by the swipe offset with the rail behind it
fn row_line(
    theme: &Theme,
    sub: &SubscriptionRow,
    state: &SwipeRowState,
    selected: bool,
    width: usize,
    cell_width: f64,
) -> Line<'static> {
    let shift = ((-state.offset_px / cell_width).round().max(0.0) as usize).min(width);

    let bg = if selected { theme.selection } else { theme.bg0 };
    let name_style = if sub.disabled {
        Style::default().fg(theme.disabled).bg(bg).add_modifier(Modifier::CROSSED_OUT)
    } else if selected {
        Style::default().fg(theme.fg0).bg(bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg1).bg(bg)
    };
    let dot_color = sub
        .color
        .as_deref()
        .map(|hex| theme.chart_color(hex))
        .unwrap_or(theme.bar_fallback);

    let price = format!("{} / {} ", sub.formatted_price(), sub.period_label);
    let price_width = text_width(&price);
    let name_room = width.saturating_sub(price_width + 3);
    let name = truncate(&sub.name, name_room);
    let padding = width.saturating_sub(3 + text_width(&name) + price_width);

    let content = vec![
        (" ● ".to_string(), Style::default().fg(dot_color).bg(bg)),
        (name, name_style),
        (" ".repeat(padding), Style::default().bg(bg)),
        (price, Style::default().fg(theme.grey1).bg(bg)),
    ];

    let mut spans = slice_columns(&content, shift, width - shift);
    if shift > 0 {
        let rail = rail_segments(theme, sub.disabled);
        let rail_width: usize = rail.iter().map(|(text, _)| text_width(text)).sum();
        // The rail is anchored to the right edge; expose its trailing columns
        let skip = rail_width.saturating_sub(shift);
        spans.extend(slice_columns(&rail, skip, shift));
        let filled = rail_width.min(shift);
        if filled < shift {
            spans.push(Span::styled(" ".repeat(shift - filled), Style::default().bg(theme.bg1)));
        }
    }
    Line::from(spans)
}

fn rail_segments(theme: &Theme, disabled: bool) -> Vec<(String, Style)> {
    let label = |text: &str, color| {
        (
            format!(" {} ", text),
            Style::default().fg(theme.bg0).bg(color).add_modifier(Modifier::BOLD),
        )
    };
    vec![
        label("e Edit", theme.edit),
        label("m Move", theme.mv),
        label(if disabled { "x Enable" } else { "x Disable" }, theme.disable),
        label("d Delete", theme.delete),
    ]
}

fn text_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

fn truncate(text: &str, max: usize) -> String {
    if text_width(text) <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    if max > 0 {
        out.push('…');
    }
    out
}

/// Cut `take` display columns out of styled segments, starting at column `skip`
fn slice_columns(segments: &[(String, Style)], skip: usize, take: usize) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut column = 0;
    let end = skip + take;
    for (text, style) in segments {
        let mut piece = String::new();
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if column >= skip && column + w <= end {
                piece.push(c);
            }
            column += w;
        }
        if !piece.is_empty() {
            spans.push(Span::styled(piece, *style));
        }
        if column >= end {
            break;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(segments: &[&str]) -> Vec<(String, Style)> {
        segments.iter().map(|s| (s.to_string(), Style::default())).collect()
    }

    fn joined(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_slice_columns_across_segments() {
        let segs = plain(&["abc", "def", "ghi"]);
        assert_eq!(joined(&slice_columns(&segs, 2, 5)), "cdefg");
        assert_eq!(joined(&slice_columns(&segs, 0, 9)), "abcdefghi");
        assert_eq!(joined(&slice_columns(&segs, 9, 3)), "");
    }

    #[test]
    fn test_slice_skips_split_wide_chars() {
        let segs = plain(&["a音b"]);
        // The wide char straddles the cut and is dropped
        assert_eq!(joined(&slice_columns(&segs, 2, 2)), "b");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Netflix", 10), "Netflix");
        assert_eq!(truncate("Netflix Premium", 8), "Netflix…");
        assert_eq!(text_width(&truncate("Netflix Premium", 8)), 8);
    }

    #[test]
    fn test_row_translates_by_offset() {
        let theme = Theme::default();
        let sub = SubscriptionRow {
            id: 1,
            name: "Music".to_string(),
            icon: None,
            color: Some("#ff0000".to_string()),
            price: 9.99,
            display_price: Some(9.99),
            currency_symbol: "$".to_string(),
            period_label: "1 MONTH".to_string(),
            category_id: None,
            disabled: false,
        };
        let closed = SwipeRowState {
            offset_px: 0.0,
            open: false,
            dragging: false,
        };
        let line = row_line(&theme, &sub, &closed, false, 40, 12.0);
        assert_eq!(line.width(), 40);
        assert!(joined(&line.spans).contains("Music"));

        let open = SwipeRowState {
            offset_px: -120.0,
            open: true,
            dragging: false,
        };
        let line = row_line(&theme, &sub, &open, false, 40, 12.0);
        assert_eq!(line.width(), 40);
        assert!(joined(&line.spans).ends_with("d Delete "));
    }
}
