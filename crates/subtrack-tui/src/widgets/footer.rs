use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use subtrack_core::motion::Clock;

use crate::app::App;

pub struct FooterWidget;

impl FooterWidget {
    /// "Expenses" on the left, period total and caption on the right
    pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            " Expenses",
            Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(title, halves[0]);

        let total = if app.is_loading {
            "…".to_string()
        } else {
            app.summary.formatted_total()
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("{} ", total),
                Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} ", app.period.label()),
                Style::default().fg(theme.grey1),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Right), halves[1]);
    }
}
