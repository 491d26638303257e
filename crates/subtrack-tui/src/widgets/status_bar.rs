use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use subtrack_core::motion::Clock;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
        let theme = &app.theme;

        let name_of = |id: i64| {
            app.subscriptions
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.as_str())
                .unwrap_or("subscription")
        };

        let (status_text, help_hint) = match &app.mode {
            Mode::DeleteConfirm(id) => (format!(" Delete {}?", name_of(*id)), " y:confirm n:cancel "),
            Mode::DisableConfirm(id) => {
                let verb = match app.subscriptions.iter().find(|s| s.id == *id) {
                    Some(sub) if sub.disabled => "Enable",
                    _ => "Disable",
                };
                (format!(" {} {}?", verb, name_of(*id)), " y:confirm n:cancel ")
            }
            Mode::MovePick { row_id, choice } => {
                let target = app
                    .move_choices()
                    .get(*choice)
                    .map(|(_, name)| name.to_string())
                    .unwrap_or_default();
                (
                    format!(" Move {} to: < {} >", name_of(*row_id), target),
                    " j/k:choose enter:move esc:cancel ",
                )
            }
            Mode::Normal => {
                let text = match &app.status_message {
                    Some(msg) => format!(" {}", msg),
                    None => format!(
                        " {} | {} | Subscriptions: {}",
                        app.period.label(),
                        app.category_label(),
                        app.subscriptions.len()
                    ),
                };
                (text, " q:quit j/k:move h/l:rail s:stats p:period c:category ")
            }
        };

        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let style = if app.mode != Mode::Normal {
            Style::default().fg(theme.error).bg(theme.bg2)
        } else {
            Style::default().fg(theme.fg0).bg(theme.bg2)
        };

        let line = Line::from(vec![
            Span::styled(status_text, style),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey1).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
