use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Running counters for the current drill or quiz.
pub struct SessionSidebar<'a> {
    pub correct: usize,
    pub incorrect: usize,
    pub pending_sync: usize,
    pub speaking: bool,
    pub theme: &'a Theme,
}

impl<'a> SessionSidebar<'a> {
    pub fn new(correct: usize, incorrect: usize, theme: &'a Theme) -> Self {
        Self {
            correct,
            incorrect,
            pending_sync: 0,
            speaking: false,
            theme,
        }
    }

    pub fn sync(mut self, pending: usize, speaking: bool) -> Self {
        self.pending_sync = pending;
        self.speaking = speaking;
        self
    }
}

fn accuracy_text(correct: usize, incorrect: usize) -> String {
    let answered = correct + incorrect;
    if answered == 0 {
        "--".to_string()
    } else {
        format!("{:.0}%", correct as f64 * 100.0 / answered as f64)
    }
}

impl Widget for SessionSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Session ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let label = Style::default().fg(colors.text_muted());
        let mut lines = vec![
            Line::from(vec![
                Span::styled(" Correct    ", label),
                Span::styled(self.correct.to_string(), Style::default().fg(colors.correct())),
            ]),
            Line::from(vec![
                Span::styled(" Incorrect  ", label),
                Span::styled(
                    self.incorrect.to_string(),
                    Style::default().fg(colors.incorrect()),
                ),
            ]),
            Line::from(vec![
                Span::styled(" Accuracy   ", label),
                Span::styled(
                    accuracy_text(self.correct, self.incorrect),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];
        if self.pending_sync > 0 {
            lines.push(Line::from(Span::styled(
                format!(" {} unsynced", self.pending_sync),
                Style::default().fg(colors.warning()),
            )));
        }
        if self.speaking {
            lines.push(Line::from(Span::styled(
                " ♪ speaking",
                Style::default().fg(colors.accent()),
            )));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
