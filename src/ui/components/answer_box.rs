use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::drill::Feedback;
use crate::session::input::AnswerInput;
use crate::ui::theme::Theme;

/// The composed answer with a cursor, plus the verdict once it is graded.
pub struct AnswerBox<'a> {
    input: &'a AnswerInput,
    feedback: Option<&'a Feedback>,
    theme: &'a Theme,
}

impl<'a> AnswerBox<'a> {
    pub fn new(input: &'a AnswerInput, feedback: Option<&'a Feedback>, theme: &'a Theme) -> Self {
        Self {
            input,
            feedback,
            theme,
        }
    }
}

pub fn feedback_text(feedback: &Feedback) -> String {
    match feedback {
        Feedback::Correct => "정답! Correct".to_string(),
        Feedback::Incorrect { expected } => format!("Not quite. Answer: {expected}"),
    }
}

impl Widget for AnswerBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = match self.feedback {
            Some(Feedback::Correct) => colors.correct(),
            Some(Feedback::Incorrect { .. }) => colors.incorrect(),
            None => colors.border_focused(),
        };
        let title = if self.input.shift_latched {
            " Answer ⇧ "
        } else {
            " Answer "
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let text_style = match self.feedback {
            Some(Feedback::Correct) => Style::default()
                .fg(colors.correct())
                .add_modifier(Modifier::BOLD),
            Some(Feedback::Incorrect { .. }) => Style::default()
                .fg(colors.incorrect())
                .bg(colors.incorrect_bg())
                .add_modifier(Modifier::CROSSED_OUT),
            None => Style::default().fg(colors.fg()),
        };

        let mut answer = vec![Span::raw(" "), Span::styled(self.input.text(), text_style)];
        if !self.input.locked {
            answer.push(Span::styled(
                " ",
                Style::default().bg(colors.card_fg()),
            ));
        }
        let mut lines = vec![Line::from(answer)];

        match self.feedback {
            Some(feedback) => {
                let color = match feedback {
                    Feedback::Correct => colors.success(),
                    Feedback::Incorrect { .. } => colors.error(),
                };
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(" {}", feedback_text(feedback)),
                    Style::default().fg(color),
                )));
            }
            None if self.input.is_empty() => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    " Type with the dubeolsik layout, Enter to check",
                    Style::default().fg(colors.text_muted()),
                )));
            }
            None => {}
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_text() {
        assert_eq!(feedback_text(&Feedback::Correct), "정답! Correct");
        assert_eq!(
            feedback_text(&Feedback::Incorrect {
                expected: "물".into()
            }),
            "Not quite. Answer: 물"
        );
    }
}
