use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::selector::QuizQuestion;
use crate::session::drill::Feedback;
use crate::session::quiz::QuizSession;
use crate::session::result::PracticeResult;
use crate::store::schema::MasteryKind;
use crate::ui::components::answer_box::{AnswerBox, feedback_text};
use crate::ui::theme::Theme;

/// What the learner is asked for a question, shown above the answer.
pub fn prompt_lines(question: &QuizQuestion) -> (String, Option<String>) {
    match question.kind {
        MasteryKind::Writing => (
            "Write in Korean:".to_string(),
            Some(question.word.translation.clone()),
        ),
        MasteryKind::Listening => ("Listen and write what you hear  [Tab] replay".to_string(), None),
        MasteryKind::Meaning => (
            "What does this mean?".to_string(),
            Some(question.word.hangul.clone()),
        ),
    }
}

pub struct QuizView<'a> {
    quiz: &'a QuizSession,
    theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(quiz: &'a QuizSession, theme: &'a Theme) -> Self {
        Self { quiz, theme }
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " Quiz {} · {}/{} ",
                self.quiz.level,
                (self.quiz.index() + 1).min(self.quiz.len()),
                self.quiz.len()
            ))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(question) = self.quiz.current() else {
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(5),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            format!(" {}", question.kind.label()),
            Style::default().fg(colors.accent()),
        )))
        .render(layout[0], buf);

        let (instruction, subject) = prompt_lines(question);
        let mut lines = vec![
            Line::from(Span::styled(instruction, Style::default().fg(colors.text_muted()))),
            Line::from(""),
        ];
        if let Some(subject) = subject {
            lines.push(Line::from(Span::styled(
                subject,
                Style::default()
                    .fg(colors.card_fg())
                    .add_modifier(Modifier::BOLD),
            )));
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(layout[1], buf);

        if question.kind == MasteryKind::Meaning && !question.options.is_empty() {
            self.render_options(question, layout[2], buf);
        } else {
            AnswerBox::new(&self.quiz.input, self.quiz.feedback.as_ref(), self.theme)
                .render(layout[2], buf);
        }
    }
}

impl QuizView<'_> {
    fn render_options(&self, question: &QuizQuestion, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let answer = &question.word.translation;

        let mut lines: Vec<Line> = question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let is_selected = i == self.quiz.selected_option;
                let style = match &self.quiz.feedback {
                    Some(_) if option == answer => Style::default()
                        .fg(colors.correct())
                        .add_modifier(Modifier::BOLD),
                    Some(Feedback::Incorrect { .. }) if is_selected => {
                        Style::default().fg(colors.incorrect()).bg(colors.incorrect_bg())
                    }
                    None if is_selected => Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default().fg(colors.fg()),
                };
                let indicator = if is_selected { ">" } else { " " };
                Line::from(Span::styled(format!(" {indicator} {}. {option}", i + 1), style))
            })
            .collect();

        if let Some(feedback) = &self.quiz.feedback {
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

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .title(" Choose ")
                    .border_style(Style::default().fg(colors.border_focused())),
            )
            .render(area, buf);
    }
}

/// Summary shown when a quiz is over.
pub struct ResultsPanel<'a> {
    result: &'a PracticeResult,
    best: Option<&'a PracticeResult>,
    theme: &'a Theme,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(result: &'a PracticeResult, best: Option<&'a PracticeResult>, theme: &'a Theme) -> Self {
        Self { result, best, theme }
    }
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(colors.text_muted());
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Level {}", self.result.level),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Correct    ", label),
                Span::styled(
                    self.result.correct.to_string(),
                    Style::default().fg(colors.correct()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Incorrect  ", label),
                Span::styled(
                    self.result.incorrect.to_string(),
                    Style::default().fg(colors.incorrect()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Accuracy   ", label),
                Span::styled(
                    format!("{:.0}%", self.result.accuracy() * 100.0),
                    Style::default().fg(colors.fg()),
                ),
            ]),
        ];
        if let Some(best) = self.best {
            lines.push(Line::from(vec![
                Span::styled("Best       ", label),
                Span::styled(
                    format!("{:.0}%", best.accuracy() * 100.0),
                    Style::default().fg(colors.text_muted()),
                ),
            ]));
        }
        if self.result.questions == 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Nothing left to quiz here. Every word is mastered.",
                Style::default().fg(colors.success()),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{Word, WordId};

    fn question(kind: MasteryKind) -> QuizQuestion {
        QuizQuestion {
            word: Word {
                id: WordId::new("00000000-0000-4000-8000-000000000001"),
                hangul: "물".into(),
                translation: "water".into(),
                level: "1A".into(),
                unit: 1,
                example_context: None,
                example_context_translation: None,
            },
            kind,
            options: Vec::new(),
        }
    }

    #[test]
    fn test_prompt_never_leaks_the_answer() {
        let (_, subject) = prompt_lines(&question(MasteryKind::Writing));
        assert_eq!(subject.as_deref(), Some("water"));
        let (_, subject) = prompt_lines(&question(MasteryKind::Listening));
        assert!(subject.is_none());
        let (_, subject) = prompt_lines(&question(MasteryKind::Meaning));
        assert_eq!(subject.as_deref(), Some("물"));
    }
}
