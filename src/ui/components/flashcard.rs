use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::flashcards::FlashcardSession;
use crate::ui::theme::Theme;

pub struct FlashcardView<'a> {
    session: &'a FlashcardSession,
    theme: &'a Theme,
}

impl<'a> FlashcardView<'a> {
    pub fn new(session: &'a FlashcardSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for FlashcardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.session.is_finished() {
            " Flashcards ".to_string()
        } else {
            format!(
                " Card {} / {} ",
                self.session.position(),
                self.session.remaining()
            )
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.card_bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(word) = self.session.current() else {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "축하해요! Every card in this level is learned.",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press [r] to put every card back in the deck.",
                    Style::default().fg(colors.text_muted()),
                )),
            ];
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let face = self.session.visible_side().unwrap_or_default();
        Paragraph::new(Line::from(Span::styled(
            face,
            Style::default()
                .fg(colors.card_fg())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let side = if self.session.is_flipped() { "back" } else { "front" };
        Paragraph::new(Line::from(Span::styled(
            format!("({side})"),
            Style::default().fg(colors.text_muted()),
        )))
        .alignment(Alignment::Center)
        .render(layout[2], buf);

        // The example sentence belongs to the back of the card.
        if self.session.is_flipped()
            && let Some(example) = word.example_context.as_deref()
        {
            let mut lines = vec![Line::from(Span::styled(
                example,
                Style::default().fg(colors.fg()),
            ))];
            if let Some(translation) = word.example_context_translation.as_deref() {
                lines.push(Line::from(Span::styled(
                    translation,
                    Style::default().fg(colors.text_muted()),
                )));
            }
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(layout[3], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{Word, WordId};

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_finished_deck_shows_congratulations() {
        let theme = Theme::default();
        let session = FlashcardSession::new(Vec::new(), true);
        let area = Rect::new(0, 0, 70, 10);
        let mut buf = Buffer::empty(area);
        FlashcardView::new(&session, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Every card in this level is learned"));
    }

    #[test]
    fn test_front_shows_hangul() {
        let theme = Theme::default();
        let word = Word {
            id: WordId::new("00000000-0000-4000-8000-000000000001"),
            hangul: "물".into(),
            translation: "water".into(),
            level: "1A".into(),
            unit: 1,
            example_context: None,
            example_context_translation: None,
        };
        let mut session = FlashcardSession::new(vec![word], false);
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        FlashcardView::new(&session, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("water"));

        session.flip();
        let mut buf = Buffer::empty(area);
        FlashcardView::new(&session, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("(back)"));
    }
}
