use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::progress::{Page, WordFilter};
use crate::hangul::jamo;
use crate::ui::theme::Theme;

/// One page of a level's word list with learned marks.
pub struct WordTable<'a> {
    page: &'a Page<'a>,
    filter: WordFilter,
    selected: usize,
    confirm_reset: bool,
    theme: &'a Theme,
}

impl<'a> WordTable<'a> {
    pub fn new(
        page: &'a Page<'a>,
        filter: WordFilter,
        selected: usize,
        confirm_reset: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            page,
            filter,
            selected,
            confirm_reset,
            theme,
        }
    }
}

/// Pad `text` to `width` terminal cells, counting Hangul as two.
fn pad_cells(text: &str, width: usize) -> String {
    let cells: usize = text
        .chars()
        .map(|c| if jamo::is_syllable(c) || jamo::is_jamo(c) { 2 } else { 1 })
        .sum();
    format!("{text}{}", " ".repeat(width.saturating_sub(cells)))
}

impl Widget for WordTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " Words · {} · page {}/{} ",
                self.filter.label(),
                self.page.page,
                self.page.total_pages
            ))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let header_style = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        Paragraph::new(Line::from(Span::styled(
            format!("   {}  {}  {}", pad_cells("Korean", 14), pad_cells("English", 24), "Unit"),
            header_style,
        )))
        .render(layout[0], buf);

        if self.page.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "   No words match this filter.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(layout[1], buf);
        }

        let lines: Vec<Line> = self
            .page
            .items
            .iter()
            .enumerate()
            .take(layout[1].height as usize)
            .map(|(i, status)| {
                let is_selected = i == self.selected;
                let mark = if status.is_learned { "✓" } else { "·" };
                let mark_style = Style::default().fg(if status.is_learned {
                    colors.success()
                } else {
                    colors.text_muted()
                });
                let row_style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .bg(colors.accent_dim())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(if is_selected { ">" } else { " " }, row_style),
                    Span::styled(format!("{mark} "), mark_style),
                    Span::styled(
                        format!(
                            "{}  {}  {}",
                            pad_cells(&status.word.hangul, 14),
                            pad_cells(&status.word.translation, 24),
                            status.word.unit
                        ),
                        row_style,
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(layout[1], buf);

        let footer = if self.confirm_reset {
            Span::styled(
                " Reset every mastery flag of this word? [y] Yes  [n] No",
                Style::default().fg(colors.warning()).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                format!(" {} words", self.page.total_items),
                Style::default().fg(colors.text_muted()),
            )
        };
        Paragraph::new(Line::from(footer)).render(layout[2], buf);
    }
}
