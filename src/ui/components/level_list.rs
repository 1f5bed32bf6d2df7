use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::LevelSummary;
use crate::ui::theme::Theme;

const BAR_WIDTH: usize = 12;

/// Dashboard list of every curriculum level with the user's progress.
pub struct LevelList<'a> {
    pub summaries: &'a [LevelSummary],
    pub selected: usize,
    pub loading: bool,
    pub theme: &'a Theme,
}

impl<'a> LevelList<'a> {
    pub fn new(summaries: &'a [LevelSummary], selected: usize, theme: &'a Theme) -> Self {
        Self {
            summaries,
            selected,
            loading: false,
            theme,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }
}

/// `████░░░░` style gauge for a ratio.
fn gauge(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut s = "█".repeat(filled);
    s.push_str(&"░".repeat(width - filled));
    s
}

/// First row to draw so the selected row stays visible.
fn scroll_offset(selected: usize, visible: usize, len: usize) -> usize {
    if visible == 0 || len <= visible {
        return 0;
    }
    selected
        .saturating_sub(visible - 1)
        .min(len - visible)
}

impl Widget for LevelList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Levels ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        let subtitle = if self.loading {
            "Loading progress..."
        } else {
            "Pick a level to practice"
        };
        let title_lines = vec![
            Line::from(Span::styled(
                "hanmadi",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtitle, Style::default().fg(colors.text_muted()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let list_area = layout[1];
        let visible = (list_area.height / 2) as usize;
        let offset = scroll_offset(self.selected, visible, self.summaries.len());

        for (row, (i, summary)) in self
            .summaries
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .enumerate()
        {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let complete = summary.progress.total > 0 && summary.progress.known == summary.progress.total;

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });
            let bar_style = Style::default().fg(if complete {
                colors.success()
            } else {
                colors.bar_filled()
            });

            let lines = vec![
                Line::from(vec![
                    Span::styled(format!(" {indicator} {:<3}", summary.level), label_style),
                    Span::styled(gauge(summary.progress.ratio(), BAR_WIDTH), bar_style),
                    Span::styled(
                        format!(" {}", summary.progress),
                        Style::default().fg(colors.text_muted()),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("     {}", summary.description),
                    Style::default().fg(colors.text_muted()),
                )),
            ];

            let y = list_area.y + (row as u16) * 2;
            let row_area = Rect::new(list_area.x, y, list_area.width, 2);
            Paragraph::new(lines).render(row_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge() {
        assert_eq!(gauge(0.0, 4), "░░░░");
        assert_eq!(gauge(0.5, 4), "██░░");
        assert_eq!(gauge(1.0, 4), "████");
        assert_eq!(gauge(2.0, 4), "████");
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 5, 12), 0);
        assert_eq!(scroll_offset(4, 5, 12), 0);
        assert_eq!(scroll_offset(5, 5, 12), 1);
        assert_eq!(scroll_offset(11, 5, 12), 7);
        assert_eq!(scroll_offset(3, 20, 12), 0);
    }
}
