use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::engine::LevelProgress;
use crate::ui::theme::Theme;

pub struct ProgressBar<'a> {
    pub label: String,
    pub ratio: f64,
    pub detail: Option<String>,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            detail: None,
            theme,
        }
    }

    /// Bar for a learned/total count, labelled "known/total (pct%)".
    pub fn counts(label: &str, progress: LevelProgress, theme: &'a Theme) -> Self {
        let mut bar = Self::new(label, progress.ratio(), theme);
        bar.detail = Some(progress.to_string());
        bar
    }
}

fn bar_label(ratio: f64, detail: Option<&str>) -> String {
    let pct = format!("{:.0}%", ratio * 100.0);
    match detail {
        Some(detail) => format!("{detail} ({pct})"),
        None => pct,
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64) as u16;
        let label = bar_label(self.ratio, self.detail.as_deref());

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_label() {
        assert_eq!(bar_label(0.5, Some("1/2")), "1/2 (50%)");
        assert_eq!(bar_label(1.0, None), "100%");
    }

    #[test]
    fn test_ratio_is_clamped() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new("x", 1.5, &theme).ratio, 1.0);
        assert_eq!(ProgressBar::new("x", -0.5, &theme).ratio, 0.0);
    }
}
