use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::keyboard::display::{self, BACKSPACE, SHIFT, SPACE};
use crate::keyboard::model::{KeyboardModel, PhysicalKey};
use crate::ui::theme::Theme;

/// On-screen dubeolsik layout. Keys light up while pressed; with the Shift
/// latch on, keys show their tense jamo.
pub struct KeyboardDiagram<'a> {
    pub model: &'a KeyboardModel,
    pub shift_latched: bool,
    pub depressed_keys: &'a HashSet<char>,
    pub compact: bool,
    pub theme: &'a Theme,
}

impl<'a> KeyboardDiagram<'a> {
    pub fn new(
        model: &'a KeyboardModel,
        shift_latched: bool,
        depressed_keys: &'a HashSet<char>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            model,
            shift_latched,
            depressed_keys,
            compact: false,
            theme,
        }
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

/// Key cap text. Jamo are double-width, so `[ㅂ q]` is six cells and `[ㅂ]` four.
fn key_cap(key: &PhysicalKey, shift: bool, compact: bool) -> String {
    let jamo = key.output(shift);
    if compact {
        format!("[{jamo}]")
    } else {
        format!("[{jamo} {}]", key.latin)
    }
}

impl Widget for KeyboardDiagram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" 두벌식 ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let (key_width, offsets): (u16, [u16; 3]) = if self.compact {
            (5, [0, 2, 4])
        } else {
            (7, [1, 4, 7])
        };
        if inner.height < 3 || inner.width < key_width * 10 {
            return;
        }

        for (row_idx, row) in self.model.rows.iter().enumerate() {
            let y = inner.y + row_idx as u16;
            let offset = offsets.get(row_idx).copied().unwrap_or(0);

            for (col_idx, key) in row.iter().enumerate() {
                let x = inner.x + offset + col_idx as u16 * key_width;
                if x + key_width > inner.x + inner.width {
                    break;
                }

                let is_pressed = self.depressed_keys.contains(&key.latin);
                let is_shifted = self.shift_latched && key.shifted.is_some();

                let style = if is_pressed {
                    Style::default().fg(colors.bg()).bg(colors.pressed_key())
                } else if is_shifted {
                    Style::default()
                        .fg(colors.shift_key())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };

                buf.set_string(x, y, key_cap(key, self.shift_latched, self.compact), style);
            }
        }

        if inner.height < 4 {
            return;
        }
        let y = inner.y + 3;
        let mut x = inner.x + offsets[0];
        for special in [SHIFT, SPACE, BACKSPACE] {
            let label = format!("[{}]", display::key_short_label(special));
            let width = label.chars().count() as u16;
            if x + width > inner.x + inner.width {
                break;
            }
            let active = self.depressed_keys.contains(&special) || (special == SHIFT && self.shift_latched);
            let style = if active {
                Style::default().fg(colors.bg()).bg(colors.pressed_key())
            } else {
                Style::default().fg(colors.text_muted())
            };
            buf.set_string(x, y, &label, style);
            x += width + 1;
        }
    }
}
