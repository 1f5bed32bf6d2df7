use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows the dubeolsik diagram needs, border included.
pub const KEYBOARD_HEIGHT: u16 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: practice panes + session sidebar
    Medium, // 60-99 cols: practice panes only, compact keyboard
    Narrow, // <60 cols: no keyboard
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        match area.width {
            100.. => LayoutTier::Wide,
            60..=99 => LayoutTier::Medium,
            _ => LayoutTier::Narrow,
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn compact_keyboard(&self) -> bool {
        *self == LayoutTier::Medium
    }
}

/// Header, main pane, optional session sidebar and the hint footer.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .areas(area);

        let (main, sidebar) = if tier.show_sidebar() {
            let [main, sidebar] =
                Layout::horizontal([Constraint::Percentage(72), Constraint::Percentage(28)])
                    .areas(body);
            (main, Some(sidebar))
        } else {
            (body, None)
        };

        Self {
            header,
            main,
            sidebar,
            footer,
            tier,
        }
    }
}

/// How a practice screen takes its answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeShape {
    /// Flashcard: card over a known-count bar.
    Card,
    /// Writing and listening drills: prompt, answer box, keyboard.
    Typed,
    /// Quiz question with its own answer area, progress bar, keyboard for
    /// typed questions.
    Question { typed: bool },
}

/// Panes of a practice screen, top to bottom. Missing panes are `None`.
#[derive(Debug, PartialEq, Eq)]
pub struct PracticeLayout {
    pub prompt: Rect,
    pub answer: Option<Rect>,
    pub progress: Option<Rect>,
    pub keyboard: Option<Rect>,
}

impl PracticeLayout {
    /// Split `main`. The keyboard is only placed when `want_keyboard` is set,
    /// the tier allows it and the other panes keep their minimum height.
    pub fn new(main: Rect, shape: PracticeShape, tier: LayoutTier, want_keyboard: bool) -> Self {
        let (content, min_content) = match shape {
            PracticeShape::Card => (vec![Constraint::Min(8), Constraint::Length(3)], 11),
            PracticeShape::Typed => (vec![Constraint::Length(5), Constraint::Min(5)], 10),
            PracticeShape::Question { .. } => {
                (vec![Constraint::Min(10), Constraint::Length(3)], 13)
            }
        };
        let keyboard_fits = main.height >= min_content + KEYBOARD_HEIGHT;
        let typed = matches!(shape, PracticeShape::Typed | PracticeShape::Question { typed: true });
        let with_keyboard =
            want_keyboard && typed && tier != LayoutTier::Narrow && keyboard_fits;

        let mut constraints = content;
        if with_keyboard {
            constraints.push(Constraint::Length(KEYBOARD_HEIGHT));
        }
        let panes = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(main);
        let keyboard = with_keyboard.then(|| panes[2]);

        match shape {
            PracticeShape::Typed => Self {
                prompt: panes[0],
                answer: Some(panes[1]),
                progress: None,
                keyboard,
            },
            PracticeShape::Card | PracticeShape::Question { .. } => Self {
                prompt: panes[0],
                answer: None,
                progress: Some(panes[1]),
                keyboard,
            },
        }
    }
}

/// Group key hints into footer lines no wider than `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    const INDENT: usize = 1;
    const GAP: usize = 2;
    if width == 0 {
        return Vec::new();
    }

    let mut rows: Vec<Vec<&str>> = Vec::new();
    let mut used = 0;
    for hint in hints.iter().copied().filter(|h| !h.is_empty()) {
        let len = hint.chars().count();
        match rows.last_mut() {
            Some(row) if used + GAP + len <= width => {
                row.push(hint);
                used += GAP + len;
            }
            _ => {
                rows.push(vec![hint]);
                used = INDENT + len;
            }
        }
    }

    rows.into_iter()
        .map(|row| format!("{}{}", " ".repeat(INDENT), row.join("  ")))
        .collect()
}

/// A popup centred in `area`, at least 48x14 where the area allows it.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let scaled = |len: u16, pct: u16, min: u16| {
        (len.saturating_mul(pct.min(100)) / 100).max(min).min(len)
    };
    let width = scaled(area.width, percent_x, 48);
    let height = scaled(area.height, percent_y, 14);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 120, 40)), LayoutTier::Wide);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 80, 24)), LayoutTier::Medium);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 40, 24)), LayoutTier::Narrow);
        assert!(AppLayout::new(Rect::new(0, 0, 120, 40)).sidebar.is_some());
        assert!(AppLayout::new(Rect::new(0, 0, 80, 40)).sidebar.is_none());
    }

    #[test]
    fn test_typed_drill_gets_answer_box_and_keyboard() {
        let main = Rect::new(0, 1, 80, 24);
        let layout = PracticeLayout::new(main, PracticeShape::Typed, LayoutTier::Medium, true);
        assert_eq!(layout.prompt.height, 5);
        assert!(layout.progress.is_none());
        let answer = layout.answer.unwrap();
        let keyboard = layout.keyboard.unwrap();
        assert_eq!(keyboard.height, KEYBOARD_HEIGHT);
        assert_eq!(answer.y + answer.height, keyboard.y);
        assert_eq!(keyboard.y + keyboard.height, main.y + main.height);
    }

    #[test]
    fn test_keyboard_dropped_when_short_or_narrow_or_not_typed() {
        let short = Rect::new(0, 0, 80, 14);
        assert!(PracticeLayout::new(short, PracticeShape::Typed, LayoutTier::Medium, true).keyboard.is_none());
        let tall = Rect::new(0, 0, 50, 30);
        assert!(PracticeLayout::new(tall, PracticeShape::Typed, LayoutTier::Narrow, true).keyboard.is_none());
        assert!(PracticeLayout::new(tall, PracticeShape::Typed, LayoutTier::Wide, false).keyboard.is_none());
        let choice = PracticeShape::Question { typed: false };
        assert!(PracticeLayout::new(tall, choice, LayoutTier::Wide, true).keyboard.is_none());
        assert!(PracticeLayout::new(tall, PracticeShape::Card, LayoutTier::Wide, true).keyboard.is_none());
    }

    #[test]
    fn test_card_and_question_end_with_progress_bar() {
        let main = Rect::new(0, 0, 70, 20);
        let card = PracticeLayout::new(main, PracticeShape::Card, LayoutTier::Medium, true);
        assert_eq!(card.progress.unwrap().height, 3);
        assert!(card.answer.is_none());

        let quiz = PracticeLayout::new(main, PracticeShape::Question { typed: true }, LayoutTier::Medium, true);
        let progress = quiz.progress.unwrap();
        assert_eq!(progress.y + progress.height, quiz.keyboard.unwrap().y);
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let hints = ["[Space] Flip", "[k] Know", "[d] Don't know", "[Esc] Back"];
        let lines = pack_hint_lines(&hints, 30);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
        assert_eq!(
            pack_hint_lines(&hints, 200),
            [" [Space] Flip  [k] Know  [d] Don't know  [Esc] Back"]
        );
        assert!(pack_hint_lines(&hints, 0).is_empty());
        assert!(pack_hint_lines(&["", ""], 40).is_empty());
    }

    #[test]
    fn test_centered_rect_fits_inside_small_area() {
        let area = Rect::new(0, 0, 30, 10);
        assert_eq!(centered_rect(50, 50, area), area);
        let big = Rect::new(0, 0, 200, 60);
        let rect = centered_rect(50, 50, big);
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (50, 15, 100, 30));
    }
}
