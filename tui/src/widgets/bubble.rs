//! Bubble Widget
//!
//! A rounded, word-wrapped speech bubble. Text that does not fit the area is
//! cut off at the last visible line with an ellipsis.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Widget};
use textwrap::wrap;

/// Speech bubble over the character area
pub struct BubbleWidget<'a> {
    content: &'a str,
    style: Style,
    border_style: Style,
}

impl<'a> BubbleWidget<'a> {
    /// Bubble around `content`
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
            border_style: Style::default(),
        }
    }

    /// Text style
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Border style
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Rows needed to show `content` at `width` columns, borders included
    pub fn height(content: &str, width: u16) -> u16 {
        if content.is_empty() {
            return 0;
        }
        let lines = wrap_lines(content, width.saturating_sub(2)).len();
        u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2)
    }
}

fn wrap_lines(content: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    content
        .lines()
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                wrap(line, width)
                    .into_iter()
                    .map(|cow| cow.to_string())
                    .collect()
            }
        })
        .collect()
}

impl Widget for BubbleWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.content.is_empty() || area.height < 3 || area.width < 3 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.border_style)
            .style(self.style);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut wrapped = wrap_lines(self.content, inner.width);
        let visible = usize::from(inner.height);
        if wrapped.len() > visible {
            wrapped.truncate(visible);
            if let Some(last) = wrapped.last_mut() {
                let keep = usize::from(inner.width).saturating_sub(1);
                let cut: String = last.chars().take(keep).collect();
                *last = format!("{cut}…");
            }
        }

        for (i, line) in wrapped.iter().enumerate() {
            let y = inner.y + u16::try_from(i).unwrap_or(u16::MAX);
            buf.set_stringn(inner.x, y, line, usize::from(inner.width), self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_height_counts_wrapped_lines() {
        assert_eq!(BubbleWidget::height("", 20), 0);
        assert_eq!(BubbleWidget::height("Done!", 20), 3);
        // 8 columns inside the borders
        assert_eq!(BubbleWidget::height("Reading files", 10), 4);
    }

    #[test]
    fn test_renders_inside_border() {
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        BubbleWidget::new("Done!").render(area, &mut buf);

        assert!(row(&buf, 0).starts_with('╭'));
        assert_eq!(row(&buf, 1), "│Done!     │");
    }

    #[test]
    fn test_overflow_is_truncated_with_ellipsis() {
        let area = Rect::new(0, 0, 8, 3);
        let mut buf = Buffer::empty(area);
        BubbleWidget::new("one two three four").render(area, &mut buf);

        assert!(row(&buf, 1).contains('…'));
    }
}
