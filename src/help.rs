use crate::terminal::Terminal;
use crossterm::cursor::MoveTo;
use crossterm::event::KeyCode;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, stdout, Write};

/// Placement of a centered help box
#[derive(Debug, PartialEq)]
struct HelpBox {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    text_width: usize,
}

impl HelpBox {
    fn centered(width: u16, height: u16, lines: &[&str]) -> Self {
        let text_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_width = text_width + 4; // 2 chars padding each side
        let box_height = lines.len() + 2;
        Self {
            x: (width as usize).saturating_sub(box_width) / 2,
            y: (height as usize).saturating_sub(box_height) / 2,
            width: box_width,
            height: box_height,
            text_width,
        }
    }
}

/// Show a modal help overlay without modifying the back buffer.
/// Returns true if the user requested quit (q/Esc) while the overlay is open.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    let (width, height) = term.size();
    render_help_overlay_direct(width, height, help_text)?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => break,
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }

    // Restore previous frame from back buffer.
    term.render()?;
    Ok(false)
}

fn render_help_overlay_direct(width: u16, height: u16, help_text: &str) -> io::Result<()> {
    let lines: Vec<&str> = help_text.lines().collect();
    let b = HelpBox::centered(width, height, &lines);

    let border_color = Color::White;
    let text_color = Color::Grey;
    let horizontal = "─".repeat(b.width - 2);
    let right = (b.x + b.width - 1) as u16;

    let mut out = stdout();

    queue!(
        out,
        MoveTo(b.x as u16, b.y as u16),
        SetForegroundColor(border_color),
        Print('┌'),
        Print(&horizontal),
        Print('┐')
    )?;

    for (i, line) in lines.iter().enumerate() {
        let y = (b.y + 1 + i) as u16;
        let padding = b.text_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        queue!(
            out,
            MoveTo(b.x as u16, y),
            SetForegroundColor(border_color),
            Print('│'),
            SetForegroundColor(text_color),
            Print(padded),
            SetForegroundColor(border_color),
            MoveTo(right, y),
            Print('│')
        )?;
    }

    queue!(
        out,
        MoveTo(b.x as u16, (b.y + b.height - 1) as u16),
        Print('└'),
        Print(&horizontal),
        Print('┘'),
        SetAttribute(Attribute::Reset),
        ResetColor
    )?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_is_centered_around_text() {
        let b = HelpBox::centered(40, 10, &["ab", "abcd"]);
        assert_eq!(b.width, 8);
        assert_eq!(b.height, 4);
        assert_eq!((b.x, b.y), (16, 3));
        assert_eq!(b.text_width, 4);
    }

    #[test]
    fn box_sticks_to_origin_on_tiny_terminals() {
        let b = HelpBox::centered(3, 1, &["long line"]);
        assert_eq!((b.x, b.y), (0, 0));
    }
}
