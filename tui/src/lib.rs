//! TUI rendering for MKS OS using ratatui.
//!
//! Everything is painted from [`Shell`] accessors in back-to-front order: desktop,
//! icons, windows, taskbar, then the modal overlays.

mod input;
mod theme;

pub use input::{InputPump, apply_event, handle_events, map_click, map_key};
pub use theme::{Palette, glyphs, styles};

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use mks_engine::{
    ErrorDialog, IconBoard, LineStyle, MenuOverlay, OpenWindow, Region, RunPrompt,
    START_LABEL, Shell, ShellLayout, sanitize_label, wrap_text,
};

/// Spacing of the background dot grid, in cells.
const GRID_STEP_X: u16 = 8;
const GRID_STEP_Y: u16 = 4;

const PROMPT_MARKER: &str = "> ";

/// Main draw function
pub fn draw(frame: &mut Frame, shell: &Shell) {
    let palette = Palette::standard();
    let layout = shell.layout();
    let bounds = frame.area();

    draw_desktop(frame.buffer_mut(), layout, bounds, &palette);
    draw_icons(frame, shell.icons(), bounds, &palette);
    let window_cursor = draw_windows(frame, shell, bounds, &palette);
    draw_taskbar(frame, shell, bounds, &palette);

    let mut cursor = window_cursor;
    if let Some(menu) = shell.start_menu().overlay() {
        draw_start_menu(frame, layout, menu, bounds, &palette);
        cursor = None;
    }
    if let Some(prompt) = shell.run_prompt() {
        cursor = draw_run_prompt(frame, layout, prompt, bounds, &palette);
    }
    if let Some(dialog) = shell.current_dialog() {
        draw_dialog(frame, layout, dialog, shell.pending_dialogs(), bounds, &palette);
        cursor = None;
    }

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

/// Shell region as a ratatui rect, clipped to what the frame can show.
fn to_rect(region: Region, bounds: Rect) -> Rect {
    Rect::new(region.x, region.y, region.width, region.height).intersection(bounds)
}

/// `text` padded with spaces to `width` display columns.
fn pad_to_width(text: &str, width: u16) -> String {
    let used = text.width();
    let mut out = text.to_string();
    out.extend(std::iter::repeat_n(' ', usize::from(width).saturating_sub(used)));
    out
}

/// Longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &text[start..]
}

fn draw_desktop(buf: &mut Buffer, layout: ShellLayout, bounds: Rect, palette: &Palette) {
    let area = to_rect(layout.desktop(), bounds);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let Some(cell) = buf.cell_mut((x, y)) else {
                continue;
            };
            cell.reset();
            cell.set_bg(palette.desktop);
            if x % GRID_STEP_X == 0 && y % GRID_STEP_Y == 0 {
                cell.set_symbol(glyphs::GRID_DOT).set_fg(palette.grid);
            }
        }
    }
}

fn draw_icons(frame: &mut Frame, icons: &IconBoard, bounds: Rect, palette: &Palette) {
    for (entry, slot) in icons.iter() {
        let label = sanitize_label(&entry.label);
        let initial: String = label.chars().take(1).collect();

        let glyph = Paragraph::new(initial)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(palette.text)
                    .bg(palette.icon_fill)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.icon_edge)),
            );
        frame.render_widget(glyph, to_rect(slot.glyph, bounds));

        let caption =
            Paragraph::new(label.into_owned()).style(Style::default().fg(palette.text).bg(palette.desktop));
        frame.render_widget(caption, to_rect(slot.label, bounds));
    }
}

/// Paints every window, focused last. Returns the focused window's text cursor.
fn draw_windows(frame: &mut Frame, shell: &Shell, bounds: Rect, palette: &Palette) -> Option<Position> {
    let focused = shell.windows().focused();
    let mut cursor = None;
    for window in shell.windows().draw_order() {
        let is_focused = focused == Some(window.id());
        let position = draw_window(frame, window, is_focused, bounds, palette);
        if is_focused {
            cursor = position;
        }
    }
    cursor
}

fn draw_window(
    frame: &mut Frame,
    window: &OpenWindow,
    focused: bool,
    bounds: Rect,
    palette: &Palette,
) -> Option<Position> {
    let area = to_rect(window.region(), bounds);
    if area.is_empty() {
        return None;
    }
    frame.render_widget(Clear, area);

    let title = sanitize_label(&window.title()).into_owned();
    let title_style = if focused {
        Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(styles::window_border(palette, focused))
        .style(Style::default().fg(palette.text).bg(palette.window))
        .title(Line::from(Span::styled(format!(" {title} "), title_style)));
    frame.render_widget(block, area);

    let close = Paragraph::new(glyphs::CLOSE_BUTTON).style(
        Style::default()
            .fg(palette.error)
            .bg(palette.window)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(close, to_rect(window.close_button(), bounds));

    let content = window.content();
    let view = window.app().view(content.width, content.height);
    let lines: Vec<Line> = view
        .lines
        .iter()
        .take(usize::from(content.height))
        .map(|line| {
            let text = sanitize_label(&line.text);
            match line.style {
                LineStyle::Normal => Line::from(text.into_owned()),
                LineStyle::Heading => {
                    Line::from(Span::styled(text.into_owned(), styles::heading(palette)))
                }
                LineStyle::Muted => Line::from(Span::styled(text.into_owned(), styles::muted(palette))),
                LineStyle::Selected => Line::from(Span::styled(
                    pad_to_width(&text, content.width),
                    styles::selected(palette),
                )),
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), to_rect(content, bounds));

    let cursor = view.cursor?;
    if cursor.x >= content.width || cursor.y >= content.height {
        return None;
    }
    let position = Position::new(content.x + cursor.x, content.y + cursor.y);
    bounds.contains(position).then_some(position)
}

fn draw_taskbar(frame: &mut Frame, shell: &Shell, bounds: Rect, palette: &Palette) {
    let layout = shell.layout();
    frame.render_widget(
        Block::default().style(styles::taskbar(palette)),
        to_rect(layout.taskbar(), bounds),
    );

    let start = Paragraph::new(START_LABEL)
        .style(styles::start_button(palette, shell.start_menu().is_open()));
    frame.render_widget(start, to_rect(layout.start_button(), bounds));

    let separator = layout.clock_separator();
    if let Some(cell) = frame.buffer_mut().cell_mut((separator.x, separator.y)) {
        cell.set_symbol(glyphs::CLOCK_SEPARATOR)
            .set_fg(palette.text_muted);
    }

    let clock = Paragraph::new(shell.clock_label()).style(styles::taskbar(palette));
    frame.render_widget(clock, to_rect(layout.clock(), bounds));
}

fn draw_start_menu(
    frame: &mut Frame,
    layout: ShellLayout,
    overlay: &MenuOverlay,
    bounds: Rect,
    palette: &Palette,
) {
    let menu = layout.start_menu(overlay.items().len());
    let area = to_rect(menu, bounds);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.icon_edge))
            .style(Style::default().fg(palette.text).bg(palette.menu)),
        area,
    );

    for (i, item) in overlay.items().iter().enumerate() {
        let row = ShellLayout::menu_item(menu, i);
        let (pointer, style) = if i == overlay.selected() {
            (glyphs::MENU_POINTER, styles::selected(palette))
        } else {
            (" ", Style::default().fg(palette.text).bg(palette.menu))
        };
        let text = pad_to_width(
            &format!("{pointer} {}", sanitize_label(&item.label)),
            row.width,
        );
        frame.render_widget(Paragraph::new(text).style(style), to_rect(row, bounds));
    }
}

/// Returns where the text cursor goes.
fn draw_run_prompt(
    frame: &mut Frame,
    layout: ShellLayout,
    prompt: &RunPrompt,
    bounds: Rect,
    palette: &Palette,
) -> Option<Position> {
    let area = to_rect(layout.run_prompt(), bounds);
    if area.is_empty() {
        return None;
    }
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.icon_edge))
        .style(Style::default().fg(palette.text).bg(palette.menu))
        .title(Line::from(Span::styled(" Run ", styles::heading(palette))))
        .title_bottom(Line::from(Span::styled(" Enter: run   Esc: cancel ", styles::muted(palette))).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let room = usize::from(inner.width).saturating_sub(PROMPT_MARKER.width() + 1);
    let sanitized = sanitize_label(prompt.text());
    let visible = tail_to_width(&sanitized, room);
    let line = Line::from(vec![
        Span::styled(PROMPT_MARKER, styles::heading(palette)),
        Span::raw(visible.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    let x = inner.x + (PROMPT_MARKER.width() + visible.width()) as u16;
    let position = Position::new(x, inner.y);
    inner.contains(position).then_some(position)
}

fn draw_dialog(
    frame: &mut Frame,
    layout: ShellLayout,
    dialog: &ErrorDialog,
    pending: usize,
    bounds: Rect,
    palette: &Palette,
) {
    let max_lines = usize::from(layout.desktop().height.saturating_sub(4)).max(1);
    let mut lines = wrap_text(&dialog.message, usize::from(layout.dialog_text_width()));
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }

    let area = to_rect(layout.dialog(lines.len() as u16), bounds);
    if area.is_empty() {
        return;
    }
    frame.render_widget(Clear, area);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(palette.error))
        .style(Style::default().fg(palette.text).bg(palette.menu))
        .padding(Padding::horizontal(1))
        .title(Line::from(Span::styled(
            format!(" {} ", dialog.title),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )));
    if pending > 1 {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {} more ", pending - 1),
                styles::muted(palette),
            ))
            .right_aligned(),
        );
    }

    let mut text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("[ OK ]", styles::selected(palette))).centered());
    frame.render_widget(Paragraph::new(text).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_counts_display_columns() {
        assert_eq!(pad_to_width("ab", 5), "ab   ");
        assert_eq!(pad_to_width("日本", 5), "日本 ");
        assert_eq!(pad_to_width("too long", 3), "too long");
    }

    #[test]
    fn tail_keeps_the_end_of_long_input() {
        assert_eq!(tail_to_width("echo hello", 5), "hello");
        assert_eq!(tail_to_width("short", 10), "short");
        assert_eq!(tail_to_width("日本語", 4), "本語");
        assert_eq!(tail_to_width("abc", 0), "");
    }

    #[test]
    fn regions_are_clipped_to_the_frame() {
        let bounds = Rect::new(0, 0, 80, 24);
        assert_eq!(
            to_rect(Region::new(70, 20, 20, 10), bounds),
            Rect::new(70, 20, 10, 4)
        );
        assert!(to_rect(Region::new(90, 30, 5, 5), bounds).is_empty());
    }
}
