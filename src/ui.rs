//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::api::Track;
use crate::app::{App, Modal, Pane, UploadField};
use crate::config::UiSettings;
use crate::player::PlayerInfo;

const CONTROLS: &str = "[tab] pane | [j/k] move | [enter] play | [space] pause | [h/l] prev/next | [s] shuffle | [-/+] volume | [f] favorite | [d] delete | [T] top | [F] favorites | [u] upload | [g] mix | [m] theme | [q] quit";

/// Colors for the current theme.
struct Palette {
    fg: Color,
    bg: Color,
    accent: Color,
    dim: Color,
    alert: Color,
}

fn palette(light: bool) -> Palette {
    if light {
        Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            dim: Color::DarkGray,
            alert: Color::Red,
        }
    } else {
        Palette {
            fg: Color::White,
            bg: Color::Reset,
            accent: Color::Cyan,
            dim: Color::DarkGray,
            alert: Color::LightRed,
        }
    }
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a visible window over `total` rows keeping `selected` centered
/// when the list is taller than the viewport. Returns `(start, end,
/// selected_pos_in_window)`.
fn window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = if selected > half { selected - half } else { 0 };
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Bordered card with the focused pane accented.
fn card(title: String, focused: bool, palette: &Palette) -> Block<'static> {
    let border = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.dim)
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border)
        .style(Style::default().fg(palette.fg))
}

fn popup_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().fg(palette.fg).bg(palette.bg))
}

/// Textual progress bar of `width` cells.
fn progress_bar(pct: u8, width: usize) -> String {
    let filled = (usize::from(pct) * width) / 100;
    let mut bar = String::from("[");
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}

/// One catalog row: favorite marker, title, duration and tags.
fn track_line(app: &App, track: &Track) -> String {
    let marker = if app.is_favorite(track.id) { "♥ " } else { "  " };
    let duration = app
        .duration_for(track)
        .map(format_mmss)
        .unwrap_or_else(|| "--:--".to_string());
    if track.tags.is_empty() {
        format!("{marker}{}  {duration}", track.title)
    } else {
        format!("{marker}{}  {duration}  [{}]", track.title, track.tag_line())
    }
}

/// Render the entire UI into the provided `frame` using `app` state, the
/// latest playback snapshot and settings.
pub fn draw(frame: &mut Frame, app: &App, player: &PlayerInfo, ui_settings: &UiSettings) {
    let palette = palette(app.light_mode);

    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        frame.area(),
    );

    let show_now_playing = app.has_queue() && app.current_track.is_some();

    let mut constraints = vec![Constraint::Length(3), Constraint::Length(3)];
    if app.error.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(1));
    if show_now_playing {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let mut idx = 0;
    let header_area = chunks[idx];
    idx += 1;
    let status_area = chunks[idx];
    idx += 1;
    let error_area = if app.error.is_some() {
        let area = chunks[idx];
        idx += 1;
        Some(area)
    } else {
        None
    };
    let body_area = chunks[idx];
    idx += 1;
    let now_area = if show_now_playing {
        let area = chunks[idx];
        idx += 1;
        Some(area)
    } else {
        None
    };
    let footer_area = chunks[idx];

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" vibo ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(palette.dim)),
        );
    frame.render_widget(header, header_area);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();
        parts.push(format!("Tracks: {}", app.tracks.len()));
        parts.push(format!("Favorites: {}", app.favorites.len()));
        parts.push(if app.shuffle {
            "Shuffle: ON".to_string()
        } else {
            "Shuffle: OFF".to_string()
        });
        parts.push(format!("Vol: {:.0}%", app.volume * 100.0));
        if app.generating {
            parts.push("Generating mix...".to_string());
        }
        if app.uploading {
            parts.push(format!("Uploading: {}%", app.upload_progress));
        }
        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status ")
                .border_style(Style::default().fg(palette.dim)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, status_area);

    // Error banner, only while an error is set.
    if let (Some(area), Some(message)) = (error_area, app.error.as_deref()) {
        let banner = Paragraph::new(message)
            .style(Style::default().fg(palette.alert))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" error (esc clears) ")
                    .border_style(Style::default().fg(palette.alert)),
            );
        frame.render_widget(banner, area);
    }

    // Body: upload/prompt/queue on the left, catalog/top tracks on the right.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(52), Constraint::Percentage(48)])
        .split(body_area);

    let upload_height = {
        let mut h: u16 = 6;
        if app.uploading {
            h += 1;
        }
        if app.upload.field == UploadField::Tags {
            h += app.upload.suggestions.len().min(5) as u16;
        }
        h
    };

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(upload_height),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(columns[0]);

    draw_upload(frame, app, left[0], &palette);
    draw_prompt(frame, app, left[1], &palette);
    draw_queue(frame, app, left[2], &palette);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(8)])
        .split(columns[1]);

    draw_catalog(frame, app, right[0], &palette);
    draw_top_tracks(frame, app, right[1], &palette);

    if let Some(area) = now_area {
        draw_now_playing(frame, app, player, area, &palette);
    }

    // Footer
    let footer = Paragraph::new(CONTROLS)
        .style(Style::default().fg(palette.dim))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .border_style(Style::default().fg(palette.dim)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, footer_area);

    if let Some(modal) = &app.modal {
        draw_modal(frame, app, modal, body_area, &palette);
    }
}

fn draw_upload(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let focused = app.pane == Pane::Upload;
    let form = &app.upload;
    let mut lines: Vec<Line> = Vec::new();

    for field in [
        UploadField::File,
        UploadField::Title,
        UploadField::Tags,
        UploadField::Cover,
    ] {
        let value = match field {
            UploadField::File => &form.file,
            UploadField::Title => &form.title,
            UploadField::Tags => &form.tags,
            UploadField::Cover => &form.cover,
        };
        let active = focused && form.field == field;
        let marker = if active { "> " } else { "  " };
        let label_style = if active {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.dim)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}: ", field.label()), label_style),
            Span::raw(value.clone()),
        ]));

        // Dropdown right under the tags field.
        if field == UploadField::Tags && form.field == UploadField::Tags {
            for (i, suggestion) in form.suggestions.iter().take(5).enumerate() {
                let style = if form.highlighted == Some(i) {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default().fg(palette.dim)
                };
                lines.push(Line::from(Span::styled(format!("      {suggestion}"), style)));
            }
        }
    }

    if app.uploading {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} {}%",
                progress_bar(app.upload_progress, 20),
                app.upload_progress
            ),
            Style::default().fg(palette.accent),
        )));
    }

    let block = card(" upload ".to_string(), focused, palette);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_prompt(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let focused = app.pane == Pane::Prompt;
    let text = if app.generating {
        format!("{} (generating...)", app.prompt)
    } else if focused {
        format!("{}_", app.prompt)
    } else {
        app.prompt.clone()
    };
    let block = card(" mood prompt ".to_string(), focused, palette);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_queue(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let focused = app.pane == Pane::Queue;
    let Some(queue) = &app.queue else {
        let hint = Paragraph::new("no mix yet: press g and describe a mood")
            .style(Style::default().fg(palette.dim))
            .block(card(" queue ".to_string(), focused, palette));
        frame.render_widget(hint, area);
        return;
    };

    let title = format!(" queue: {} ", queue.prompt());
    let total = queue.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = window(total, height, app.queue_cursor);

    let items: Vec<ListItem> = queue.items()[start..end]
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let index = start + offset;
            let marker = if index == queue.current_index() {
                "▶ "
            } else {
                "  "
            };
            let label = format!("{marker}{} (w:{})", item.track.title, item.weight);
            if index == queue.current_index() {
                ListItem::new(label).style(Style::default().fg(palette.accent))
            } else {
                ListItem::new(label)
            }
        })
        .collect();

    let list = List::new(items)
        .block(card(title, focused, palette))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_catalog(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let focused = app.pane == Pane::Catalog;
    let title = format!(" tracks ({}) ", app.tracks.len());

    let total = app.tracks.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = window(total, height, app.catalog_cursor);

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|track| ListItem::new(track_line(app, track)))
        .collect();

    let list = List::new(items)
        .block(card(title, focused, palette))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_top_tracks(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = card(" top tracks ".to_string(), false, palette);
    if app.top_tracks.is_empty() {
        let hint = Paragraph::new("no picks yet")
            .style(Style::default().fg(palette.dim))
            .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let rows: Vec<ListItem> = app
        .top_tracks
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|t| ListItem::new(format!("{}  used: {}", t.title, t.times_selected)))
        .collect();
    frame.render_widget(List::new(rows).block(block), area);
}

fn draw_now_playing(frame: &mut Frame, app: &App, player: &PlayerInfo, area: Rect, palette: &Palette) {
    let Some(track) = &app.current_track else {
        return;
    };

    let icon = if player.url.is_none() {
        "■"
    } else if player.playing {
        "▶"
    } else {
        "⏸"
    };

    let total = player.duration.or_else(|| app.duration_for(track));
    let time = match total {
        Some(t) => format!("{} / {}", format_mmss(player.elapsed), format_mmss(t)),
        None => format_mmss(player.elapsed),
    };

    let mut text = format!("{icon} {}  [{time}]", track.title);
    if let Some(queue) = &app.queue {
        text.push_str(&format!("  mix: {}", queue.prompt()));
    }

    let bar = Paragraph::new(text)
        .style(Style::default().fg(palette.accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" now playing ")
                .border_style(Style::default().fg(palette.dim)),
        );
    frame.render_widget(bar, area);
}

fn draw_modal(frame: &mut Frame, app: &App, modal: &Modal, area: Rect, palette: &Palette) {
    match modal {
        Modal::TrackDetail(track) => {
            let popup = centered_rect_sized(64, 10, area);
            frame.render_widget(Clear, popup);
            let duration = app
                .duration_for(track)
                .map(format_mmss)
                .unwrap_or_else(|| "-".to_string());
            let tags = if track.tags.is_empty() {
                "-".to_string()
            } else {
                track.tag_line()
            };
            let text = format!(
                "Title: {}\nTags: {}\nDuration: {}\nSelected: {} times\nUploaded: {}\nCover: {}",
                track.title,
                tags,
                duration,
                track.times_selected,
                track.uploaded_at.as_deref().unwrap_or("-"),
                track.cover_url.as_deref().unwrap_or("-"),
            );
            let par = Paragraph::new(text)
                .block(popup_block(" track (esc closes, f favorite) ", palette))
                .wrap(Wrap { trim: true });
            frame.render_widget(par, popup);
        }
        Modal::ConfirmDelete(track) => {
            let popup = centered_rect_sized(50, 5, area);
            frame.render_widget(Clear, popup);
            let par = Paragraph::new(format!("Delete \"{}\"? [y/n]", track.title))
                .style(Style::default().fg(palette.alert))
                .block(popup_block(" confirm ", palette))
                .wrap(Wrap { trim: true });
            frame.render_widget(par, popup);
        }
        Modal::TopTracks => {
            draw_list_modal(
                frame,
                app,
                &app.top_tracks,
                " top tracks (esc closes) ",
                true,
                area,
                palette,
            );
        }
        Modal::Favorites => {
            draw_list_modal(
                frame,
                app,
                &app.favorites,
                " favorites (esc closes, f removes) ",
                false,
                area,
                palette,
            );
        }
    }
}

fn draw_list_modal(
    frame: &mut Frame,
    app: &App,
    tracks: &[Track],
    title: &str,
    show_times: bool,
    area: Rect,
    palette: &Palette,
) {
    let height = (tracks.len() as u16 + 2).clamp(4, 14);
    let popup = centered_rect_sized(56, height, area);
    frame.render_widget(Clear, popup);

    if tracks.is_empty() {
        let par = Paragraph::new("nothing here yet")
            .style(Style::default().fg(palette.dim))
            .block(popup_block(title, palette));
        frame.render_widget(par, popup);
        return;
    }

    let visible = popup.height.saturating_sub(2) as usize;
    let (start, end, selected) = window(tracks.len(), visible, app.modal_cursor);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| {
            if show_times {
                ListItem::new(format!("{}  used: {}", t.title, t.times_selected))
            } else {
                ListItem::new(track_line(app, t))
            }
        })
        .collect();

    let list = List::new(items)
        .block(popup_block(title, palette))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, popup, &mut state);
}
