use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use strada_core::{ReminderDecision, Urgency};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::ALL).title("Strada"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::Locate => draw_locate(frame, app, *content_area),
        Screen::Search => draw_search(frame, app, *content_area),
        Screen::Favorites => draw_favorites(frame, app, *content_area),
        Screen::Detail => draw_detail(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Locate => {
            "Type \"lat, lon\" · Enter locate · ↑/↓ move · → details · Tab next screen · Ctrl-R reload · Ctrl-C quit"
        }
        Screen::Search => {
            "Type a street · Enter search · ↑/↓ move · → details · Tab next screen · Ctrl-R reload · Ctrl-C quit"
        }
        Screen::Favorites => {
            "↑/↓ move · Enter/→ details · Tab next screen · Ctrl-R reload · q/Ctrl-C quit"
        }
        Screen::Detail => "Esc/←/b back · Tab next screen · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn header_text(app: &App) -> String {
    let catalog = app.service.catalog();
    let source = &app.service.source().name;
    match catalog.loaded_at() {
        Some(loaded_at) => format!(
            "{source} · {} street segments · loaded {}",
            catalog.len(),
            loaded_at.format("%d.%m.%Y %H:%M")
        ),
        None => format!("{source} · no data loaded yet"),
    }
}

/// Splits a screen into an input line and a results area.
fn input_layout(area: Rect) -> Option<(Rect, Rect)> {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // results
        ])
        .split(area);

    match layout_chunks.as_ref() {
        [input_area, results_area] => Some((*input_area, *results_area)),
        _ => None,
    }
}

fn draw_locate(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some((input_area, results_area)) = input_layout(area) else {
        return;
    };

    let input = Paragraph::new(app.location_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Where are you parked? (lat, lon in degrees, Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, input_area);

    let title = format!(
        "Streets within {} m (nearest first)",
        app.settings.matching.max_distance_meters
    );

    if app.nearby.is_empty() {
        let paragraph = Paragraph::new("No results yet. Type your position and press Enter.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, results_area);
        return;
    }

    let today = App::today();
    let rows = app.nearby.iter().map(|hit| {
        Row::new(vec![
            Cell::from(format!("{:.0} m", hit.distance_m)),
            Cell::from(hit.street.name.clone()),
            Cell::from(next_cleaning_label(hit.next_cleaning, today)),
            Cell::from(hit.street.rule.to_string()),
        ])
        .style(Style::default().fg(urgency_color(hit.next_cleaning, today)))
    });

    let column_widths = [
        Constraint::Length(7),
        Constraint::Length(28),
        Constraint::Length(26),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Dist", "Street", "Next cleaning", "Schedule"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(Some(app.nearby_index));
    frame.render_stateful_widget(table, results_area, &mut state);
}

fn draw_search(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some((input_area, results_area)) = input_layout(area) else {
        return;
    };

    let input = Paragraph::new(app.search_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search street by name (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, input_area);

    let items = if app.search_results.is_empty() {
        vec![ListItem::new("No results yet. Try part of a street name, e.g. \"servi\".")]
    } else {
        app.search_results
            .iter()
            .enumerate()
            .map(|(idx, street)| {
                let marker = if app.best_match == Some(idx) { "★ " } else { "  " };
                ListItem::new(format!("{marker}{}: {}", street.name, street.rule))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Segments (★ = next to be cleaned, → to open)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.search_results.is_empty() {
        state.select(Some(app.search_index));
    }
    frame.render_stateful_widget(list, results_area, &mut state);
}

fn draw_favorites(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = format!(
        "Favorites cleaned within {} days",
        app.settings.reminders.warning_days_advance
    );

    if app.favorite_alerts.is_empty() {
        let text = if app.settings.favorites.is_empty() {
            "No favorites configured. Add `favorites = [\"via dei servi\"]` to strada.toml."
                .to_owned()
        } else {
            format!(
                "No cleaning coming up on your {} favorite street(s).",
                app.settings.favorites.len()
            )
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let today = App::today();
    let rows = app.favorite_alerts.iter().map(|alert| {
        let mut style = Style::default().fg(urgency_color(Some(alert.date), today));
        if alert.days_until == 0 {
            style = style.add_modifier(Modifier::BOLD);
        }

        Row::new(vec![
            Cell::from(alert.date.format("%d.%m.%Y").to_string()),
            Cell::from(relative_day_label(alert.date, today)),
            Cell::from(alert.street.clone()),
            Cell::from(alert.schedule.clone()),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(28),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Date", "In", "Street", "Schedule"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(Some(app.favorite_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        let paragraph = Paragraph::new("No street selected.")
            .block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(paragraph, area);
        return;
    };

    let today = App::today();
    let title = format!("{} (Esc/←/b to go back)", detail.street.name);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Schedule: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(detail.street.rule.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status:   ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                decision_label(detail.decision),
                Style::default().fg(urgency_color(detail.upcoming.first().copied(), today)),
            ),
        ]),
        Line::from(format!(
            "Geometry: {} points",
            detail.street.path.points().len()
        )),
        Line::default(),
        Line::styled(
            "Upcoming cleanings",
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];

    if detail.upcoming.is_empty() {
        lines.push(Line::from("  none found in the next months"));
    } else {
        lines.extend(detail.upcoming.iter().map(|date| {
            Line::from(format!(
                "  {} {}  {}",
                date.format("%a"),
                date.format("%d.%m.%Y"),
                relative_day_label(*date, today)
            ))
        }));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn decision_label(decision: Option<ReminderDecision>) -> String {
    match decision {
        None => "next cleaning unknown".to_owned(),
        Some(ReminderDecision::Expired) => "cleaning date passed".to_owned(),
        Some(ReminderDecision::NotYet(days)) => format!("no action needed, cleaning in {days} days"),
        Some(ReminderDecision::Remind(Urgency::Today)) => "cleaning TODAY, move your car".to_owned(),
        Some(ReminderDecision::Remind(Urgency::Tomorrow)) => {
            "cleaning tomorrow, move your car tonight".to_owned()
        }
        Some(ReminderDecision::Remind(Urgency::Upcoming(days))) => {
            format!("cleaning in {days} days, plan ahead")
        }
    }
}

fn next_cleaning_label(next: Option<NaiveDate>, today: NaiveDate) -> String {
    next.map_or_else(
        || "unknown".to_owned(),
        |date| {
            format!(
                "{} {} ({})",
                date.format("%a"),
                date.format("%d.%m"),
                relative_day_label(date, today)
            )
        },
    )
}

fn urgency_color(next: Option<NaiveDate>, today: NaiveDate) -> Color {
    match next.map(|date| (date - today).num_days()) {
        Some(0) => Color::Red,
        Some(1) => Color::Yellow,
        Some(_) => Color::Green,
        None => Color::Gray,
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date")
    }

    #[test]
    fn relative_labels() {
        assert_eq!(relative_day_label(date(6), date(6)), "today");
        assert_eq!(relative_day_label(date(7), date(6)), "tomorrow");
        assert_eq!(relative_day_label(date(10), date(6)), "in 4 days");
        assert_eq!(relative_day_label(date(3), date(6)), "3 days ago");
    }

    #[test]
    fn unknown_next_cleaning() {
        assert_eq!(next_cleaning_label(None, date(6)), "unknown");
        assert_eq!(next_cleaning_label(Some(date(7)), date(6)), "Thu 07.03 (tomorrow)");
        assert_eq!(urgency_color(None, date(6)), Color::Gray);
    }
}
