use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Reload the dataset via `service.refresh`(...)
    Refresh,
    /// Run `service.nearby`(...) for the typed position
    Locate,
    /// Run `service.search`(...) for the typed name
    Search,
    /// Open the selected street in the detail view
    OpenDetail,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            Char('c') => Action::Quit,
            Char('r') => Action::Refresh,
            _ => Action::None,
        };
    }
    if key.code == Tab {
        app.next_screen();
        return Action::None;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Locate | Screen::Search => match key.code {
            Up => app.move_selection(false),
            Down => app.move_selection(true),
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::ALT) {
                    input_mut(app).push(character);
                }
            }
            Backspace => {
                input_mut(app).pop();
            }
            Esc => input_mut(app).clear(),
            Enter => {
                action = if app.screen == Screen::Locate {
                    Action::Locate
                } else {
                    Action::Search
                };
            }
            Right => {
                action = Action::OpenDetail;
            }
            _ => {}
        },

        Screen::Favorites => match key.code {
            Char('q') => {
                action = Action::Quit;
            }
            Up | Char('k') => app.move_selection(false),
            Down | Char('j') => app.move_selection(true),
            Enter | Right => {
                action = Action::OpenDetail;
            }
            _ => {}
        },

        Screen::Detail => match key.code {
            Char('q') => {
                action = Action::Quit;
            }
            Left | Esc | Char('b') => app.back(),
            _ => {}
        },
    }
    action
}

/// Text field of the current input screen.
fn input_mut(app: &mut App) -> &mut String {
    if app.screen == Screen::Locate {
        &mut app.location_input
    } else {
        &mut app.search_input
    }
}
