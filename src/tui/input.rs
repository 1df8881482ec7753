use crossterm::event::{KeyCode, KeyEvent};

use crate::io::ConfigStore;

use super::app::App;

/// Handle a key event in the current mode
pub fn handle_key<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay intercepts all input
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    if app.vm.is_searching() {
        handle_search(app, key);
    } else if app.vm.is_inserting() {
        handle_insert(app, key);
    } else if app.vm.is_editing() {
        handle_edit(app, key);
    } else {
        handle_navigate(app, key);
    }
}

fn handle_navigate<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => app.vm.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.vm.select_previous(),
        KeyCode::Char('H') => app.vm.select_top(),
        KeyCode::Char('L') => app.vm.select_bottom(),
        KeyCode::Char('M') => app.vm.select_middle(),
        KeyCode::Char('n') => {
            app.reset_input("");
            app.vm.start_insert_after();
        }
        KeyCode::Char('N') => {
            app.reset_input("");
            app.vm.start_insert_before();
        }
        KeyCode::Char('e') => {
            app.vm.start_edit();
            if let Some(snapshot) = app.vm.editing_snapshot() {
                let text = snapshot.text.clone();
                app.reset_input(&text);
            }
        }
        KeyCode::Char('x') => app.vm.delete_item(),
        KeyCode::Char('p') => app.vm.paste_item(false),
        KeyCode::Char('P') => app.vm.paste_item(true),
        KeyCode::Char('l') => app.vm.set_as_root(app.vm.selected_node()),
        KeyCode::Char('h') => app.vm.move_root_upwards(),
        KeyCode::Char('c') => app.vm.toggle_hide_complete_items(),
        KeyCode::Char('u') => app.vm.undo(),
        KeyCode::Enter => app.vm.toggle_complete(),
        KeyCode::Char(' ') => app.vm.toggle_collapse_node(),
        KeyCode::Char('/') => {
            app.reset_input("");
            app.vm.update_search("");
        }
        _ => {}
    }
}

fn handle_insert<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    match key.code {
        // Enter keeps inserting so a whole list can be typed in one go
        KeyCode::Enter => {
            let text = app.input_buffer.trim().to_string();
            if text.is_empty() {
                app.vm.cancel_insert();
            } else {
                app.vm.insert_item(&text);
                app.vm.start_insert_after();
            }
            app.reset_input("");
        }
        // Esc commits a non-empty field rather than dropping typed text
        KeyCode::Esc => {
            let text = app.input_buffer.trim().to_string();
            if text.is_empty() {
                app.vm.cancel_insert();
            } else {
                app.vm.insert_item(&text);
            }
            app.reset_input("");
        }
        _ => handle_text_entry(app, key),
    }
}

fn handle_edit<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let text = app.input_buffer.clone();
            app.vm.finish_edit(&text);
            app.reset_input("");
        }
        KeyCode::Esc => {
            app.vm.cancel_edit();
            app.reset_input("");
        }
        _ => handle_text_entry(app, key),
    }
}

fn handle_search<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.vm.finish_search();
            app.reset_input("");
        }
        KeyCode::Esc => {
            app.vm.cancel_search();
            app.reset_input("");
        }
        KeyCode::Up => app.vm.select_previous_search_result(),
        KeyCode::Down => app.vm.select_next_search_result(),
        _ => {
            handle_text_entry(app, key);
            let query = app.input_buffer.clone();
            app.vm.update_search(&query);
        }
    }
}

fn handle_text_entry<C: ConfigStore>(app: &mut App<C>, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.input_insert(c),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Left => app.input_left(),
        KeyCode::Right => app.input_right(),
        KeyCode::Home => app.input_home(),
        KeyCode::End => app.input_end(),
        _ => {}
    }
}
