use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::{ConfigManager, ConfigStore, load_outline, save_outline};
use crate::view::ViewModel;

use super::input;
use super::render;
use super::theme::Theme;

/// Main application state
pub struct App<C: ConfigStore> {
    pub vm: ViewModel<C>,
    pub save_file: PathBuf,
    pub theme: Theme,
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// Text being typed into the inline insert/edit field or the search
    /// prompt
    pub input_buffer: String,
    /// Byte offset of the cursor within `input_buffer`
    pub input_cursor: usize,
    /// Outline area size from the previous draw, to detect resizes
    last_size: (usize, usize),
}

impl<C: ConfigStore> App<C> {
    pub fn new(vm: ViewModel<C>, save_file: PathBuf) -> Self {
        App {
            vm,
            save_file,
            theme: Theme::default(),
            should_quit: false,
            show_help: false,
            input_buffer: String::new(),
            input_cursor: 0,
            last_size: (0, 0),
        }
    }

    /// Propagate the outline area size to the view model when it changes.
    /// Resizing resets the scroll window, so skip the call on equal sizes.
    pub fn sync_window_size(&mut self, width: usize, height: usize) {
        if self.last_size != (width, height) {
            self.last_size = (width, height);
            self.vm.set_window_size(width, height);
        }
    }

    pub fn reset_input(&mut self, text: &str) {
        self.input_buffer = text.to_string();
        self.input_cursor = self.input_buffer.len();
    }

    pub fn input_insert(&mut self, c: char) {
        self.input_buffer.insert(self.input_cursor, c);
        self.input_cursor += c.len_utf8();
    }

    pub fn input_backspace(&mut self) {
        if let Some(prev) = self.prev_char_boundary() {
            self.input_buffer.remove(prev);
            self.input_cursor = prev;
        }
    }

    pub fn input_left(&mut self) {
        if let Some(prev) = self.prev_char_boundary() {
            self.input_cursor = prev;
        }
    }

    pub fn input_right(&mut self) {
        if let Some(c) = self.input_buffer[self.input_cursor..].chars().next() {
            self.input_cursor += c.len_utf8();
        }
    }

    pub fn input_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn input_end(&mut self) {
        self.input_cursor = self.input_buffer.len();
    }

    fn prev_char_boundary(&self) -> Option<usize> {
        self.input_buffer[..self.input_cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }
}

/// Run the TUI application
pub fn run(
    save_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigManager::load(save_file, config_file)?;
    let save_path = config.save_file().to_path_buf();
    let tree = load_outline(&save_path)?;

    let mut app = App::new(ViewModel::new(tree, config), save_path);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Flush the outline and settings before exit
    let flush_result = flush(&app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    flush_result
}

fn flush(app: &App<ConfigManager>) -> Result<(), Box<dyn std::error::Error>> {
    save_outline(&app.save_file, app.vm.tree())?;
    app.vm.config().save()?;
    Ok(())
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<ConfigManager>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut save_counter = 0u32;
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            // Debounced save: every ~5 key presses
            save_counter += 1;
            if save_counter >= 5 {
                let _ = flush(app);
                save_counter = 0;
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
