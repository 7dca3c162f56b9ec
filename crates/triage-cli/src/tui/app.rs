//! TUI application state and event loop.
//!
//! The terminal hosts one [`TriageApp`]. Real elapsed time between loop
//! iterations is fed to the app's virtual clock, so the chart reveal and the
//! simulated inference delay play out in real time while the core stays
//! deterministic. Everything runs on the UI thread.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use triage_core::{
    FileReader, FsFileReader, LoginForm, Route, SignupForm, TriageApp, UploadError, View,
};

const POLL_INTERVAL: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Form input
// ---------------------------------------------------------------------------

/// One editable text field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub secret: bool,
}

impl Field {
    fn new(name: &'static str, label: &'static str, secret: bool) -> Self {
        Self {
            name,
            label,
            value: String::new(),
            secret,
        }
    }

    /// Text as shown on screen.
    pub fn display(&self) -> String {
        if self.secret {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

fn login_fields() -> Vec<Field> {
    vec![
        Field::new("email", "Email", false),
        Field::new("password", "Password", true),
    ]
}

fn signup_fields() -> Vec<Field> {
    vec![
        Field::new("name", "Full name", false),
        Field::new("email", "Email", false),
        Field::new("password", "Password", true),
        Field::new("confirm", "Confirm password", true),
    ]
}

fn upload_fields() -> Vec<Field> {
    vec![Field::new("image", "Image path", false)]
}

fn fields_for(route: &Route) -> Vec<Field> {
    match route {
        Route::Login => login_fields(),
        Route::Signup => signup_fields(),
        Route::Home => upload_fields(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    core: TriageApp,
    running: bool,
    fields: Vec<Field>,
    focus: usize,
    fields_route: Route,
    status: Option<String>,
}

impl App {
    pub fn new(core: TriageApp) -> Self {
        let route = core.route().clone();
        Self {
            fields: fields_for(&route),
            fields_route: route,
            core,
            running: true,
            focus: 0,
            status: None,
        }
    }

    pub fn core(&self) -> &TriageApp {
        &self.core
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn view(&self) -> View {
        self.core.view()
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before a panic message is printed.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let mut last_tick = Instant::now();

        while self.running {
            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            let now = Instant::now();
            self.core.advance(now - last_tick);
            last_tick = now;
            self.sync_fields();
        }

        Ok(())
    }

    /// Reset the input fields whenever the route changed underneath us.
    fn sync_fields(&mut self) {
        if *self.core.route() != self.fields_route {
            self.fields_route = self.core.route().clone();
            self.fields = fields_for(&self.fields_route);
            self.focus = 0;
        }
    }

    fn go(&mut self, route: Route) {
        self.status = None;
        self.core.navigate(route);
        self.sync_fields();
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false
            }
            KeyCode::F(1) => self.go(Route::Home),
            KeyCode::F(2) => self.go(Route::Dashboard),
            KeyCode::F(3) => self.go(Route::Login),
            KeyCode::F(4) => self.go(Route::Signup),
            KeyCode::F(5) => self.go(Route::Privacy),
            KeyCode::F(6) => self.go(Route::Result),
            KeyCode::F(10) => {
                self.status = None;
                self.core.logout();
                self.sync_fields();
            }
            KeyCode::Tab | KeyCode::Down => {
                if !self.fields.is_empty() {
                    self.focus = (self.focus + 1) % self.fields.len();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if !self.fields.is_empty() {
                    self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(c);
                }
            }
            _ => {}
        }
    }

    fn value(&self, name: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    fn submit(&mut self) {
        self.status = None;
        match self.core.route().clone() {
            Route::Login => {
                let form = LoginForm {
                    email: self.value("email"),
                    password: self.value("password"),
                };
                // Errors are shown inline through the view.
                let _ = self.core.submit_login(&form);
            }
            Route::Signup => {
                let form = SignupForm {
                    name: self.value("name"),
                    email: self.value("email"),
                    password: self.value("password"),
                    confirm: self.value("confirm"),
                };
                if self.core.submit_signup(&form).is_ok() {
                    if let Some(token) = self.core.verification_token(&form.email) {
                        self.status = Some(format!("Verification link: #/verify-email?token={token}"));
                    }
                }
            }
            Route::Home => self.submit_upload(),
            // Both the result and the "no result" view lead back to upload.
            Route::Result => {
                self.core.new_analysis();
            }
            _ => {}
        }
        self.sync_fields();
    }

    fn submit_upload(&mut self) {
        let raw = self.value("image");
        let path = raw.trim();
        let file = if path.is_empty() {
            None
        } else {
            match FsFileReader.read(Path::new(path)) {
                Ok(f) => Some(f),
                Err(e) => {
                    self.status = Some(format!("Cannot read {path}: {e}"));
                    return;
                }
            }
        };
        match self.core.submit_upload(file) {
            Ok(()) => {}
            Err(UploadError::Invalid(_)) => {}
            Err(UploadError::Busy) => {
                self.status = Some("An analysis is already running.".into());
            }
        }
    }
}
