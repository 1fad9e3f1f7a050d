use std::io;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use crate::columns::{columns_for, Widget};
use crate::domain::{escape_value, Entity, EntityKind, PostPatch, User, UserPatch};
use crate::grid::{GridConfig, GridController, Record};
use crate::service::{self, EntityService, PostService, ServiceError, Transition};
use crate::stats::{self, StatItem};
use crate::style::Style;
use crate::ui;

pub type UserService = dyn EntityService<Entity = User, Patch = UserPatch>;

/// Services shared with background jobs
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<Mutex<UserService>>,
    pub posts: Arc<Mutex<dyn PostService>>,
}

fn lock<T: ?Sized>(store: &Arc<Mutex<T>>) -> service::Result<MutexGuard<'_, T>> {
    store
        .lock()
        .map_err(|_| ServiceError::Unavailable("store lock poisoned".to_string()))
}

impl Stores {
    /// Fetch the whole collection for one tab
    pub fn load(&self, kind: EntityKind) -> service::Result<Vec<Entity>> {
        Ok(match kind {
            EntityKind::User => lock(&self.users)?.get_all()?.into_iter().map(Entity::from).collect(),
            EntityKind::Post => lock(&self.posts)?.get_all()?.into_iter().map(Entity::from).collect(),
        })
    }

    /// Run a mutation and return the success message
    pub fn apply(&self, mutation: &Mutation) -> service::Result<String> {
        match mutation {
            Mutation::CreateUser(patch) => {
                let user = lock(&self.users)?.create(patch.clone())?;
                Ok(format!("User {} created", user.username))
            }
            Mutation::UpdateUser(id, patch) => {
                lock(&self.users)?.update(*id, patch.clone())?;
                Ok(format!("User #{} updated", id))
            }
            Mutation::CreatePost(patch) => {
                let post = lock(&self.posts)?.create(patch.clone())?;
                Ok(format!("Post \"{}\" created", post.title))
            }
            Mutation::UpdatePost(id, patch) => {
                lock(&self.posts)?.update(*id, patch.clone())?;
                Ok(format!("Post #{} updated", id))
            }
            Mutation::Delete(EntityKind::User, id) => {
                lock(&self.users)?.delete(*id)?;
                Ok(format!("User #{} deleted", id))
            }
            Mutation::Delete(EntityKind::Post, id) => {
                lock(&self.posts)?.delete(*id)?;
                Ok(format!("Post #{} deleted", id))
            }
            Mutation::Transition(id, transition) => {
                lock(&self.posts)?.transition(*id, *transition)?;
                Ok(format!("{} post #{}", transition.done_message(), id))
            }
        }
    }
}

/// A change requested from the console
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateUser(UserPatch),
    UpdateUser(u64, UserPatch),
    CreatePost(PostPatch),
    UpdatePost(u64, PostPatch),
    Delete(EntityKind, u64),
    Transition(u64, Transition),
}

impl Mutation {
    fn kind(&self) -> EntityKind {
        match self {
            Mutation::CreateUser(_) | Mutation::UpdateUser(..) => EntityKind::User,
            Mutation::Delete(kind, _) => *kind,
            _ => EntityKind::Post,
        }
    }
}

/// Result from a background operation
pub enum BackgroundResult {
    Loaded {
        kind: EntityKind,
        result: service::Result<Vec<Entity>>,
    },
    Mutated {
        kind: EntityKind,
        result: service::Result<(String, Vec<Entity>)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: AlertKind::Success, title: "Success".to_string(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: AlertKind::Error, title: "Error".to_string(), message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Create,
    Edit(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Prompt(Prompt),
    ConfirmDelete(u64),
}

pub struct App {
    pub kind: EntityKind,
    pub grid: GridController<Widget>,
    pub entities: Vec<Entity>,
    pub stats: Vec<StatItem>,
    pub style: Style,
    pub mode: Mode,
    /// Search term or prompt text being typed
    pub input: String,
    /// Selected row on the current page
    pub cursor: usize,
    pub alert: Option<Alert>,
    pub read_only: bool,
    pub should_quit: bool,
    stores: Stores,
    /// One receiver per running job, tagged with the collection it refreshes
    bg_receivers: Vec<(EntityKind, Receiver<BackgroundResult>)>,
}

impl App {
    pub fn new(kind: EntityKind, config: GridConfig, stores: Stores, style: Style) -> Self {
        let grid = GridController::new(config).with_columns(columns_for(kind));
        let mut app = Self {
            kind,
            grid,
            entities: Vec::new(),
            stats: Vec::new(),
            style,
            mode: Mode::Normal,
            input: String::new(),
            cursor: 0,
            alert: None,
            read_only: false,
            should_quit: false,
            stores,
            bg_receivers: Vec::new(),
        };

        let result = app.stores.load(kind);
        app.handle_background_result(BackgroundResult::Loaded { kind, result });
        app
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_loading(&self) -> bool {
        !self.bg_receivers.is_empty()
    }

    fn is_loading_kind(&self, kind: EntityKind) -> bool {
        self.bg_receivers.iter().any(|(k, _)| *k == kind)
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            // Check for completed background operations
            self.poll_background_result();

            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    // === Background jobs ===

    fn spawn<F>(&mut self, kind: EntityKind, job: F)
    where
        F: FnOnce(&Stores) -> BackgroundResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.bg_receivers.push((kind, rx));

        let stores = self.stores.clone();
        thread::spawn(move || {
            // Receiver may be gone if the app quit first
            let _ = tx.send(job(&stores));
        });
    }

    /// Refresh the current tab in the background, unless a job for it is
    /// already running
    pub fn reload(&mut self) {
        let kind = self.kind;
        if self.is_loading_kind(kind) {
            return;
        }
        self.spawn(kind, move |stores| BackgroundResult::Loaded { kind, result: stores.load(kind) });
    }

    /// Run a mutation, then reload its collection, in the background
    pub fn submit(&mut self, mutation: Mutation) {
        if self.read_only {
            self.alert = Some(Alert::error("Read-only mode: changes are disabled"));
            return;
        }
        if self.is_loading() {
            self.alert = Some(Alert::error("Another operation is in progress"));
            return;
        }

        info!(?mutation, "submitting");
        let kind = mutation.kind();
        self.spawn(kind, move |stores| {
            let result = stores
                .apply(&mutation)
                .and_then(|message| Ok((message, stores.load(kind)?)));
            BackgroundResult::Mutated { kind, result }
        });
    }

    /// Check for and handle completed background operations
    fn poll_background_result(&mut self) {
        let mut finished = Vec::new();
        self.bg_receivers.retain(|(_, receiver)| match receiver.try_recv() {
            Ok(result) => {
                finished.push(Some(result));
                false
            }
            Err(mpsc::TryRecvError::Empty) => true,
            // Thread died unexpectedly
            Err(mpsc::TryRecvError::Disconnected) => {
                finished.push(None);
                false
            }
        });

        for result in finished {
            match result {
                Some(result) => self.handle_background_result(result),
                None => self.alert = Some(Alert::error("Operation failed")),
            }
        }
    }

    fn handle_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Loaded { kind, result: Ok(entities) } => {
                self.apply_entities(kind, entities);
            }
            BackgroundResult::Mutated { kind, result: Ok((message, entities)) } => {
                info!(%kind, %message, "mutation complete");
                self.apply_entities(kind, entities);
                self.alert = Some(Alert::success(message));
            }
            BackgroundResult::Loaded { kind, result: Err(e) } => {
                error!(%kind, error = %e, "load failed");
                self.alert = Some(Alert::error(format!("Failed to load {}s: {}", kind, e)));
            }
            BackgroundResult::Mutated { kind, result: Err(e) } => {
                error!(%kind, error = %e, "mutation failed");
                self.alert = Some(Alert::error(e.to_string()));
            }
        }
    }

    fn apply_entities(&mut self, kind: EntityKind, entities: Vec<Entity>) {
        // Records for a tab we already left; any alert still applies
        if kind != self.kind {
            warn!(%kind, current = %self.kind, "dropping stale result");
            return;
        }
        let records: Vec<Record<Widget>> = entities.iter().map(Entity::to_record).collect();
        self.stats = stats::compute(kind, &entities);
        self.entities = entities;
        self.grid.set_data(records);
        self.clamp_cursor();
    }

    // === Tabs and selection ===

    pub fn switch_tab(&mut self, kind: EntityKind) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        self.entities.clear();
        self.stats.clear();
        self.grid.set_columns(Some(columns_for(kind)));
        self.grid.set_data(Vec::new());
        self.grid.reset_pagination();
        self.cursor = 0;
        self.reload();
    }

    fn clamp_cursor(&mut self) {
        let len = self.grid.page_items().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn selected_id(&self) -> Option<u64> {
        let items = self.grid.page_items();
        let id = items.get(self.cursor)?.id()?;
        u64::try_from(id).ok()
    }

    fn selected_entity(&self) -> Option<&Entity> {
        let id = self.selected_id()?;
        self.entities.iter().find(|e| e.id() == id)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.grid.page_items().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn change_page(&mut self, f: impl FnOnce(&mut GridController<Widget>)) {
        let before = self.grid.state().current_page;
        f(&mut self.grid);
        if self.grid.state().current_page != before {
            self.cursor = 0;
        }
    }

    fn sort_by_column(&mut self, index: usize) {
        let columns = self.grid.columns();
        if let Some(column) = columns.get(index) {
            self.grid.request_sort(&column.key);
            self.cursor = 0;
        }
    }

    // === Key handling ===

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::Prompt(prompt) => self.handle_prompt_key(prompt, key),
            Mode::ConfirmDelete(id) => {
                self.mode = Mode::Normal;
                if key.code == KeyCode::Char('y') {
                    self.submit(Mutation::Delete(self.kind, id));
                } else {
                    self.alert = None;
                }
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.alert = None,
            KeyCode::Tab | KeyCode::BackTab => self.switch_tab(self.kind.toggled()),
            KeyCode::Char('/') => {
                if self.grid.config().searchable {
                    self.input = self.grid.state().search_term.clone();
                    self.mode = Mode::Search;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                self.change_page(|g| g.next_page())
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                self.change_page(|g| g.prev_page())
            }
            KeyCode::Char('g') | KeyCode::Home => self.change_page(|g| g.first_page()),
            KeyCode::Char('G') | KeyCode::End => self.change_page(|g| g.last_page()),
            KeyCode::Char('+') => {
                let size = self.grid.state().page_size + 5;
                self.grid.set_page_size(size);
                self.clamp_cursor();
            }
            KeyCode::Char('-') => {
                let size = self.grid.state().page_size.saturating_sub(5);
                self.grid.set_page_size(size);
                self.clamp_cursor();
            }
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.sort_by_column(digit as usize - 1);
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('c') => self.open_prompt(Prompt::Create),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    self.open_prompt(Prompt::Edit(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.mode = Mode::ConfirmDelete(id);
                    self.alert = Some(Alert {
                        kind: AlertKind::Error,
                        title: "Confirm".to_string(),
                        message: format!("Delete {} #{}? Press y to confirm", self.kind, id),
                    });
                }
            }
            KeyCode::Char('P') => self.transition_selected(Transition::Publish),
            KeyCode::Char('A') => self.transition_selected(Transition::Archive),
            KeyCode::Char('R') => self.transition_selected(Transition::Restore),
            _ => {}
        }
    }

    fn transition_selected(&mut self, transition: Transition) {
        if self.kind != EntityKind::Post {
            return;
        }
        if let Some(id) = self.selected_id() {
            self.submit(Mutation::Transition(id, transition));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => return,
        }
        // Live search
        self.grid.set_search_term(self.input.as_str());
        self.clamp_cursor();
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        if self.read_only {
            self.alert = Some(Alert::error("Read-only mode: changes are disabled"));
            return;
        }
        let prefill = match (prompt, self.selected_entity()) {
            (Prompt::Edit(_), Some(Entity::User(u))) => format!(
                "username={}; email={}; role={}; status={}",
                escape_value(&u.username),
                escape_value(&u.email),
                u.role.as_str(),
                u.status.as_str()
            ),
            (Prompt::Edit(_), Some(Entity::Post(p))) => format!(
                "title={}; author={}; category={}; status={}",
                escape_value(&p.title),
                escape_value(&p.author),
                p.category.as_str(),
                p.status.as_str()
            ),
            _ => String::new(),
        };
        self.input = prefill;
        self.mode = Mode::Prompt(prompt);
    }

    fn handle_prompt_key(&mut self, prompt: Prompt, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.input);
                self.mode = Mode::Normal;
                match self.build_mutation(prompt, &input) {
                    Ok(mutation) => self.submit(mutation),
                    Err(message) => self.alert = Some(Alert::error(message)),
                }
            }
            _ => {}
        }
    }

    fn build_mutation(&self, prompt: Prompt, input: &str) -> Result<Mutation, String> {
        Ok(match (self.kind, prompt) {
            (EntityKind::User, Prompt::Create) => Mutation::CreateUser(UserPatch::parse(input)?),
            (EntityKind::User, Prompt::Edit(id)) => Mutation::UpdateUser(id, UserPatch::parse(input)?),
            (EntityKind::Post, Prompt::Create) => Mutation::CreatePost(PostPatch::parse(input)?),
            (EntityKind::Post, Prompt::Edit(id)) => Mutation::UpdatePost(id, PostPatch::parse(input)?),
        })
    }

    /// Input line label for the current mode
    pub fn prompt_label(&self) -> Option<String> {
        match self.mode {
            Mode::Search => Some("/".to_string()),
            Mode::Prompt(Prompt::Create) => Some(format!("new {}: ", self.kind)),
            Mode::Prompt(Prompt::Edit(id)) => Some(format!("edit {} #{}: ", self.kind, id)),
            _ => None,
        }
    }
}
