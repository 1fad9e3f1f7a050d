//! Mutation boundary for users and posts.
//!
//! The console never touches entity files directly: it goes through
//! [`EntityService`] (and [`PostService`] for publishing workflows), then
//! reloads the full collection and hands it to the grid.

use std::fmt;

use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::domain::{EntityKind, Post, PostCategory, PostPatch, PostStatus, User, UserPatch, UserRole, UserStatus};
use crate::fileio::{FileError, FileIO};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    #[error("{0}")]
    Validation(String),

    #[error("cannot {action} a {from} post")]
    InvalidTransition { action: Transition, from: PostStatus },

    #[error("store is read-only")]
    ReadOnly,

    #[error("storage error: {0}")]
    Storage(#[from] FileError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Post workflow transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Publish,
    Archive,
    Restore,
}

impl Transition {
    /// Status a post must be in for the transition to apply, and the status
    /// it ends in
    pub fn edge(self) -> (PostStatus, PostStatus) {
        match self {
            Transition::Publish => (PostStatus::Draft, PostStatus::Published),
            Transition::Archive => (PostStatus::Published, PostStatus::Archived),
            Transition::Restore => (PostStatus::Archived, PostStatus::Published),
        }
    }

    /// Past-tense message shown after success
    pub fn done_message(self) -> &'static str {
        match self {
            Transition::Publish => "Published",
            Transition::Archive => "Archived",
            Transition::Restore => "Restored",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Publish => "publish",
            Transition::Archive => "archive",
            Transition::Restore => "restore",
        })
    }
}

/// CRUD operations over one entity collection
pub trait EntityService: Send {
    type Entity;
    type Patch;

    fn get_all(&self) -> Result<Vec<Self::Entity>>;

    fn create(&mut self, patch: Self::Patch) -> Result<Self::Entity>;

    fn update(&mut self, id: u64, patch: Self::Patch) -> Result<Self::Entity>;

    fn delete(&mut self, id: u64) -> Result<()>;
}

/// Publishing workflow on top of post CRUD
pub trait PostService: EntityService<Entity = Post, Patch = PostPatch> {
    fn transition(&mut self, id: u64, transition: Transition) -> Result<Post>;

    fn publish(&mut self, id: u64) -> Result<Post> {
        self.transition(id, Transition::Publish)
    }

    fn archive(&mut self, id: u64) -> Result<Post> {
        self.transition(id, Transition::Archive)
    }

    fn restore(&mut self, id: u64) -> Result<Post> {
        self.transition(id, Transition::Restore)
    }
}

/// Entities a [`Store`] can hold
pub trait Stored: Clone + Send {
    const KIND: EntityKind;

    fn id(&self) -> u64;
}

impl Stored for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Stored for Post {
    const KIND: EntityKind = EntityKind::Post;

    fn id(&self) -> u64 {
        self.id
    }
}

/// In-memory collection, optionally persisted through [`FileIO`] after every
/// mutation
pub struct Store<T> {
    items: Vec<T>,
    file_io: Option<FileIO>,
    read_only: bool,
}

impl<T: Stored> Store<T> {
    pub fn in_memory(items: Vec<T>) -> Self {
        Self { items, file_io: None, read_only: false }
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn next_id(&self) -> u64 {
        self.items.iter().map(Stored::id).max().unwrap_or(0) + 1
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(ServiceError::NotFound { kind: T::KIND, id })
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(ServiceError::ReadOnly)
        } else {
            Ok(())
        }
    }

    /// Write `items` to the backing file, then make them the current contents.
    /// On a failed write the store keeps its previous contents.
    fn commit(&mut self, items: Vec<T>) -> Result<()>
    where
        T: serde::Serialize,
    {
        if let Some(file_io) = &self.file_io {
            file_io.write(&items)?;
        }
        self.items = items;
        Ok(())
    }

    /// Current contents with the item at `pos` replaced
    fn replaced(&self, pos: usize, item: T) -> Vec<T> {
        let mut items = self.items.clone();
        items[pos] = item;
        items
    }

    fn remove(&mut self, id: u64) -> Result<()>
    where
        T: serde::Serialize,
    {
        self.check_writable()?;
        let pos = self.position(id)?;
        let mut items = self.items.clone();
        items.remove(pos);
        self.commit(items)?;
        info!(kind = %T::KIND, id, "deleted");
        Ok(())
    }
}

impl<T: Stored + serde::de::DeserializeOwned> Store<T> {
    /// Load from a file. Returns the store and any load warnings.
    pub fn open(file_io: FileIO) -> Result<(Self, Vec<String>)> {
        let loaded = file_io.load::<T>()?;
        let store = Self { items: loaded.items, file_io: Some(file_io), read_only: false };
        Ok((store, loaded.warnings))
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Required text field: present and not blank after trimming
fn required(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{} is required", field))),
    }
}

/// A field being updated may not be blanked out
fn replace_required(slot: &mut String, value: Option<String>, field: &str) -> Result<()> {
    if let Some(v) = value {
        *slot = required(Some(v), field)?;
    }
    Ok(())
}

impl EntityService for Store<User> {
    type Entity = User;
    type Patch = UserPatch;

    fn get_all(&self) -> Result<Vec<User>> {
        Ok(self.items.clone())
    }

    fn create(&mut self, patch: UserPatch) -> Result<User> {
        self.check_writable()?;
        let user = User {
            id: self.next_id(),
            username: required(patch.username, "username")?,
            email: required(patch.email, "email")?,
            role: patch.role.unwrap_or(UserRole::User),
            status: patch.status.unwrap_or(UserStatus::Active),
            created_at: today(),
            last_login: None,
        };
        let mut items = self.items.clone();
        items.push(user.clone());
        self.commit(items)?;
        info!(id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    fn update(&mut self, id: u64, patch: UserPatch) -> Result<User> {
        self.check_writable()?;
        let pos = self.position(id)?;
        let mut user = self.items[pos].clone();

        replace_required(&mut user.username, patch.username, "username")?;
        replace_required(&mut user.email, patch.email, "email")?;
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(status) = patch.status {
            user.status = status;
        }

        let items = self.replaced(pos, user.clone());
        self.commit(items)?;
        info!(id, "user updated");
        Ok(user)
    }

    fn delete(&mut self, id: u64) -> Result<()> {
        self.remove(id)
    }
}

impl EntityService for Store<Post> {
    type Entity = Post;
    type Patch = PostPatch;

    fn get_all(&self) -> Result<Vec<Post>> {
        Ok(self.items.clone())
    }

    fn create(&mut self, patch: PostPatch) -> Result<Post> {
        self.check_writable()?;
        let post = Post {
            id: self.next_id(),
            title: required(patch.title, "title")?,
            content: patch.content.unwrap_or_default(),
            author: required(patch.author, "author")?,
            category: patch.category.unwrap_or(PostCategory::Other),
            status: patch.status.unwrap_or(PostStatus::Draft),
            views: 0,
            created_at: today(),
        };
        let mut items = self.items.clone();
        items.push(post.clone());
        self.commit(items)?;
        info!(id = post.id, title = %post.title, "post created");
        Ok(post)
    }

    fn update(&mut self, id: u64, patch: PostPatch) -> Result<Post> {
        self.check_writable()?;
        let pos = self.position(id)?;
        let mut post = self.items[pos].clone();

        replace_required(&mut post.title, patch.title, "title")?;
        replace_required(&mut post.author, patch.author, "author")?;
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(status) = patch.status {
            post.status = status;
        }

        let items = self.replaced(pos, post.clone());
        self.commit(items)?;
        info!(id, "post updated");
        Ok(post)
    }

    fn delete(&mut self, id: u64) -> Result<()> {
        self.remove(id)
    }
}

impl PostService for Store<Post> {
    fn transition(&mut self, id: u64, transition: Transition) -> Result<Post> {
        self.check_writable()?;
        let pos = self.position(id)?;
        let (from, to) = transition.edge();

        let current = self.items[pos].status;
        if current != from {
            return Err(ServiceError::InvalidTransition { action: transition, from: current });
        }

        let mut post = self.items[pos].clone();
        post.status = to;
        let items = self.replaced(pos, post.clone());
        self.commit(items)?;
        info!(id, %transition, "post status changed");
        Ok(post)
    }
}
