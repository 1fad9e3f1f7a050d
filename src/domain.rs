//! User and post entities and their conversion into grid records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::grid::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    #[default]
    Post,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Post => "post",
        }
    }

    /// Tab label
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::User => "Users",
            EntityKind::Post => "Posts",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EntityKind::User => EntityKind::Post,
            EntityKind::Post => EntityKind::User,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "users" => Ok(EntityKind::User),
            "post" | "posts" => Ok(EntityKind::Post),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    User,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Moderator, UserRole::User];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Moderator => "moderator",
            UserRole::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Active, UserStatus::Inactive, UserStatus::Suspended];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [PostStatus::Draft, PostStatus::Published, PostStatus::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Development,
    Design,
    Accessibility,
    #[serde(other)]
    Other,
}

impl PostCategory {
    pub const ALL: [PostCategory; 4] = [
        PostCategory::Development,
        PostCategory::Design,
        PostCategory::Accessibility,
        PostCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PostCategory::Development => "development",
            PostCategory::Design => "design",
            PostCategory::Accessibility => "accessibility",
            PostCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub author: String,
    pub category: PostCategory,
    pub status: PostStatus,
    #[serde(default)]
    pub views: u64,
    pub created_at: String,
}

/// Partial user used by create and update; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

/// Partial post used by create and update; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<PostCategory>,
    pub status: Option<PostStatus>,
}

/// Look up an enum variant by its lowercase name
fn variant<T: Copy>(all: &[T], name: &str, as_str: fn(T) -> &'static str, field: &str) -> Result<T, String> {
    let name = name.trim().to_lowercase();
    all.iter()
        .copied()
        .find(|v| as_str(*v) == name)
        .ok_or_else(|| {
            let allowed: Vec<&str> = all.iter().map(|v| as_str(*v)).collect();
            format!("{} must be one of {}", field, allowed.join(", "))
        })
}

/// Escape a field value for prompt input: `;` becomes `\;` and `\` becomes `\\`
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == ';' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Split on `;` except where escaped, unescaping `\;` and `\\` along the way.
/// Any other backslash is kept as is.
fn split_unescaped(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.peek() {
                Some(&next) if next == ';' || next == '\\' => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(ch),
            },
            ';' => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

/// Split `key=value; key=value` input into trimmed pairs
fn assignments(input: &str) -> Result<Vec<(String, String)>, String> {
    split_unescaped(input)
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => Ok((key.trim().to_lowercase(), value.trim().to_string())),
            None => Err(format!("expected key=value, got '{}'", part)),
        })
        .collect()
}

impl UserPatch {
    /// Parse prompt input such as `username=kim; role=admin`
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut patch = Self::default();
        for (key, value) in assignments(input)? {
            match key.as_str() {
                "username" => patch.username = Some(value),
                "email" => patch.email = Some(value),
                "role" => patch.role = Some(variant(&UserRole::ALL, &value, UserRole::as_str, "role")?),
                "status" => {
                    patch.status = Some(variant(&UserStatus::ALL, &value, UserStatus::as_str, "status")?)
                }
                other => return Err(format!("unknown user field '{}'", other)),
            }
        }
        Ok(patch)
    }
}

impl PostPatch {
    /// Parse prompt input such as `title=Hello; category=design`
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut patch = Self::default();
        for (key, value) in assignments(input)? {
            match key.as_str() {
                "title" => patch.title = Some(value),
                "content" => patch.content = Some(value),
                "author" => patch.author = Some(value),
                "category" => {
                    patch.category =
                        Some(variant(&PostCategory::ALL, &value, PostCategory::as_str, "category")?)
                }
                "status" => {
                    patch.status = Some(variant(&PostStatus::ALL, &value, PostStatus::as_str, "status")?)
                }
                other => return Err(format!("unknown post field '{}'", other)),
            }
        }
        Ok(patch)
    }
}

/// Either entity kind
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    User(User),
    Post(Post),
}

impl Entity {
    pub fn id(&self) -> u64 {
        match self {
            Entity::User(u) => u.id,
            Entity::Post(p) => p.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Post(_) => EntityKind::Post,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            Entity::User(u) => &u.created_at,
            Entity::Post(p) => &p.created_at,
        }
    }

    /// Grid row for this entity. Field order is the order inferred columns use.
    pub fn to_record<H>(&self) -> Record<H> {
        match self {
            Entity::User(u) => Record::new()
                .with("id", u.id)
                .with("username", u.username.as_str())
                .with("email", u.email.as_str())
                .with("role", u.role.as_str())
                .with("status", u.status.as_str())
                .with("createdAt", u.created_at.as_str())
                .with("lastLogin", u.last_login.as_deref()),
            Entity::Post(p) => Record::new()
                .with("id", p.id)
                .with("title", p.title.as_str())
                .with("content", p.content.as_str())
                .with("author", p.author.as_str())
                .with("category", p.category.as_str())
                .with("status", p.status.as_str())
                .with("views", p.views)
                .with("createdAt", p.created_at.as_str()),
        }
    }
}

impl From<User> for Entity {
    fn from(u: User) -> Self {
        Entity::User(u)
    }
}

impl From<Post> for Entity {
    fn from(p: Post) -> Self {
        Entity::Post(p)
    }
}
