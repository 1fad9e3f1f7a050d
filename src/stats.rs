//! Summary counters shown above the grid

use crate::columns::{format_thousands, Tone};
use crate::domain::{Entity, EntityKind, PostStatus, UserRole, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatItem {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

impl StatItem {
    fn count(label: &'static str, n: usize, tone: Tone) -> Self {
        Self { label, value: format_thousands(n as i64), tone }
    }
}

/// Stats for the given tab. Entities of the other kind are ignored.
pub fn compute(kind: EntityKind, entities: &[Entity]) -> Vec<StatItem> {
    match kind {
        EntityKind::User => user_stats(entities),
        EntityKind::Post => post_stats(entities),
    }
}

fn user_stats(entities: &[Entity]) -> Vec<StatItem> {
    let users: Vec<_> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::User(u) => Some(u),
            Entity::Post(_) => None,
        })
        .collect();
    let with_status = |status: UserStatus| users.iter().filter(|u| u.status == status).count();

    vec![
        StatItem::count("Total", users.len(), Tone::Primary),
        StatItem::count("Active", with_status(UserStatus::Active), Tone::Success),
        StatItem::count("Inactive", with_status(UserStatus::Inactive), Tone::Warning),
        StatItem::count("Suspended", with_status(UserStatus::Suspended), Tone::Danger),
        StatItem::count(
            "Admins",
            users.iter().filter(|u| u.role == UserRole::Admin).count(),
            Tone::Info,
        ),
    ]
}

fn post_stats(entities: &[Entity]) -> Vec<StatItem> {
    let posts: Vec<_> = entities
        .iter()
        .filter_map(|e| match e {
            Entity::Post(p) => Some(p),
            Entity::User(_) => None,
        })
        .collect();
    let with_status = |status: PostStatus| posts.iter().filter(|p| p.status == status).count();
    let views = posts.iter().map(|p| p.views).fold(0u64, u64::saturating_add);

    vec![
        StatItem::count("Total", posts.len(), Tone::Primary),
        StatItem::count("Published", with_status(PostStatus::Published), Tone::Success),
        StatItem::count("Draft", with_status(PostStatus::Draft), Tone::Warning),
        StatItem::count("Archived", with_status(PostStatus::Archived), Tone::Secondary),
        StatItem {
            label: "Views",
            value: format_thousands(i64::try_from(views).unwrap_or(i64::MAX)),
            tone: Tone::Info,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, PostCategory, User};

    fn post(id: u64, status: PostStatus, views: u64) -> Entity {
        Entity::Post(Post {
            id,
            title: "t".to_string(),
            content: String::new(),
            author: "a".to_string(),
            category: PostCategory::Design,
            status,
            views,
            created_at: "2024-01-01".to_string(),
        })
    }

    fn user(id: u64, role: UserRole, status: UserStatus) -> Entity {
        Entity::User(User {
            id,
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            role,
            status,
            created_at: "2024-01-01".to_string(),
            last_login: None,
        })
    }

    fn values(items: &[StatItem]) -> Vec<(&str, &str)> {
        items.iter().map(|s| (s.label, s.value.as_str())).collect()
    }

    #[test]
    fn post_counts_and_views() {
        let entities = vec![
            post(1, PostStatus::Published, 1200),
            post(2, PostStatus::Draft, 0),
            post(3, PostStatus::Published, 800),
            post(4, PostStatus::Archived, 5),
        ];
        assert_eq!(
            values(&compute(EntityKind::Post, &entities)),
            vec![
                ("Total", "4"),
                ("Published", "2"),
                ("Draft", "1"),
                ("Archived", "1"),
                ("Views", "2,005"),
            ]
        );
    }

    #[test]
    fn user_counts() {
        let entities = vec![
            user(1, UserRole::Admin, UserStatus::Active),
            user(2, UserRole::User, UserStatus::Suspended),
            user(3, UserRole::Moderator, UserStatus::Active),
        ];
        assert_eq!(
            values(&compute(EntityKind::User, &entities)),
            vec![
                ("Total", "3"),
                ("Active", "2"),
                ("Inactive", "0"),
                ("Suspended", "1"),
                ("Admins", "1"),
            ]
        );
    }

    #[test]
    fn empty_collection_is_all_zero() {
        assert!(compute(EntityKind::Post, &[]).iter().all(|s| s.value == "0"));
    }

    #[test]
    fn views_total_saturates() {
        let entities = vec![post(1, PostStatus::Published, u64::MAX), post(2, PostStatus::Draft, u64::MAX)];
        let stats = compute(EntityKind::Post, &entities);
        let views = stats.iter().find(|s| s.label == "Views").unwrap();
        assert_eq!(views.value, format_thousands(i64::MAX));
    }
}
