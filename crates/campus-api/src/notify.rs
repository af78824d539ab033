use campus_db::Database;
use campus_types::models::NotificationKind;

use crate::middleware::CurrentUser;

/// Something a user did that the affected user should hear about.
pub enum Event<'a> {
    Followed,
    Answered { query_title: &'a str },
    Messaged,
}

impl Event<'_> {
    fn kind(&self) -> NotificationKind {
        match self {
            Self::Followed => NotificationKind::Follow,
            Self::Answered { .. } => NotificationKind::Answer,
            Self::Messaged => NotificationKind::Message,
        }
    }

    fn text(&self, actor: &str) -> String {
        match self {
            Self::Followed => format!("{} started following you.", actor),
            Self::Answered { query_title } => {
                format!("{} answered your query: {}", actor, query_title)
            }
            Self::Messaged => format!("{} sent you a message.", actor),
        }
    }
}

/// Record a notification for `recipient_id`. Users are never notified about
/// their own actions; returns the new row id, or `None` when skipped.
pub fn notify(
    db: &Database,
    recipient_id: i64,
    actor: &CurrentUser,
    event: Event<'_>,
) -> anyhow::Result<Option<i64>> {
    if recipient_id == actor.id {
        return Ok(None);
    }

    let id = db.send_notification(
        recipient_id,
        Some(actor.id),
        event.kind(),
        &event.text(&actor.username),
    )?;
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use campus_db::models::NewUser;
    use campus_types::models::Role;

    use super::*;

    fn actor(db: &Database, username: &str) -> CurrentUser {
        let id = db
            .create_user(&NewUser {
                username,
                email: "x@y.edu",
                password_hash: "h",
                role: Role::Senior,
                college: "",
            })
            .unwrap();
        CurrentUser::from(db.get_user_by_id(id).unwrap().unwrap())
    }

    #[test]
    fn texts_name_the_actor() {
        let db = Database::open_in_memory().unwrap();
        let salma = actor(&db, "salma");
        let adam = actor(&db, "adam");

        notify(&db, adam.id, &salma, Event::Answered { query_title: "Organic chem" }).unwrap();
        let rows = db.list_notifications(adam.id).unwrap();
        assert_eq!(rows[0].kind, NotificationKind::Answer);
        assert_eq!(rows[0].message, "salma answered your query: Organic chem");
    }

    #[test]
    fn own_actions_are_not_notified() {
        let db = Database::open_in_memory().unwrap();
        let salma = actor(&db, "salma");

        assert!(notify(&db, salma.id, &salma, Event::Messaged).unwrap().is_none());
        assert!(db.list_notifications(salma.id).unwrap().is_empty());
    }
}
