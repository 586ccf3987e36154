use serde::{Deserialize, Serialize};

use mizan_core::{Entity, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Sales,
    Warehouse,
    Accountant,
}

/// Application sections gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Dashboard,
    Inventory,
    Sales,
    Purchases,
    Contacts,
    Ledger,
    Settings,
}

impl Role {
    /// Which sections this role may open.
    pub fn can_access(&self, section: Section) -> bool {
        match self {
            Role::Admin => true,
            Role::Accountant => matches!(
                section,
                Section::Dashboard
                    | Section::Sales
                    | Section::Purchases
                    | Section::Contacts
                    | Section::Ledger
            ),
            Role::Sales => matches!(
                section,
                Section::Dashboard | Section::Sales | Section::Contacts
            ),
            Role::Warehouse => matches!(section, Section::Dashboard | Section::Inventory),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub email: String,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Linear scan for an exact username+password match.
///
/// Returns the matched user or nothing; callers get no hint whether the
/// username or the password was wrong.
pub fn authenticate(users: &[User], username: &str, password: &str) -> Option<User> {
    users
        .iter()
        .find(|u| u.username == username && u.password == password)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, password: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: username.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            role,
            email: format!("{username}@example.com"),
        }
    }

    #[test]
    fn exact_match_is_required() {
        let users = vec![user("admin", "admin123", Role::Admin)];
        assert!(authenticate(&users, "admin", "admin123").is_some());
        assert!(authenticate(&users, "admin", "Admin123").is_none());
        assert!(authenticate(&users, "Admin", "admin123").is_none());
        assert!(authenticate(&users, "admin", "").is_none());
    }

    #[test]
    fn admin_opens_every_section() {
        for section in [
            Section::Dashboard,
            Section::Inventory,
            Section::Sales,
            Section::Purchases,
            Section::Contacts,
            Section::Ledger,
            Section::Settings,
        ] {
            assert!(Role::Admin.can_access(section));
        }
    }

    #[test]
    fn other_roles_are_restricted() {
        assert!(Role::Accountant.can_access(Section::Ledger));
        assert!(!Role::Accountant.can_access(Section::Inventory));
        assert!(!Role::Accountant.can_access(Section::Settings));

        assert!(Role::Sales.can_access(Section::Sales));
        assert!(!Role::Sales.can_access(Section::Purchases));

        assert!(Role::Warehouse.can_access(Section::Inventory));
        assert!(!Role::Warehouse.can_access(Section::Sales));
    }
}
