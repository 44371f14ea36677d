use crate::model::User;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirm-password")]
    pub confirm_password: String,
}

/// Per-field registration messages; a field is `None` when it passed.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let messages: Vec<&str> = [
            &self.username,
            &self.email,
            &self.password,
            &self.confirm_password,
        ]
        .iter()
        .filter_map(|message| message.as_deref())
        .collect();
        write!(f, "{}", messages.join("; "))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shelf {
    List,
    Likes,
}

impl Shelf {
    fn prompt(self) -> &'static str {
        match self {
            Shelf::List => "Debes registrarte para usar Mi Lista",
            Shelf::Likes => "Debes registrarte para dar like",
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipState {
    pub shelf: Shelf,
    pub member: bool,
}

impl MembershipState {
    pub fn label(&self) -> &'static str {
        match (self.shelf, self.member) {
            (Shelf::List, false) => "+ Mi Lista",
            (Shelf::List, true) => "✓ En Mi Lista",
            (Shelf::Likes, false) => "👍",
            (Shelf::Likes, true) => "❤️",
        }
    }
}

/// A membership toggle was attempted without a current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotRegistered(pub Shelf);

impl NotRegistered {
    pub fn prompt(&self) -> &'static str {
        self.0.prompt()
    }
}

impl fmt::Display for NotRegistered {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    UnknownUser,
    WrongPassword,
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Usuario o contraseña incorrectos")
    }
}

/// Users and memberships of one visitor.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct SessionState {
    users: Vec<User>,
    current_user: Option<String>,
    lists: HashMap<String, Vec<String>>,
    likes: HashMap<String, Vec<String>>,
}

impl SessionState {
    pub fn current_user(&self) -> Option<&User> {
        let username = self.current_user.as_ref()?;
        self.users.iter().find(|user| &user.username == username)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Checks every field of `form` and reports all failures at once.
    pub fn validate(&self, form: &RegistrationForm) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if form.username.trim().is_empty() {
            errors.username = Some("El nombre de usuario es obligatorio".to_owned());
        }
        if !EMAIL_PATTERN.is_match(&form.email) {
            errors.email = Some("Correo electrónico inválido".to_owned());
        }
        if form.password.encode_utf16().count() < MIN_PASSWORD_LEN {
            errors.password = Some(format!(
                "La contraseña debe tener al menos {} caracteres",
                MIN_PASSWORD_LEN
            ));
        }
        if form.password != form.confirm_password {
            errors.confirm_password = Some("Las contraseñas no coinciden".to_owned());
        }
        let taken = self
            .users
            .iter()
            .any(|user| user.username == form.username || user.email == form.email);
        if taken && errors.username.is_none() {
            errors.username = Some("El nombre o correo ya existe".to_owned());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Registers a new user and logs it in. `password_hash` is stored as given.
    pub fn register(
        &mut self,
        form: &RegistrationForm,
        password_hash: String,
    ) -> Result<&User, ValidationErrors> {
        self.validate(form)?;
        let username = form.username.clone();
        self.lists.insert(username.clone(), Vec::new());
        self.likes.insert(username.clone(), Vec::new());
        self.current_user = Some(username);
        self.users.push(User {
            username: form.username.clone(),
            email: form.email.clone(),
            password_hash,
        });
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn login<F>(&mut self, username: &str, verify: F) -> Result<&User, LoginError>
    where
        F: FnOnce(&User) -> bool,
    {
        let index = self
            .users
            .iter()
            .position(|user| user.username == username)
            .ok_or(LoginError::UnknownUser)?;
        if !verify(&self.users[index]) {
            return Err(LoginError::WrongPassword);
        }
        self.current_user = Some(username.to_owned());
        Ok(&self.users[index])
    }

    pub fn logout(&mut self) {
        self.current_user = None;
    }

    pub fn toggle_list(&mut self, title: &str) -> Result<MembershipState, NotRegistered> {
        self.toggle(Shelf::List, title)
    }

    pub fn toggle_like(&mut self, title: &str) -> Result<MembershipState, NotRegistered> {
        self.toggle(Shelf::Likes, title)
    }

    pub fn toggle(&mut self, shelf: Shelf, title: &str) -> Result<MembershipState, NotRegistered> {
        let username = self.current_user.clone().ok_or(NotRegistered(shelf))?;
        let titles = self.shelf_mut(shelf).entry(username).or_default();
        let member = match titles.iter().position(|t| t == title) {
            Some(index) => {
                titles.remove(index);
                false
            }
            None => {
                titles.push(title.to_owned());
                true
            }
        };
        Ok(MembershipState { shelf, member })
    }

    /// Current membership of `title` for the logged in user; false when
    /// nobody is logged in.
    pub fn membership(&self, shelf: Shelf, title: &str) -> MembershipState {
        let member = self
            .current_user
            .as_ref()
            .and_then(|username| self.shelf(shelf).get(username))
            .map_or(false, |titles| titles.iter().any(|t| t == title));
        MembershipState { shelf, member }
    }

    pub fn titles(&self, shelf: Shelf) -> &[String] {
        self.current_user
            .as_ref()
            .and_then(|username| self.shelf(shelf).get(username))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn shelf(&self, shelf: Shelf) -> &HashMap<String, Vec<String>> {
        match shelf {
            Shelf::List => &self.lists,
            Shelf::Likes => &self.likes,
        }
    }

    fn shelf_mut(&mut self, shelf: Shelf) -> &mut HashMap<String, Vec<String>> {
        match shelf {
            Shelf::List => &mut self.lists,
            Shelf::Likes => &mut self.likes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
        }
    }

    fn registered(username: &str) -> SessionState {
        let mut state = SessionState::default();
        let email = format!("{}@example.com", username);
        state
            .register(&form(username, &email, "secreto", "secreto"), "hash".to_owned())
            .unwrap();
        state
    }

    #[test]
    fn register_logs_in() {
        let state = registered("ana");
        let user = state.current_user().unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.password_hash, "hash");
        assert!(state.titles(Shelf::List).is_empty());
        assert!(state.titles(Shelf::Likes).is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let state = SessionState::default();
        let errors = state
            .validate(&form("   ", "no-es-un-correo", "123", "321"))
            .unwrap_err();
        assert_eq!(
            errors.username.as_deref(),
            Some("El nombre de usuario es obligatorio")
        );
        assert_eq!(errors.email.as_deref(), Some("Correo electrónico inválido"));
        assert_eq!(
            errors.password.as_deref(),
            Some("La contraseña debe tener al menos 6 caracteres")
        );
        assert_eq!(
            errors.confirm_password.as_deref(),
            Some("Las contraseñas no coinciden")
        );
    }

    #[test]
    fn email_pattern() {
        let state = SessionState::default();
        let check = |email: &str| state.validate(&form("ana", email, "secreto", "secreto"));
        assert!(check("ana@example.com").is_ok());
        assert!(check("a@b.c.d").is_ok());
        assert!(check("ana@example").is_err());
        assert!(check("ana example@x.com").is_err());
        assert!(check("@example.com").is_err());
        assert!(check("").is_err());
    }

    #[test]
    fn password_length_counts_utf16_units() {
        let state = SessionState::default();
        assert!(state.validate(&form("ana", "a@b.co", "😀😀😀", "😀😀😀")).is_ok());
        assert!(state.validate(&form("ana", "a@b.co", "😀😀", "😀😀")).is_err());
        assert!(state.validate(&form("ana", "a@b.co", "ñññññ", "ñññññ")).is_err());
        assert!(state.validate(&form("ana", "a@b.co", "ññññññ", "ññññññ")).is_ok());
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let mut state = registered("ana");
        state.logout();
        let before = state.clone();

        let errors = state
            .register(&form("ana", "otra@example.com", "secreto", "secreto"), "h".to_owned())
            .unwrap_err();
        assert_eq!(errors.username.as_deref(), Some("El nombre o correo ya existe"));

        let errors = state
            .register(&form("luis", "ana@example.com", "secreto", "secreto"), "h".to_owned())
            .unwrap_err();
        assert_eq!(errors.username.as_deref(), Some("El nombre o correo ya existe"));

        assert_eq!(state, before);
        assert!(state.current_user().is_none());
    }

    #[test]
    fn duplicate_does_not_override_missing_username() {
        let state = registered("ana");
        let errors = state
            .validate(&form("", "ana@example.com", "secreto", "secreto"))
            .unwrap_err();
        assert_eq!(
            errors.username.as_deref(),
            Some("El nombre de usuario es obligatorio")
        );
    }

    #[test]
    fn toggle_twice_round_trips() {
        let mut state = registered("ana");
        let added = state.toggle_list("Dune").unwrap();
        assert!(added.member);
        assert_eq!(added.label(), "✓ En Mi Lista");
        assert_eq!(state.titles(Shelf::List), &["Dune".to_owned()]);
        let removed = state.toggle_list("Dune").unwrap();
        assert!(!removed.member);
        assert_eq!(removed.label(), "+ Mi Lista");
        assert!(state.titles(Shelf::List).is_empty());

        assert_eq!(state.toggle_like("Dune").unwrap().label(), "❤️");
        assert_eq!(state.toggle_like("Dune").unwrap().label(), "👍");
    }

    #[test]
    fn shelves_are_independent() {
        let mut state = registered("ana");
        state.toggle_like("Coco").unwrap();
        assert!(state.membership(Shelf::Likes, "Coco").member);
        assert!(!state.membership(Shelf::List, "Coco").member);
    }

    #[test]
    fn toggle_without_user_is_rejected() {
        let mut state = SessionState::default();
        let before = state.clone();
        let err = state.toggle_list("Dune").unwrap_err();
        assert_eq!(err.prompt(), "Debes registrarte para usar Mi Lista");
        let err = state.toggle_like("Dune").unwrap_err();
        assert_eq!(err.prompt(), "Debes registrarte para dar like");
        assert_eq!(state, before);
    }

    #[test]
    fn memberships_follow_current_user() {
        let mut state = registered("ana");
        state.toggle_list("Coco").unwrap();
        state.logout();
        assert!(!state.membership(Shelf::List, "Coco").member);
        state
            .register(&form("luis", "luis@example.com", "secreto", "secreto"), "h".to_owned())
            .unwrap();
        assert!(!state.membership(Shelf::List, "Coco").member);
        state.login("ana", |_| true).unwrap();
        assert!(state.membership(Shelf::List, "Coco").member);
    }

    #[test]
    fn login_checks_password() {
        let mut state = registered("ana");
        state.logout();
        assert_eq!(
            state.login("nadie", |_| true).unwrap_err(),
            LoginError::UnknownUser
        );
        assert_eq!(
            state.login("ana", |_| false).unwrap_err(),
            LoginError::WrongPassword
        );
        assert!(state.current_user().is_none());
        assert_eq!(state.login("ana", |_| true).unwrap().username, "ana");
    }
}
