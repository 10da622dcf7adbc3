use std::fmt;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl User {
    /// Name to show, falling back to the id for users with a blank name
    pub fn display_name(&self) -> String {
        match self.name.trim().is_empty() {
            true => format!("User {}", self.id),
            false => self.name.clone(),
        }
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|i| !i.trim().is_empty())
    }
}

/// Profile update. Only the fields that are set get sent.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.password.is_none() && self.image.is_none()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdmin {
    pub user_id: UserId,
    pub turnon: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_fall_back_to_id() {
        let mut u: User = serde_json::from_str(r#"{"id":7,"name":"  "}"#).unwrap();
        assert_eq!(u.display_name(), "User 7");
        u.name = String::from("Ada");
        assert_eq!(u.display_name(), "Ada");
        assert_eq!(u.image(), None);
    }

    #[test]
    fn update_skips_unset_fields() {
        let update = UserUpdate {
            name: Some(String::from("Ada")),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "name": "Ada" })
        );
    }
}
