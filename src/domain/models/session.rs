use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role_name: String,
}

/// One-shot message shown on the next page a session renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flash {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl Flash {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Per-request view of the session, built once by middleware and handed to
/// handlers as a request extension.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<SessionUser>,
    pub flash: Option<Flash>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role_name(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.role_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_context() {
        let context = RequestContext::anonymous();
        assert!(!context.is_authenticated());
        assert_eq!(context.role_name(), None);
    }

    #[test]
    fn test_role_name_comes_from_user() {
        let context = RequestContext {
            user: Some(SessionUser {
                id: "42".to_string(),
                username: None,
                role_name: "admin".to_string(),
            }),
            flash: None,
        };
        assert!(context.is_authenticated());
        assert_eq!(context.role_name(), Some("admin"));
    }

    #[test]
    fn test_flash_serializes_kind_as_type() {
        let flash = Flash::new("success", "Donation saved");
        let value = serde_json::to_value(&flash).unwrap();
        assert_eq!(value["type"], "success");
        assert_eq!(value["message"], "Donation saved");
    }
}
