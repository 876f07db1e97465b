use serde::{Deserialize, Serialize};
use std::fmt;

/// Insertion-ordered, duplicate-free set of role names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(Vec<String>);

impl Roles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for role in roles {
            let role = role.into();
            let role = role.trim();
            if role.is_empty() || out.iter().any(|r| r == role) {
                continue;
            }
            out.push(role.to_string());
        }
        Self(out)
    }

    /// Parse a comma-separated role list such as `"ADMIN, AGENT"`.
    pub fn parse_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_csv(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_csv())
    }
}

/// Resolved (tenant, user, roles) for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub tenant_id: String,
    pub user_id: Option<String>,
    pub roles: Roles,
}

impl Identity {
    pub fn new(tenant_id: impl Into<String>, user_id: Option<String>, roles: Roles) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id,
            roles,
        }
    }

    pub fn tenant_only(tenant_id: impl Into<String>) -> Self {
        Self::new(tenant_id, None, Roles::default())
    }
}

/// Outcome of credential verification, produced next to the identity by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub authenticated: bool,
    pub principal: Option<String>,
}

impl Authentication {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn verified(principal: Option<String>) -> Self {
        Self {
            authenticated: true,
            principal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_roles_in_order_without_duplicates() {
        let roles = Roles::parse_csv(" AGENT,ADMIN, ,AGENT ");
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec!["AGENT", "ADMIN"]);
        assert_eq!(roles.to_csv(), "AGENT,ADMIN");
    }

    #[test]
    fn empty_csv_yields_no_roles() {
        assert!(Roles::parse_csv("").is_empty());
        assert!(!Roles::parse_csv("").contains(""));
    }

    #[test]
    fn identity_serializes_camel_case() {
        let identity = Identity::new("acme", Some("u1".into()), Roles::parse_csv("ADMIN"));
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["tenantId"], "acme");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["roles"][0], "ADMIN");
    }
}
