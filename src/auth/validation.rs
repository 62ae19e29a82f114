use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::auth::dto::CredentialsRequest;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Required,
    Text,
    Email,
    MinChars(usize),
}

/// Rules for one body field. `trim` decides whether surrounding whitespace
/// counts towards presence.
struct FieldRules {
    field: &'static str,
    trim: bool,
    rules: &'static [(Rule, &'static str)],
}

const EMAIL: FieldRules = FieldRules {
    field: "email",
    trim: true,
    rules: &[
        (Rule::Required, "Email is required"),
        (Rule::Email, "Email must be valid"),
    ],
};

const REGISTER_RULES: &[FieldRules] = &[
    EMAIL,
    FieldRules {
        field: "password",
        trim: false,
        rules: &[
            (Rule::Required, "Password is required"),
            (Rule::MinChars(6), "Password must be at least 6 characters"),
        ],
    },
];

// No length rule on login: a short wrong password is a failed login, not a bad request.
const LOGIN_RULES: &[FieldRules] = &[
    EMAIL,
    FieldRules {
        field: "password",
        trim: false,
        rules: &[
            (Rule::Required, "Password is required"),
            (Rule::Text, "Password must be a string"),
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Email and password that passed validation; email is trimmed and lower-cased.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn is_present(value: Option<&Value>, trim: bool) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) if trim => !s.trim().is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        // wrong type: present, left to the format rules
        Some(_) => true,
    }
}

fn passes(rule: Rule, value: &Value) -> bool {
    match (rule, value.as_str()) {
        (Rule::Required, _) => true,
        (_, None) => false,
        (Rule::Text, Some(_)) => true,
        (Rule::Email, Some(v)) => is_valid_email(v.trim()),
        (Rule::MinChars(min), Some(v)) => v.chars().count() >= min,
    }
}

fn run_rules<'a>(
    table: &[FieldRules],
    lookup: impl Fn(&str) -> Option<&'a Value>,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for field in table {
        let value = lookup(field.field);
        for &(rule, message) in field.rules {
            let failed = match value {
                _ if matches!(rule, Rule::Required) => !is_present(value, field.trim),
                Some(v) if is_present(value, field.trim) => !passes(rule, v),
                _ => false,
            };
            if failed {
                violations.push(FieldViolation {
                    field: field.field,
                    message,
                });
            }
        }
    }
    violations
}

impl CredentialsRequest {
    fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "email" => self.email.as_ref(),
            "password" => self.password.as_ref(),
            _ => None,
        }
    }

    fn validate_with(self, table: &[FieldRules]) -> Result<Credentials, Vec<FieldViolation>> {
        let violations = run_rules(table, |name| self.field(name));
        if !violations.is_empty() {
            return Err(violations);
        }
        let text = |v: Option<Value>| match v {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        Ok(Credentials {
            email: text(self.email).trim().to_lowercase(),
            password: text(self.password),
        })
    }

    /// Register rules, every violation reported together.
    pub fn validate_register(self) -> Result<Credentials, Vec<FieldViolation>> {
        self.validate_with(REGISTER_RULES)
    }

    /// Login rules: presence, email format and a string password.
    pub fn validate_login(self) -> Result<Credentials, Vec<FieldViolation>> {
        self.validate_with(LOGIN_RULES)
    }
}
