//! Account domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neon_core::config::DEFAULT_WAKE_WORD;
use neon_core::error::NeonError;

/// What the user does. Decides which organization label is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupation {
    Student,
    Employee,
}

impl Occupation {
    /// Label for the organization field.
    pub fn organization_label(&self) -> &'static str {
        match self {
            Occupation::Student => "Institution",
            Occupation::Employee => "Company",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Occupation::Student => "student",
            Occupation::Employee => "employee",
        }
    }
}

impl fmt::Display for Occupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupation::Student => write!(f, "Student"),
            Occupation::Employee => write!(f, "Employee"),
        }
    }
}

impl FromStr for Occupation {
    type Err = NeonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Occupation::Student),
            "employee" => Ok(Occupation::Employee),
            other => Err(NeonError::InvalidInput(format!(
                "Unknown occupation: {}",
                other
            ))),
        }
    }
}

/// Registration form contents.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub occupation: Option<Occupation>,
    /// Institution for students, company for employees.
    pub organization: String,
}

impl NewAccount {
    /// Trim fields and reject forms missing an email, password, or
    /// occupation.
    pub fn validate(mut self) -> Result<(Self, Occupation), NeonError> {
        self.email = self.email.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.organization = self.organization.trim().to_string();

        if self.email.is_empty() || !self.email.contains('@') {
            return Err(NeonError::InvalidInput(
                "A valid email is required".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(NeonError::InvalidInput("A password is required".to_string()));
        }
        let occupation = self.occupation.ok_or_else(|| {
            NeonError::InvalidInput("Please select Student or Employee".to_string())
        })?;
        Ok((self, occupation))
    }
}

/// A stored account, without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub occupation: Occupation,
    pub organization: String,
    pub wake_word: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Accounts still on the default wake word are sent through setup.
    pub fn needs_setup(&self) -> bool {
        self.wake_word.trim().eq_ignore_ascii_case(DEFAULT_WAKE_WORD)
    }
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(Uuid),
    DuplicateEmail,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewAccount {
        NewAccount {
            email: "  ada@example.com ".into(),
            password: "secret".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            age: Some(36),
            occupation: Some(Occupation::Employee),
            organization: "Analytical Engines".into(),
        }
    }

    #[test]
    fn test_occupation_from_str() {
        assert_eq!("Student".parse::<Occupation>().unwrap(), Occupation::Student);
        assert_eq!(" employee ".parse::<Occupation>().unwrap(), Occupation::Employee);
        assert!("retired".parse::<Occupation>().is_err());
    }

    #[test]
    fn test_organization_label() {
        assert_eq!(Occupation::Student.organization_label(), "Institution");
        assert_eq!(Occupation::Employee.organization_label(), "Company");
    }

    #[test]
    fn test_validate_trims_email() {
        let (form, occupation) = form().validate().unwrap();
        assert_eq!(form.email, "ada@example.com");
        assert_eq!(occupation, Occupation::Employee);
    }

    #[test]
    fn test_validate_requires_occupation() {
        let mut f = form();
        f.occupation = None;
        assert!(matches!(f.validate(), Err(NeonError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_requires_email() {
        let mut f = form();
        f.email = "   ".into();
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_needs_setup() {
        let mut account = Account {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            age: None,
            occupation: Occupation::Student,
            organization: String::new(),
            wake_word: "hey alexa".into(),
            created_at: Utc::now(),
        };
        assert!(account.needs_setup());
        account.wake_word = "Hey Alexa".into();
        assert!(account.needs_setup());
        account.wake_word = "hey neon".into();
        assert!(!account.needs_setup());
        assert_eq!(account.full_name(), "Ada Lovelace");
    }
}
