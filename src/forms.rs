//! Local validation for the signup, project and task forms.
//!
//! Validators return every problem at once, keyed by field name, so a caller
//! can show them next to the matching inputs. An empty map means valid.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::*;

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid regex")
});
static RE_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static RE_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static RE_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid regex"));

/// Field name -> message.
pub type FormErrors = BTreeMap<&'static str, String>;

fn require(errors: &mut FormErrors, field: &'static str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
        false
    } else {
        true
    }
}

/// `local@domain.tld` with a TLD of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    RE_EMAIL.is_match(email)
}

/// Mixed case plus at least one digit.
pub fn is_strong_password(password: &str) -> bool {
    RE_LOWER.is_match(password) && RE_UPPER.is_match(password) && RE_DIGIT.is_match(password)
}

/// Trim entries, drop blanks and keep the first occurrence of each.
pub fn normalize_list(items: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.as_ref().trim();
        if !item.is_empty() && !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

// ============================================================
// Signup
// ============================================================

/// The three-step signup form, including the local-only confirmation.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub company: String,
    pub job_role: String,
    pub skills: Vec<String>,
    pub years_of_experience: String,
}

impl SignupForm {
    /// Step 1: personal information.
    pub fn validate_personal(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        require(&mut errors, "firstName", &self.first_name, "First name is required");
        require(&mut errors, "lastName", &self.last_name, "Last name is required");
        if require(&mut errors, "email", &self.email, "Email is required")
            && !is_valid_email(self.email.trim())
        {
            errors.insert("email", "Invalid email address".to_string());
        }
        errors
    }

    /// Step 2: account security.
    pub fn validate_security(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if require(&mut errors, "password", &self.password, "Password is required") {
            let p = &self.password;
            if p.chars().count() < 8 {
                errors.insert("password", "Password must be at least 8 characters".to_string());
            } else if !is_strong_password(p) {
                errors.insert(
                    "password",
                    "Password must contain uppercase, lowercase, and number".to_string(),
                );
            }
        }
        if require(
            &mut errors,
            "confirmPassword",
            &self.confirm_password,
            "Please confirm your password",
        ) && self.password != self.confirm_password
        {
            errors.insert("confirmPassword", "Passwords do not match".to_string());
        }
        errors
    }

    /// Step 3: company details.
    pub fn validate_company(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        require(&mut errors, "company", &self.company, "Company name is required");
        require(&mut errors, "jobRole", &self.job_role, "Job role is required");
        require(
            &mut errors,
            "yearsOfExperience",
            &self.years_of_experience,
            "Years of experience is required",
        );
        errors
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = self.validate_personal();
        errors.extend(self.validate_security());
        errors.extend(self.validate_company());
        errors
    }

    /// Build the request body. The confirmation is dropped here.
    pub fn into_input(self) -> Result<SignupInput, FormErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(SignupInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            company: self.company.trim().to_string(),
            job_role: self.job_role.trim().to_string(),
            skills: normalize_list(&self.skills),
            years_of_experience: self.years_of_experience.trim().to_string(),
        })
    }
}

// ============================================================
// Projects
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub team_members: Vec<String>,
}

impl ProjectForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        require(&mut errors, "projectName", &self.name, "Project name is required");
        require(&mut errors, "projectDesc", &self.description, "Description is required");
        if self.priority.is_none() {
            errors.insert("priority", "Priority is required".to_string());
        }
        if self.due_date.is_none() {
            errors.insert("dueDate", "Due date is required".to_string());
        }
        errors
    }

    /// New projects always start in `planning`.
    pub fn into_input(self) -> Result<CreateProjectInput, FormErrors> {
        let errors = self.validate();
        match (self.priority, self.due_date) {
            (Some(priority), Some(due_date)) if errors.is_empty() => Ok(CreateProjectInput {
                project_name: self.name.trim().to_string(),
                project_desc: self.description.trim().to_string(),
                priority,
                due_date,
                team_members: normalize_list(&self.team_members),
                status: ProjectStatus::Planning,
            }),
            _ => Err(errors),
        }
    }
}

// ============================================================
// Tasks
// ============================================================

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: None,
            status: TaskStatus::Todo,
            due_date: None,
        }
    }
}

impl TaskForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        require(&mut errors, "taskTitle", &self.title, "Task title is required");
        require(&mut errors, "description", &self.description, "Description is required");
        if self.priority.is_none() {
            errors.insert("priority", "Priority is required".to_string());
        }
        if self.due_date.is_none() {
            errors.insert("dueDate", "Due date is required".to_string());
        }
        errors
    }

    /// Build the request body, stamping `created` as the creation date.
    pub fn into_input(self, created: NaiveDate) -> Result<CreateTaskInput, FormErrors> {
        let errors = self.validate();
        match (self.priority, self.due_date) {
            (Some(priority), Some(due_date)) if errors.is_empty() => Ok(CreateTaskInput {
                task_title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                priority,
                status: self.status,
                due_date,
                created_date: created,
            }),
            _ => Err(errors),
        }
    }
}

/// One line per error, for terminal output.
pub fn describe(errors: &FormErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}
