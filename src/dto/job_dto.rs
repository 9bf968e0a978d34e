use serde::{Deserialize, Serialize};
use validator::Validate;

/// Server-side search filters for the job list. Uncommitted until the list
/// is reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobFilters {
    pub title: String,
    pub company: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Title,
    Company,
    Location,
}

impl JobFilters {
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Title => self.title = value,
            FilterField::Company => self.company = value,
            FilterField::Location => self.location = value,
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("company", self.company.clone()),
            ("location", self.location.clone()),
        ]
    }
}

/// The HR "add job" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, Default)]
pub struct JobForm {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobFormField {
    Title,
    Company,
    Location,
    Description,
}

impl JobForm {
    pub fn set(&mut self, field: JobFormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            JobFormField::Title => self.title = value,
            JobFormField::Company => self.company = value,
            JobFormField::Location => self.location = value,
            JobFormField::Description => self.description = value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    #[serde(flatten)]
    pub form: JobForm,
    pub posted_by: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_flattens_form_and_tags_poster() {
        let payload = CreateJobPayload {
            form: JobForm {
                title: "Backend Engineer".into(),
                company: "Acme".into(),
                location: "Remote".into(),
                description: "Rust services".into(),
            },
            posted_by: 12,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "title": "Backend Engineer",
                "company": "Acme",
                "location": "Remote",
                "description": "Rust services",
                "postedBy": 12
            })
        );
    }

    #[test]
    fn blank_form_field_fails_validation() {
        let mut form = JobForm {
            title: "QA".into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            description: String::new(),
        };
        assert!(form.validate().is_err());
        form.set(JobFormField::Description, "Manual testing");
        assert!(form.validate().is_ok());
    }
}
