use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// A stored assessment. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub experience: String,
    pub coding_experience: String,
    pub project_description: String,
    pub skills: Vec<String>,
    pub terms_accepted: bool,
    pub submitted_at: DateTime<Utc>,
    pub technical_answers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// A validated submission that has not been assigned an id or owner yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub full_name: String,
    pub email: String,
    pub experience: String,
    pub coding_experience: String,
    pub project_description: String,
    pub skills: Vec<String>,
    pub terms_accepted: bool,
    pub technical_answers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
}

impl NewSubmission {
    pub fn into_submission(self, id: String, user_id: String, submitted_at: DateTime<Utc>) -> Submission {
        Submission {
            id,
            user_id,
            full_name: self.full_name,
            email: self.email,
            experience: self.experience,
            coding_experience: self.coding_experience,
            project_description: self.project_description,
            skills: self.skills,
            terms_accepted: self.terms_accepted,
            submitted_at,
            technical_answers: self.technical_answers,
            user_agent: self.user_agent,
        }
    }
}

/// Body of `POST /api/submit-assessment`. Any extra `question*` / `tech*` keys
/// are collected as technical answers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    pub full_name: String,
    pub email: String,
    pub experience: String,
    pub coding_experience: String,
    pub project_description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

const MIN_FULL_NAME: usize = 2;
const MIN_CODING_EXPERIENCE: usize = 10;
const MIN_PROJECT_DESCRIPTION: usize = 20;

fn is_technical_key(key: &str) -> bool {
    key.starts_with("question") || key.starts_with("tech")
}

impl AssessmentRequest {
    pub fn validate(self) -> Result<NewSubmission, AppError> {
        if self.full_name.trim().chars().count() < MIN_FULL_NAME {
            return Err(AppError::BadRequest(
                "Full name must be at least 2 characters".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::BadRequest("Valid email is required".to_string()));
        }
        if self.experience.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Experience level is required".to_string(),
            ));
        }
        if self.coding_experience.trim().chars().count() < MIN_CODING_EXPERIENCE {
            return Err(AppError::BadRequest(
                "Coding experience must be at least 10 characters".to_string(),
            ));
        }
        if self.project_description.trim().chars().count() < MIN_PROJECT_DESCRIPTION {
            return Err(AppError::BadRequest(
                "Project description must be at least 20 characters".to_string(),
            ));
        }
        if self.skills.iter().all(|s| s.trim().is_empty()) {
            return Err(AppError::BadRequest(
                "At least one skill is required".to_string(),
            ));
        }
        if !self.terms_accepted {
            return Err(AppError::BadRequest(
                "Terms and conditions must be accepted".to_string(),
            ));
        }

        let mut technical_answers = BTreeMap::new();
        for (key, value) in self.extra {
            if !is_technical_key(&key) {
                continue;
            }
            match value {
                Value::String(answer) => {
                    technical_answers.insert(key, answer);
                }
                Value::Null => {}
                _ => {
                    return Err(AppError::BadRequest(format!(
                        "Answer for '{key}' must be a string"
                    )));
                }
            }
        }

        Ok(NewSubmission {
            full_name: self.full_name,
            email: self.email,
            experience: self.experience,
            coding_experience: self.coding_experience,
            project_description: self.project_description,
            skills: self.skills,
            terms_accepted: self.terms_accepted,
            technical_answers,
            user_agent: self.user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "fullName": "Grace Hopper",
            "email": "grace@example.com",
            "experience": "senior",
            "question1": "To manage state and side effects in functional components",
            "question2": "PUT",
            "techStack": "COBOL",
            "codingExperience": "Compilers since 1952",
            "projectDescription": "Built the first compiler, A-0, for UNIVAC I",
            "skills": ["Java", "SQL"],
            "termsAccepted": true,
            "userId": "spoofed"
        })
    }

    fn parse(v: Value) -> Result<NewSubmission, AppError> {
        serde_json::from_value::<AssessmentRequest>(v).unwrap().validate()
    }

    #[test]
    fn collects_technical_answers_only() {
        let s = parse(body()).unwrap();
        assert_eq!(s.technical_answers.len(), 3);
        assert_eq!(s.technical_answers["question2"], "PUT");
        assert_eq!(s.technical_answers["techStack"], "COBOL");
        assert!(!s.technical_answers.contains_key("userId"));
        assert_eq!(s.skills, vec!["Java", "SQL"]);
    }

    #[test]
    fn non_string_answer_is_a_validation_error() {
        let mut v = body();
        v["question3"] = json!(42);
        assert!(matches!(parse(v), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut v = body();
        v["termsAccepted"] = json!(false);
        assert!(matches!(parse(v), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn skills_must_not_be_empty() {
        let mut v = body();
        v["skills"] = json!([]);
        assert!(matches!(parse(v), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn short_project_description_is_rejected() {
        let mut v = body();
        v["projectDescription"] = json!("too short");
        assert!(matches!(parse(v), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn serializes_camel_case() {
        let s = parse(body())
            .unwrap()
            .into_submission("ASSESS_1_0".into(), "grace".into(), Utc::now());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["userId"], "grace");
        assert_eq!(v["projectDescription"], "Built the first compiler, A-0, for UNIVAC I");
        assert!(v.get("userAgent").is_none());
    }
}
