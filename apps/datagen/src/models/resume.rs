use serde::{Deserialize, Serialize};

/// One synthetic resume. Anonymous until the render stage gives it a sequence index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub personal_info: PersonalInfo,
    pub summary: String,
    /// Always at least one entry; only the first is rendered.
    pub education: Vec<Education>,
    pub skills: Skills,
    /// Always at least one project.
    pub projects: Vec<Project>,
    /// Empty for candidates without work experience.
    pub experience: Vec<String>,
    pub hobbies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub start_year: String,
    pub end_year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub programming: Vec<String>,
    pub ml_dl: Vec<String>,
    pub cv: Vec<String>,
    pub tools: Vec<String>,
}

impl Skills {
    /// Categories in display order, with their heading.
    pub fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Programming", &self.programming),
            ("ML & DL", &self.ml_dl),
            ("Computer Vision", &self.cv),
            ("Tools", &self.tools),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(rename = "description")]
    pub bullets: Vec<String>,
}

impl Record {
    /// Checks the structural invariants a renderer relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.education.is_empty() {
            return Err("record has no education entry".to_string());
        }
        if self.projects.is_empty() {
            return Err("record has no projects".to_string());
        }
        Ok(())
    }
}
