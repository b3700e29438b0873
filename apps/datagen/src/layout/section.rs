use std::fmt;

use serde::{Deserialize, Serialize};

/// The six canonical section classes. The discriminant is the detection class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionClass {
    Header = 0,
    Education = 1,
    Skills = 2,
    Projects = 3,
    Experience = 4,
    Hobbies = 5,
}

impl SectionClass {
    pub const ALL: [SectionClass; 6] = [
        SectionClass::Header,
        SectionClass::Education,
        SectionClass::Skills,
        SectionClass::Projects,
        SectionClass::Experience,
        SectionClass::Hobbies,
    ];

    pub fn class_id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionClass::Header => "header",
            SectionClass::Education => "education",
            SectionClass::Skills => "skills",
            SectionClass::Projects => "projects",
            SectionClass::Experience => "experience",
            SectionClass::Hobbies => "hobbies",
        }
    }

    /// Looks up a layout section name. Names outside the six classes return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        SectionClass::ALL.into_iter().find(|class| class.name() == name)
    }
}

impl fmt::Display for SectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_ids_are_fixed() {
        let ids: Vec<(&str, u8)> = SectionClass::ALL
            .iter()
            .map(|c| (c.name(), c.class_id()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("header", 0),
                ("education", 1),
                ("skills", 2),
                ("projects", 3),
                ("experience", 4),
                ("hobbies", 5),
            ]
        );
    }

    #[test]
    fn test_from_name_ignores_unknown_sections() {
        assert_eq!(SectionClass::from_name("skills"), Some(SectionClass::Skills));
        assert_eq!(SectionClass::from_name("footer"), None);
        assert_eq!(SectionClass::from_name("Header"), None);
    }
}
