//! The tutor directory.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Subject filter value that matches every teacher.
pub const ALL_SUBJECTS: &str = "All Subjects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub subjects: Vec<String>,
    pub bio: String,
    pub experience: String,
    pub rating: f32,
    pub email: String,
}

fn teacher(
    id: &str,
    name: &str,
    seed: &str,
    subjects: &[&str],
    bio: &str,
    experience: &str,
    rating: f32,
) -> Teacher {
    Teacher {
        id: id.to_string(),
        name: name.to_string(),
        avatar: format!("https://picsum.photos/seed/{}/200/200", seed),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        bio: bio.to_string(),
        experience: experience.to_string(),
        rating,
        email: format!("{}@example.com", name_slug(name)),
    }
}

/// "Dr. Evelyn Reed" -> "evelyn.reed"
fn name_slug(name: &str) -> String {
    name.split_whitespace()
        .filter(|w| !w.ends_with('.'))
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".")
}

static TEACHERS: Lazy<Vec<Teacher>> = Lazy::new(|| {
    vec![
        teacher(
            "1",
            "Dr. Evelyn Reed",
            "evelyn",
            &["Calculus", "Linear Algebra", "Differential Equations"],
            "Passionate about making complex math accessible. PhD in Applied Mathematics with 10+ years of teaching experience at university level.",
            "10+ years",
            4.9,
        ),
        teacher(
            "2",
            "Mr. Samuel Green",
            "samuel",
            &["Algebra", "Geometry", "Trigonometry", "Statistics"],
            "Engaging high school math teacher focused on building strong foundational skills. Believes in a practical, problem-solving approach.",
            "8 years",
            4.7,
        ),
        teacher(
            "3",
            "Ms. Olivia Chen",
            "olivia",
            &["Pre-Calculus", "Statistics", "Discrete Mathematics"],
            "Friendly and patient tutor specializing in helping students overcome math anxiety. MSc in Statistics.",
            "5 years",
            4.8,
        ),
        teacher(
            "4",
            "Prof. Arthur Dent",
            "arthur",
            &["Number Theory", "Abstract Algebra", "Topology"],
            "Researcher and lecturer with a knack for explaining abstract concepts with clarity and enthusiasm. Enjoys tackling challenging problems.",
            "15 years",
            4.6,
        ),
        teacher(
            "5",
            "Mrs. Bella Swan",
            "bella",
            &["Basic Math", "Pre-Algebra", "Study Skills"],
            "Dedicated to helping younger students build confidence in math. Focuses on personalized learning and making math fun.",
            "6 years",
            4.9,
        ),
        teacher(
            "6",
            "Dr. Zaphod Beeblebrox",
            "zaphod",
            &["Probability Theory", "Mathematical Physics", "Chaos Theory"],
            "An unconventional tutor who makes even the most improbable math topics seem perfectly normal. Two heads are better than one for problem-solving!",
            "7 years",
            4.5,
        ),
    ]
});

pub fn all() -> &'static [Teacher] {
    &TEACHERS
}

pub fn get(id: &str) -> Option<&'static Teacher> {
    TEACHERS.iter().find(|t| t.id == id)
}

/// Filter values offered to the user, starting with [`ALL_SUBJECTS`].
pub fn subjects() -> Vec<&'static str> {
    let mut subjects = vec![ALL_SUBJECTS];
    for teacher in TEACHERS.iter() {
        for subject in &teacher.subjects {
            if !subjects.contains(&subject.as_str()) {
                subjects.push(subject.as_str());
            }
        }
    }
    subjects
}

/// Teachers whose name, bio or subjects contain `query` (case-insensitive)
/// and who teach `subject`. Blank or absent filters match everyone.
pub fn search(query: Option<&str>, subject: Option<&str>) -> Vec<&'static Teacher> {
    let query = query.map(str::trim).unwrap_or_default().to_lowercase();
    let subject = subject
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ALL_SUBJECTS);

    TEACHERS
        .iter()
        .filter(|t| match subject {
            Some(wanted) => t.subjects.iter().any(|s| s.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .filter(|t| {
            query.is_empty()
                || t.name.to_lowercase().contains(&query)
                || t.bio.to_lowercase().contains(&query)
                || t.subjects.iter().any(|s| s.to_lowercase().contains(&query))
        })
        .collect()
}
