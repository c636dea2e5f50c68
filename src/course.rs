//! Read-only course records and their display defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_DURATION: &str = "Self-paced";
pub const DEFAULT_PRICE: &str = "Free";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub level: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

impl Course {
    pub fn duration(&self) -> &str {
        self.duration.as_deref().unwrap_or(DEFAULT_DURATION)
    }

    pub fn lessons(&self) -> u32 {
        self.lessons.unwrap_or(0)
    }

    pub fn students(&self) -> u64 {
        self.students.unwrap_or(0)
    }

    pub fn price(&self) -> &str {
        self.price.as_deref().unwrap_or(DEFAULT_PRICE)
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("course '{0}' not found")]
    NotFound(String),

    #[error("malformed course data: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait CourseCatalog: Send + Sync {
    /// Fetch one course. A missing id is [`CourseError::NotFound`]; it is
    /// not retried.
    fn fetch(&self, id: &str) -> Result<Course, CourseError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    courses: HashMap<String, Course>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "<id>": { ...course fields... } }`. Each record's `id` is taken
    /// from its key.
    pub fn from_json(json: &str) -> Result<Self, CourseError> {
        let raw: HashMap<String, Course> = serde_json::from_str(json)?;
        let courses = raw
            .into_iter()
            .map(|(id, mut course)| {
                course.id = id.clone();
                (id, course)
            })
            .collect();
        Ok(Self { courses })
    }

    pub fn insert(&mut self, course: Course) {
        self.courses.insert(course.id.clone(), course);
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl CourseCatalog for InMemoryCatalog {
    fn fetch(&self, id: &str) -> Result<Course, CourseError> {
        self.courses
            .get(id)
            .cloned()
            .ok_or_else(|| CourseError::NotFound(id.to_string()))
    }
}
