use crate::error::{Error, Result};
use axum::{
    extract::{Path, Query},
    Json,
};
use mathfluent_core::teachers::{self, Teacher};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct TeacherQuery {
    pub q: Option<String>,
    pub subject: Option<String>,
}

/// GET /teachers?q=&subject=
pub async fn list_teachers(Query(query): Query<TeacherQuery>) -> Json<Vec<Teacher>> {
    let found = teachers::search(query.q.as_deref(), query.subject.as_deref());
    Json(found.into_iter().cloned().collect())
}

/// GET /teachers/subjects
pub async fn list_subjects() -> Json<Vec<&'static str>> {
    Json(teachers::subjects())
}

/// GET /teachers/{teacher_id}
pub async fn get_teacher(Path(teacher_id): Path<String>) -> Result<Json<Teacher>> {
    teachers::get(&teacher_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("Teacher {}", teacher_id)))
}
