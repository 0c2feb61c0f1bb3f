use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::fresh_student_id;
use crate::ops::Mutation;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let students: Vec<serde_json::Value> = store
        .record()
        .students
        .iter()
        .map(|s| {
            json!({
                "studentId": s.id,
                "name": s.name,
                "gradeLevel": s.grade,
                "points": s.points,
            })
        })
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty name", None),
    };
    let grade_level = match req.params.get("gradeLevel").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty gradeLevel", None),
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let student_id = fresh_student_id();
    match store.dispatch(&Mutation::AddStudent {
        id: student_id.clone(),
        name,
        grade_level,
    }) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id })),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_students_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing studentId", None),
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let existed = store.record().student(&student_id).is_some();
    match store.dispatch(&Mutation::RemoveStudent { student_id }) {
        Ok(()) => ok(&req.id, json!({ "removed": existed })),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.remove" => Some(handle_students_remove(state, req)),
        _ => None,
    }
}
