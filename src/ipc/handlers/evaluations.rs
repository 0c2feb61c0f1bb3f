use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{fresh_evaluation_id, EvaluationType};
use crate::ops::Mutation;
use serde_json::json;

fn handle_evaluations_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let evaluations: Vec<serde_json::Value> = store
        .record()
        .evaluations
        .iter()
        .map(|e| {
            json!({
                "evaluationId": e.id,
                "name": e.name,
                "type": e.eval_type.as_str(),
                "dateCreated": e.date_created,
                "dueDate": e.due_date,
            })
        })
        .collect();
    ok(&req.id, json!({ "evaluations": evaluations }))
}

fn handle_evaluations_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty name", None),
    };
    let eval_type = match req
        .params
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(EvaluationType::parse)
    {
        Some(t) => t,
        None => {
            return err(
                &req.id,
                "bad_params",
                "type must be one of: Tarea, Actividad, Proyecto, Examen",
                None,
            )
        }
    };
    let due_date = match req.params.get("dueDate").and_then(|v| v.as_str()) {
        Some(d) if chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok() => d.to_string(),
        _ => {
            return err(
                &req.id,
                "bad_params",
                "dueDate must be a YYYY-MM-DD date",
                None,
            )
        }
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let evaluation_id = fresh_evaluation_id();
    match store.dispatch(&Mutation::AddEvaluation {
        id: evaluation_id.clone(),
        name,
        eval_type,
        due_date,
    }) {
        Ok(()) => ok(&req.id, json!({ "evaluationId": evaluation_id })),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_evaluations_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let evaluation_id = match req.params.get("evaluationId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing evaluationId", None),
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let existed = store.record().evaluation(&evaluation_id).is_some();
    let affected_students = store
        .record()
        .students
        .iter()
        .filter(|s| s.assignment_data.contains_key(&evaluation_id))
        .count();
    match store.dispatch(&Mutation::DeleteEvaluation { evaluation_id }) {
        Ok(()) => ok(
            &req.id,
            json!({
                "removed": existed,
                "cascadedStudents": affected_students,
            }),
        ),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "evaluations.list" => Some(handle_evaluations_list(state, req)),
        "evaluations.add" => Some(handle_evaluations_add(state, req)),
        "evaluations.delete" => Some(handle_evaluations_delete(state, req)),
        _ => None,
    }
}
