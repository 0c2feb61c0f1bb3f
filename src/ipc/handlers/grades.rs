use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::SubmissionStatus;
use crate::ops::Mutation;
use serde_json::json;

/// Grade input arrives from a free-text field: a number is kept, anything
/// blank or unparseable clears the stored grade. Never coerced to 0.
fn parse_grade_param(raw: Option<&serde_json::Value>) -> Option<f64> {
    match raw {
        None => None,
        Some(v) => match v {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => n.as_f64().filter(|g| g.is_finite()),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|g| g.is_finite()),
            _ => None,
        },
    }
}

fn require_pair(
    state: &AppState,
    req: &Request,
) -> Result<(String, String), serde_json::Value> {
    let student_id = match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return Err(err(&req.id, "bad_params", "missing studentId", None)),
    };
    let evaluation_id = match req.params.get("evaluationId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return Err(err(&req.id, "bad_params", "missing evaluationId", None)),
    };

    let Some(store) = state.store.as_ref() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    if store.record().student(&student_id).is_none() {
        return Err(err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        ));
    }
    if store.record().evaluation(&evaluation_id).is_none() {
        return Err(err(
            &req.id,
            "not_found",
            "evaluation not found",
            Some(json!({ "evaluationId": evaluation_id })),
        ));
    }
    Ok((student_id, evaluation_id))
}

fn handle_grades_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (student_id, evaluation_id) = match require_pair(state, req) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };
    let grade = parse_grade_param(req.params.get("grade"));

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match store.dispatch(&Mutation::SetGrade {
        student_id: student_id.clone(),
        evaluation_id: evaluation_id.clone(),
        grade,
    }) {
        Ok(()) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "evaluationId": evaluation_id,
                "grade": grade,
            }),
        ),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_grades_set_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (student_id, evaluation_id) = match require_pair(state, req) {
        Ok(pair) => pair,
        Err(resp) => return resp,
    };
    let status = match req
        .params
        .get("status")
        .and_then(|v| v.as_str())
        .and_then(SubmissionStatus::parse)
    {
        Some(s) => s,
        None => {
            return err(
                &req.id,
                "bad_params",
                "status must be one of: Pendiente, Entregado, Tardíamente, Sin Entregar",
                None,
            )
        }
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match store.dispatch(&Mutation::SetSubmissionStatus {
        student_id: student_id.clone(),
        evaluation_id: evaluation_id.clone(),
        status,
    }) {
        Ok(()) => ok(
            &req.id,
            json!({
                "studentId": student_id,
                "evaluationId": evaluation_id,
                "status": status.as_str(),
            }),
        ),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_grades_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let rows = calc::student_averages(store.record());
    match serde_json::to_value(&rows) {
        Ok(v) => ok(&req.id, json!({ "students": v })),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

fn handle_grades_for_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing studentId", None),
    };

    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let record = store.record();
    let Some(student) = record.student(&student_id) else {
        return err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        );
    };

    let rows: Vec<serde_json::Value> = record
        .evaluations
        .iter()
        .map(|e| {
            let entry = student.assignment_data.get(&e.id);
            json!({
                "evaluationId": e.id,
                "name": e.name,
                "type": e.eval_type.as_str(),
                "dateCreated": e.date_created,
                "dueDate": e.due_date,
                "grade": calc::grade_for_evaluation(student, &e.id),
                "status": entry
                    .map(|en| en.effective_status())
                    .unwrap_or(SubmissionStatus::Pendiente)
                    .as_str(),
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "studentId": student_id,
            "rows": rows,
            "finalAverage": calc::final_average(student, &record.evaluations),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.set" => Some(handle_grades_set(state, req)),
        "grades.setStatus" => Some(handle_grades_set_status(state, req)),
        "grades.summary" => Some(handle_grades_summary(state, req)),
        "grades.forStudent" => Some(handle_grades_for_student(state, req)),
        _ => None,
    }
}
