use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::ops::Mutation;
use serde_json::json;

fn handle_points_adjust(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing studentId", None),
    };
    let Some(delta) = req.params.get("delta").and_then(|v| v.as_i64()) else {
        return err(&req.id, "bad_params", "delta must be an integer", None);
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if store.record().student(&student_id).is_none() {
        return err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        );
    }
    match store.dispatch(&Mutation::AdjustPoints {
        student_id: student_id.clone(),
        delta,
    }) {
        Ok(()) => {
            let points = store
                .record()
                .student(&student_id)
                .map(|s| s.points)
                .unwrap_or(0);
            ok(&req.id, json!({ "studentId": student_id, "points": points }))
        }
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_points_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match req.params.get("studentId").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing studentId", None),
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if store.record().student(&student_id).is_none() {
        return err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": student_id })),
        );
    }
    match store.dispatch(&Mutation::ResetPoints {
        student_id: student_id.clone(),
    }) {
        Ok(()) => ok(&req.id, json!({ "studentId": student_id, "points": 0 })),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

fn handle_leaderboard_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let rows = calc::leaderboard_order(store.record());
    match serde_json::to_value(&rows) {
        Ok(v) => ok(&req.id, json!({ "leaderboard": v })),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "points.adjust" => Some(handle_points_adjust(state, req)),
        "points.reset" => Some(handle_points_reset(state, req)),
        "leaderboard.get" => Some(handle_leaderboard_get(state, req)),
        _ => None,
    }
}
