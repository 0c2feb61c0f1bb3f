use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::ops::Mutation;
use serde_json::json;

fn handle_class_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let record = match serde_json::to_value(store.record()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "serialize_failed", e.to_string(), None),
    };
    ok(
        &req.id,
        json!({
            "class": record,
            "notes": store.notes(),
        }),
    )
}

fn handle_class_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let overview = calc::class_overview(store.record());
    match serde_json::to_value(&overview) {
        Ok(v) => ok(&req.id, v),
        Err(e) => err(&req.id, "serialize_failed", e.to_string(), None),
    }
}

fn handle_class_update_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match req.params.get("name").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty name", None),
    };
    let subject = match req.params.get("subject").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty subject", None),
    };
    // Omitted key leaves the stored description alone; null clears it.
    let description = match req.params.get("description") {
        None => None,
        Some(serde_json::Value::Null) => Some(None),
        Some(v) => match v.as_str() {
            Some(s) => Some(Some(s.to_string())),
            None => return err(&req.id, "bad_params", "description must be a string", None),
        },
    };

    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match store.dispatch(&Mutation::UpdateClassInfo {
        name,
        subject,
        description,
    }) {
        Ok(()) => ok(&req.id, json!({ "classId": store.record().id })),
        Err(e) => err(&req.id, "store_save_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "class.get" => Some(handle_class_get(state, req)),
        "class.overview" => Some(handle_class_overview(state, req)),
        "class.updateInfo" => Some(handle_class_update_info(state, req)),
        _ => None,
    }
}
