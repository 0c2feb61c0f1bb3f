use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::suggest::{ActivitySuggester, TemplateSuggester};
use serde_json::json;

fn handle_activities_suggest(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let grade = match req.params.get("grade").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty grade", None),
    };
    let subject = match req.params.get("subject").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => return err(&req.id, "bad_params", "missing or empty subject", None),
    };

    // Fire-and-forget from the data model's perspective: a failure here
    // never touches the store.
    let suggester = TemplateSuggester;
    match suggester.suggest(&grade, &subject) {
        Ok(suggestions) => ok(&req.id, json!({ "suggestions": suggestions })),
        Err(e) => err(&req.id, "suggest_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "activities.suggest" => Some(handle_activities_suggest(state, req)),
        _ => None,
    }
}
