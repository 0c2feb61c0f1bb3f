use crate::model::{
    default_class_record, AssignmentEntry, ClassRecord, Evaluation, EvaluationType, Student,
    SubmissionStatus, DEFAULT_CLASS_ID,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of normalizing a persisted blob into the canonical shape.
/// `repaired` tells the caller the stored bytes no longer match the
/// canonical serialization and should be written back (self-healing).
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub record: ClassRecord,
    pub repaired: bool,
    pub notes: Vec<String>,
}

/// Normalize whatever was stored under the data key into the canonical
/// single-class record. Accepts the three historical shapes:
///
///   v1: students carry `points` only
///   v2: `points` plus a per-type `grades` map (dropped on upgrade,
///       no unambiguous per-evaluation target exists)
///   v3: `points` plus per-evaluation `assignmentData` (canonical)
///
/// Never fails; anything unusable degrades to the hardcoded default.
pub fn reconcile(raw: Option<&Value>) -> ReconcileOutcome {
    let mut notes: Vec<String> = Vec::new();

    let record = match raw {
        None => {
            notes.push("no stored data; starting from the default class".to_string());
            default_class_record()
        }
        Some(v) => reconcile_value(v, &mut notes),
    };

    // The stored blob is a one-element array for shape compatibility with
    // the historical multi-class layout.
    let canonical = serde_json::to_value(std::slice::from_ref(&record)).unwrap_or(Value::Null);
    let repaired = raw != Some(&canonical);

    ReconcileOutcome {
        record,
        repaired,
        notes,
    }
}

fn reconcile_value(raw: &Value, notes: &mut Vec<String>) -> ClassRecord {
    // Historical blobs are one-element arrays; a bare record is accepted too.
    let class_obj = match raw {
        Value::Array(items) if items.len() == 1 => &items[0],
        Value::Array(items) => {
            notes.push(format!(
                "expected exactly one stored class, found {}; resetting to default",
                items.len()
            ));
            return default_class_record();
        }
        Value::Object(_) => raw,
        _ => {
            notes.push("stored data is not a class collection; resetting to default".to_string());
            return default_class_record();
        }
    };

    let Some(obj) = class_obj.as_object() else {
        notes.push("stored class is not an object; resetting to default".to_string());
        return default_class_record();
    };

    let id = obj.get("id").and_then(|v| v.as_str()).unwrap_or("");
    if id != DEFAULT_CLASS_ID {
        notes.push(format!(
            "stored class id {:?} does not match the expected class; resetting to default",
            id
        ));
        return default_class_record();
    }

    let defaults = default_class_record();
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or(defaults.name);
    let subject = obj
        .get("subject")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or(defaults.subject);
    let description = obj
        .get("description")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let evaluations = match obj.get("evaluations") {
        None => {
            notes.push("class had no evaluations field; defaulting to empty".to_string());
            Vec::new()
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| reconcile_evaluation(item, notes))
            .collect(),
        Some(_) => {
            notes.push("evaluations field is not a list; defaulting to empty".to_string());
            Vec::new()
        }
    };

    let students = match obj.get("students") {
        None => {
            notes.push("class had no students field; defaulting to empty".to_string());
            Vec::new()
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| reconcile_student(item, notes))
            .collect(),
        Some(_) => {
            notes.push("students field is not a list; defaulting to empty".to_string());
            Vec::new()
        }
    };

    ClassRecord {
        id: DEFAULT_CLASS_ID.to_string(),
        name,
        subject,
        description,
        students,
        evaluations,
    }
}

fn reconcile_student(raw: &Value, notes: &mut Vec<String>) -> Option<Student> {
    let obj = raw.as_object()?;
    let id = obj.get("id").and_then(|v| v.as_str()).unwrap_or("");
    let name = obj.get("name").and_then(|v| v.as_str()).unwrap_or("");
    if id.is_empty() || name.is_empty() {
        notes.push("dropped a student record without id or name".to_string());
        return None;
    }

    let grade = obj
        .get("grade")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let points = match obj.get("points") {
        Some(v) => match v.as_f64() {
            Some(p) if p.is_finite() => (p.round() as i64).max(0),
            _ => {
                notes.push(format!("student {name}: unusable points value reset to 0"));
                0
            }
        },
        None => 0,
    };

    // The v2 per-type grades map has no per-evaluation target to migrate
    // onto; it is dropped on this one-time upgrade.
    if obj.get("grades").is_some() {
        notes.push(format!(
            "student {name}: dropped legacy per-type grades (no per-evaluation mapping)"
        ));
    }

    let mut assignment_data: BTreeMap<String, AssignmentEntry> = BTreeMap::new();
    match obj.get("assignmentData") {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (eval_id, entry) in entries {
                let Some(entry) = reconcile_assignment_entry(entry, &format!("{name}/{eval_id}"), notes)
                else {
                    continue;
                };
                // An entry with neither grade nor status reads the same as
                // no entry; drop it so the shape stays canonical.
                if entry.grade.is_none() && entry.status.is_none() {
                    continue;
                }
                assignment_data.insert(eval_id.clone(), entry);
            }
        }
        Some(_) => {
            notes.push(format!(
                "student {name}: assignmentData was not a map; defaulting to empty"
            ));
        }
    }

    Some(Student {
        id: id.to_string(),
        name: name.to_string(),
        grade,
        points,
        assignment_data,
    })
}

fn reconcile_assignment_entry(
    raw: &Value,
    context: &str,
    notes: &mut Vec<String>,
) -> Option<AssignmentEntry> {
    let obj = raw.as_object()?;

    let grade = match obj.get("grade") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(g) if g.is_finite() => Some(g),
            _ => {
                notes.push(format!("{context}: cleared a non-numeric grade"));
                None
            }
        },
    };

    let status = match obj.get("status") {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_str().and_then(SubmissionStatus::parse) {
            Some(s) => Some(s),
            None => {
                notes.push(format!("{context}: cleared an unknown submission status"));
                None
            }
        },
    };

    Some(AssignmentEntry { grade, status })
}

fn reconcile_evaluation(raw: &Value, notes: &mut Vec<String>) -> Option<Evaluation> {
    let obj = raw.as_object()?;
    let id = obj.get("id").and_then(|v| v.as_str()).unwrap_or("");
    let name = obj.get("name").and_then(|v| v.as_str()).unwrap_or("");
    if id.is_empty() || name.is_empty() {
        notes.push("dropped an evaluation without id or name".to_string());
        return None;
    }

    let eval_type = match obj
        .get("type")
        .and_then(|v| v.as_str())
        .and_then(EvaluationType::parse)
    {
        Some(t) => t,
        None => {
            notes.push(format!("dropped evaluation {name}: unknown type"));
            return None;
        }
    };

    let date_created = match obj.get("dateCreated").and_then(|v| v.as_str()) {
        Some(d) if is_valid_date(d) => d.to_string(),
        _ => {
            notes.push(format!("evaluation {name}: missing creation date, using today"));
            crate::model::today_string()
        }
    };
    let due_date = match obj.get("dueDate").and_then(|v| v.as_str()) {
        Some(d) if is_valid_date(d) => d.to_string(),
        _ => {
            notes.push(format!(
                "evaluation {name}: missing due date, using creation date"
            ));
            date_created.clone()
        }
    };

    Some(Evaluation {
        id: id.to_string(),
        name: name.to_string(),
        eval_type,
        date_created,
        due_date,
    })
}

fn is_valid_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
