use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The app manages exactly one class. Any persisted record carrying a
/// different id is treated as corruption and replaced by the default.
pub const DEFAULT_CLASS_ID: &str = "cl_hist_12b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationType {
    Tarea,
    Actividad,
    Proyecto,
    Examen,
}

pub const EVALUATION_TYPES: [EvaluationType; 4] = [
    EvaluationType::Tarea,
    EvaluationType::Actividad,
    EvaluationType::Proyecto,
    EvaluationType::Examen,
];

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::Tarea => "Tarea",
            EvaluationType::Actividad => "Actividad",
            EvaluationType::Proyecto => "Proyecto",
            EvaluationType::Examen => "Examen",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Tarea" => Some(EvaluationType::Tarea),
            "Actividad" => Some(EvaluationType::Actividad),
            "Proyecto" => Some(EvaluationType::Proyecto),
            "Examen" => Some(EvaluationType::Examen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pendiente,
    Entregado,
    #[serde(rename = "Tardíamente")]
    Tardiamente,
    #[serde(rename = "Sin Entregar")]
    SinEntregar,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pendiente => "Pendiente",
            SubmissionStatus::Entregado => "Entregado",
            SubmissionStatus::Tardiamente => "Tardíamente",
            SubmissionStatus::SinEntregar => "Sin Entregar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Pendiente" => Some(SubmissionStatus::Pendiente),
            "Entregado" => Some(SubmissionStatus::Entregado),
            "Tardíamente" => Some(SubmissionStatus::Tardiamente),
            "Sin Entregar" => Some(SubmissionStatus::SinEntregar),
            _ => None,
        }
    }
}

/// Per-(student, evaluation) cell. Absence of the whole entry reads the
/// same as `{grade: None, status: None}`; an unset status means Pendiente.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
}

impl AssignmentEntry {
    pub fn effective_status(&self) -> SubmissionStatus {
        self.status.unwrap_or(SubmissionStatus::Pendiente)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Grade-level label, e.g. "5°". Not a mark.
    pub grade: String,
    pub points: i64,
    #[serde(default)]
    pub assignment_data: BTreeMap<String, AssignmentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub eval_type: EvaluationType,
    /// YYYY-MM-DD
    pub date_created: String,
    /// YYYY-MM-DD
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub students: Vec<Student>,
    pub evaluations: Vec<Evaluation>,
}

impl ClassRecord {
    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn evaluation(&self, evaluation_id: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.id == evaluation_id)
    }
}

/// The hardcoded single class the app ships with. Reconciliation falls
/// back to this whenever the persisted blob is unusable.
pub fn default_class_record() -> ClassRecord {
    ClassRecord {
        id: DEFAULT_CLASS_ID.to_string(),
        name: "Historia 12th B".to_string(),
        subject: "Historia".to_string(),
        description: Some(
            "Clase de historia para duodécimo grado, enfocada en la historia contemporánea."
                .to_string(),
        ),
        students: Vec::new(),
        evaluations: Vec::new(),
    }
}

pub fn fresh_student_id() -> String {
    format!("st_{}", uuid::Uuid::new_v4())
}

pub fn fresh_evaluation_id() -> String {
    format!("ev_{}", uuid::Uuid::new_v4())
}

/// Today's calendar date as stored in evaluation records.
pub fn today_string() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_status_round_trips_spanish_labels() {
        for s in [
            SubmissionStatus::Pendiente,
            SubmissionStatus::Entregado,
            SubmissionStatus::Tardiamente,
            SubmissionStatus::SinEntregar,
        ] {
            assert_eq!(SubmissionStatus::parse(s.as_str()), Some(s));
            let json = serde_json::to_string(&s).expect("serialize status");
            let back: SubmissionStatus = serde_json::from_str(&json).expect("parse status");
            assert_eq!(back, s);
        }
        assert_eq!(SubmissionStatus::parse("Entregada"), None);
    }

    #[test]
    fn class_record_serializes_camel_case() {
        let mut student = Student {
            id: "st_1".to_string(),
            name: "Ana".to_string(),
            grade: "12°".to_string(),
            points: 3,
            assignment_data: BTreeMap::new(),
        };
        student.assignment_data.insert(
            "ev_1".to_string(),
            AssignmentEntry {
                grade: Some(90.0),
                status: None,
            },
        );
        let mut record = default_class_record();
        record.students.push(student);

        let v = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(v["students"][0]["assignmentData"]["ev_1"]["grade"], 90.0);
        assert!(v["students"][0]["assignmentData"]["ev_1"]
            .get("status")
            .is_none());
    }
}
