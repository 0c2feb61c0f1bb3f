use crate::model::{
    today_string, AssignmentEntry, ClassRecord, Evaluation, EvaluationType, Student,
    SubmissionStatus,
};
use std::collections::BTreeMap;

/// Closed set of intents the UI shell can dispatch. Parameter validation
/// (non-empty names, known enum labels) happens at the IPC boundary; by
/// the time a `Mutation` exists it always applies cleanly, with unknown
/// ids degrading to no-ops.
#[derive(Debug, Clone)]
pub enum Mutation {
    AddStudent {
        id: String,
        name: String,
        grade_level: String,
    },
    RemoveStudent {
        student_id: String,
    },
    AdjustPoints {
        student_id: String,
        delta: i64,
    },
    ResetPoints {
        student_id: String,
    },
    AddEvaluation {
        id: String,
        name: String,
        eval_type: EvaluationType,
        due_date: String,
    },
    DeleteEvaluation {
        evaluation_id: String,
    },
    SetGrade {
        student_id: String,
        evaluation_id: String,
        grade: Option<f64>,
    },
    SetSubmissionStatus {
        student_id: String,
        evaluation_id: String,
        status: SubmissionStatus,
    },
    UpdateClassInfo {
        name: String,
        subject: String,
        /// Outer `None` leaves the stored description untouched;
        /// `Some(None)` clears it.
        description: Option<Option<String>>,
    },
}

/// Apply one intent to a snapshot, producing the next snapshot. Pure:
/// persistence and notification are the caller's concern.
pub fn apply(record: &ClassRecord, mutation: &Mutation) -> ClassRecord {
    let mut next = record.clone();
    match mutation {
        Mutation::AddStudent {
            id,
            name,
            grade_level,
        } => {
            next.students.push(Student {
                id: id.clone(),
                name: name.clone(),
                grade: grade_level.clone(),
                points: 0,
                assignment_data: BTreeMap::new(),
            });
        }
        Mutation::RemoveStudent { student_id } => {
            next.students.retain(|s| s.id != *student_id);
        }
        Mutation::AdjustPoints { student_id, delta } => {
            if let Some(s) = next.students.iter_mut().find(|s| s.id == *student_id) {
                // Saturate on extreme deltas; the balance must never wrap.
                s.points = s.points.saturating_add(*delta).max(0);
            }
        }
        Mutation::ResetPoints { student_id } => {
            if let Some(s) = next.students.iter_mut().find(|s| s.id == *student_id) {
                s.points = 0;
            }
        }
        Mutation::AddEvaluation {
            id,
            name,
            eval_type,
            due_date,
        } => {
            next.evaluations.push(Evaluation {
                id: id.clone(),
                name: name.clone(),
                eval_type: *eval_type,
                date_created: today_string(),
                due_date: due_date.clone(),
            });
        }
        Mutation::DeleteEvaluation { evaluation_id } => {
            next.evaluations.retain(|e| e.id != *evaluation_id);
            // Cascade so no student keeps grade data for a gone evaluation.
            for s in &mut next.students {
                s.assignment_data.remove(evaluation_id);
            }
        }
        Mutation::SetGrade {
            student_id,
            evaluation_id,
            grade,
        } => {
            if let Some(s) = next.students.iter_mut().find(|s| s.id == *student_id) {
                // Blank or unparseable input arrives as None and clears the
                // stored grade; it never becomes zero.
                let grade = grade.filter(|g| g.is_finite());
                let entry = s
                    .assignment_data
                    .entry(evaluation_id.clone())
                    .or_insert_with(AssignmentEntry::default);
                entry.grade = grade;
                if entry.grade.is_none() && entry.status.is_none() {
                    s.assignment_data.remove(evaluation_id);
                }
            }
        }
        Mutation::SetSubmissionStatus {
            student_id,
            evaluation_id,
            status,
        } => {
            if let Some(s) = next.students.iter_mut().find(|s| s.id == *student_id) {
                let entry = s
                    .assignment_data
                    .entry(evaluation_id.clone())
                    .or_insert_with(AssignmentEntry::default);
                entry.status = Some(*status);
            }
        }
        Mutation::UpdateClassInfo {
            name,
            subject,
            description,
        } => {
            next.name = name.clone();
            next.subject = subject.clone();
            if let Some(d) = description {
                next.description = d.clone();
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_class_record;

    fn class_with_ana() -> ClassRecord {
        let record = default_class_record();
        apply(
            &record,
            &Mutation::AddStudent {
                id: "st_ana".to_string(),
                name: "Ana".to_string(),
                grade_level: "12°".to_string(),
            },
        )
    }

    #[test]
    fn new_students_start_at_zero_with_empty_data() {
        let record = class_with_ana();
        let ana = record.student("st_ana").expect("ana exists");
        assert_eq!(ana.points, 0);
        assert!(ana.assignment_data.is_empty());
    }

    #[test]
    fn points_never_go_below_zero() {
        // Scenario A: decrement from zero stays at zero.
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: -5,
            },
        );
        assert_eq!(record.student("st_ana").unwrap().points, 0);

        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: 3,
            },
        );
        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: -10,
            },
        );
        assert_eq!(record.student("st_ana").unwrap().points, 0);
    }

    #[test]
    fn huge_point_deltas_saturate_instead_of_overflowing() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: 5,
            },
        );
        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: i64::MAX,
            },
        );
        assert_eq!(record.student("st_ana").unwrap().points, i64::MAX);

        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: i64::MIN,
            },
        );
        assert_eq!(record.student("st_ana").unwrap().points, 0);
    }

    #[test]
    fn reset_points_is_idempotent() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_ana".to_string(),
                delta: 7,
            },
        );
        record = apply(
            &record,
            &Mutation::ResetPoints {
                student_id: "st_ana".to_string(),
            },
        );
        record = apply(
            &record,
            &Mutation::ResetPoints {
                student_id: "st_ana".to_string(),
            },
        );
        assert_eq!(record.student("st_ana").unwrap().points, 0);
    }

    #[test]
    fn mutations_on_unknown_ids_are_no_ops() {
        let record = class_with_ana();
        let after = apply(
            &record,
            &Mutation::AdjustPoints {
                student_id: "st_nadie".to_string(),
                delta: 5,
            },
        );
        assert_eq!(after, record);

        let after = apply(
            &record,
            &Mutation::RemoveStudent {
                student_id: "st_nadie".to_string(),
            },
        );
        assert_eq!(after, record);

        let after = apply(
            &record,
            &Mutation::DeleteEvaluation {
                evaluation_id: "ev_nada".to_string(),
            },
        );
        assert_eq!(after, record);
    }

    #[test]
    fn set_grade_preserves_status_and_clears_on_none() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::SetSubmissionStatus {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                status: SubmissionStatus::Tardiamente,
            },
        );
        record = apply(
            &record,
            &Mutation::SetGrade {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                grade: Some(85.0),
            },
        );
        let entry = &record.student("st_ana").unwrap().assignment_data["ev_1"];
        assert_eq!(entry.grade, Some(85.0));
        assert_eq!(entry.status, Some(SubmissionStatus::Tardiamente));

        // Scenario C: clearing the grade keeps the status.
        record = apply(
            &record,
            &Mutation::SetGrade {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                grade: None,
            },
        );
        let entry = &record.student("st_ana").unwrap().assignment_data["ev_1"];
        assert_eq!(entry.grade, None);
        assert_eq!(entry.status, Some(SubmissionStatus::Tardiamente));
    }

    #[test]
    fn non_finite_grade_input_clears_instead_of_storing() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::SetGrade {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                grade: Some(f64::NAN),
            },
        );
        // Grade cleared and nothing else set, so no entry remains at all.
        assert!(record
            .student("st_ana")
            .unwrap()
            .assignment_data
            .get("ev_1")
            .is_none());
    }

    #[test]
    fn set_status_preserves_existing_grade() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::SetGrade {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                grade: Some(92.5),
            },
        );
        record = apply(
            &record,
            &Mutation::SetSubmissionStatus {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                status: SubmissionStatus::Entregado,
            },
        );
        let entry = &record.student("st_ana").unwrap().assignment_data["ev_1"];
        assert_eq!(entry.grade, Some(92.5));
        assert_eq!(entry.status, Some(SubmissionStatus::Entregado));
    }

    #[test]
    fn unset_status_reads_as_pendiente() {
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::SetGrade {
                student_id: "st_ana".to_string(),
                evaluation_id: "ev_1".to_string(),
                grade: Some(60.0),
            },
        );
        let entry = &record.student("st_ana").unwrap().assignment_data["ev_1"];
        assert_eq!(entry.effective_status(), SubmissionStatus::Pendiente);
    }

    #[test]
    fn deleting_an_evaluation_cascades_to_every_student() {
        // P4: after the delete, no assignmentData carries the key.
        let mut record = class_with_ana();
        record = apply(
            &record,
            &Mutation::AddStudent {
                id: "st_beto".to_string(),
                name: "Beto".to_string(),
                grade_level: "12°".to_string(),
            },
        );
        record = apply(
            &record,
            &Mutation::AddEvaluation {
                id: "ev_quiz".to_string(),
                name: "Quiz1".to_string(),
                eval_type: EvaluationType::Tarea,
                due_date: "2025-04-01".to_string(),
            },
        );
        for sid in ["st_ana", "st_beto"] {
            record = apply(
                &record,
                &Mutation::SetGrade {
                    student_id: sid.to_string(),
                    evaluation_id: "ev_quiz".to_string(),
                    grade: Some(77.0),
                },
            );
        }

        record = apply(
            &record,
            &Mutation::DeleteEvaluation {
                evaluation_id: "ev_quiz".to_string(),
            },
        );
        assert!(record.evaluation("ev_quiz").is_none());
        for s in &record.students {
            assert!(!s.assignment_data.contains_key("ev_quiz"));
        }
    }

    #[test]
    fn status_transitions_are_free_between_all_states() {
        let mut record = class_with_ana();
        let sequence = [
            SubmissionStatus::Entregado,
            SubmissionStatus::SinEntregar,
            SubmissionStatus::Tardiamente,
            SubmissionStatus::Pendiente,
            SubmissionStatus::Entregado,
        ];
        for status in sequence {
            record = apply(
                &record,
                &Mutation::SetSubmissionStatus {
                    student_id: "st_ana".to_string(),
                    evaluation_id: "ev_1".to_string(),
                    status,
                },
            );
            let entry = &record.student("st_ana").unwrap().assignment_data["ev_1"];
            assert_eq!(entry.status, Some(status));
        }
    }

    #[test]
    fn update_class_info_changes_metadata_only() {
        let record = class_with_ana();
        let after = apply(
            &record,
            &Mutation::UpdateClassInfo {
                name: "Historia 12th B (tarde)".to_string(),
                subject: "Historia".to_string(),
                description: Some(Some("Grupo de la tarde".to_string())),
            },
        );
        assert_eq!(after.name, "Historia 12th B (tarde)");
        assert_eq!(after.description, Some("Grupo de la tarde".to_string()));
        assert_eq!(after.id, record.id);
        assert_eq!(after.students, record.students);
    }

    #[test]
    fn omitted_description_survives_an_info_update() {
        let record = class_with_ana();
        let original_description = record.description.clone();
        assert!(original_description.is_some());

        let after = apply(
            &record,
            &Mutation::UpdateClassInfo {
                name: "Historia 12th B".to_string(),
                subject: "Historia".to_string(),
                description: None,
            },
        );
        assert_eq!(after.description, original_description);

        // An explicit clear still works.
        let cleared = apply(
            &after,
            &Mutation::UpdateClassInfo {
                name: "Historia 12th B".to_string(),
                subject: "Historia".to_string(),
                description: Some(None),
            },
        );
        assert_eq!(cleared.description, None);
    }
}
