use crate::model::{ClassRecord, Evaluation, EvaluationType, Student, EVALUATION_TYPES};
use serde::Serialize;
use std::collections::HashMap;

/// 2-decimal rounding matching the legacy app's `toFixed(2)`:
/// half away from zero.
pub fn round_off_2_decimals(x: f64) -> f64 {
    (100.0 * x).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopScorer {
    pub student_id: String,
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub student_count: usize,
    pub total_points: i64,
    pub average_points: i64,
    pub top_scorer: Option<TopScorer>,
    pub evaluation_count: usize,
    pub evaluation_type_counts: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub student_id: String,
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAverages {
    pub student_id: String,
    pub name: String,
    /// Keyed by evaluation type label; `null` means no graded work of
    /// that type ("N/A" in the grid).
    pub by_type: HashMap<String, Option<f64>>,
    pub final_average: Option<f64>,
}

pub fn total_points(record: &ClassRecord) -> i64 {
    record.students.iter().map(|s| s.points).sum()
}

pub fn average_points(record: &ClassRecord) -> i64 {
    let n = record.students.len();
    if n == 0 {
        return 0;
    }
    (total_points(record) as f64 / n as f64).round() as i64
}

/// Maximum points; first occurrence wins ties.
pub fn top_scorer(record: &ClassRecord) -> Option<&Student> {
    let mut best: Option<&Student> = None;
    for s in &record.students {
        match best {
            Some(b) if s.points <= b.points => {}
            _ => best = Some(s),
        }
    }
    best
}

/// Students sorted by points descending. The sort is stable, so equal
/// points keep their original relative order; ranks are positional.
pub fn leaderboard_order(record: &ClassRecord) -> Vec<LeaderboardRow> {
    let mut sorted: Vec<&Student> = record.students.iter().collect();
    sorted.sort_by(|a, b| b.points.cmp(&a.points));
    sorted
        .iter()
        .enumerate()
        .map(|(i, s)| LeaderboardRow {
            rank: i + 1,
            student_id: s.id.clone(),
            name: s.name.clone(),
            points: s.points,
        })
        .collect()
}

/// The single recorded grade for one evaluation, if any.
pub fn grade_for_evaluation(student: &Student, evaluation_id: &str) -> Option<f64> {
    student
        .assignment_data
        .get(evaluation_id)
        .and_then(|entry| entry.grade)
        .filter(|g| g.is_finite())
}

/// Mean of the recorded grades among evaluations of `eval_type`.
/// Ungraded evaluations are excluded from numerator and denominator;
/// `None` when the type has no evaluations or no graded entries.
pub fn average_for_type(
    student: &Student,
    evaluations: &[Evaluation],
    eval_type: EvaluationType,
) -> Option<f64> {
    mean_of_grades(
        student,
        evaluations.iter().filter(|e| e.eval_type == eval_type),
    )
}

/// Unweighted mean of whatever grades exist across all evaluations.
pub fn final_average(student: &Student, evaluations: &[Evaluation]) -> Option<f64> {
    mean_of_grades(student, evaluations.iter())
}

fn mean_of_grades<'a, I>(student: &Student, evaluations: I) -> Option<f64>
where
    I: Iterator<Item = &'a Evaluation>,
{
    let mut total = 0.0_f64;
    let mut graded = 0_usize;
    for e in evaluations {
        if let Some(g) = grade_for_evaluation(student, &e.id) {
            total += g;
            graded += 1;
        }
    }
    if graded == 0 {
        return None;
    }
    Some(round_off_2_decimals(total / graded as f64))
}

pub fn evaluation_type_counts(evaluations: &[Evaluation]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = EVALUATION_TYPES
        .iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect();
    for e in evaluations {
        *counts.entry(e.eval_type.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn class_overview(record: &ClassRecord) -> ClassOverview {
    ClassOverview {
        student_count: record.students.len(),
        total_points: total_points(record),
        average_points: average_points(record),
        top_scorer: top_scorer(record).map(|s| TopScorer {
            student_id: s.id.clone(),
            name: s.name.clone(),
            points: s.points,
        }),
        evaluation_count: record.evaluations.len(),
        evaluation_type_counts: evaluation_type_counts(&record.evaluations),
    }
}

pub fn student_averages(record: &ClassRecord) -> Vec<StudentAverages> {
    record
        .students
        .iter()
        .map(|s| {
            let by_type = EVALUATION_TYPES
                .iter()
                .map(|t| {
                    (
                        t.as_str().to_string(),
                        average_for_type(s, &record.evaluations, *t),
                    )
                })
                .collect();
            StudentAverages {
                student_id: s.id.clone(),
                name: s.name.clone(),
                by_type,
                final_average: final_average(s, &record.evaluations),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_class_record, AssignmentEntry, SubmissionStatus};
    use std::collections::BTreeMap;

    fn student(id: &str, name: &str, points: i64) -> Student {
        Student {
            id: id.to_string(),
            name: name.to_string(),
            grade: "12°".to_string(),
            points,
            assignment_data: BTreeMap::new(),
        }
    }

    fn evaluation(id: &str, eval_type: EvaluationType) -> Evaluation {
        Evaluation {
            id: id.to_string(),
            name: format!("Eval {id}"),
            eval_type,
            date_created: "2025-03-01".to_string(),
            due_date: "2025-03-08".to_string(),
        }
    }

    fn set_grade(s: &mut Student, eval_id: &str, grade: f64) {
        s.assignment_data.insert(
            eval_id.to_string(),
            AssignmentEntry {
                grade: Some(grade),
                status: Some(SubmissionStatus::Entregado),
            },
        );
    }

    #[test]
    fn rounding_matches_to_fixed_2() {
        assert_eq!(round_off_2_decimals(80.0), 80.0);
        assert_eq!(round_off_2_decimals(83.333333), 83.33);
        assert_eq!(round_off_2_decimals(83.335), 83.34);
    }

    #[test]
    fn average_points_is_zero_for_empty_class() {
        let record = default_class_record();
        assert_eq!(total_points(&record), 0);
        assert_eq!(average_points(&record), 0);
        assert!(top_scorer(&record).is_none());
        assert!(leaderboard_order(&record).is_empty());
    }

    #[test]
    fn average_points_rounds_to_nearest_integer() {
        let mut record = default_class_record();
        record.students.push(student("st_a", "Ana", 10));
        record.students.push(student("st_b", "Beto", 15));
        // 12.5 rounds up.
        assert_eq!(average_points(&record), 13);
    }

    #[test]
    fn top_scorer_tie_breaks_on_first_occurrence() {
        let mut record = default_class_record();
        record.students.push(student("st_a", "Ana", 7));
        record.students.push(student("st_b", "Beto", 7));
        record.students.push(student("st_c", "Carla", 3));
        assert_eq!(top_scorer(&record).map(|s| s.id.as_str()), Some("st_a"));
    }

    #[test]
    fn leaderboard_keeps_original_order_on_equal_points() {
        let mut record = default_class_record();
        record.students.push(student("st_a", "Ana", 5));
        record.students.push(student("st_b", "Beto", 9));
        record.students.push(student("st_c", "Carla", 5));

        let rows = leaderboard_order(&record);
        let ids: Vec<&str> = rows.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(ids, vec!["st_b", "st_a", "st_c"]);
        let ranks: Vec<usize> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn ungraded_evaluations_are_excluded_not_zeroed() {
        let evals = vec![
            evaluation("ev_1", EvaluationType::Tarea),
            evaluation("ev_2", EvaluationType::Tarea),
        ];
        let mut ana = student("st_a", "Ana", 0);
        set_grade(&mut ana, "ev_1", 80.0);

        // A second ungraded Tarea must not pull the average to 40.
        assert_eq!(
            average_for_type(&ana, &evals, EvaluationType::Tarea),
            Some(80.0)
        );
        assert_eq!(final_average(&ana, &evals), Some(80.0));
    }

    #[test]
    fn type_with_no_evaluations_is_not_available() {
        let evals = vec![evaluation("ev_1", EvaluationType::Tarea)];
        let mut ana = student("st_a", "Ana", 0);
        set_grade(&mut ana, "ev_1", 90.0);

        assert_eq!(
            average_for_type(&ana, &evals, EvaluationType::Tarea),
            Some(90.0)
        );
        assert_eq!(average_for_type(&ana, &evals, EvaluationType::Examen), None);
        assert_eq!(final_average(&student("st_b", "Beto", 0), &evals), None);
    }

    #[test]
    fn orphaned_assignment_keys_are_ignored() {
        let evals = vec![evaluation("ev_1", EvaluationType::Proyecto)];
        let mut ana = student("st_a", "Ana", 0);
        set_grade(&mut ana, "ev_1", 70.0);
        // Key left behind by an evaluation that no longer exists.
        set_grade(&mut ana, "ev_gone", 10.0);

        assert_eq!(final_average(&ana, &evals), Some(70.0));
        assert_eq!(
            average_for_type(&ana, &evals, EvaluationType::Proyecto),
            Some(70.0)
        );
    }

    #[test]
    fn per_type_average_mixes_multiple_grades() {
        let evals = vec![
            evaluation("ev_1", EvaluationType::Examen),
            evaluation("ev_2", EvaluationType::Examen),
            evaluation("ev_3", EvaluationType::Tarea),
        ];
        let mut ana = student("st_a", "Ana", 0);
        set_grade(&mut ana, "ev_1", 75.0);
        set_grade(&mut ana, "ev_2", 80.0);
        set_grade(&mut ana, "ev_3", 100.0);

        assert_eq!(
            average_for_type(&ana, &evals, EvaluationType::Examen),
            Some(77.5)
        );
        assert_eq!(final_average(&ana, &evals), Some(85.0));
    }

    #[test]
    fn overview_counts_types_including_empty_ones() {
        let mut record = default_class_record();
        record
            .evaluations
            .push(evaluation("ev_1", EvaluationType::Tarea));
        record
            .evaluations
            .push(evaluation("ev_2", EvaluationType::Tarea));
        record
            .evaluations
            .push(evaluation("ev_3", EvaluationType::Examen));

        let overview = class_overview(&record);
        assert_eq!(overview.evaluation_count, 3);
        assert_eq!(overview.evaluation_type_counts["Tarea"], 2);
        assert_eq!(overview.evaluation_type_counts["Examen"], 1);
        assert_eq!(overview.evaluation_type_counts["Proyecto"], 0);
        assert_eq!(overview.evaluation_type_counts["Actividad"], 0);
    }
}
