use std::collections::HashMap;

use crate::models::{
    AnswerOutcome, ClassStatistics, CombinedScore, HistogramBucket, LetterGrade, McqGradingResult,
    McqQuestionOutcome, Question, QuestionDetails, QuestionKind, ShortAnswerGrade,
};

pub const PASS_PERCENTAGE: f64 = 50.0;

/// Percentage histogram bucket edges; the last bucket is inclusive of 100.
const HISTOGRAM_RANGES: [&str; 5] = ["0-19", "20-39", "40-59", "60-79", "80-100"];

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Obtained over total as a percentage, defined as 0 when total is 0.
pub fn percentage(obtained: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        obtained / total * 100.0
    }
}

/// Score every multiple-choice question against the answers map. Missing keys
/// count as unanswered; answers are trimmed and uppercased before comparison.
/// Pure and idempotent: the same inputs always reproduce the same result.
pub fn score_mcq(questions: &[Question], answers: &HashMap<String, String>) -> McqGradingResult {
    let mut total_marks = 0.0;
    let mut obtained_marks = 0.0;
    let mut correct_count = 0;
    let mut incorrect_count = 0;
    let mut unanswered_count = 0;
    let mut per_question = Vec::new();

    for question in questions {
        let QuestionDetails::Mcq { correct_option, .. } = &question.details else {
            continue;
        };

        total_marks += question.marks;

        let given = answers
            .get(&question.answer_key())
            .map(|raw| raw.trim().to_uppercase())
            .unwrap_or_default();

        let (outcome, awarded) = if given.is_empty() {
            unanswered_count += 1;
            (AnswerOutcome::Unanswered, 0.0)
        } else if given == correct_option.as_str() {
            correct_count += 1;
            (AnswerOutcome::Correct, question.marks)
        } else {
            incorrect_count += 1;
            (AnswerOutcome::Incorrect, 0.0)
        };

        obtained_marks += awarded;
        per_question.push(McqQuestionOutcome {
            question_no: question.question_no,
            given,
            outcome,
            max_marks: question.marks,
            awarded_marks: awarded,
        });
    }

    McqGradingResult {
        total_marks,
        obtained_marks,
        percentage: round2(percentage(obtained_marks, total_marks)),
        correct_count,
        incorrect_count,
        unanswered_count,
        per_question,
    }
}

pub fn short_answer_total(questions: &[Question]) -> f64 {
    questions
        .iter()
        .filter(|q| q.kind() == QuestionKind::ShortAnswer)
        .map(|q| q.marks)
        .sum()
}

pub fn short_answer_obtained(grades: &HashMap<String, ShortAnswerGrade>) -> f64 {
    grades.values().map(|g| g.awarded_marks).sum()
}

/// A submission counts as short-answer graded only when every short-answer
/// question on the exam has an entry. Vacuously true when there are none.
pub fn is_sa_complete(
    questions: &[Question],
    grades: &HashMap<String, ShortAnswerGrade>,
) -> bool {
    questions
        .iter()
        .filter(|q| q.kind() == QuestionKind::ShortAnswer)
        .all(|q| grades.contains_key(&q.answer_key()))
}

/// Marks must be at most one decimal place; 7.25 is rejected, 7.2 is fine.
pub fn has_single_decimal_place(marks: f64) -> bool {
    let scaled = marks * 10.0;
    (scaled - scaled.round()).abs() < 1e-9
}

/// Bounds checks a grader-entered mark. Returns a message per violated rule
/// so the caller can aggregate across the whole request.
pub fn validate_awarded_marks(question_no: u32, awarded: f64, max: f64) -> Vec<String> {
    let mut problems = Vec::new();
    if awarded < 0.0 {
        problems.push(format!(
            "Question {question_no}: awarded marks cannot be negative"
        ));
    }
    if awarded > max {
        problems.push(format!(
            "Question {question_no}: awarded marks {awarded} exceed the maximum of {max}"
        ));
    }
    if !has_single_decimal_place(awarded) {
        problems.push(format!(
            "Question {question_no}: awarded marks are limited to one decimal place"
        ));
    }
    problems
}

/// Fold the automatic and manual components into one combined score.
pub fn combine_scores(
    mcq_obtained: f64,
    mcq_total: f64,
    sa_obtained: f64,
    sa_total: f64,
) -> CombinedScore {
    let overall_obtained = mcq_obtained + sa_obtained;
    let overall_total = mcq_total + sa_total;
    let overall_percentage = round2(percentage(overall_obtained, overall_total));
    CombinedScore {
        mcq_obtained,
        mcq_total,
        sa_obtained,
        sa_total,
        overall_obtained,
        overall_total,
        overall_percentage,
        grade: LetterGrade::from_percentage(overall_percentage),
        passed: overall_percentage >= PASS_PERCENTAGE,
    }
}

/// Class-level aggregates over combined percentages. Used for reporting and
/// snapshotted onto the exam at finalization, never for gating.
pub fn class_statistics(percentages: &[f64]) -> ClassStatistics {
    let mut histogram: Vec<HistogramBucket> = HISTOGRAM_RANGES
        .iter()
        .map(|range| HistogramBucket {
            range: (*range).to_string(),
            count: 0,
        })
        .collect();

    if percentages.is_empty() {
        return ClassStatistics {
            total_students: 0,
            pass_count: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            median: 0.0,
            std_dev: 0.0,
            histogram,
        };
    }

    let n = percentages.len() as f64;
    let mean = percentages.iter().sum::<f64>() / n;
    let variance = percentages
        .iter()
        .map(|p| (p - mean).powi(2))
        .sum::<f64>()
        / n;

    let mut sorted = percentages.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if sorted.len() % 2 == 1 {
        sorted[sorted.len() / 2]
    } else {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    };

    for p in percentages {
        let bucket = ((p / 20.0).floor() as usize).min(HISTOGRAM_RANGES.len() - 1);
        histogram[bucket].count += 1;
    }

    ClassStatistics {
        total_students: percentages.len() as u32,
        pass_count: percentages.iter().filter(|p| **p >= PASS_PERCENTAGE).count() as u32,
        mean: round2(mean),
        min: round2(sorted[0]),
        max: round2(sorted[sorted.len() - 1]),
        median: round2(median),
        std_dev: round2(variance.sqrt()),
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{McqOption, McqOptions};
    use chrono::Utc;
    use uuid::Uuid;

    fn mcq(question_no: u32, marks: f64, correct: McqOption) -> Question {
        Question {
            id: Uuid::new_v4().to_string(),
            exam_id: "exam-1".into(),
            question_no,
            text: format!("MCQ {question_no}"),
            marks,
            details: QuestionDetails::Mcq {
                options: McqOptions {
                    a: "one".into(),
                    b: "two".into(),
                    c: "three".into(),
                    d: "four".into(),
                },
                correct_option: correct,
            },
            created_at: Utc::now(),
        }
    }

    fn short(question_no: u32, marks: f64) -> Question {
        Question {
            id: Uuid::new_v4().to_string(),
            exam_id: "exam-1".into(),
            question_no,
            text: format!("SA {question_no}"),
            marks,
            details: QuestionDetails::ShortAnswer {
                sample_answer: "because".into(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn scoring_normalizes_case_and_whitespace() {
        let questions = vec![mcq(1, 2.0, McqOption::B)];
        let answers = HashMap::from([("mcq_1".to_string(), "  b ".to_string())]);
        let result = score_mcq(&questions, &answers);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.obtained_marks, 2.0);
    }

    #[test]
    fn missing_and_empty_answers_are_unanswered() {
        let questions = vec![mcq(1, 2.0, McqOption::A), mcq(2, 2.0, McqOption::C)];
        let answers = HashMap::from([("mcq_2".to_string(), "   ".to_string())]);
        let result = score_mcq(&questions, &answers);
        assert_eq!(result.unanswered_count, 2);
        assert_eq!(result.total_marks, 4.0);
        assert_eq!(result.obtained_marks, 0.0);
    }

    #[test]
    fn zero_total_marks_yields_zero_percentage() {
        let result = score_mcq(&[], &HashMap::new());
        assert_eq!(result.percentage, 0.0);
        assert_eq!(combine_scores(0.0, 0.0, 0.0, 0.0).overall_percentage, 0.0);
    }

    #[test]
    fn decimal_place_rule() {
        assert!(has_single_decimal_place(7.0));
        assert!(has_single_decimal_place(7.5));
        assert!(!has_single_decimal_place(7.25));
    }

    #[test]
    fn sa_completion_requires_every_question() {
        let questions = vec![short(1, 5.0), short(2, 5.0)];
        let mut grades = HashMap::new();
        assert!(!is_sa_complete(&questions, &grades));

        grades.insert(
            "sa_1".to_string(),
            ShortAnswerGrade {
                awarded_marks: 4.0,
                max_marks: 5.0,
                feedback: String::new(),
                graded_by: "lecturer-1".into(),
                graded_at: Utc::now(),
            },
        );
        assert!(!is_sa_complete(&questions, &grades));

        grades.insert(
            "sa_2".to_string(),
            ShortAnswerGrade {
                awarded_marks: 3.0,
                max_marks: 5.0,
                feedback: String::new(),
                graded_by: "lecturer-1".into(),
                graded_at: Utc::now(),
            },
        );
        assert!(is_sa_complete(&questions, &grades));

        // no short-answer questions at all: vacuously complete
        assert!(is_sa_complete(&[mcq(1, 1.0, McqOption::A)], &HashMap::new()));
    }

    #[test]
    fn statistics_cover_mean_median_and_histogram() {
        let stats = class_statistics(&[10.0, 50.0, 90.0]);
        assert_eq!(stats.total_students, 3);
        assert_eq!(stats.pass_count, 2);
        assert_eq!(stats.mean, 50.0);
        assert_eq!(stats.median, 50.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 90.0);
        assert_eq!(stats.histogram[0].count, 1);
        assert_eq!(stats.histogram[2].count, 1);
        assert_eq!(stats.histogram[4].count, 1);
    }
}
