mod common;

use std::collections::HashMap;

use chrono::Utc;
use examroom_api::models::{LetterGrade, McqOption, ShortAnswerGrade};
use examroom_api::services::grading::{
    class_statistics, combine_scores, is_sa_complete, score_mcq, short_answer_obtained,
    short_answer_total, validate_awarded_marks,
};

use common::{mcq_question, sa_question};

fn grade(awarded: f64, max: f64) -> ShortAnswerGrade {
    ShortAnswerGrade {
        awarded_marks: awarded,
        max_marks: max,
        feedback: "ok".into(),
        graded_by: "lecturer-1".into(),
        graded_at: Utc::now(),
    }
}

#[test]
fn mcq_scoring_is_idempotent() {
    let questions = vec![
        mcq_question("exam-1", 1, 2.0, McqOption::A),
        mcq_question("exam-1", 2, 2.0, McqOption::B),
        mcq_question("exam-1", 3, 1.0, McqOption::D),
    ];
    let answers = HashMap::from([
        ("mcq_1".to_string(), "a".to_string()),
        ("mcq_2".to_string(), "C".to_string()),
    ]);

    let first = score_mcq(&questions, &answers);
    let second = score_mcq(&questions, &answers);

    assert_eq!(first.obtained_marks, second.obtained_marks);
    assert_eq!(first.total_marks, second.total_marks);
    assert_eq!(first.percentage, second.percentage);
    assert_eq!(first.correct_count, second.correct_count);
    assert_eq!(first.incorrect_count, second.incorrect_count);
    assert_eq!(first.unanswered_count, second.unanswered_count);

    assert_eq!(first.correct_count, 1);
    assert_eq!(first.incorrect_count, 1);
    assert_eq!(first.unanswered_count, 1);
    assert_eq!(first.total_marks, 5.0);
    assert_eq!(first.obtained_marks, 2.0);
}

#[test]
fn totals_accumulate_over_all_questions_regardless_of_answers() {
    let questions = vec![
        mcq_question("exam-1", 1, 3.0, McqOption::A),
        mcq_question("exam-1", 2, 3.0, McqOption::B),
    ];
    let result = score_mcq(&questions, &HashMap::new());
    assert_eq!(result.total_marks, 6.0);
    assert_eq!(result.obtained_marks, 0.0);
    assert_eq!(result.percentage, 0.0);
}

#[test]
fn percentage_is_zero_when_total_is_zero() {
    let result = score_mcq(&[], &HashMap::new());
    assert_eq!(result.percentage, 0.0);
}

#[test]
fn combined_percentage_matches_the_formula() {
    // mcq 7/10, sa 5/10 -> 12/20 = 60%
    let combined = combine_scores(7.0, 10.0, 5.0, 10.0);
    assert_eq!(combined.overall_obtained, 12.0);
    assert_eq!(combined.overall_total, 20.0);
    assert_eq!(combined.overall_percentage, 60.0);
    assert_eq!(combined.grade, LetterGrade::C);
    assert!(combined.passed);

    // rounding to two decimals: 1/3 of 100
    let combined = combine_scores(1.0, 3.0, 0.0, 0.0);
    assert_eq!(combined.overall_percentage, 33.33);
}

#[test]
fn letter_grade_thresholds() {
    assert_eq!(combine_scores(80.0, 100.0, 0.0, 0.0).grade, LetterGrade::A);
    assert_eq!(combine_scores(79.9, 100.0, 0.0, 0.0).grade, LetterGrade::B);
    assert_eq!(combine_scores(69.9, 100.0, 0.0, 0.0).grade, LetterGrade::C);
    assert_eq!(combine_scores(59.9, 100.0, 0.0, 0.0).grade, LetterGrade::D);
    assert_eq!(combine_scores(49.9, 100.0, 0.0, 0.0).grade, LetterGrade::F);
    assert!(!combine_scores(49.9, 100.0, 0.0, 0.0).passed);
    assert!(combine_scores(50.0, 100.0, 0.0, 0.0).passed);
}

#[test]
fn sa_graded_requires_every_question() {
    let questions = vec![
        mcq_question("exam-1", 1, 2.0, McqOption::A),
        sa_question("exam-1", 1, 5.0),
        sa_question("exam-1", 2, 5.0),
    ];

    let mut grades = HashMap::new();
    assert!(!is_sa_complete(&questions, &grades));

    grades.insert("sa_1".to_string(), grade(4.5, 5.0));
    assert!(!is_sa_complete(&questions, &grades));

    grades.insert("sa_2".to_string(), grade(2.0, 5.0));
    assert!(is_sa_complete(&questions, &grades));

    assert_eq!(short_answer_total(&questions), 10.0);
    assert_eq!(short_answer_obtained(&grades), 6.5);
}

#[test]
fn sa_graded_is_vacuously_true_without_short_answer_questions() {
    let questions = vec![mcq_question("exam-1", 1, 2.0, McqOption::A)];
    assert!(is_sa_complete(&questions, &HashMap::new()));
}

#[test]
fn awarded_marks_validation_rules() {
    // fine: bounds and one decimal place
    assert!(validate_awarded_marks(1, 4.5, 5.0).is_empty());
    assert!(validate_awarded_marks(1, 0.0, 5.0).is_empty());
    assert!(validate_awarded_marks(1, 5.0, 5.0).is_empty());

    assert!(!validate_awarded_marks(1, -0.5, 5.0).is_empty());
    assert!(!validate_awarded_marks(1, 5.5, 5.0).is_empty());
    assert!(!validate_awarded_marks(1, 4.25, 5.0).is_empty());

    // a negative two-decimal value breaks two rules at once
    assert_eq!(validate_awarded_marks(1, -0.25, 5.0).len(), 2);
}

#[test]
fn statistics_for_three_students() {
    let stats = class_statistics(&[40.0, 60.0, 80.0]);
    assert_eq!(stats.total_students, 3);
    assert_eq!(stats.pass_count, 2);
    assert_eq!(stats.mean, 60.0);
    assert_eq!(stats.median, 60.0);
    assert_eq!(stats.min, 40.0);
    assert_eq!(stats.max, 80.0);
    // population standard deviation of {40,60,80}
    assert_eq!(stats.std_dev, 16.33);

    let counts: Vec<u32> = stats.histogram.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![0, 0, 1, 1, 1]);
}

#[test]
fn statistics_median_of_even_count() {
    let stats = class_statistics(&[10.0, 20.0, 80.0, 100.0]);
    assert_eq!(stats.median, 50.0);
    // 100% lands in the top bucket, not out of range
    assert_eq!(stats.histogram[4].count, 2);
}
