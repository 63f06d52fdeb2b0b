#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, Utc};
use examroom_api::models::{
    CreateExamRequest, Exam, ExamStatus, McqOption, McqOptions, Question, QuestionDetails,
};
use examroom_api::utils::time::combine_date_time;
use uuid::Uuid;

/// The fixed offset every test runs in (+05:30).
pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap()
}

pub fn at(date: &str, time: &str) -> DateTime<FixedOffset> {
    combine_date_time(date, time, offset()).unwrap()
}

/// A published one-hour exam on 2025-03-10 starting at 10:00.
pub fn published_exam() -> Exam {
    let req = CreateExamRequest {
        title: "Operating systems mid-term".into(),
        description: "Closed book".into(),
        instructions: "Answer every question".into(),
        exam_date: "2025-03-10".into(),
        start_time: "10:00".into(),
        end_time: "11:00".into(),
        duration_minutes: 60,
    };
    let mut exam = Exam::new(req, "lecturer-1", Utc::now());
    exam.status = ExamStatus::Published;
    exam
}

pub fn mcq_question(exam_id: &str, question_no: u32, marks: f64, correct: McqOption) -> Question {
    Question {
        id: Uuid::new_v4().to_string(),
        exam_id: exam_id.to_string(),
        question_no,
        text: format!("MCQ question {question_no}"),
        marks,
        details: QuestionDetails::Mcq {
            options: McqOptions {
                a: "alpha".into(),
                b: "beta".into(),
                c: "gamma".into(),
                d: "delta".into(),
            },
            correct_option: correct,
        },
        created_at: Utc::now(),
    }
}

pub fn sa_question(exam_id: &str, question_no: u32, marks: f64) -> Question {
    Question {
        id: Uuid::new_v4().to_string(),
        exam_id: exam_id.to_string(),
        question_no,
        text: format!("Short-answer question {question_no}"),
        marks,
        details: QuestionDetails::ShortAnswer {
            sample_answer: "A page fault traps to the kernel".into(),
        },
        created_at: Utc::now(),
    }
}
