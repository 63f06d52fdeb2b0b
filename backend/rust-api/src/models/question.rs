use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Question model stored in the MongoDB "questions" collection.
///
/// `question_no` is dense 1..N per kind; deleting a question renumbers the
/// remainder so the sequence never has holes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: String,
    pub exam_id: String,
    pub question_no: u32,
    pub text: String,
    pub marks: f64,
    #[serde(flatten)]
    pub details: QuestionDetails,
    #[serde(rename = "createdAt", with = "super::bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
}

/// Kind-specific payload. A multiple-choice question cannot exist without its
/// options and answer key, a short-answer question cannot exist without its
/// sample answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionDetails {
    Mcq {
        options: McqOptions,
        correct_option: McqOption,
    },
    ShortAnswer {
        sample_answer: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Mcq,
    ShortAnswer,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Mcq => "mcq",
            QuestionKind::ShortAnswer => "short_answer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McqOption {
    A,
    B,
    C,
    D,
}

impl McqOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            McqOption::A => "A",
            McqOption::B => "B",
            McqOption::C => "C",
            McqOption::D => "D",
        }
    }
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self.details {
            QuestionDetails::Mcq { .. } => QuestionKind::Mcq,
            QuestionDetails::ShortAnswer { .. } => QuestionKind::ShortAnswer,
        }
    }

    /// Key under which the student's answer is stored in the submission's
    /// answers map. Derived from kind and number, so renumbering on delete
    /// changes it.
    pub fn answer_key(&self) -> String {
        match self.kind() {
            QuestionKind::Mcq => format!("mcq_{}", self.question_no),
            QuestionKind::ShortAnswer => format!("sa_{}", self.question_no),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    pub marks: f64,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

/// Question as shown to a student taking the exam: no answer key, no sample
/// answer.
#[derive(Debug, Serialize)]
pub struct StudentQuestionView {
    pub question_no: u32,
    pub kind: QuestionKind,
    pub text: String,
    pub marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<McqOptions>,
}

impl From<&Question> for StudentQuestionView {
    fn from(question: &Question) -> Self {
        let options = match &question.details {
            QuestionDetails::Mcq { options, .. } => Some(options.clone()),
            QuestionDetails::ShortAnswer { .. } => None,
        };
        Self {
            question_no: question.question_no,
            kind: question.kind(),
            text: question.text.clone(),
            marks: question.marks,
            options,
        }
    }
}
