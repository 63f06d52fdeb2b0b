use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of one multiple-choice answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqQuestionOutcome {
    pub question_no: u32,
    /// Student answer after trim + uppercase normalization; empty when the
    /// question was left unanswered.
    pub given: String,
    pub outcome: AnswerOutcome,
    pub max_marks: f64,
    pub awarded_marks: f64,
}

/// Result of the automatic multiple-choice scorer. Recomputable at any time
/// from the same questions and answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqGradingResult {
    pub total_marks: f64,
    pub obtained_marks: f64,
    pub percentage: f64,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
    pub per_question: Vec<McqQuestionOutcome>,
}

/// One manually recorded short-answer grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortAnswerGrade {
    pub awarded_marks: f64,
    pub max_marks: f64,
    #[serde(default)]
    pub feedback: String,
    pub graded_by: String,
    #[serde(rename = "gradedAt", with = "super::bson_datetime_as_chrono")]
    pub graded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            LetterGrade::A
        } else if percentage >= 70.0 {
            LetterGrade::B
        } else if percentage >= 60.0 {
            LetterGrade::C
        } else if percentage >= 50.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

/// Automatic and manual scores folded together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedScore {
    pub mcq_obtained: f64,
    pub mcq_total: f64,
    pub sa_obtained: f64,
    pub sa_total: f64,
    pub overall_obtained: f64,
    pub overall_total: f64,
    /// Rounded to two decimals for display.
    pub overall_percentage: f64,
    pub grade: LetterGrade,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub range: String,
    pub count: u32,
}

/// Snapshot of class-level results, stored on the exam at finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassStatistics {
    pub total_students: u32,
    pub pass_count: u32,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
    pub histogram: Vec<HistogramBucket>,
}
