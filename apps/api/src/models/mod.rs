pub mod question;
pub mod report;
pub mod session;

pub use question::{Difficulty, Question, QuestionDisplay, QuestionOption, QuestionType};
pub use report::{InterviewReport, QuestionReport};
pub use session::{AnswerEvaluation, AnswerRecord, InterviewSession, SessionStatus};
