pub mod feedback;
pub mod mini_game;
pub mod question;
pub use feedback::{AttemptRecord, AttemptSummary, Feedback};
pub use mini_game::{GameType, MiniGame};
pub use question::{Question, QuestionList, QuestionType};
