pub mod error;
pub mod models;
pub mod quiz;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{EntityRecognizer, Prompt, QuizModel};
pub use storage::QuizStorage;
pub use types::{
    ArticleContent, Difficulty, EntityMap, NewQuizRecord, QuizOutput, QuizQuestion, QuizRecord,
};
