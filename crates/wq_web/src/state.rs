use wq_scraper::QuizManager;

pub struct AppState {
    pub manager: QuizManager,
}

impl AppState {
    pub fn new(manager: QuizManager) -> Self {
        Self { manager }
    }
}
