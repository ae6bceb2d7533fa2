#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Database error")]
    Database(#[from] sqlx::error::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("{url} answered {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unexpected page structure: {0}")]
    Parse(String),

    #[error("Invalid date {header:?} {time:?}: {reason}")]
    DateParse {
        header: String,
        time: String,
        reason: &'static str,
    },

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}
