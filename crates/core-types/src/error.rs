use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Review {0} has no comment; this helper requires one")]
    MissingComment(i64),
}
