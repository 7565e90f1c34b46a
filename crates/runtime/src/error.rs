use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),
}

impl Error {
    /// True for a rejected read, as opposed to a bad request or a storage fault.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::Policy(policy::Error::AccessDenied { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
