use thiserror::Error;

use basket_core::errors::DomainError;
use basket_db::repositories::RepositoryError;

/// Failure surface of the service layer. Every variant maps onto one
/// [`ErrorKind`] so callers can classify failures without matching on
/// individual variants.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("product {product_id} is not available for purchase")]
    ProductNotActive { product_id: i64 },
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("{resource} {id} does not belong to the requesting user")]
    Forbidden { resource: &'static str, id: i64 },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unprocessable,
    Forbidden,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unprocessable => "unprocessable",
            Self::Forbidden => "forbidden",
            Self::Internal => "internal",
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ProductNotActive { .. }
            | Self::InsufficientStock { .. }
            | Self::Domain(_) => ErrorKind::Unprocessable,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use basket_core::errors::DomainError;

    use super::{ErrorKind, ServiceError};

    #[test]
    fn variants_classify_into_expected_kinds() {
        assert_eq!(ServiceError::NotFound { resource: "user" }.kind(), ErrorKind::NotFound);
        assert_eq!(
            ServiceError::ProductNotActive { product_id: 5 }.kind(),
            ErrorKind::Unprocessable
        );
        assert_eq!(
            ServiceError::InsufficientStock { requested: 4, available: 1 }.kind(),
            ErrorKind::Unprocessable
        );
        assert_eq!(
            ServiceError::Domain(DomainError::ZeroQuantity).kind(),
            ErrorKind::Unprocessable
        );
        assert_eq!(
            ServiceError::Forbidden { resource: "cart item", id: 9 }.kind(),
            ErrorKind::Forbidden
        );
    }
}
