//! Common utilities for the oriole routing toolkit

pub mod error;

pub use error::{EntityKind, Error, Result};

#[cfg(test)]
mod tests {
    use crate::error::{EntityKind, Error};

    #[test]
    fn duplicate_id_message_names_kind_and_id() {
        let err = Error::DuplicateId {
            kind: EntityKind::Link,
            id: "0_1".to_string(),
        };
        assert_eq!(err.to_string(), "link id '0_1' is already registered");
    }
}
