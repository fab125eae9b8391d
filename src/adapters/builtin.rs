//! Built-in adapter: Serves the compiled-in reference table.

use std::sync::Arc;

use crate::domain::{ReferenceError, ReferenceTable};
use crate::ports::ReferenceSource;

/// Reference source backed by the constants shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinReference;

impl ReferenceSource for BuiltinReference {
    fn load(&self) -> Result<Arc<ReferenceTable>, ReferenceError> {
        Ok(ReferenceTable::shared())
    }

    fn describe(&self) -> String {
        "built-in WHO/Thai reference (ages 2-19)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_matches_standard() {
        let table = BuiltinReference.load().expect("Should load");
        assert_eq!(table.fingerprint(), ReferenceTable::standard().fingerprint());
    }

    #[test]
    fn test_builtin_shares_one_table() {
        let first = BuiltinReference.load().expect("Should load");
        let second = BuiltinReference.load().expect("Should load");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(std::ptr::eq(first.as_ref(), ReferenceTable::standard()));
    }
}
