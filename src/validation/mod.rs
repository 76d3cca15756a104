//! Field rules shared by the workflow schema builders

mod rules;

#[cfg(test)]
mod tests;

use crate::error::{FieldPath, ValidationError};

pub use rules::{
    check_bool_or_expression, check_cron, check_exclusive, check_expression, check_globs,
    check_job_id, check_min, check_non_empty, check_non_empty_list, check_reusable_workflow,
    check_volume, require,
};

/// Implemented by every schema record that has constraints beyond its types
pub trait Validate {
    /// Check this record, reporting failures relative to `path`
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, path: &FieldPath) -> Result<(), ValidationError> {
        match self {
            Some(inner) => inner.validate(path),
            None => Ok(()),
        }
    }
}
