// Helper functions for the report handlers
use crate::data::budget_store::Selection;
use crate::error::EngineError;

pub fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, EngineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::ProcessingError(format!("'{}' must not be empty", field)));
    }
    Ok(trimmed)
}

pub fn selection_from(state: &str, institution: &str) -> Result<Selection, EngineError> {
    Ok(Selection::new(
        require_non_empty("state", state)?,
        require_non_empty("institution", institution)?,
    ))
}
