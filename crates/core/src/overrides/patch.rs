//! Field patches and change sets.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{EngineError, EngineResult};

/// An update to a nullable field.
///
/// `Keep` and `Clear` stay distinct so "leave unchanged" and "set to null"
/// never collapse into the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// Leave the field unchanged.
    #[default]
    Keep,
    /// Set the field to a value.
    Set(T),
    /// Set the field to null.
    Clear,
}

impl<T> FieldPatch<T> {
    /// Builds a patch from a wire value and a clear flag.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` when both a value and the clear flag are given.
    pub fn from_parts(value: Option<T>, clear: bool, field: &str) -> EngineResult<Self> {
        match (value, clear) {
            (Some(_), true) => Err(EngineError::invalid(format!(
                "{field}: supply a value or clear it, not both"
            ))),
            (Some(value), false) => Ok(Self::Set(value)),
            (None, true) => Ok(Self::Clear),
            (None, false) => Ok(Self::Keep),
        }
    }

    /// Transforms the value of a `Set` patch, possibly failing.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub fn try_map<U, F>(self, f: F) -> EngineResult<FieldPatch<U>>
    where
        F: FnOnce(T) -> EngineResult<U>,
    {
        Ok(match self {
            Self::Keep => FieldPatch::Keep,
            Self::Set(value) => FieldPatch::Set(f(value)?),
            Self::Clear => FieldPatch::Clear,
        })
    }
}

/// One changed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// Field name.
    pub field: String,
    /// Value before the change.
    pub previous: Value,
    /// Value after the change.
    pub next: Value,
}

/// Fields an override will change.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a required field. Returns the new value when it differs from `current`.
    pub fn track<T>(&mut self, field: &str, current: &T, proposed: Option<T>) -> Option<T>
    where
        T: Serialize + PartialEq,
    {
        match proposed {
            Some(value) if value != *current => {
                self.record(field, current, &value);
                Some(value)
            }
            _ => None,
        }
    }

    /// Tracks a nullable field. Returns the new value when it differs from `current`.
    pub fn track_patch<T>(
        &mut self,
        field: &str,
        current: &Option<T>,
        patch: FieldPatch<T>,
    ) -> Option<Option<T>>
    where
        T: Serialize + PartialEq,
    {
        let next = match patch {
            FieldPatch::Keep => return None,
            FieldPatch::Set(value) => Some(value),
            FieldPatch::Clear => None,
        };
        if next == *current {
            return None;
        }
        self.record(field, current, &next);
        Some(next)
    }

    /// Records a change computed by the caller.
    pub fn record<P, N>(&mut self, field: &str, previous: &P, next: &N)
    where
        P: Serialize + ?Sized,
        N: Serialize + ?Sized,
    {
        self.changes.push(FieldChange {
            field: field.to_string(),
            previous: serde_json::to_value(previous).unwrap_or(Value::Null),
            next: serde_json::to_value(next).unwrap_or(Value::Null),
        });
    }

    /// Returns true when nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Fails with `NoChangesProvided` when nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoChangesProvided` for an empty set.
    pub fn require_changes(&self) -> EngineResult<()> {
        if self.is_empty() {
            Err(EngineError::NoChangesProvided)
        } else {
            Ok(())
        }
    }

    /// Names of changed fields.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.field.clone()).collect()
    }

    /// Returns the tracked changes.
    #[must_use]
    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Audit metadata: the reason plus previous and next values keyed by field.
    #[must_use]
    pub fn audit_metadata(&self, reason: &str) -> Value {
        let mut previous = Map::new();
        let mut next = Map::new();
        for change in &self.changes {
            previous.insert(change.field.clone(), change.previous.clone());
            next.insert(change.field.clone(), change.next.clone());
        }
        json!({
            "reason": reason,
            "changed_fields": self.fields(),
            "previous": previous,
            "next": next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(FieldPatch::from_parts(Some(1), false, "x").unwrap(), FieldPatch::Set(1));
        assert_eq!(FieldPatch::<i32>::from_parts(None, true, "x").unwrap(), FieldPatch::Clear);
        assert_eq!(FieldPatch::<i32>::from_parts(None, false, "x").unwrap(), FieldPatch::Keep);
        assert!(FieldPatch::from_parts(Some(1), true, "x").is_err());
    }

    #[test]
    fn test_equal_values_are_not_changes() {
        let mut changes = ChangeSet::new();
        assert_eq!(changes.track("name", &"Ana".to_string(), Some("Ana".to_string())), None);
        assert_eq!(
            changes.track_patch("email", &Some("a@x".to_string()), FieldPatch::Set("a@x".to_string())),
            None
        );
        assert_eq!(changes.track_patch::<String>("student_id", &None, FieldPatch::Clear), None);
        assert!(changes.require_changes().is_err());
    }

    #[test]
    fn test_clear_differs_from_keep() {
        let mut changes = ChangeSet::new();
        let current = Some("2021-0001".to_string());
        assert_eq!(changes.track_patch("student_id", &current, FieldPatch::Keep), None);
        assert_eq!(changes.track_patch("student_id", &current, FieldPatch::Clear), Some(None));
        assert_eq!(changes.fields(), vec!["student_id"]);
    }

    #[test]
    fn test_audit_metadata_shape() {
        let mut changes = ChangeSet::new();
        changes.track("points", &2, Some(5));
        let metadata = changes.audit_metadata("appeal granted");
        assert_eq!(
            metadata,
            json!({
                "reason": "appeal granted",
                "changed_fields": ["points"],
                "previous": {"points": 2},
                "next": {"points": 5},
            })
        );
    }
}
