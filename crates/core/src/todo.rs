//! Todo payload validation and partial-update reconciliation.
//!
//! Inbound JSON is read in one of two explicit modes:
//!
//! - [`validate_create`] resolves a full [`TodoFields`] value, applying
//!   defaults for omitted optional fields.
//! - [`validate_update`] produces a [`TodoPatch`] holding only the fields
//!   that were present in the payload.
//!
//! Both modes collect every field-level failure into a single
//! [`ValidationErrors`] rather than stopping at the first one. Unknown keys
//! are dropped in both modes.
//!
//! [`reconcile`] then merges a patch onto the current values of a record.

use std::borrow::Cow;

use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_COMPLETED: &str = "completed";
pub const FIELD_POSITION_X: &str = "position_x";
pub const FIELD_POSITION_Y: &str = "position_y";

/// Key used for failures that concern the payload as a whole.
pub const SCHEMA_FIELD: &str = "_schema";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The resolved, writable fields of a todo record (everything but `id`).
#[derive(Debug, Clone, PartialEq)]
pub struct TodoFields {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

/// A validated partial field-set.
///
/// `None` means the field was absent from the payload and must be left
/// untouched. For nullable columns `Some(None)` means the client sent an
/// explicit `null` and the stored value is cleared.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TodoPatch {
    #[validate(length(min = 1, max = 100, message = "Length must be between 1 and 100."))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "Longer than maximum length 500."))]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub position_x: Option<Option<f64>>,
    pub position_y: Option<Option<f64>>,
}

impl TodoPatch {
    /// True when the payload carried no recognised field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.position_x.is_none()
            && self.position_y.is_none()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a creation payload.
///
/// `title` is required. `completed` defaults to `false`; `description` and
/// the positions default to `null`.
pub fn validate_create(payload: &Value) -> Result<TodoFields, ValidationErrors> {
    let object = as_object(payload)?;
    let mut failures = Vec::new();

    let patch = read_patch(object, &mut failures);
    if !object.contains_key(FIELD_TITLE) {
        failures.push((FIELD_TITLE, required_error()));
    }
    check(&patch, failures)?;

    let Some(title) = patch.title else {
        let mut errors = ValidationErrors::new();
        errors.add(FIELD_TITLE, required_error());
        return Err(errors);
    };

    Ok(TodoFields {
        title,
        description: patch.description.flatten(),
        completed: patch.completed.unwrap_or(false),
        position_x: patch.position_x.flatten(),
        position_y: patch.position_y.flatten(),
    })
}

/// Validate a partial-update payload.
///
/// Every field is optional, but a present field must satisfy the same rules
/// as on creation.
pub fn validate_update(payload: &Value) -> Result<TodoPatch, ValidationErrors> {
    let object = as_object(payload)?;
    let mut failures = Vec::new();

    let patch = read_patch(object, &mut failures);
    check(&patch, failures)?;

    Ok(patch)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Apply `patch` onto `current`. Absent fields keep their current value.
pub fn reconcile(current: TodoFields, patch: TodoPatch) -> TodoFields {
    TodoFields {
        title: patch.title.unwrap_or(current.title),
        description: patch.description.unwrap_or(current.description),
        completed: patch.completed.unwrap_or(current.completed),
        position_x: patch.position_x.unwrap_or(current.position_x),
        position_y: patch.position_y.unwrap_or(current.position_y),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type FieldFailure = (&'static str, ValidationError);

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn required_error() -> ValidationError {
    field_error("required", "Missing data for required field.")
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(SCHEMA_FIELD, field_error("type", "Invalid input type."));
        errors
    })
}

/// Read the known fields out of `object`, recording type and null failures.
///
/// A field that fails its type check is left absent in the returned patch so
/// the length rules only run on well-typed values.
fn read_patch(object: &Map<String, Value>, failures: &mut Vec<FieldFailure>) -> TodoPatch {
    let title = read(object, FIELD_TITLE, as_string, "Not a valid string.", failures);
    let completed = read(
        object,
        FIELD_COMPLETED,
        Value::as_bool,
        "Not a valid boolean.",
        failures,
    );

    TodoPatch {
        title: non_null(title, FIELD_TITLE, failures),
        description: read(
            object,
            FIELD_DESCRIPTION,
            as_string,
            "Not a valid string.",
            failures,
        ),
        completed: non_null(completed, FIELD_COMPLETED, failures),
        position_x: read(
            object,
            FIELD_POSITION_X,
            Value::as_f64,
            "Not a valid number.",
            failures,
        ),
        position_y: read(
            object,
            FIELD_POSITION_Y,
            Value::as_f64,
            "Not a valid number.",
            failures,
        ),
    }
}

/// Look up `field`: `None` if absent, `Some(None)` if null, `Some(Some(_))`
/// if it converts. Values of the wrong JSON type are never coerced.
fn read<T>(
    object: &Map<String, Value>,
    field: &'static str,
    convert: fn(&Value) -> Option<T>,
    message: &'static str,
    failures: &mut Vec<FieldFailure>,
) -> Option<Option<T>> {
    match object.get(field)? {
        Value::Null => Some(None),
        value => match convert(value) {
            Some(converted) => Some(Some(converted)),
            None => {
                failures.push((field, field_error("type", message)));
                None
            }
        },
    }
}

fn non_null<T>(
    value: Option<Option<T>>,
    field: &'static str,
    failures: &mut Vec<FieldFailure>,
) -> Option<T> {
    match value? {
        Some(inner) => Some(inner),
        None => {
            failures.push((field, field_error("null", "Field may not be null.")));
            None
        }
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

/// Run the declarative rules on `patch` and fold in the failures found while
/// reading. Succeeds only if both are empty.
fn check(patch: &TodoPatch, failures: Vec<FieldFailure>) -> Result<(), ValidationErrors> {
    let mut errors = patch.validate().err().unwrap_or_else(ValidationErrors::new);
    for (field, error) in failures {
        errors.add(field, error);
    }

    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
