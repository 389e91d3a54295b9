//! Student payload validation.
//!
//! Request bodies arrive as loosely typed JSON. [`Submission`] resolves the
//! single-vs-batch shape up front, and [`validate_record`] turns each object
//! into a [`StudentCandidate`] or a map of per-field messages. A submission is
//! only accepted when every record in it is valid.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationErrors};

/// Roll number given to records created without one.
pub const DEFAULT_ROLL_NO: &str = "0000";

/// Key used for errors that are not tied to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const DUPLICATE_ROLL_NO: &str = "student with this roll no already exists.";

const REQUIRED: &str = "This field is required.";
const NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const AGE_TOO_LARGE: &str = "Ensure this value is less than or equal to 2147483647.";
const AGE_TOO_SMALL: &str = "Ensure this value is greater than or equal to -2147483648.";

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A fully populated student record that has not been assigned an id yet.
///
/// Length limits match the `students` column widths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StudentCandidate {
    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub roll_no: String,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub name: String,
    pub age: i32,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub city: String,
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Human-readable error messages keyed by field name.
///
/// Serializes as a plain JSON object: `{"name": ["This field is required."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding exactly one message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A request body holding either one record or a list of records.
///
/// The same shape is used for what goes in (raw JSON), what comes back on
/// success (created rows), and what comes back on failure (one error map per
/// record), so clients always get a response mirroring what they sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Submission<T> {
    Batch(Vec<T>),
    Single(T),
}

impl<T> Submission<T> {
    pub fn is_batch(&self) -> bool {
        matches!(self, Submission::Batch(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Submission::Single(_) => 1,
            Submission::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Submission::Single(item) => std::slice::from_ref(item).iter(),
            Submission::Batch(items) => items.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        match self {
            Submission::Single(item) => std::slice::from_mut(item).iter_mut(),
            Submission::Batch(items) => items.iter_mut(),
        }
    }

    pub fn as_ref(&self) -> Submission<&T> {
        match self {
            Submission::Single(item) => Submission::Single(item),
            Submission::Batch(items) => Submission::Batch(items.iter().collect()),
        }
    }

    /// Apply `f` to every item, preserving the shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Submission<U> {
        match self {
            Submission::Single(item) => Submission::Single(f(item)),
            Submission::Batch(items) => Submission::Batch(items.into_iter().map(f).collect()),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Submission::Single(item) => vec![item],
            Submission::Batch(items) => items,
        }
    }
}

impl<T> Submission<Result<T, FieldErrors>> {
    /// Succeed only if every item succeeded.
    ///
    /// On failure every position gets an error map, empty for the items that
    /// were fine, so clients can line errors up with what they sent.
    pub fn transpose(self) -> Result<Submission<T>, Submission<FieldErrors>> {
        match self {
            Submission::Single(result) => result.map(Submission::Single).map_err(Submission::Single),
            Submission::Batch(results) => {
                if results.iter().all(Result::is_ok) {
                    Ok(Submission::Batch(results.into_iter().flatten().collect()))
                } else {
                    Err(Submission::Batch(
                        results
                            .into_iter()
                            .map(|result| result.err().unwrap_or_default())
                            .collect(),
                    ))
                }
            }
        }
    }
}

impl Submission<Value> {
    /// Resolve a raw request body: a JSON array is a batch, anything else is
    /// treated as a single record (and rejected later if it is not an object).
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Array(items) => Submission::Batch(items),
            other => Submission::Single(other),
        }
    }

    /// Validate every record, applying `default_roll_no` where it is omitted.
    ///
    /// Within a batch, a roll number already claimed by an earlier record is
    /// reported as a duplicate on the later one.
    pub fn validate(
        &self,
        default_roll_no: &str,
    ) -> Result<Submission<StudentCandidate>, Submission<FieldErrors>> {
        let mut results = self
            .as_ref()
            .map(|record| validate_record(record, default_roll_no));

        let mut seen = HashSet::new();
        for result in results.iter_mut() {
            let repeated = matches!(result, Ok(c) if !seen.insert(c.roll_no.clone()));
            if repeated {
                *result = Err(FieldErrors::single("roll_no", DUPLICATE_ROLL_NO));
            }
        }

        results.transpose()
    }
}

impl Submission<StudentCandidate> {
    pub fn roll_nos(&self) -> Vec<String> {
        self.iter().map(|c| c.roll_no.clone()).collect()
    }

    /// Reject the submission if any candidate uses a roll number in `taken`.
    pub fn reject_taken(&self, taken: &[String]) -> Result<(), Submission<FieldErrors>> {
        let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
        if !self.iter().any(|c| taken.contains(c.roll_no.as_str())) {
            return Ok(());
        }
        Err(self.as_ref().map(|c| {
            if taken.contains(c.roll_no.as_str()) {
                FieldErrors::single("roll_no", DUPLICATE_ROLL_NO)
            } else {
                FieldErrors::new()
            }
        }))
    }

    /// Error report blaming the candidate at `index` for a roll number clash.
    pub fn conflict_at(&self, index: usize) -> Submission<FieldErrors> {
        let mut position = 0;
        self.as_ref().map(|_| {
            let errors = if position == index {
                FieldErrors::single("roll_no", DUPLICATE_ROLL_NO)
            } else {
                FieldErrors::new()
            };
            position += 1;
            errors
        })
    }
}

impl<T: fmt::Display> fmt::Display for Submission<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Submission::Single(item) => fmt::Display::fmt(item, f),
            Submission::Batch(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{{{item}}}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Record validation
// ---------------------------------------------------------------------------

/// Validate one JSON record.
///
/// `roll_no` is optional and falls back to `default_roll_no`; `name`, `age`
/// and `city` are required. Unknown keys are ignored. All problems are
/// reported together rather than stopping at the first.
pub fn validate_record(record: &Value, default_roll_no: &str) -> Result<StudentCandidate, FieldErrors> {
    let Some(object) = record.as_object() else {
        return Err(FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected an object, but got {}.",
                json_type_name(record)
            ),
        ));
    };

    let mut errors = FieldErrors::new();

    let roll_no = match string_field(object, "roll_no") {
        Ok(value) => value.unwrap_or_else(|| default_roll_no.to_owned()),
        Err(message) => {
            errors.add("roll_no", message);
            String::new()
        }
    };
    let name = required(&mut errors, "name", string_field(object, "name"));
    let age = required(&mut errors, "age", integer_field(object, "age"));
    let city = required(&mut errors, "city", string_field(object, "city"));

    // Absent or invalid fields are stood in for by empty values, which never
    // trip the length checks, so each field reports only its first problem.
    let candidate = StudentCandidate {
        roll_no,
        name: name.unwrap_or_default(),
        age: age.unwrap_or_default(),
        city: city.unwrap_or_default(),
    };
    if let Err(length_errors) = candidate.validate() {
        errors.merge(length_errors.into());
    }

    if errors.is_empty() {
        Ok(candidate)
    } else {
        Err(errors)
    }
}

fn required<T>(errors: &mut FieldErrors, field: &str, outcome: Result<Option<T>, String>) -> Option<T> {
    match outcome {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            errors.add(field, REQUIRED);
            None
        }
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// Read a text field. Numbers are accepted and stringified; surrounding
/// whitespace is trimmed. `Ok(None)` means the key is absent.
fn string_field(object: &Map<String, Value>, field: &str) -> Result<Option<String>, String> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::Null) => Err(NULL.into()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(BLANK.into())
            } else {
                Ok(Some(trimmed.to_owned()))
            }
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(NOT_A_STRING.into()),
    }
}

/// Read a 32-bit integer field from a number or a numeric string.
fn integer_field(object: &Map<String, Value>, field: &str) -> Result<Option<i32>, String> {
    let value = match object.get(field) {
        None => return Ok(None),
        Some(Value::Null) => return Err(NULL.into()),
        Some(Value::Number(n)) => integer_from_number(n)?,
        Some(Value::String(s)) => integer_from_str(s)?,
        Some(_) => return Err(INVALID_INTEGER.into()),
    };

    i32::try_from(value).map(Some).map_err(|_| {
        if value > 0 {
            AGE_TOO_LARGE.to_owned()
        } else {
            AGE_TOO_SMALL.to_owned()
        }
    })
}

fn integer_from_number(n: &Number) -> Result<i64, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    match n.as_f64() {
        // `as` saturates, which is fine: anything that large is out of range.
        Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(INVALID_INTEGER.into()),
    }
}

/// Accepts `"21"`, `" 21 "` and `"21.0"`; rejects `"21.5"` and `"abc"`.
fn integer_from_str(s: &str) -> Result<i64, String> {
    let trimmed = s.trim();
    let digits = match trimmed.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        Some(_) => return Err(INVALID_INTEGER.into()),
        None => trimmed,
    };
    digits.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(INVALID_INTEGER.into()),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
