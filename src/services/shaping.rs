//! Data shaping
//!
//! Projects records onto the fields a client asked for with `?fields=`.
//! Every shaped type declares an explicit field registry through [`Shape`];
//! a [`DataShaper`] resolves field lists against that registry and builds
//! ordered [`ShapedEntity`] values.
//!
//! Resolution rules:
//! - tokens are split on commas, trimmed and matched case-insensitively
//! - unknown tokens are ignored and duplicates keep their first position
//! - an empty or absent list selects every field in declaration order
//! - the `id` field is always present, appended last when not requested

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::models::EmployeeDto;

/// Name of the identifier field every registry must contain
pub const ID_FIELD: &str = "id";

/// Scalar value of one shaped field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<uuid::Uuid> for FieldValue {
    fn from(value: uuid::Uuid) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// One registered field: its public name and how to read it
pub struct Field<T> {
    pub name: &'static str,
    pub accessor: fn(&T) -> FieldValue,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, accessor: fn(&T) -> FieldValue) -> Self {
        Self { name, accessor }
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Types that can be shaped
pub trait Shape: Sized {
    /// Fields in declaration order
    fn fields() -> Vec<Field<Self>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapingError {
    #[error("Field registry of {type_name} has no 'id' field")]
    MissingIdentifier { type_name: &'static str },

    #[error("Field registry of {type_name} declares '{field}' more than once")]
    DuplicateField {
        type_name: &'static str,
        field: &'static str,
    },
}

/// Validated field registry of one type
pub struct FieldRegistry<T> {
    fields: Vec<Field<T>>,
    id_index: usize,
}

impl<T> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.fields)
            .field("id_index", &self.id_index)
            .finish()
    }
}

impl<T: Shape> FieldRegistry<T> {
    /// Build the registry from [`Shape::fields`].
    ///
    /// # Errors
    ///
    /// Fails when no field is named `id` or a name is declared twice.
    pub fn build() -> Result<Self, ShapingError> {
        let type_name = std::any::type_name::<T>();
        let fields = T::fields();

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name.eq_ignore_ascii_case(field.name)) {
                return Err(ShapingError::DuplicateField {
                    type_name,
                    field: field.name,
                });
            }
        }

        let id_index = fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(ID_FIELD))
            .ok_or(ShapingError::MissingIdentifier { type_name })?;

        Ok(Self { fields, id_index })
    }
}

impl<T> FieldRegistry<T> {
    fn find(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Indices of the fields selected by `fields`, identifier included
    fn resolve(&self, fields: Option<&str>) -> Vec<usize> {
        let requested = fields.map(str::trim).unwrap_or_default();
        if requested.is_empty() {
            return (0..self.fields.len()).collect();
        }

        let mut selected: Vec<usize> = Vec::new();
        for token in requested.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match self.find(token) {
                Some(index) if !selected.contains(&index) => selected.push(index),
                Some(_) => {}
                None => tracing::debug!("Ignoring unknown field: {}", token),
            }
        }

        if !selected.contains(&self.id_index) {
            selected.push(self.id_index);
        }
        selected
    }

    /// Field names in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// A record reduced to the requested fields
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedEntity {
    /// Identifier of the source record
    pub id: FieldValue,
    /// Selected fields in output order
    pub entity: Vec<(String, FieldValue)>,
}

impl ShapedEntity {
    /// Value of a field, matched case-insensitively
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entity
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Field names in output order
    pub fn keys(&self) -> Vec<&str> {
        self.entity.iter().map(|(key, _)| key.as_str()).collect()
    }
}

impl Serialize for ShapedEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entity.len()))?;
        for (key, value) in &self.entity {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Shapes records of one type
pub struct DataShaper<T> {
    registry: Arc<FieldRegistry<T>>,
}

impl<T> Clone for DataShaper<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Shape> DataShaper<T> {
    /// Build a shaper, validating the type's field registry
    pub fn new() -> Result<Self, ShapingError> {
        Ok(Self {
            registry: Arc::new(FieldRegistry::build()?),
        })
    }
}

impl<T> DataShaper<T> {
    /// Shape every entity with the same field selection
    pub fn shape_data(&self, entities: &[T], fields: Option<&str>) -> Vec<ShapedEntity> {
        let selected = self.registry.resolve(fields);
        entities
            .iter()
            .map(|entity| self.project(entity, &selected))
            .collect()
    }

    /// Shape a single entity
    pub fn shape_entity(&self, entity: &T, fields: Option<&str>) -> ShapedEntity {
        let selected = self.registry.resolve(fields);
        self.project(entity, &selected)
    }

    pub fn registry(&self) -> &FieldRegistry<T> {
        &self.registry
    }

    fn project(&self, entity: &T, selected: &[usize]) -> ShapedEntity {
        let fields = &self.registry.fields;
        ShapedEntity {
            id: (fields[self.registry.id_index].accessor)(entity),
            entity: selected
                .iter()
                .map(|&i| (fields[i].name.to_string(), (fields[i].accessor)(entity)))
                .collect(),
        }
    }
}

impl Shape for EmployeeDto {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("id", |e: &EmployeeDto| e.id.into()),
            Field::new("name", |e: &EmployeeDto| e.name.as_str().into()),
            Field::new("age", |e: &EmployeeDto| e.age.into()),
            Field::new("position", |e: &EmployeeDto| e.position.as_str().into()),
        ]
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn field_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("id".to_string()),
            Just("NAME".to_string()),
            Just("Age".to_string()),
            Just(" position ".to_string()),
            Just("salary".to_string()),
            Just(String::new()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Shaped output always carries the identifier exactly once and only known fields
        #[test]
        fn identifier_always_present_once(
            tokens in prop::collection::vec(field_token(), 0..8),
            age in 18i32..70,
        ) {
            let shaper = DataShaper::<EmployeeDto>::new().unwrap();
            let dto = EmployeeDto {
                id: Uuid::new_v4(),
                name: "Ann".to_string(),
                age,
                position: "Dev".to_string(),
            };
            let fields = tokens.join(",");
            let shaped = shaper.shape_entity(&dto, Some(&fields));
            let keys = shaped.keys();

            prop_assert_eq!(keys.iter().filter(|k| **k == "id").count(), 1);
            for key in &keys {
                prop_assert!(["id", "name", "age", "position"].contains(key));
            }
            let mut unique = keys.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), keys.len());
        }
    }
}
