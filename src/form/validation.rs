use std::collections::BTreeMap;
use std::sync::Arc;

use super::controller::{FieldKey, FormController, FormError, FormResult, write_lock};

/// Per-field validation results. A field without an entry passed.
pub type FieldErrors<E> = BTreeMap<FieldKey, E>;

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> String;
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

/// Implemented by `#[derive(FormModel)]`.
pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Every field in declaration order.
    fn field_keys() -> &'static [FieldKey];

    /// Name-based access to `String` fields.
    fn text(&self, key: FieldKey) -> Option<&str>;
    fn text_mut(&mut self, key: FieldKey) -> Option<&mut String>;

    fn field_key(name: &str) -> Option<FieldKey> {
        Self::field_keys()
            .iter()
            .copied()
            .find(|key| key.as_str() == name)
    }
}

pub trait FieldValidator<T, L, E>: Send + Sync
where
    L: FieldLens<T>,
    E: ValidationError,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E>;
}

impl<T, L, E, F> FieldValidator<T, L, E> for F
where
    L: FieldLens<T>,
    E: ValidationError,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), E> + Send + Sync,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E> {
        (self)(model, value)
    }
}

pub trait FormValidator<T, E>: Send + Sync
where
    E: ValidationError,
{
    fn validate(&self, model: &T) -> FieldErrors<E>;
}

impl<T, E, F> FormValidator<T, E> for F
where
    E: ValidationError,
    F: Fn(&T) -> FieldErrors<E> + Send + Sync,
{
    fn validate(&self, model: &T) -> FieldErrors<E> {
        (self)(model)
    }
}

/// Builds a model from `(field name, value)` pairs on top of its default.
/// Missing fields keep their default value.
pub fn model_from_pairs<T, I, K, V>(pairs: I) -> FormResult<T>
where
    T: FormModel + Default,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut model = T::default();
    for (name, value) in pairs {
        let name = name.as_ref();
        let slot = T::field_key(name)
            .and_then(|key| model.text_mut(key))
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value.into();
    }
    Ok(model)
}

impl<T, E> FormController<T, E>
where
    T: FormModel,
    E: ValidationError,
{
    pub fn register_field_validator<L, V>(&self, lens: L, validator: V) -> FormResult<()>
    where
        L: FieldLens<T>,
        V: FieldValidator<T, L, E> + 'static,
    {
        let key = lens.key();
        let validator = Arc::new(validator);
        let wrapped: super::controller::SyncFieldValidatorFn<T, E> =
            Arc::new(move |model: &T| validator.validate(model, lens.get(model)));
        let mut validators = write_lock(
            &self.shared.field_validators,
            "registering field validator",
        )?;
        validators.push((key, wrapped));
        Ok(())
    }

    pub fn register_form_validator<V>(&self, validator: V) -> FormResult<()>
    where
        V: FormValidator<T, E> + 'static,
    {
        let validator = Arc::new(validator);
        let wrapped: super::controller::SyncFormValidatorFn<T, E> =
            Arc::new(move |model: &T| validator.validate(model));
        let mut validators =
            write_lock(&self.shared.form_validators, "registering form validator")?;
        validators.push(wrapped);
        Ok(())
    }
}
