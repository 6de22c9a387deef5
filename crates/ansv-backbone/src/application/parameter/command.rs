use serde_json::{Map, Value};

use crate::domain::parameter::{NewParameter, ParameterPatch};

use super::{Error, Result};

const NAME_FIELD: &str = "nombre_parametro";
const VALUE_FIELD: &str = "valor_parametro";
const DATA_TYPE_FIELD: &str = "tipo_dato";
const DESCRIPTION_FIELD: &str = "descripcion";

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CreatingParameterCommand {
    pub name: String,
    pub value: String,
    pub data_type: Option<String>,
    pub description: Option<String>,
}

impl CreatingParameterCommand {
    /// Builds the command from a raw JSON object. `None` stands for an absent or unreadable body.
    pub fn from_fields(fields: Option<Map<String, Value>>) -> Result<Self> {
        let mut fields = fields.ok_or(Error::MissingRequiredFields)?;

        let name = fields.remove(NAME_FIELD).filter(|value| !value.is_null());
        let value = fields.remove(VALUE_FIELD).filter(|value| !value.is_null());
        let (Some(name), Some(value)) = (name, value) else {
            return Err(Error::MissingRequiredFields);
        };

        Ok(Self {
            name: required_text(NAME_FIELD, name)?,
            value: required_text(VALUE_FIELD, value)?,
            data_type: fields.remove(DATA_TYPE_FIELD).map(|v| optional_text(DATA_TYPE_FIELD, v)).transpose()?.flatten(),
            description: fields
                .remove(DESCRIPTION_FIELD)
                .map(|v| optional_text(DESCRIPTION_FIELD, v))
                .transpose()?
                .flatten(),
        })
    }
}

impl From<CreatingParameterCommand> for NewParameter {
    fn from(value: CreatingParameterCommand) -> Self {
        Self { name: value.name, value: value.value, data_type: value.data_type, description: value.description }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct UpdatingParameterCommand {
    pub name: Option<String>,
    pub value: Option<String>,
    pub data_type: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl UpdatingParameterCommand {
    /// Builds the command from a raw JSON object, keeping only the updatable fields. Unknown keys are
    /// ignored.
    pub fn from_fields(fields: Option<Map<String, Value>>) -> Result<Self> {
        let fields = fields.filter(|fields| !fields.is_empty()).ok_or(Error::EmptyUpdate)?;

        let mut command = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                NAME_FIELD => command.name = Some(required_text(NAME_FIELD, value)?),
                VALUE_FIELD => command.value = Some(required_text(VALUE_FIELD, value)?),
                DATA_TYPE_FIELD => command.data_type = Some(optional_text(DATA_TYPE_FIELD, value)?),
                DESCRIPTION_FIELD => command.description = Some(optional_text(DESCRIPTION_FIELD, value)?),
                _ => continue,
            }
        }

        if command.is_empty() {
            return Err(Error::NoUpdatableFields);
        }

        Ok(command)
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.value.is_none() && self.data_type.is_none() && self.description.is_none()
    }
}

impl From<UpdatingParameterCommand> for ParameterPatch {
    fn from(value: UpdatingParameterCommand) -> Self {
        Self { name: value.name, value: value.value, data_type: value.data_type, description: value.description }
    }
}

fn required_text(field: &'static str, value: Value) -> Result<String> {
    optional_text(field, value)?.ok_or(Error::InvalidFieldValue(field))
}

fn optional_text(field: &'static str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::InvalidFieldValue(field)),
    }
}
