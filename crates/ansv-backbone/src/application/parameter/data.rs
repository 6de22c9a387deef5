use crate::domain::parameter::Parameter;

pub(crate) struct ParameterData {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub legacy_value: Option<String>,
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub last_modified: Option<String>,
}

impl From<Parameter> for ParameterData {
    fn from(value: Parameter) -> Self {
        Self {
            id: value.id,
            name: value.name,
            value: value.value,
            legacy_value: value.legacy_value,
            data_type: value.data_type,
            description: value.description,
            last_modified: value.last_modified,
        }
    }
}
