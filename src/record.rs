use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Form fields of the equipment inventory, in the column order of the
/// sheet records are appended to.
pub const EQUIPMENT_FIELDS: [&str; 14] = [
    "Nome",
    "Código",
    "Código Pai/Local",
    "Fabricante",
    "Modelo",
    "Tipo",
    "Classificação 1",
    "Classificação 2",
    "Peso",
    "Outro 2",
    "Serial",
    "Centro de Custos",
    "CRITICIDADE",
    "Média diária de uso do equipamento",
];

/// A named, versioned list of record fields.
///
/// The field order is the column order of the append target. The target
/// has no schema to check against, so a change on either side has to be
/// reflected here with a new version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub name: String,
    pub version: u32,
    pub fields: Vec<String>,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self::equipment_v1()
    }
}

impl RecordLayout {
    pub fn equipment_v1() -> Self {
        RecordLayout {
            name: "equipamentos".to_string(),
            version: 1,
            fields: EQUIPMENT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn build_row(&self, request: &NewRecordRequest) -> Vec<String> {
        for unknown in self.unknown_fields(request) {
            warn!(
                "field '{}' is not part of layout {} v{} and will be dropped",
                unknown, self.name, self.version
            );
        }
        build_row(request, &self.fields)
    }

    /// Fields of `request` that this layout does not place anywhere.
    pub fn unknown_fields<'a>(&self, request: &'a NewRecordRequest) -> Vec<&'a str> {
        request
            .field_names()
            .filter(|name| !self.fields.iter().any(|f| f == name))
            .collect()
    }

    /// Layout fields that are not columns of `columns`, in layout order.
    pub fn missing_from<'a>(&'a self, columns: &[&str]) -> Vec<&'a str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|f| !columns.contains(f))
            .collect()
    }
}

/// Free-text values submitted through the new-record form, keyed by field
/// name. No field is required and empty values are kept as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewRecordRequest {
    fields: BTreeMap<String, String>,
}

impl NewRecordRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NewRecordRequest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        NewRecordRequest {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Orders the values of `request` by `column_order`.
///
/// The row always has one cell per entry of `column_order`; fields the
/// request does not carry become empty strings.
///
/// # Examples
/// ```
/// use inventario::record::{build_row, NewRecordRequest};
///
/// let request = NewRecordRequest::new().with("Nome", "Bomba 1");
/// let order = vec!["Código".to_string(), "Nome".to_string()];
/// assert_eq!(build_row(&request, &order), vec!["", "Bomba 1"]);
/// ```
pub fn build_row(request: &NewRecordRequest, column_order: &[String]) -> Vec<String> {
    column_order
        .iter()
        .map(|field| request.get(field).unwrap_or_default().to_string())
        .collect()
}
