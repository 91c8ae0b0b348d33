//! Customer record extracted from an invoice's "SEÑOR(ES)" block.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight customer fields, in sheet column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Razón social.
    LegalName,
    /// RUT, the unique customer key.
    TaxId,
    /// Giro (trade activity).
    TradeActivity,
    /// Dirección.
    Address,
    /// Comuna.
    Commune,
    /// Ciudad.
    City,
    /// Nombre contacto.
    ContactName,
    /// Teléfono.
    Phone,
}

impl Field {
    /// All fields in column order.
    pub const ALL: [Field; 8] = [
        Field::LegalName,
        Field::TaxId,
        Field::TradeActivity,
        Field::Address,
        Field::Commune,
        Field::City,
        Field::ContactName,
        Field::Phone,
    ];

    /// Header literal used in the sheet and in warnings.
    pub fn header(&self) -> &'static str {
        match self {
            Field::LegalName => "Razón social",
            Field::TaxId => "RUT",
            Field::TradeActivity => "Giro",
            Field::Address => "Dirección",
            Field::Commune => "Comuna",
            Field::City => "Ciudad",
            Field::ContactName => "Nombre contacto",
            Field::Phone => "Teléfono",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A customer as read from one invoice.
///
/// Every field is optional; `tax_id` is the key used for deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Legal name (razón social).
    pub legal_name: Option<String>,

    /// RUT. `NN.NNN.NNN-D` when found in the customer section; as written,
    /// minus whitespace, when recovered by the fallback pass.
    pub tax_id: Option<String>,

    /// Trade activity (giro).
    pub trade_activity: Option<String>,

    /// Street address.
    pub address: Option<String>,

    /// Commune.
    pub commune: Option<String>,

    /// City.
    pub city: Option<String>,

    /// Contact person.
    pub contact_name: Option<String>,

    /// Phone, normalized to `+569 XXXXXXXX` where possible.
    pub phone: Option<String>,
}

impl CustomerRecord {
    /// Get a field value.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Return a copy of this record with `field` set to `value`.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Set `field` only when `value` is present.
    pub fn with_opt(self, field: Field, value: Option<String>) -> Self {
        match value {
            Some(v) => self.with(field, v),
            None => self,
        }
    }

    /// Fields with no value, in column order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    /// Whether no field at all was found.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Merge two partial records; the first non-absent value wins per field.
    pub fn or(self, other: CustomerRecord) -> CustomerRecord {
        CustomerRecord {
            legal_name: self.legal_name.or(other.legal_name),
            tax_id: self.tax_id.or(other.tax_id),
            trade_activity: self.trade_activity.or(other.trade_activity),
            address: self.address.or(other.address),
            commune: self.commune.or(other.commune),
            city: self.city.or(other.city),
            contact_name: self.contact_name.or(other.contact_name),
            phone: self.phone.or(other.phone),
        }
    }

    /// Header row in column order.
    pub fn headers() -> [&'static str; 8] {
        Field::ALL.map(|f| f.header())
    }

    /// Values in column order.
    pub fn to_row(&self) -> [Option<&str>; 8] {
        Field::ALL.map(|f| self.get(f))
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::LegalName => &self.legal_name,
            Field::TaxId => &self.tax_id,
            Field::TradeActivity => &self.trade_activity,
            Field::Address => &self.address,
            Field::Commune => &self.commune,
            Field::City => &self.city,
            Field::ContactName => &self.contact_name,
            Field::Phone => &self.phone,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::LegalName => &mut self.legal_name,
            Field::TaxId => &mut self.tax_id,
            Field::TradeActivity => &mut self.trade_activity,
            Field::Address => &mut self.address,
            Field::Commune => &mut self.commune,
            Field::City => &mut self.city,
            Field::ContactName => &mut self.contact_name,
            Field::Phone => &mut self.phone,
        }
    }
}
