//! Device record types and input validation.
//!
//! A [`DeviceRecord`] is one physical unit of equipment as held in the
//! record store. Records are serialized in camelCase, the layout the store
//! documents use. [`NewDevice`] and [`DevicePatch`] are the create and
//! partial-update payloads accepted at the catalog boundary.

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::types::DeviceId;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One physical inventory unit.
///
/// Every field tolerates absence on read so that hand-imported documents
/// with gaps still load; required-ness is enforced on write only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub original_id: DeviceId,
    pub itm_code: String,
    pub device_name: String,
    pub model: String,
    pub manufacturer: String,
    pub department: String,
    pub serial_number: String,
    pub quantity: i64,
    pub date_received: String,
    pub warranty_period: Option<String>,
    pub supplier: Option<String>,
    pub country_of_origin: Option<String>,
    pub accessories: Option<String>,
    pub remarks: Option<String>,
    pub recipient_name: Option<String>,
    pub entry_voucher_number: Option<String>,
    pub details_link: Option<String>,
    pub image_url: Option<String>,
}

impl DeviceRecord {
    /// Build a record from a create payload and the ids the catalog assigned.
    pub fn from_new(id: DeviceId, input: NewDevice) -> Self {
        Self {
            id,
            original_id: id,
            itm_code: input.itm_code,
            device_name: input.device_name,
            model: input.model,
            manufacturer: input.manufacturer,
            department: input.department,
            serial_number: input.serial_number,
            quantity: input.quantity,
            date_received: input.date_received,
            warranty_period: input.warranty_period,
            supplier: input.supplier,
            country_of_origin: input.country_of_origin,
            accessories: input.accessories,
            remarks: input.remarks,
            recipient_name: input.recipient_name,
            entry_voucher_number: input.entry_voucher_number,
            details_link: input.details_link,
            image_url: input.image_url,
        }
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &DevicePatch) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt(slot: &mut Option<String>, value: &Option<Option<String>>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        set(&mut self.itm_code, &patch.itm_code);
        set(&mut self.device_name, &patch.device_name);
        set(&mut self.model, &patch.model);
        set(&mut self.manufacturer, &patch.manufacturer);
        set(&mut self.department, &patch.department);
        set(&mut self.serial_number, &patch.serial_number);
        set(&mut self.quantity, &patch.quantity);
        set(&mut self.date_received, &patch.date_received);
        set_opt(&mut self.warranty_period, &patch.warranty_period);
        set_opt(&mut self.supplier, &patch.supplier);
        set_opt(&mut self.country_of_origin, &patch.country_of_origin);
        set_opt(&mut self.accessories, &patch.accessories);
        set_opt(&mut self.remarks, &patch.remarks);
        set_opt(&mut self.recipient_name, &patch.recipient_name);
        set_opt(&mut self.entry_voucher_number, &patch.entry_voucher_number);
        set_opt(&mut self.details_link, &patch.details_link);
        set_opt(&mut self.image_url, &patch.image_url);
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Create payload: a full record minus the catalog-assigned ids.
///
/// Absent fields decode as empty so validation can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDevice {
    #[validate(length(min = 1, message = "This field is required"))]
    pub itm_code: String,
    #[validate(length(min = 1, message = "This field is required"))]
    pub device_name: String,
    #[validate(length(min = 1, message = "This field is required"))]
    pub model: String,
    #[validate(length(min = 1, message = "This field is required"))]
    pub manufacturer: String,
    #[validate(length(min = 1, message = "This field is required"))]
    pub department: String,
    #[validate(length(min = 1, message = "This field is required"))]
    pub serial_number: String,
    #[validate(range(min = 1, message = "Quantity must be greater than 0"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "This field is required"))]
    pub date_received: String,
    pub warranty_period: Option<String>,
    pub supplier: Option<String>,
    pub country_of_origin: Option<String>,
    pub accessories: Option<String>,
    pub remarks: Option<String>,
    pub recipient_name: Option<String>,
    pub entry_voucher_number: Option<String>,
    pub details_link: Option<String>,
    pub image_url: Option<String>,
}

impl From<DeviceRecord> for NewDevice {
    /// Drop the ids so an exported record can be validated like fresh input.
    fn from(record: DeviceRecord) -> Self {
        Self {
            itm_code: record.itm_code,
            device_name: record.device_name,
            model: record.model,
            manufacturer: record.manufacturer,
            department: record.department,
            serial_number: record.serial_number,
            quantity: record.quantity,
            date_received: record.date_received,
            warranty_period: record.warranty_period,
            supplier: record.supplier,
            country_of_origin: record.country_of_origin,
            accessories: record.accessories,
            remarks: record.remarks,
            recipient_name: record.recipient_name,
            entry_voucher_number: record.entry_voucher_number,
            details_link: record.details_link,
            image_url: record.image_url,
        }
    }
}

impl NewDevice {
    /// Trim the required text fields so whitespace-only input counts as missing.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.itm_code,
            &mut self.device_name,
            &mut self.model,
            &mut self.manufacturer,
            &mut self.department,
            &mut self.serial_number,
            &mut self.date_received,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }
}

/// Partial update payload. Only `Some` fields are written.
///
/// Optional fields are doubly wrapped: an absent key leaves the stored value
/// alone, while an explicit `null` arrives as `Some(None)` and clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub itm_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Quantity must be greater than 0"))]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub date_received: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub warranty_period: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub supplier: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub accessories: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub entry_voucher_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub details_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl DevicePatch {
    /// A patch that sets only `imageUrl`.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(Some(url.into())),
            ..Self::default()
        }
    }

    /// Trim the required text fields so whitespace-only values count as blank.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.itm_code,
            &mut self.device_name,
            &mut self.model,
            &mut self.manufacturer,
            &mut self.department,
            &mut self.serial_number,
            &mut self.date_received,
        ]
        .into_iter()
        .flatten()
        {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }

    /// True when no field would be written.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Present keys decode to `Some`, so `null` becomes `Some(None)`.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a create payload, returning a single message naming every bad field.
pub fn validate_new_device(input: &NewDevice) -> Result<(), CoreError> {
    input.validate().map_err(validation_error)
}

/// Validate a partial update. An empty patch is rejected.
pub fn validate_patch(patch: &DevicePatch) -> Result<(), CoreError> {
    if patch.is_empty() {
        return Err(CoreError::Validation(
            "Update must set at least one field".to_string(),
        ));
    }
    patch.validate().map_err(validation_error)
}

/// Flatten validator errors into `"field: message; field: message"`, sorted by field.
fn validation_error(errors: ValidationErrors) -> CoreError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{}: {message}", to_camel_case(&field))
        })
        .collect();
    parts.sort();
    CoreError::Validation(parts.join("; "))
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
