//! # Delivery Scheduling and Address Types
//!
//! Delivery zones, the fixed time-slot windows, and the delivery and
//! billing forms with their field validation.

use serde::{Deserialize, Serialize};

/// A deliverable zone (city/postal-code area).
/// Selecting one is a checkout precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub id: String,
    pub name: String,
    pub postal_code: String,
    pub active: bool,
}

impl DeliveryZone {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            postal_code: postal_code.into(),
            active: true,
        }
    }
}

/// The fixed set of two-hour delivery windows offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "09:00-11:00")]
    NineEleven,
    #[serde(rename = "10:00-12:00")]
    TenTwelve,
    #[serde(rename = "11:00-13:00")]
    ElevenThirteen,
    #[serde(rename = "14:00-16:00")]
    FourteenSixteen,
    #[serde(rename = "15:00-17:00")]
    FifteenSeventeen,
    #[serde(rename = "16:00-18:00")]
    SixteenEighteen,
    #[serde(rename = "17:00-19:00")]
    SeventeenNineteen,
}

impl TimeSlot {
    /// All offered windows, in display order
    pub const ALL: [TimeSlot; 7] = [
        TimeSlot::NineEleven,
        TimeSlot::TenTwelve,
        TimeSlot::ElevenThirteen,
        TimeSlot::FourteenSixteen,
        TimeSlot::FifteenSeventeen,
        TimeSlot::SixteenEighteen,
        TimeSlot::SeventeenNineteen,
    ];

    /// The window as stored and sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::NineEleven => "09:00-11:00",
            TimeSlot::TenTwelve => "10:00-12:00",
            TimeSlot::ElevenThirteen => "11:00-13:00",
            TimeSlot::FourteenSixteen => "14:00-16:00",
            TimeSlot::FifteenSeventeen => "15:00-17:00",
            TimeSlot::SixteenEighteen => "16:00-18:00",
            TimeSlot::SeventeenNineteen => "17:00-19:00",
        }
    }

    /// Parse a stored window back into a slot
    pub fn parse(value: &str) -> Option<Self> {
        TimeSlot::ALL.into_iter().find(|slot| slot.as_str() == value)
    }
}

impl Default for TimeSlot {
    fn default() -> Self {
        TimeSlot::TenTwelve
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recipient and address data collected on the delivery step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl DeliveryInfo {
    /// Recipient full name as shown on receipts
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Validate every field, collecting all failures rather than
    /// stopping at the first one.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.push("firstName", "first name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.push("lastName", "last name is required");
        }
        if self.email.trim().is_empty() {
            errors.push("email", "email is required");
        } else if !is_valid_email(&self.email) {
            errors.push("email", "invalid email format");
        }
        if self.phone.trim().is_empty() {
            errors.push("phone", "phone is required");
        } else if !is_valid_phone(&self.phone) {
            errors.push("phone", "invalid phone format");
        }
        if self.address.trim().is_empty() {
            errors.push("address", "address is required");
        }
        if self.postal_code.trim().is_empty() {
            errors.push("postalCode", "postal code is required");
        } else if !is_valid_postal_code(&self.postal_code) {
            errors.push("postalCode", "postal code must be 5 digits");
        }

        errors.into_result()
    }
}

/// Billing address, either copied from the delivery info or entered
/// independently when `use_same_billing_address` is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl BillingInfo {
    /// Derive a billing address from the delivery form (the default)
    pub fn from_delivery(delivery: &DeliveryInfo) -> Self {
        Self {
            first_name: delivery.first_name.clone(),
            last_name: delivery.last_name.clone(),
            email: Some(delivery.email.clone()),
            phone: Some(delivery.phone.clone()),
            address: delivery.address.clone(),
            city: delivery.city.clone(),
            postal_code: delivery.postal_code.clone(),
            country: None,
            company: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.push("firstName", "first name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.push("lastName", "last name is required");
        }
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !is_valid_email(email) {
                errors.push("email", "invalid email format");
            }
        }
        if self.address.trim().is_empty() {
            errors.push("address", "address is required");
        }
        if self.postal_code.trim().is_empty() {
            errors.push("postalCode", "postal code is required");
        } else if !is_valid_postal_code(&self.postal_code) {
            errors.push("postalCode", "postal code must be 5 digits");
        }

        errors.into_result()
    }
}

/// A single failed field with its user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Collected per-field validation failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether a specific field failed
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

/// `local@domain.tld` shape: one `@`, no whitespace, a dot with
/// non-empty parts on both sides in the domain.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// At least 10 characters of digits and `+ - ( )` once spaces are
/// stripped.
fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.len() >= 10
        && stripped
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')'))
}

/// Exactly 5 ASCII digits (French postal code)
fn is_valid_postal_code(code: &str) -> bool {
    code.len() == 5 && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_delivery() -> DeliveryInfo {
        DeliveryInfo {
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            email: "marie.dupont@example.fr".to_string(),
            phone: "06 12 34 56 78".to_string(),
            address: "12 rue des Lilas".to_string(),
            city: "Paris".to_string(),
            postal_code: "75011".to_string(),
            instructions: None,
        }
    }

    #[test]
    fn test_valid_delivery_info() {
        assert!(valid_delivery().validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut info = valid_delivery();
        info.first_name = "  ".to_string();
        info.address = String::new();

        let errors = info.validate().unwrap_err();
        assert!(errors.has_field("firstName"));
        assert!(errors.has_field("address"));
        assert!(!errors.has_field("email"));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.fr"));
        assert!(is_valid_email("marie+fleurs@mail.example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.fr"));
        assert!(!is_valid_email("a@.fr"));
        assert!(!is_valid_email("a b@c.fr"));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("06 12 34 56 78"));
        assert!(is_valid_phone("+33612345678"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("06 12 34 56 ab"));
    }

    #[test]
    fn test_postal_code_validation() {
        assert!(is_valid_postal_code("75011"));
        assert!(!is_valid_postal_code("7501"));
        assert!(!is_valid_postal_code("750111"));
        assert!(!is_valid_postal_code("75O11"));
    }

    #[test]
    fn test_billing_from_delivery() {
        let delivery = valid_delivery();
        let billing = BillingInfo::from_delivery(&delivery);

        assert_eq!(billing.first_name, "Marie");
        assert_eq!(billing.email.as_deref(), Some("marie.dupont@example.fr"));
        assert_eq!(billing.postal_code, "75011");
        assert!(billing.validate().is_ok());
    }

    #[test]
    fn test_time_slot_round_trip() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse(slot.as_str()), Some(slot));
        }
        assert_eq!(TimeSlot::parse("08:00-10:00"), None);
        assert_eq!(TimeSlot::default(), TimeSlot::TenTwelve);
    }

    #[test]
    fn test_time_slot_serde_uses_window_string() {
        let json = serde_json::to_string(&TimeSlot::FourteenSixteen).unwrap();
        assert_eq!(json, "\"14:00-16:00\"");
        let back: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeSlot::FourteenSixteen);
    }
}
