//! Customer details collected at checkout.

use std::fmt;

/// Contact and delivery details for an order. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    /// Full name
    pub name: String,

    /// Phone number, any formatting
    pub phone: String,

    /// Email address
    pub email: String,

    /// Free-text delivery address
    pub address: String,
}

impl CustomerInfo {
    /// Create customer info from its four fields.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
        }
    }

    /// The value of a single field.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::Address => &self.address,
        }
    }
}

/// A checkout form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Full name
    Name,

    /// Phone number
    Phone,

    /// Email address
    Email,

    /// Delivery address
    Address,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 4] = [Field::Name, Field::Phone, Field::Email, Field::Address];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "Full Name",
            Field::Phone => "Phone Number",
            Field::Email => "Email Address",
            Field::Address => "Delivery Address",
        };

        f.write_str(label)
    }
}
