//! Registered composite field layouts
//!
//! The schema declares which sub-fields a composite field carries but rarely
//! labels them. Each known format ships its own label table; composite fields
//! with an unknown format cannot be mapped.

/// Named sub-field layout of a composite field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeFormat {
    Address,
    Coordinates,
    DateRange,
    DueDate,
    FullName,
    PhoneNumber,
}

impl CompositeFormat {
    pub const ALL: [CompositeFormat; 6] = [
        Self::Address,
        Self::Coordinates,
        Self::DateRange,
        Self::DueDate,
        Self::FullName,
        Self::PhoneNumber,
    ];

    /// Look up a format by its `typeOptions.format` name
    pub fn lookup(format: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == format)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Coordinates => "coordinates",
            Self::DateRange => "dateRange",
            Self::DueDate => "dueDate",
            Self::FullName => "fullName",
            Self::PhoneNumber => "phoneNumber",
        }
    }

    fn labels(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Address => &[
                ("street", "Street"),
                ("suiteAptBldg", "Suite / Apt. / Building"),
                ("city", "City"),
                ("stateRegion", "State / Region"),
                ("postalCode", "Postal Code"),
                ("country", "Country"),
            ],
            Self::Coordinates => &[("latitude", "Latitude"), ("longitude", "Longitude")],
            Self::DateRange => &[("from", "From"), ("to", "To")],
            Self::DueDate => &[
                ("from", "Start (optional)"),
                ("to", "Due"),
                ("overdue", "Overdue"),
                ("complete", "Complete"),
            ],
            Self::FullName => &[
                ("title", "Title"),
                ("first", "First Name"),
                ("middle", "Middle Name"),
                ("last", "Last Name"),
            ],
            Self::PhoneNumber => &[("country", "Country"), ("number", "Number")],
        }
    }

    /// Display label of a sub-field, falling back to its api name
    pub fn sub_field_label<'a>(&self, api_name: &'a str) -> &'a str {
        self.labels()
            .iter()
            .find(|(name, _)| *name == api_name)
            .map(|(_, label)| *label)
            .unwrap_or(api_name)
    }
}

impl std::fmt::Display for CompositeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_formats() {
        for format in CompositeFormat::ALL {
            assert_eq!(CompositeFormat::lookup(format.as_str()), Some(format));
        }
        assert_eq!(CompositeFormat::lookup("currency"), None);
        assert_eq!(CompositeFormat::lookup("Address"), None);
    }

    #[test]
    fn test_sub_field_labels() {
        assert_eq!(
            CompositeFormat::Address.sub_field_label("suiteAptBldg"),
            "Suite / Apt. / Building"
        );
        assert_eq!(CompositeFormat::DueDate.sub_field_label("from"), "Start (optional)");
        assert_eq!(CompositeFormat::DateRange.sub_field_label("from"), "From");
        assert_eq!(CompositeFormat::FullName.sub_field_label("nickname"), "nickname");
    }
}
