use serde::{Deserialize, Serialize};

/// Kind of value a grid column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// `integer == false` means a real column (e.g. an area)
    Number { integer: bool },
    ForeignKey,
    /// Edit/delete/insert buttons; carries no data
    Control,
}

/// Reference from a foreign-key column to a column of another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub table: &'static str,
    pub column: &'static str,
    /// The committed value is parsed as an integer
    pub numeric: bool,
}

/// One column of a registered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub title: &'static str,
    pub kind: FieldKind,
    /// Display width in pixels
    pub width: u32,
    /// Identity column: update/delete match on it
    pub key: bool,
    /// Blank input is rejected and the column is `NOT NULL`
    pub required: bool,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl FieldDescriptor {
    pub const fn text(name: &'static str, title: &'static str, width: u32) -> Self {
        Self {
            name,
            title,
            kind: FieldKind::Text,
            width,
            key: false,
            required: false,
            foreign_key: None,
        }
    }

    pub const fn integer(name: &'static str, title: &'static str, width: u32) -> Self {
        Self {
            name,
            title,
            kind: FieldKind::Number { integer: true },
            width,
            key: false,
            required: false,
            foreign_key: None,
        }
    }

    pub const fn real(name: &'static str, title: &'static str, width: u32) -> Self {
        Self {
            name,
            title,
            kind: FieldKind::Number { integer: false },
            width,
            key: false,
            required: false,
            foreign_key: None,
        }
    }

    pub const fn foreign_key(
        name: &'static str,
        title: &'static str,
        width: u32,
        table: &'static str,
        column: &'static str,
        numeric: bool,
    ) -> Self {
        Self {
            name,
            title,
            kind: FieldKind::ForeignKey,
            width,
            key: false,
            required: false,
            foreign_key: Some(ForeignKeyRef {
                table,
                column,
                numeric,
            }),
        }
    }

    pub const fn control() -> Self {
        Self {
            name: "",
            title: "",
            kind: FieldKind::Control,
            width: 80,
            key: false,
            required: false,
            foreign_key: None,
        }
    }

    /// Marks the field as part of the row identity. Keys are always required.
    pub const fn as_key(mut self) -> Self {
        self.key = true;
        self.required = true;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_control(&self) -> bool {
        matches!(self.kind, FieldKind::Control)
    }

    /// Whether values of this column compare and store as numbers.
    pub fn is_numeric(&self) -> bool {
        match self.kind {
            FieldKind::Number { .. } => true,
            FieldKind::ForeignKey => self.foreign_key.map(|fk| fk.numeric).unwrap_or(false),
            FieldKind::Text | FieldKind::Control => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_required() {
        let id = FieldDescriptor::integer("city_id", "Id", 70).as_key();
        assert!(id.key && id.required);

        let name = FieldDescriptor::text("city_name", "Name", 150).required();
        assert!(name.required && !name.key);

        let fk = FieldDescriptor::foreign_key("fg_region_id", "Region", 110, "regions", "region_id", true);
        assert!(!fk.required);
        assert!(fk.is_numeric());
    }
}
