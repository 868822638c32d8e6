//! Field type categories and their SQL type codes.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SqlParseError};

/// The primitive type category of a field or literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTypeCategory {
    /// Character data.
    String,
    /// Date, time or timestamp.
    Date,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Number,
    /// Arbitrary precision decimal.
    BigNumber,
    /// Boolean.
    Boolean,
    /// Raw bytes.
    Binary,
    /// No usable type.
    None,
}

impl FieldTypeCategory {
    /// All categories, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Date,
        Self::Integer,
        Self::Number,
        Self::BigNumber,
        Self::Boolean,
        Self::Binary,
        Self::None,
    ];

    /// Returns the display name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Date => "Date",
            Self::Integer => "Integer",
            Self::Number => "Number",
            Self::BigNumber => "BigNumber",
            Self::Boolean => "Boolean",
            Self::Binary => "Binary",
            Self::None => "None",
        }
    }
}

impl fmt::Display for FieldTypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL types as exposed to JDBC-style clients, with their standard integer
/// type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Float,
    Real,
    Double,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Longvarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    Varbinary,
    Longvarbinary,
    Blob,
    Boolean,
    Null,
    Other,
}

impl SqlType {
    const ALL: [Self; 24] = [
        Self::Bit,
        Self::Tinyint,
        Self::Smallint,
        Self::Integer,
        Self::Bigint,
        Self::Float,
        Self::Real,
        Self::Double,
        Self::Numeric,
        Self::Decimal,
        Self::Char,
        Self::Varchar,
        Self::Longvarchar,
        Self::Clob,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Binary,
        Self::Varbinary,
        Self::Longvarbinary,
        Self::Blob,
        Self::Boolean,
        Self::Null,
        Self::Other,
    ];

    /// Returns the standard integer code of the type.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Bit => -7,
            Self::Tinyint => -6,
            Self::Smallint => 5,
            Self::Integer => 4,
            Self::Bigint => -5,
            Self::Float => 6,
            Self::Real => 7,
            Self::Double => 8,
            Self::Numeric => 2,
            Self::Decimal => 3,
            Self::Char => 1,
            Self::Varchar => 12,
            Self::Longvarchar => -1,
            Self::Clob => 2005,
            Self::Date => 91,
            Self::Time => 92,
            Self::Timestamp => 93,
            Self::Binary => -2,
            Self::Varbinary => -3,
            Self::Longvarbinary => -4,
            Self::Blob => 2004,
            Self::Boolean => 16,
            Self::Null => 0,
            Self::Other => 1111,
        }
    }

    /// Looks a type up by its integer code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Returns the SQL name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bit => "BIT",
            Self::Tinyint => "TINYINT",
            Self::Smallint => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Float => "FLOAT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Longvarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Longvarbinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::Null => "NULL",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the SQL type a category is reported as.
#[must_use]
pub const fn encode(category: FieldTypeCategory) -> SqlType {
    match category {
        FieldTypeCategory::String => SqlType::Varchar,
        FieldTypeCategory::Date => SqlType::Timestamp,
        FieldTypeCategory::Integer => SqlType::Bigint,
        FieldTypeCategory::Number => SqlType::Double,
        FieldTypeCategory::BigNumber => SqlType::Decimal,
        FieldTypeCategory::Boolean => SqlType::Boolean,
        FieldTypeCategory::Binary => SqlType::Blob,
        FieldTypeCategory::None => SqlType::Other,
    }
}

/// Returns the category a SQL type maps to.
#[must_use]
pub const fn decode(sql_type: SqlType) -> FieldTypeCategory {
    match sql_type {
        SqlType::Tinyint | SqlType::Smallint | SqlType::Integer | SqlType::Bigint => {
            FieldTypeCategory::Integer
        }
        SqlType::Float | SqlType::Real | SqlType::Double => FieldTypeCategory::Number,
        SqlType::Numeric | SqlType::Decimal => FieldTypeCategory::BigNumber,
        SqlType::Char | SqlType::Varchar | SqlType::Longvarchar | SqlType::Clob => {
            FieldTypeCategory::String
        }
        SqlType::Date | SqlType::Time | SqlType::Timestamp => FieldTypeCategory::Date,
        SqlType::Bit | SqlType::Boolean => FieldTypeCategory::Boolean,
        SqlType::Binary | SqlType::Varbinary | SqlType::Longvarbinary | SqlType::Blob => {
            FieldTypeCategory::Binary
        }
        SqlType::Null | SqlType::Other => FieldTypeCategory::None,
    }
}

/// Returns the category an integer SQL type code maps to.
///
/// # Errors
///
/// Returns `UnsupportedSqlType` for codes outside the mapped set.
pub fn decode_code(code: i32) -> Result<FieldTypeCategory> {
    SqlType::from_code(code)
        .map(decode)
        .ok_or(SqlParseError::UnsupportedSqlType(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_decode_is_identity() {
        for category in FieldTypeCategory::ALL {
            assert_eq!(decode(encode(category)), category, "{category}");
            assert_eq!(decode_code(encode(category).code()), Ok(category));
        }
    }

    #[test]
    fn test_decode_accepts_aliases() {
        assert_eq!(decode(SqlType::Smallint), FieldTypeCategory::Integer);
        assert_eq!(decode(SqlType::Bigint), FieldTypeCategory::Integer);
        assert_eq!(decode(SqlType::Float), FieldTypeCategory::Number);
        assert_eq!(decode(SqlType::Double), FieldTypeCategory::Number);
        assert_eq!(decode(SqlType::Clob), FieldTypeCategory::String);
        assert_eq!(decode(SqlType::Char), FieldTypeCategory::String);
        assert_eq!(decode(SqlType::Time), FieldTypeCategory::Date);
        assert_eq!(decode(SqlType::Binary), FieldTypeCategory::Binary);
        assert_eq!(decode(SqlType::Null), FieldTypeCategory::None);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        assert_eq!(
            decode_code(2000),
            Err(SqlParseError::UnsupportedSqlType(2000))
        );
    }

    #[test]
    fn test_codes_are_unique() {
        for a in SqlType::ALL {
            assert_eq!(SqlType::from_code(a.code()), Some(a), "{a}");
        }
    }
}
