//! Column type definitions as the catalog spells them.
//!
//! A definition such as `struct<id:int,info:struct<name:string>>` is parsed
//! into a [`ColumnType`] tree, and dotted identifiers (`user.info.name`) are
//! resolved against that tree down to a queryable [`PrimitiveKind`].
//!
//! Only struct fields can be traversed. Maps and arrays may appear in a
//! definition but nothing inside them can be addressed.

use std::fmt;

use common::model::ColumnDescriptor;

use crate::error::{CompileError, CompileResult};

/// Scalar types that deletion queries know how to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Char,
    String,
    Varchar,
    Bigint,
    Int,
    Smallint,
    Tinyint,
    Double,
    Float,
}

impl PrimitiveKind {
    fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "char" => PrimitiveKind::Char,
            "string" => PrimitiveKind::String,
            "varchar" => PrimitiveKind::Varchar,
            "bigint" => PrimitiveKind::Bigint,
            "int" | "integer" => PrimitiveKind::Int,
            "smallint" => PrimitiveKind::Smallint,
            "tinyint" => PrimitiveKind::Tinyint,
            "double" => PrimitiveKind::Double,
            "float" => PrimitiveKind::Float,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "string",
            PrimitiveKind::Varchar => "varchar",
            PrimitiveKind::Bigint => "bigint",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Smallint => "smallint",
            PrimitiveKind::Tinyint => "tinyint",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Float => "float",
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char | PrimitiveKind::String | PrimitiveKind::Varchar
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Bigint
                | PrimitiveKind::Int
                | PrimitiveKind::Smallint
                | PrimitiveKind::Tinyint
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub data_type: ColumnType,
}

/// Parsed column type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Primitive(PrimitiveKind),
    /// A scalar the compiler cannot match on, e.g. `decimal(10,2)` or `boolean`
    Unsupported(String),
    Struct(Vec<StructField>),
    Map {
        key: Box<ColumnType>,
        value: Box<ColumnType>,
    },
    Array(Box<ColumnType>),
}

impl ColumnType {
    /// Parse a raw catalog type definition.
    ///
    /// Fails with [`CompileError::InvalidSchema`] on unbalanced brackets or
    /// malformed struct/map bodies.
    pub fn parse(definition: &str) -> CompileResult<Self> {
        parse_type(definition).ok_or_else(|| CompileError::InvalidSchema {
            definition: definition.to_string(),
        })
    }
}

fn parse_type(definition: &str) -> Option<ColumnType> {
    let definition = definition.trim();

    if let Some(body) = generic_body(definition, "struct")? {
        let mut fields = Vec::new();
        for field in split_top_level(body)? {
            let (name, data_type) = field.split_once(':')?;
            let name = name.trim();
            if name.is_empty() || name.contains(['<', '>', '(', ')']) {
                return None;
            }
            fields.push(StructField {
                name: name.to_string(),
                data_type: parse_type(data_type)?,
            });
        }
        return Some(ColumnType::Struct(fields));
    }

    if let Some(body) = generic_body(definition, "map")? {
        let parts = split_top_level(body)?;
        let [key, value] = parts.as_slice() else {
            return None;
        };
        return Some(ColumnType::Map {
            key: Box::new(parse_type(key)?),
            value: Box::new(parse_type(value)?),
        });
    }

    if let Some(body) = generic_body(definition, "array")? {
        return Some(ColumnType::Array(Box::new(parse_type(body)?)));
    }

    parse_scalar(definition)
}

/// Returns the text between `keyword<` and the matching final `>`.
///
/// `Some(None)` means the definition is not of this generic type at all;
/// `None` means it starts like one but is malformed.
fn generic_body<'a>(definition: &'a str, keyword: &str) -> Option<Option<&'a str>> {
    let Some(head) = definition.get(..keyword.len()) else {
        return Some(None);
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return Some(None);
    }
    let Some(rest) = definition[keyword.len()..].trim_start().strip_prefix('<') else {
        return Some(None);
    };
    let body = rest.strip_suffix('>')?;

    // The opening bracket must close exactly at the end of the definition.
    let mut depth = 0usize;
    for c in body.chars() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    if depth != 0 || body.trim().is_empty() {
        return None;
    }
    Some(Some(body))
}

/// Split on commas that are not nested inside `<>` or `()`.
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in body.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    if parts.iter().any(|part| part.trim().is_empty()) {
        return None;
    }
    Some(parts)
}

fn parse_scalar(definition: &str) -> Option<ColumnType> {
    // Parameterized scalars such as varchar(255) or decimal(10,2)
    let name = match definition.split_once('(') {
        Some((name, params)) => {
            let params = params.strip_suffix(')')?;
            if params.contains(['(', ')', '<', '>', ':']) {
                return None;
            }
            name.trim()
        }
        None => definition,
    };

    let is_identifier = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ');
    if !is_identifier {
        return None;
    }

    let name = name.to_ascii_lowercase();
    Some(match PrimitiveKind::from_name(&name) {
        Some(kind) => ColumnType::Primitive(kind),
        None => ColumnType::Unsupported(name),
    })
}

/// Resolve a dotted identifier against a column list to its primitive kind.
///
/// The first segment names a column; the rest walk through struct fields.
pub fn resolve(columns: &[ColumnDescriptor], dotted_id: &str) -> CompileResult<PrimitiveKind> {
    let mut segments = dotted_id.split('.');
    let column_name = segments.next().unwrap_or_default();

    let column = columns
        .iter()
        .find(|column| column.name == column_name)
        .ok_or_else(|| CompileError::UnknownColumn {
            column: dotted_id.to_string(),
        })?;

    let root = ColumnType::parse(&column.data_type)?;
    let unsupported = || CompileError::UnsupportedType {
        path: dotted_id.to_string(),
    };

    let mut node = &root;
    let mut path = column_name.to_string();
    for segment in segments {
        node = match node {
            ColumnType::Struct(fields) => fields
                .iter()
                .find(|field| field.name == segment)
                .map(|field| &field.data_type)
                .ok_or_else(|| CompileError::UnknownField {
                    path: path.clone(),
                    field: segment.to_string(),
                })?,
            ColumnType::Map { .. } | ColumnType::Array(_) => return Err(unsupported()),
            ColumnType::Primitive(_) | ColumnType::Unsupported(_) => {
                return Err(CompileError::UnknownField {
                    path: path.clone(),
                    field: segment.to_string(),
                });
            }
        };
        path.push('.');
        path.push_str(segment);
    }

    match node {
        ColumnType::Primitive(kind) => Ok(*kind),
        _ => Err(unsupported()),
    }
}
