use indexmap::IndexMap;
use serde::Serialize;

use crate::annotation;
use crate::ast::{Direction, FieldLine};
use crate::parser::Parser;
use crate::resolver;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub raw_definition: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub has_error: bool,
    pub error_message: String,
    pub note: Option<String>,
}

impl Field {
    pub fn from_line(line: &FieldLine) -> Self {
        Self {
            name: line.name.clone(),
            raw_definition: line.definition.clone(),
            is_primary_key: annotation::is_primary_key(&line.definition),
            is_foreign_key: false,
            has_error: false,
            error_message: String::new(),
            note: annotation::note(&line.definition),
        }
    }

    pub fn declared_type(&self) -> String {
        annotation::strip(&self.raw_definition)
    }

    pub fn is_nullable(&self) -> bool {
        annotation::is_nullable(&self.raw_definition)
    }

    pub(crate) fn flag_error(&mut self, message: impl Into<String>) {
        self.has_error = true;
        self.error_message = message.into();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub fields: Vec<Field>,
}

impl Table {
    /// First field with this name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
    pub direction: Direction,
}

impl Relationship {
    pub fn touches(&self, table: &str, field: &str) -> bool {
        (self.from_table == table && self.from_field == field)
            || (self.to_table == table && self.to_field == field)
    }
}

/// The parsed and validated schema. Built from scratch on every parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramModel {
    pub tables: IndexMap<String, Table>,
    pub relationships: Vec<Relationship>,
}

impl DiagramModel {
    /// Parse and validate `source`. Never fails: problems are attached to the
    /// offending fields.
    pub fn from_source(source: &str) -> Self {
        let blocks = Parser::new(source).parse();

        let mut tables: IndexMap<String, Table> = IndexMap::new();
        for block in &blocks {
            let fields = block.lines.iter().map(Field::from_line).collect();
            // A repeated table name replaces the fields but keeps the slot.
            tables.insert(
                block.name.clone(),
                Table {
                    name: block.name.clone(),
                    fields,
                },
            );
        }

        let mut model = DiagramModel {
            tables,
            relationships: Vec::new(),
        };
        resolver::resolve(&mut model, &blocks);

        tracing::debug!(
            tables = model.tables.len(),
            relationships = model.relationships.len(),
            errors = model.errors().count(),
            "parsed schema"
        );
        model
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Every relationship touching `table.field` from either end.
    pub fn relationships_for<'a>(
        &'a self,
        table: &'a str,
        field: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.touches(table, field))
    }

    /// `(table, field)` pairs for every field in error, in model order.
    pub fn errors(&self) -> impl Iterator<Item = (&Table, &Field)> {
        self.tables
            .values()
            .flat_map(|t| t.fields.iter().map(move |f| (t, f)))
            .filter(|(_, f)| f.has_error)
    }
}
