//! SQL DDL export of a validated model.

use crate::model::{DiagramModel, Field, Table};

/// One `CREATE TABLE` statement per table, in model order.
pub fn to_sql(model: &DiagramModel) -> String {
    let mut output = String::new();
    for table in model.tables.values() {
        serialize_table(&mut output, table, model);
    }
    output
}

fn serialize_table(output: &mut String, table: &Table, model: &DiagramModel) {
    output.push_str(&format!("CREATE TABLE {} (\n", table.name));

    let mut lines: Vec<String> = table.fields.iter().map(column_definition).collect();

    // Foreign keys go after all columns. Only fields with a resolved
    // relationship get a constraint.
    for field in table.fields.iter().filter(|f| f.is_foreign_key) {
        let Some(rel) = model.relationships_for(&table.name, &field.name).next() else {
            continue;
        };
        let (other_table, other_field) = if rel.to_table == table.name {
            (&rel.from_table, &rel.from_field)
        } else {
            (&rel.to_table, &rel.to_field)
        };
        lines.push(format!(
            "  FOREIGN KEY ({}) REFERENCES {}({})",
            field.name, other_table, other_field
        ));
    }

    output.push_str(&lines.join(",\n"));
    output.push_str("\n);\n\n");
}

fn column_definition(field: &Field) -> String {
    let typ = field.declared_type();
    let mut line = format!("  {} {}", field.name, typ);

    if field.is_primary_key {
        line.push_str(" PRIMARY KEY");
        if typ.to_lowercase().contains("int") {
            line.push_str(" AUTO_INCREMENT");
        }
    }
    if !field.has_error && !field.is_nullable() {
        line.push_str(" NOT NULL");
    }
    line
}
