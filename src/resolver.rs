//! Cross-table validation of `[ref: ...]` annotations.
//!
//! Runs once every table has been parsed so forward references resolve. Each
//! reference site is handled on its own: a failure is attached to the
//! referencing field and the walk carries on. Type checks run only after
//! every site has been resolved, so a mismatch always has the last word.

use crate::annotation;
use crate::ast::{FieldLine, RefAnnotation, TableBlock};
use crate::model::{DiagramModel, Relationship};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Referenced table '{table}' does not exist")]
    TableMissing { table: String },
    #[error("Referenced field '{field}' does not exist in table '{table}'")]
    FieldMissing { table: String, field: String },
    #[error("Referenced field '{field}' is not a primary key")]
    NotPrimaryKey { field: String },
    #[error("Type mismatch: '{from_type}' cannot reference '{to_type}' in {table}.{field}")]
    TypeMismatch {
        from_type: String,
        to_type: String,
        table: String,
        field: String,
    },
}

/// A field line carrying a well-formed reference annotation.
struct Site<'a> {
    table: &'a str,
    line: &'a FieldLine,
    target: RefAnnotation,
}

/// Resolve every reference site in `blocks` against `model`, flagging fields
/// and appending relationships in source order, then type-check all sites.
pub fn resolve(model: &mut DiagramModel, blocks: &[TableBlock]) {
    let sites: Vec<Site<'_>> = blocks
        .iter()
        .flat_map(|block| {
            block.lines.iter().filter_map(move |line| {
                annotation::reference(&line.definition).map(|target| Site {
                    table: &block.name,
                    line,
                    target,
                })
            })
        })
        .collect();

    for site in &sites {
        resolve_site(model, site);
    }
    for site in &sites {
        check_types(model, site);
    }
}

fn resolve_site(model: &mut DiagramModel, site: &Site<'_>) {
    let outcome = link(model, site);

    let Some(field) = model
        .tables
        .get_mut(site.table)
        .and_then(|t| t.field_mut(&site.line.name))
    else {
        return;
    };
    field.is_foreign_key = true;

    match outcome {
        Ok(relationship) => model.relationships.push(relationship),
        Err(err) => {
            tracing::debug!(table = site.table, field = %site.line.name, %err, "unresolved reference");
            field.flag_error(err.to_string());
        }
    }
}

/// Existence and primary-key checks, first failure wins.
fn link(model: &DiagramModel, site: &Site<'_>) -> Result<Relationship, ReferenceError> {
    let target = &site.target;
    let table = model
        .table(&target.table)
        .ok_or_else(|| ReferenceError::TableMissing {
            table: target.table.clone(),
        })?;
    let field = table
        .field(&target.field)
        .ok_or_else(|| ReferenceError::FieldMissing {
            table: target.table.clone(),
            field: target.field.clone(),
        })?;
    if !field.is_primary_key {
        return Err(ReferenceError::NotPrimaryKey {
            field: target.field.clone(),
        });
    }

    Ok(Relationship {
        from_table: site.table.to_string(),
        from_field: site.line.name.clone(),
        to_table: target.table.clone(),
        to_field: target.field.clone(),
        direction: target.direction,
    })
}

/// Compare declared types with lookups of its own, independent of
/// `resolve_site`. A mismatch overwrites whatever message the field carries.
fn check_types(model: &mut DiagramModel, site: &Site<'_>) {
    let target = &site.target;
    let Some(to_type) = model
        .table(&target.table)
        .and_then(|t| t.field(&target.field))
        .map(|f| f.declared_type())
    else {
        return;
    };
    let from_type = annotation::strip(&site.line.definition);
    if from_type == to_type {
        return;
    }

    if let Some(field) = model
        .tables
        .get_mut(site.table)
        .and_then(|t| t.field_mut(&site.line.name))
    {
        let err = ReferenceError::TypeMismatch {
            from_type,
            to_type,
            table: target.table.clone(),
            field: target.field.clone(),
        };
        field.flag_error(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Direction;
    use crate::model::DiagramModel;

    fn field<'a>(model: &'a DiagramModel, table: &str, name: &str) -> &'a crate::model::Field {
        model.table(table).unwrap().field(name).unwrap()
    }

    #[test]
    fn test_forward_reference() {
        let input = r#"
            Table posts {
                id integer [pk]
                author_id integer [ref: > users.id]
            }
            Table users {
                id integer [pk]
            }
        "#;
        let model = DiagramModel::from_source(input);
        assert_eq!(model.relationships.len(), 1);
        assert!(!field(&model, "posts", "author_id").has_error);
    }

    #[test]
    fn test_missing_field() {
        let input = "Table users { id integer [pk] }\nTable posts { uid integer [ref: > users.uuid] }";
        let model = DiagramModel::from_source(input);
        let uid = field(&model, "posts", "uid");
        assert!(uid.is_foreign_key);
        assert_eq!(
            uid.error_message,
            "Referenced field 'uuid' does not exist in table 'users'"
        );
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn test_target_must_be_primary_key() {
        let input = "Table users { id integer [pk]\n email text }\nTable posts { mail text [ref: > users.email] }";
        let model = DiagramModel::from_source(input);
        let mail = field(&model, "posts", "mail");
        assert!(mail.has_error);
        assert_eq!(mail.error_message, "Referenced field 'email' is not a primary key");
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn test_type_mismatch_overwrites_earlier_error() {
        let input = "Table users { id integer [pk]\n email text }\nTable posts { mail integer [ref: > users.email] }";
        let model = DiagramModel::from_source(input);
        let mail = field(&model, "posts", "mail");
        assert!(mail.has_error);
        assert_eq!(
            mail.error_message,
            "Type mismatch: 'integer' cannot reference 'text' in users.email"
        );
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn test_malformed_reference_is_ignored() {
        let input = "Table users { id integer [pk] }\nTable posts { uid integer [ref: users.id] }";
        let model = DiagramModel::from_source(input);
        let uid = field(&model, "posts", "uid");
        assert!(!uid.is_foreign_key);
        assert!(!uid.has_error);
        assert!(model.relationships.is_empty());
    }

    #[test]
    fn test_one_bad_site_does_not_affect_siblings() {
        let input = r#"
            Table users { id integer [pk] }
            Table posts {
                id integer [pk]
                ghost_id integer [ref: > ghosts.id]
                user_id integer [ref: < users.id]
            }
        "#;
        let model = DiagramModel::from_source(input);
        assert!(field(&model, "posts", "ghost_id").has_error);
        assert!(!field(&model, "posts", "user_id").has_error);
        assert_eq!(model.relationships.len(), 1);
        assert_eq!(model.relationships[0].direction, Direction::OneToMany);
    }

    #[test]
    fn test_self_reference() {
        let input = "Table node { id integer [pk]\n parent_id integer [null] [ref: > node.id] }";
        let model = DiagramModel::from_source(input);
        assert_eq!(model.relationships.len(), 1);
        assert!(!field(&model, "node", "parent_id").has_error);
    }

    #[test]
    fn test_type_comparison_is_case_sensitive() {
        let input = "Table a { id INT [pk] }\nTable b { a_id int [ref: > a.id] }";
        let model = DiagramModel::from_source(input);
        assert_eq!(model.relationships.len(), 1);
        assert!(field(&model, "b", "a_id").has_error);
    }

    #[test]
    fn test_type_mismatch_survives_later_duplicate_field() {
        let input = "Table users { id text [pk] }\nTable posts { a integer [ref: > users.id]\n a integer [ref: > ghost.id] }";
        let model = DiagramModel::from_source(input);
        let a = field(&model, "posts", "a");
        assert!(a.has_error);
        assert_eq!(
            a.error_message,
            "Type mismatch: 'integer' cannot reference 'text' in users.id"
        );
        assert_eq!(model.relationships.len(), 1);
    }

    #[test]
    fn test_reference_from_replaced_table_is_skipped() {
        let input = "Table a { x int [ref: > b.id] }\nTable b { id int [pk] }\nTable a { y int }";
        let model = DiagramModel::from_source(input);
        assert!(model.relationships.is_empty());
        assert_eq!(model.errors().count(), 0);
        let y = field(&model, "a", "y");
        assert!(!y.is_foreign_key);
        assert!(!y.has_error);
    }
}
