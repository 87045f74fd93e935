//! Commit operation planning.
//!
//! A commit's operations may reference other model instances through
//! nested sub-models. Before any row is written, the engine expands the
//! operation list (nested sub-models that are not part of the commit
//! become implicit inserts) and orders it so that every referenced
//! instance is committed before the instances referencing it.

use revtab_model::{Model, Value};

use crate::commit::{IndexCommit, Operation, OperationKind};
use crate::error::{EngineError, EngineResult};

/// One schedulable unit of a commit: an operation kind applied to a model.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlannedOp<'a> {
    /// The operation kind.
    pub kind: OperationKind,
    /// The model the operation applies to.
    pub model: &'a Model,
}

/// Expands and topologically orders a commit's operations.
///
/// # Errors
///
/// Returns [`EngineError::DependencyCycle`] if the reference graph cannot
/// be linearized.
pub(crate) fn plan(commit: &IndexCommit) -> EngineResult<Vec<PlannedOp<'_>>> {
    let mut nodes: Vec<PlannedOp<'_>> = Vec::new();
    let mut keys: Vec<(String, String)> = Vec::new();

    for operation in commit.operations() {
        nodes.push(PlannedOp {
            kind: operation.kind(),
            model: operation.model(),
        });
        keys.push(key_of(operation.model()));
    }

    // Hoist nested sub-models that are not part of the commit into
    // implicit inserts, depth-first.
    let mut cursor = 0;
    while cursor < nodes.len() {
        let model = nodes[cursor].model;
        for sub in sub_models(model) {
            let key = key_of(sub);
            if !keys.contains(&key) {
                nodes.push(PlannedOp {
                    kind: OperationKind::Insert,
                    model: sub,
                });
                keys.push(key);
            }
        }
        cursor += 1;
    }

    // Edges run from a referenced instance to every node referencing it.
    // A model nesting an instance of its own type and identity produces a
    // self-edge, reported as a cycle.
    let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        for sub in sub_models(node.model) {
            let key = key_of(sub);
            for (other, other_key) in keys.iter().enumerate() {
                if *other_key == key {
                    dependencies[index].push(other);
                }
            }
        }
    }

    // Kahn's algorithm, lowest-index-first for a stable order.
    let mut scheduled = vec![false; nodes.len()];
    let mut order: Vec<usize> = Vec::with_capacity(nodes.len());

    while order.len() < nodes.len() {
        let ready = (0..nodes.len()).find(|&i| {
            !scheduled[i] && dependencies[i].iter().all(|&dep| scheduled[dep])
        });

        match ready {
            Some(index) => {
                scheduled[index] = true;
                order.push(index);
            }
            None => return Err(EngineError::dependency_cycle(commit.id())),
        }
    }

    Ok(order.into_iter().map(|i| nodes[i]).collect())
}

/// Returns the direct sub-models of a model instance.
fn sub_models(model: &Model) -> Vec<&Model> {
    let mut subs = Vec::new();
    for entry in model.entries() {
        collect_sub_models(entry.value(), &mut subs);
    }
    subs
}

fn collect_sub_models<'a>(value: &'a Value, out: &mut Vec<&'a Model>) {
    match value {
        Value::Model(sub) => out.push(sub),
        Value::List(elements) => {
            for element in elements {
                collect_sub_models(element, out);
            }
        }
        Value::Map(pairs) => {
            for (_, nested) in pairs {
                collect_sub_models(nested, out);
            }
        }
        _ => {}
    }
}

/// Keys a model by type name and identity value for dependency matching.
fn key_of(model: &Model) -> (String, String) {
    let identity = model
        .identity()
        .map(|(_, value)| format!("{value:?}"))
        .unwrap_or_default();
    (model.type_name().to_string(), identity)
}
