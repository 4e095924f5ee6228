//! Resolves extension calls before compilation.

use crate::error::CompileError;
use crate::extensions::ExtensionRegistry;
use log::{debug, info};
use mapstyle_expr::FunctionNamespace;
use mapstyle_parser::{Definition, ValueNode};
use std::time::Duration;
use tokio::task::JoinSet;

/// A declaration value that is a single call to a registered extension.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtensionCall {
    pub name: String,
    pub args: Vec<ValueNode>,
}

/// Finds every extension call site, in definition order.
pub(crate) fn discover_calls(defs: &[Definition], registry: &ExtensionRegistry) -> Vec<ExtensionCall> {
    if registry.is_empty() {
        return Vec::new();
    }
    defs.iter()
        .flat_map(|def| def.rules.iter())
        .filter_map(|rule| rule.value.as_call())
        .filter(|(name, _)| registry.contains(name))
        .map(|(name, args)| ExtensionCall {
            name: name.to_string(),
            args: args.to_vec(),
        })
        .collect()
}

/// Runs every discovered call concurrently and waits for all of them to
/// publish into `namespace`. Returns immediately when there is nothing to
/// resolve. Calls for the same name race and the last to finish wins.
pub(crate) async fn resolve_extensions(
    calls: Vec<ExtensionCall>,
    registry: &ExtensionRegistry,
    namespace: &FunctionNamespace,
    timeout: Option<Duration>,
) -> Result<(), CompileError> {
    if calls.is_empty() {
        return Ok(());
    }
    info!("Resolving {} extension call(s)", calls.len());

    let mut tasks = JoinSet::new();
    for call in calls {
        let Some(extension) = registry.get(&call.name) else {
            continue;
        };
        let pending = extension.prepare(call.args);
        let namespace = namespace.clone();
        let name = call.name;
        tasks.spawn(async move {
            let function = pending.await;
            debug!("Extension '{}' resolved", name);
            namespace.insert(name, function);
        });
    }

    let barrier = async {
        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| CompileError::Extension(e.to_string()))?;
        }
        Ok::<(), CompileError>(())
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, barrier)
            .await
            .map_err(|_| CompileError::ExtensionTimeout(limit))?,
        None => barrier.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstyle_expr::ExtensionFunction;
    use mapstyle_parser::{flatten, parse_stylesheet};
    use mapstyle_types::StyleValue;

    fn registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register("testing", |_args: Vec<ValueNode>| async {
            ExtensionFunction::new(|args| args.first().cloned().unwrap_or_default())
        });
        registry
    }

    #[test]
    fn test_discovers_only_registered_calls() {
        let sheet = parse_stylesheet(
            "#a { marker-width: testing([prop]); line-color: rgb(1, 2, 3); [zoom = 3] { marker-fill: testing(2); } }",
        )
        .unwrap();
        let calls = discover_calls(&flatten(&sheet), &registry());
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.name == "testing"));
        assert_eq!(calls[1].args, vec![ValueNode::Number(2.0)]);
    }

    #[tokio::test]
    async fn test_resolves_into_namespace() {
        let registry = registry();
        let namespace = FunctionNamespace::new();
        let calls = vec![ExtensionCall {
            name: "testing".into(),
            args: vec![],
        }];
        resolve_extensions(calls, &registry, &namespace, None).await.unwrap();
        let function = namespace.get("testing").unwrap();
        assert_eq!(function.call(&[StyleValue::Number(4.0)]), StyleValue::Number(4.0));
    }

    #[tokio::test]
    async fn test_no_calls_is_immediate() {
        let namespace = FunctionNamespace::new();
        resolve_extensions(Vec::new(), &registry(), &namespace, None).await.unwrap();
        assert!(namespace.is_empty());
    }
}
