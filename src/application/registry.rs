//! Command registry - Validated commands keyed by name

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use super::errors::ValidationError;
use crate::domain::entities::{CommandDescriptor, CommandMetadata, LoadedModule, PluginModule};

/// What to do when two modules register the same command name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Last registered wins
    #[default]
    Replace,
    /// First registered wins, later ones are rejected
    KeepFirst,
}

/// Result of checking a module against the command shape
#[derive(Debug)]
pub enum Validation {
    Valid(CommandDescriptor),
    Invalid(ValidationError),
}

/// Check that `module` exposes `data.name` and `execute`
pub fn validate(source: &str, module: &PluginModule) -> Validation {
    let Some(data) = &module.data else {
        return Validation::Invalid(ValidationError::MissingMetadata);
    };
    let metadata = CommandMetadata::new(data.clone());
    let Some(name) = metadata.name().map(str::to_string) else {
        return Validation::Invalid(ValidationError::MissingName);
    };
    let Some(executor) = module.execute.clone() else {
        return Validation::Invalid(ValidationError::MissingExecutor);
    };

    Validation::Valid(CommandDescriptor {
        name,
        metadata,
        executor,
        source: source.to_string(),
    })
}

/// How a descriptor ended up in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registered {
    Inserted,
    /// Shadowed an earlier descriptor from this source
    Replaced(String),
}

/// Counts from one [`CommandRegistry::register_all`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterTally {
    /// New command names
    pub inserted: usize,
    /// Accepted, but shadowing an earlier module of the same name
    pub replaced: usize,
    /// Failed validation
    pub rejected: usize,
    /// Never loaded
    pub unloaded: usize,
}

/// Registry of validated commands.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
    index: HashMap<String, usize>,
    policy: DuplicatePolicy,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Validate and register a loaded module
    pub fn register(&mut self, source: &str, module: &PluginModule) -> Result<Registered, ValidationError> {
        match validate(source, module) {
            Validation::Valid(descriptor) => self.insert(descriptor),
            Validation::Invalid(e) => Err(e),
        }
    }

    /// Register an already validated descriptor
    pub fn insert(&mut self, descriptor: CommandDescriptor) -> Result<Registered, ValidationError> {
        match self.index.get(&descriptor.name) {
            Some(&slot) => match self.policy {
                DuplicatePolicy::Replace => {
                    let previous = std::mem::replace(&mut self.commands[slot], descriptor);
                    Ok(Registered::Replaced(previous.source))
                }
                DuplicatePolicy::KeepFirst => Err(ValidationError::Duplicate(descriptor.name)),
            },
            None => {
                self.index.insert(descriptor.name.clone(), self.commands.len());
                self.commands.push(descriptor);
                Ok(Registered::Inserted)
            }
        }
    }

    /// Register every successfully loaded module, reporting rejects.
    ///
    /// Load failures are only counted; the loader already reported them.
    pub fn register_all(&mut self, modules: &[LoadedModule], sink: &dyn DiagnosticSink) -> RegisterTally {
        let mut tally = RegisterTally::default();
        for loaded in modules {
            let Ok(module) = &loaded.result else {
                tally.unloaded += 1;
                continue;
            };
            let source = loaded.file_name();
            match self.register(&source, module) {
                Ok(Registered::Inserted) => {
                    tally.inserted += 1;
                    if let Some(command) = self.commands.last() {
                        tracing::info!(command = %command.name, %source, "Registered command");
                    }
                }
                Ok(Registered::Replaced(previous)) => {
                    tally.replaced += 1;
                    sink.report(Diagnostic::new(
                        DiagnosticKind::Validation,
                        source.clone(),
                        format!("Command shadows the one registered from \"{}\"", previous),
                    ));
                }
                Err(e) => {
                    tally.rejected += 1;
                    sink.report(Diagnostic::new(
                        DiagnosticKind::Validation,
                        source.clone(),
                        format!("Skipping command \"{}\": {}", source, e),
                    ));
                }
            }
        }
        tally
    }

    /// Metadata of every command, in registration order
    pub fn describe_all(&self) -> Vec<Value> {
        self.commands
            .iter()
            .map(|c| c.metadata.as_value().clone())
            .collect()
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.index.get(name).map(|&slot| &self.commands[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::diagnostics::MemorySink;
    use crate::application::errors::{BoxError, LoadError};
    use crate::domain::traits::executor_fn;
    use serde_json::json;
    use std::path::PathBuf;

    fn command(name: &str) -> PluginModule {
        PluginModule::new()
            .with_data(json!({ "name": name, "description": format!("{} command", name) }))
            .with_executor(executor_fn(|_ctx| async { Ok::<(), BoxError>(()) }))
    }

    fn loaded(file: &str, result: Result<PluginModule, LoadError>) -> LoadedModule {
        LoadedModule {
            name: file.trim_end_matches(".yaml").to_string(),
            path: PathBuf::from("commands").join(file),
            result,
        }
    }

    #[test]
    fn test_valid_commands_are_described_and_found() {
        let mut registry = CommandRegistry::new();
        for name in ["ping", "ban", "echo"] {
            assert_eq!(registry.register(name, &command(name)), Ok(Registered::Inserted));
        }

        let described = registry.describe_all();
        assert_eq!(described.len(), 3);
        assert_eq!(described[0]["name"], "ping");
        assert_eq!(described[2]["name"], "echo");

        for name in ["ping", "ban", "echo"] {
            assert_eq!(registry.lookup(name).map(|c| c.name.as_str()), Some(name));
        }
        assert!(registry.lookup("unknown").is_none());
    }

    #[test]
    fn test_invalid_modules_are_rejected() {
        let mut registry = CommandRegistry::new();

        let no_executor = PluginModule::new().with_data(json!({ "name": "ban" }));
        assert_eq!(
            registry.register("ban.yaml", &no_executor).unwrap_err(),
            ValidationError::MissingExecutor
        );

        let no_name = PluginModule::new()
            .with_data(json!({ "description": "nameless" }))
            .with_executor(executor_fn(|_ctx| async { Ok::<(), BoxError>(()) }));
        assert_eq!(
            registry.register("nameless.yaml", &no_name).unwrap_err(),
            ValidationError::MissingName
        );

        let no_data = PluginModule::new().with_executor(executor_fn(|_ctx| async { Ok::<(), BoxError>(()) }));
        assert_eq!(
            registry.register("bare.yaml", &no_data).unwrap_err(),
            ValidationError::MissingMetadata
        );

        assert!(registry.is_empty());
        assert!(registry.describe_all().is_empty());
    }

    #[test]
    fn test_duplicate_replace_keeps_position() {
        let mut registry = CommandRegistry::new();
        registry.register("ping.yaml", &command("ping")).unwrap();
        registry.register("ban.yaml", &command("ban")).unwrap();

        let replacement = PluginModule::new()
            .with_data(json!({ "name": "ping", "description": "newer" }))
            .with_executor(executor_fn(|_ctx| async { Ok::<(), BoxError>(()) }));
        assert_eq!(
            registry.register("ping2.yaml", &replacement),
            Ok(Registered::Replaced("ping.yaml".to_string()))
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["ping", "ban"]);
        assert_eq!(registry.lookup("ping").unwrap().source, "ping2.yaml");
        assert_eq!(registry.describe_all()[0]["description"], "newer");
    }

    #[test]
    fn test_register_all_counts_shadowed_commands_once() {
        let sink = MemorySink::new();
        let modules = vec![
            loaded("ping.yaml", Ok(command("ping"))),
            loaded("ping2.yaml", Ok(command("ping"))),
        ];

        let mut registry = CommandRegistry::new();
        let tally = registry.register_all(&modules, &sink);

        assert_eq!(tally.inserted, registry.describe_all().len());
        assert_eq!(tally.replaced, 1);
        assert_eq!(tally.rejected, 0);
        assert_eq!(sink.count(DiagnosticKind::Validation), 1);
    }

    #[test]
    fn test_duplicate_keep_first_rejects() {
        let mut registry = CommandRegistry::with_policy(DuplicatePolicy::KeepFirst);
        registry.register("ping.yaml", &command("ping")).unwrap();

        assert_eq!(
            registry.register("ping2.yaml", &command("ping")),
            Err(ValidationError::Duplicate("ping".to_string()))
        );
        assert_eq!(registry.lookup("ping").unwrap().source, "ping.yaml");
    }

    #[test]
    fn test_register_all_reports_rejects_only() {
        let sink = MemorySink::new();
        let modules = vec![
            loaded("ping.yaml", Ok(command("ping"))),
            loaded("ban.yaml", Ok(command("ban"))),
            loaded("broken.yaml", Err(LoadError::Parse("bad".to_string()))),
            loaded("half.yaml", Ok(PluginModule::new().with_data(json!({ "name": "half" })))),
        ];

        let mut registry = CommandRegistry::new();
        let tally = registry.register_all(&modules, &sink);
        assert_eq!(
            tally,
            RegisterTally {
                inserted: 2,
                replaced: 0,
                rejected: 1,
                unloaded: 1
            }
        );
        assert_eq!(registry.names(), vec!["ping", "ban"]);

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::Validation);
        assert_eq!(entries[0].unit, "half.yaml");
    }
}
