// SPDX-License-Identifier: MIT OR Apache-2.0
//! Console commands.
//!
//! Interaction commands stand in for what a user would do on a rendered
//! diagram. Each one runs against the engine as a single transaction.

use crate::error::AppError;
use diagram_bridge_graph::{
    DataRef, DiagramEngine, EngineError, Fields, GraphModelEngine, Key, LinkData, ModelConfig,
    NodeData,
};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;

/// Link key property used when the document configures none
const DEFAULT_LINK_KEY: &str = "key";

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a node
    Add {
        /// Node key
        key: Key,
        /// Extra fields
        fields: Fields,
    },
    /// Remove a node and its links
    Remove {
        /// Node key
        key: Key,
    },
    /// Draw a link
    Link {
        /// Source key
        from: Key,
        /// Target key
        to: Key,
        /// Link key, for keyed links
        key: Option<String>,
    },
    /// Delete a link
    Unlink {
        /// Source key
        from: Key,
        /// Target key
        to: Key,
        /// Link key, for keyed links
        key: Option<String>,
    },
    /// Move a node into a group, or out of any group
    Group {
        /// Node key
        key: Key,
        /// Group key, `None` to ungroup
        group: Option<Key>,
    },
    /// Set one field of a node
    Set {
        /// Node key
        key: Key,
        /// Field name
        field: String,
        /// New value
        value: Value,
    },
    /// Duplicate a node
    Copy {
        /// Node key
        key: Key,
    },
    /// Print the engine and declarative models
    Show,
    /// Save the declarative model
    Save {
        /// Target path, the loaded document if omitted
        path: Option<PathBuf>,
    },
    /// Exit
    Quit,
}

impl Command {
    /// Transaction name for interaction commands
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "Add Node",
            Command::Remove { .. } => "Delete Node",
            Command::Link { .. } => "Link",
            Command::Unlink { .. } => "Unlink",
            Command::Group { .. } => "Group",
            Command::Set { .. } => "Set Property",
            Command::Copy { .. } => "Paste",
            Command::Show => "Show",
            Command::Save { .. } => "Save",
            Command::Quit => "Quit",
        }
    }

    /// Perform an interaction command on the engine
    pub fn apply(&self, engine: &mut GraphModelEngine, config: &ModelConfig) -> Result<(), EngineError> {
        match self {
            Command::Add { key, fields } => {
                let mut node = NodeData::new(key.clone());
                node.fields = fields.clone();
                engine.add_node_data(node);
            }
            Command::Remove { key } => {
                engine
                    .remove_node_data(key)
                    .ok_or_else(|| EngineError::NodeNotFound(key.clone()))?;
            }
            Command::Link { from, to, key } => {
                for endpoint in [from, to] {
                    if engine.find_node_data(endpoint).is_none() {
                        return Err(EngineError::NodeNotFound(endpoint.clone()));
                    }
                }
                engine.add_link_data(link_record(from, to, key.as_deref(), config));
            }
            Command::Unlink { from, to, key } => {
                engine
                    .remove_link_data(&link_record(from, to, key.as_deref(), config))
                    .ok_or_else(|| EngineError::LinkNotFound {
                        from: from.clone(),
                        to: to.clone(),
                    })?;
            }
            Command::Group { key, group } => engine.set_node_group(key, group.as_deref())?,
            Command::Set { key, field, value } => {
                engine.set_data_property(&DataRef::Node(key.clone()), field, value.clone())?;
            }
            Command::Copy { key } => {
                let copy = engine.copy_node(key)?;
                tracing::info!(%key, %copy, "node copied");
            }
            Command::Show | Command::Save { .. } | Command::Quit => {}
        }
        Ok(())
    }
}

fn link_record(from: &str, to: &str, key: Option<&str>, config: &ModelConfig) -> LinkData {
    let link = LinkData::new(from, to);
    match key {
        Some(key) => {
            let property = config
                .link_key_property
                .as_deref()
                .unwrap_or(DEFAULT_LINK_KEY);
            link.with_field(property, link_key_value(key))
        }
        None => link,
    }
}

/// Numeric keys typed on the console stay numbers
fn link_key_value(key: &str) -> Value {
    match serde_json::from_str::<Value>(key) {
        Ok(number @ Value::Number(_)) => number,
        _ => Value::String(key.to_string()),
    }
}

/// Split off the first whitespace-separated word
fn next_word(input: &str) -> (Option<&str>, &str) {
    let input = input.trim_start();
    if input.is_empty() {
        return (None, input);
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (Some(word), rest.trim_start()),
        None => (Some(input), ""),
    }
}

fn required<'a>(word: Option<&'a str>, what: &str, usage: &str) -> Result<&'a str, AppError> {
    word.ok_or_else(|| AppError::Parse(format!("missing {what}, usage: {usage}")))
}

fn no_more(rest: &str, usage: &str) -> Result<(), AppError> {
    if rest.trim().is_empty() {
        Ok(())
    } else {
        Err(AppError::Parse(format!("unexpected `{}`, usage: {usage}", rest.trim())))
    }
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = next_word(line);
        let Some(verb) = verb else {
            return Err(AppError::Parse("empty command".to_string()));
        };

        let command = match verb {
            "add" => {
                const USAGE: &str = "add <key> [json-fields]";
                let (key, rest) = next_word(rest);
                let key = required(key, "key", USAGE)?.to_string();
                let fields = if rest.trim().is_empty() {
                    Fields::new()
                } else {
                    serde_json::from_str(rest)?
                };
                Command::Add { key, fields }
            }
            "remove" => {
                const USAGE: &str = "remove <key>";
                let (key, rest) = next_word(rest);
                let key = required(key, "key", USAGE)?.to_string();
                no_more(rest, USAGE)?;
                Command::Remove { key }
            }
            "link" | "unlink" => {
                const USAGE: &str = "link|unlink <from> <to> [key]";
                let (from, rest) = next_word(rest);
                let from = required(from, "source", USAGE)?.to_string();
                let (to, rest) = next_word(rest);
                let to = required(to, "target", USAGE)?.to_string();
                let (key, rest) = next_word(rest);
                let key = key.map(str::to_string);
                no_more(rest, USAGE)?;
                if verb == "link" {
                    Command::Link { from, to, key }
                } else {
                    Command::Unlink { from, to, key }
                }
            }
            "group" => {
                const USAGE: &str = "group <key> <group|->";
                let (key, rest) = next_word(rest);
                let key = required(key, "key", USAGE)?.to_string();
                let (group, rest) = next_word(rest);
                let group = required(group, "group", USAGE)?;
                no_more(rest, USAGE)?;
                let group = (group != "-").then(|| group.to_string());
                Command::Group { key, group }
            }
            "set" => {
                const USAGE: &str = "set <key> <field> <json>";
                let (key, rest) = next_word(rest);
                let key = required(key, "key", USAGE)?.to_string();
                let (field, rest) = next_word(rest);
                let field = required(field, "field", USAGE)?.to_string();
                if rest.trim().is_empty() {
                    return Err(AppError::Parse(format!("missing value, usage: {USAGE}")));
                }
                let value = serde_json::from_str(rest)?;
                Command::Set { key, field, value }
            }
            "copy" => {
                const USAGE: &str = "copy <key>";
                let (key, rest) = next_word(rest);
                let key = required(key, "key", USAGE)?.to_string();
                no_more(rest, USAGE)?;
                Command::Copy { key }
            }
            "show" => {
                no_more(rest, "show")?;
                Command::Show
            }
            "save" => {
                let (path, rest) = next_word(rest);
                no_more(rest, "save [path]")?;
                Command::Save {
                    path: path.map(PathBuf::from),
                }
            }
            "quit" | "exit" => Command::Quit,
            other => return Err(AppError::Parse(format!("unknown command `{other}`"))),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_bridge_graph::DiagramModel;
    use serde_json::json;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            parse("add Zeta"),
            Command::Add {
                key: "Zeta".into(),
                fields: Fields::new(),
            }
        );
        let Command::Add { fields, .. } = parse(r#"add Zeta {"color": "red", "size": 2}"#) else {
            panic!("expected add");
        };
        assert_eq!(fields.get("color"), Some(&json!("red")));
        assert_eq!(fields.get("size"), Some(&json!(2)));
    }

    #[test]
    fn test_parse_links_and_groups() {
        assert_eq!(
            parse("link Alpha Beta"),
            Command::Link {
                from: "Alpha".into(),
                to: "Beta".into(),
                key: None,
            }
        );
        assert_eq!(
            parse("unlink  Alpha   Beta l2"),
            Command::Unlink {
                from: "Alpha".into(),
                to: "Beta".into(),
                key: Some("l2".into()),
            }
        );
        assert_eq!(
            parse("group Beta -"),
            Command::Group {
                key: "Beta".into(),
                group: None,
            }
        );
        assert_eq!(
            parse("set Alpha loc \"10 20\""),
            Command::Set {
                key: "Alpha".into(),
                field: "loc".into(),
                value: json!("10 20"),
            }
        );
        assert_eq!(parse("save out.ron"), Command::Save { path: Some("out.ron".into()) });
        assert_eq!(parse("  show "), Command::Show);
    }

    #[test]
    fn test_parse_errors() {
        for line in ["", "fly Alpha", "remove", "remove a b", "link a", "set a color"] {
            assert!(
                matches!(line.parse::<Command>(), Err(AppError::Parse(_))),
                "{line:?} should not parse"
            );
        }
        assert!(matches!(
            "add a {not json".parse::<Command>(),
            Err(AppError::Json(_))
        ));
    }

    #[test]
    fn test_numeric_link_keys() {
        let mut engine = GraphModelEngine::new("test");
        let config = ModelConfig::default().with_link_key_property("key");
        engine.load_model(
            DiagramModel::new(
                vec![NodeData::new("a"), NodeData::new("b")],
                vec![
                    LinkData::new("a", "b").with_field("key", -1),
                    LinkData::new("a", "b").with_field("key", "x"),
                ],
            ),
            config.clone(),
            Default::default(),
        );

        parse("unlink a b -1").apply(&mut engine, &config).unwrap();
        assert_eq!(engine.link_data().len(), 1);
        assert_eq!(engine.link_data()[0].get_str("key"), Some("x"));

        parse("link a b 7").apply(&mut engine, &config).unwrap();
        assert_eq!(engine.link_data()[1].get("key"), Some(&json!(7)));
    }

    #[test]
    fn test_apply_to_engine() {
        let mut engine = GraphModelEngine::new("test");
        let config = ModelConfig::default();
        engine.load_model(
            DiagramModel::new(vec![NodeData::new("a"), NodeData::new("b")], vec![]),
            config.clone(),
            Default::default(),
        );

        parse("link a b").apply(&mut engine, &config).unwrap();
        assert_eq!(engine.link_data().len(), 1);

        assert!(matches!(
            parse("link a ghost").apply(&mut engine, &config),
            Err(EngineError::NodeNotFound(_))
        ));
        assert!(matches!(
            parse("unlink b a").apply(&mut engine, &config),
            Err(EngineError::LinkNotFound { .. })
        ));

        parse("group b a").apply(&mut engine, &config).unwrap();
        assert_eq!(engine.find_node_data("b").unwrap().get_str("group"), Some("a"));

        parse("remove a").apply(&mut engine, &config).unwrap();
        assert!(engine.link_data().is_empty());
        assert_eq!(engine.node_data().len(), 1);
    }
}
