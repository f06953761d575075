//! REPL command parsing.

use planner_core::{AircraftType, Node};

/// How the user names a node: by uid or by `#index` into the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Uid(String),
    Index(usize),
}

impl NodeRef {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("missing node".to_string());
        }
        match raw.strip_prefix('#') {
            Some(index) => index
                .parse()
                .map(NodeRef::Index)
                .map_err(|_| format!("bad node index '{}'", raw)),
            None => Ok(NodeRef::Uid(raw.to_string())),
        }
    }

    /// Resolve to a uid against the listed nodes.
    pub fn resolve(&self, nodes: &[Node]) -> Result<String, String> {
        match self {
            NodeRef::Uid(uid) => Ok(uid.clone()),
            NodeRef::Index(index) => nodes
                .get(*index)
                .map(|node| node.uid.clone())
                .ok_or_else(|| format!("no node #{} ({} loaded)", index, nodes.len())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Query nodes around the origin, optionally with a new radius/capacity.
    Nodes {
        radius: Option<f64>,
        capacity: Option<u32>,
    },
    /// Pick an aircraft type, or list them when none is given.
    Aircraft(Option<AircraftType>),
    Click(NodeRef),
    Route,
    Show,
    List,
    Edges,
    /// Ask the backend directly whether the active router exists.
    Probe,
    Quit,
}

pub const HELP: &str = "\
commands:
  nodes [radius] [capacity]   fetch nodes around the origin
  aircraft [xl|cargo|interstate]
                              list aircraft types or pick one
  click <uid|#index>          select source, then destination; a third click clears
  route                       route between the selected nodes
  show                        session summary
  list                        list loaded nodes
  edges                       list edges of the active aircraft
  probe                       ask the backend if the router is initialized
  help                        this text
  quit                        exit";

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "nodes" | "n" => Command::Nodes {
            radius: args
                .first()
                .map(|s| s.parse().map_err(|_| format!("bad radius '{}'", s)))
                .transpose()?,
            capacity: args
                .get(1)
                .map(|s| s.parse().map_err(|_| format!("bad capacity '{}'", s)))
                .transpose()?,
        },
        "aircraft" | "a" | "pick" => {
            Command::Aircraft(args.first().map(|s| s.parse()).transpose()?)
        }
        "click" | "c" => {
            let target = args.first().ok_or("click needs a node")?;
            Command::Click(NodeRef::parse(target)?)
        }
        "route" | "r" => Command::Route,
        "show" | "s" => Command::Show,
        "list" | "ls" => Command::List,
        "edges" => Command::Edges,
        "probe" => Command::Probe,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try help)", other)),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::Location;

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn parses_nodes_arguments() {
        assert_eq!(
            parse_command("nodes 800 20"),
            Ok(Some(Command::Nodes { radius: Some(800.0), capacity: Some(20) }))
        );
        assert_eq!(
            parse_command("nodes"),
            Ok(Some(Command::Nodes { radius: None, capacity: None }))
        );
        assert!(parse_command("nodes far").is_err());
    }

    #[test]
    fn parses_aircraft() {
        assert_eq!(
            parse_command("aircraft cargo"),
            Ok(Some(Command::Aircraft(Some(AircraftType::ArrowCargo))))
        );
        assert_eq!(parse_command("aircraft"), Ok(Some(Command::Aircraft(None))));
        assert!(parse_command("aircraft blimp").is_err());
    }

    #[test]
    fn parses_click_targets() {
        assert_eq!(
            parse_command("click #2"),
            Ok(Some(Command::Click(NodeRef::Index(2))))
        );
        assert_eq!(
            parse_command("c 5f0e"),
            Ok(Some(Command::Click(NodeRef::Uid("5f0e".to_string()))))
        );
        assert!(parse_command("click").is_err());
        assert!(parse_command("click #x").is_err());
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(parse_command("fly").is_err());
    }

    #[test]
    fn resolves_index_against_nodes() {
        let nodes = vec![
            Node::new("a", Location::new(0.0, 0.0, 0.0)),
            Node::new("b", Location::new(1.0, 1.0, 0.0)),
        ];
        assert_eq!(NodeRef::Index(1).resolve(&nodes), Ok("b".to_string()));
        assert!(NodeRef::Index(2).resolve(&nodes).is_err());
        assert_eq!(NodeRef::Uid("z".to_string()).resolve(&nodes), Ok("z".to_string()));
    }
}
