use std::collections::{HashMap, HashSet};

use log::trace;
use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use petgraph::Graph;

use crate::descriptor::{File, Message};
use crate::{Error, Result};

/// Visits every message reachable from the services of `file`.
///
/// Methods are visited in declaration order, input before output, and each message is
/// followed transitively through its message typed fields. A message is visited once, the
/// first time it is reached, identified by its type name. Every field on the way is checked
/// for consistency, and methods whose messages cannot be resolved are reported as malformed.
pub fn visit_messages(
    file: &dyn File,
    visitor: &mut dyn FnMut(&dyn Message) -> Result<()>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for i in 0..file.service_count() {
        let service = file.service(i);
        for j in 0..service.method_count() {
            let method = service.method(j);
            let input = method.input_message().ok_or_else(|| {
                Error::malformed(format!(
                    "input type {} of {}.{} is not resolvable",
                    method.input_type_name(),
                    service.name(),
                    method.name()
                ))
            })?;
            visit_message(&*input, &mut seen, visitor)?;

            let output = method.output_message().ok_or_else(|| {
                Error::malformed(format!(
                    "output type {} of {}.{} is not resolvable",
                    method.output_type_name(),
                    service.name(),
                    method.name()
                ))
            })?;
            visit_message(&*output, &mut seen, visitor)?;
        }
    }
    Ok(())
}

fn visit_message(
    message: &dyn Message,
    seen: &mut HashSet<String>,
    visitor: &mut dyn FnMut(&dyn Message) -> Result<()>,
) -> Result<()> {
    if !seen.insert(message.type_name()) {
        return Ok(());
    }
    visitor(message)?;

    for i in 0..message.field_count() {
        let field = message.field(i);
        field.check()?;
        let field_message = field.message_type();
        if let Some(field_message) = field_message {
            visit_message(&*field_message, seen, visitor)?;
        }
    }
    Ok(())
}

/// `MessageGraph` builds a graph of the messages reachable from a file's services, whose
/// edges correspond to message typed fields. The goal is to recognize when message types are
/// recursively nested, so that generated exercise code does not recurse forever.
pub struct MessageGraph {
    index: HashMap<String, NodeIndex>,
    graph: Graph<String, ()>,
}

impl MessageGraph {
    pub fn new(file: &dyn File) -> Result<MessageGraph> {
        let mut msg_graph = MessageGraph {
            index: HashMap::new(),
            graph: Graph::new(),
        };

        visit_messages(file, &mut |message| {
            msg_graph.add_message(message);
            Ok(())
        })?;

        Ok(msg_graph)
    }

    fn get_or_insert_index(&mut self, msg_name: String) -> NodeIndex {
        let MessageGraph {
            ref mut index,
            ref mut graph,
            ..
        } = *self;
        *index
            .entry(msg_name.clone())
            .or_insert_with(|| graph.add_node(msg_name))
    }

    fn add_message(&mut self, message: &dyn Message) {
        let msg_name = message.type_name();
        trace!("message graph: {}", msg_name);
        let msg_index = self.get_or_insert_index(msg_name);

        for i in 0..message.field_count() {
            let field = message.field(i);
            if let Some(field_message) = field.message_type() {
                let field_index = self.get_or_insert_index(field_message.type_name());
                self.graph.add_edge(msg_index, field_index, ());
            };
        }
    }

    /// Returns true if message type `inner` is nested in message type `outer`, i.e. a value
    /// of `outer` can transitively contain a value of `inner`.
    pub fn is_nested(&self, outer: &str, inner: &str) -> bool {
        let outer = match self.index.get(outer) {
            Some(outer) => *outer,
            None => return false,
        };
        let inner = match self.index.get(inner) {
            Some(inner) => *inner,
            None => return false,
        };

        has_path_connecting(&self.graph, outer, inner, None)
    }
}
