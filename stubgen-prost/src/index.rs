use std::collections::HashMap;

use log::trace;
use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};

use stubgen::descriptor::dotted_to_colons;

/// A message type, as the C++ generated code names it.
#[derive(Debug)]
pub struct MessageEntry<'a> {
    pub descriptor: &'a DescriptorProto,
    /// The C++ class name, with nested names joined by `_`.
    pub name: String,
    /// The fully qualified C++ class name.
    pub type_name: String,
}

impl MessageEntry<'_> {
    pub fn is_map_entry(&self) -> bool {
        self.descriptor
            .options
            .as_ref()
            .and_then(|options| options.map_entry)
            .unwrap_or(false)
    }
}

/// An enum type, as the C++ generated code names it.
#[derive(Debug)]
pub struct EnumEntry<'a> {
    pub descriptor: &'a EnumDescriptorProto,
    pub name: String,
    pub type_name: String,
}

/// Every message and enum of a set of files, by fully qualified protobuf name
/// (`.package.Outer.Inner`).
#[derive(Debug, Default)]
pub struct DescriptorIndex<'a> {
    messages: HashMap<String, MessageEntry<'a>>,
    enums: HashMap<String, EnumEntry<'a>>,
}

impl<'a> DescriptorIndex<'a> {
    pub fn new(files: impl IntoIterator<Item = &'a FileDescriptorProto>) -> DescriptorIndex<'a> {
        let mut index = DescriptorIndex::default();
        for file in files {
            let package = format!(
                "{}{}",
                if file.package.is_some() { "." } else { "" },
                file.package()
            );
            let scope = match dotted_to_colons(file.package()) {
                colons if colons.is_empty() => "::".to_string(),
                colons => format!("::{}::", colons),
            };

            for message in &file.message_type {
                index.add_message(&package, &scope, "", message);
            }
            for desc in &file.enum_type {
                index.add_enum(&package, &scope, "", desc);
            }
        }
        index
    }

    fn add_message(
        &mut self,
        package: &str,
        scope: &str,
        outer: &str,
        message: &'a DescriptorProto,
    ) {
        let fq_name = format!("{}.{}", package, message.name());
        let name = nested_name(outer, message.name());
        trace!("index message: {} -> {}{}", fq_name, scope, name);

        for nested in &message.nested_type {
            self.add_message(&fq_name, scope, &name, nested);
        }
        for desc in &message.enum_type {
            self.add_enum(&fq_name, scope, &name, desc);
        }

        self.messages.insert(
            fq_name,
            MessageEntry {
                descriptor: message,
                type_name: format!("{}{}", scope, name),
                name,
            },
        );
    }

    fn add_enum(&mut self, package: &str, scope: &str, outer: &str, desc: &'a EnumDescriptorProto) {
        let fq_name = format!("{}.{}", package, desc.name());
        let name = nested_name(outer, desc.name());
        self.enums.insert(
            fq_name,
            EnumEntry {
                descriptor: desc,
                type_name: format!("{}{}", scope, name),
                name,
            },
        );
    }

    pub fn message(&self, fq_name: &str) -> Option<&MessageEntry<'a>> {
        self.messages.get(fq_name)
    }

    pub fn enumeration(&self, fq_name: &str) -> Option<&EnumEntry<'a>> {
        self.enums.get(fq_name)
    }

    /// Returns true if `fq_name` names a synthesized map entry message.
    pub fn is_map_entry(&self, fq_name: &str) -> bool {
        self.message(fq_name).map_or(false, MessageEntry::is_map_entry)
    }
}

fn nested_name(outer: &str, name: &str) -> String {
    if outer.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", outer, name)
    }
}
