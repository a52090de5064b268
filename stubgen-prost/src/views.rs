//! `stubgen` descriptor views over `prost-types` descriptors.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
};

use stubgen::descriptor::{
    dotted_to_colons, strip_extension, Enum, EnumValue, Field, FieldType, File, Message, Method,
    Service, StreamingMode,
};
use stubgen::printer::{Printer, StringPrinter};

use crate::index::{DescriptorIndex, EnumEntry, MessageEntry};

/// Maps a protobuf field type onto the C++ value type it is represented with.
pub fn field_type(ty: Type) -> FieldType {
    match ty {
        Type::Int32 | Type::Sint32 | Type::Sfixed32 => FieldType::Int32,
        Type::Int64 | Type::Sint64 | Type::Sfixed64 => FieldType::Int64,
        Type::Uint32 | Type::Fixed32 => FieldType::Uint32,
        Type::Uint64 | Type::Fixed64 => FieldType::Uint64,
        Type::Double => FieldType::Double,
        Type::Float => FieldType::Float,
        Type::Bool => FieldType::Bool,
        Type::Enum => FieldType::Enum,
        Type::String | Type::Bytes => FieldType::String,
        Type::Message | Type::Group => FieldType::Message,
    }
}

/// A `.pkg.Name` reference written the C++ way, for types missing from the index.
fn cpp_type_name(pb_ident: &str) -> String {
    format!("::{}", dotted_to_colons(pb_ident))
}

#[derive(Clone, Copy)]
pub struct ProtoFile<'a> {
    index: &'a DescriptorIndex<'a>,
    file: &'a FileDescriptorProto,
}

impl<'a> ProtoFile<'a> {
    pub fn new(index: &'a DescriptorIndex<'a>, file: &'a FileDescriptorProto) -> ProtoFile<'a> {
        ProtoFile { index, file }
    }
}

impl File for ProtoFile<'_> {
    fn filename(&self) -> String {
        self.file.name().to_string()
    }

    fn filename_without_ext(&self) -> String {
        strip_extension(self.file.name()).to_string()
    }

    fn message_header_ext(&self) -> String {
        ".pb.h".to_string()
    }

    fn service_header_ext(&self) -> String {
        ".grpc.pb.h".to_string()
    }

    fn package(&self) -> String {
        self.file.package().to_string()
    }

    fn package_with_colons(&self) -> String {
        dotted_to_colons(self.file.package())
    }

    fn package_parts(&self) -> Vec<String> {
        self.file
            .package()
            .split('.')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn additional_headers(&self) -> String {
        String::new()
    }

    fn service_count(&self) -> usize {
        self.file.service.len()
    }

    fn service(&self, i: usize) -> Box<dyn Service + '_> {
        Box::new(ProtoService {
            index: self.index,
            service: &self.file.service[i],
        })
    }

    fn create_printer<'b>(&self, buf: &'b mut String) -> Box<dyn Printer + 'b> {
        Box::new(StringPrinter::new(buf))
    }
}

struct ProtoService<'a> {
    index: &'a DescriptorIndex<'a>,
    service: &'a ServiceDescriptorProto,
}

impl Service for ProtoService<'_> {
    fn name(&self) -> String {
        self.service.name().to_string()
    }

    fn method_count(&self) -> usize {
        self.service.method.len()
    }

    fn method(&self, i: usize) -> Box<dyn Method + '_> {
        Box::new(ProtoMethod {
            index: self.index,
            method: &self.service.method[i],
        })
    }
}

struct ProtoMethod<'a> {
    index: &'a DescriptorIndex<'a>,
    method: &'a MethodDescriptorProto,
}

impl ProtoMethod<'_> {
    fn type_name(&self, pb_ident: &str) -> String {
        self.index
            .message(pb_ident)
            .map_or_else(|| cpp_type_name(pb_ident), |entry| entry.type_name.clone())
    }

    fn message(&self, pb_ident: &str) -> Option<Box<dyn Message + '_>> {
        let entry = self.index.message(pb_ident)?;
        Some(Box::new(ProtoMessage::new(self.index, entry)))
    }

    fn mode(&self) -> StreamingMode {
        StreamingMode::new(self.method.client_streaming(), self.method.server_streaming())
    }
}

impl Method for ProtoMethod<'_> {
    fn name(&self) -> String {
        self.method.name().to_string()
    }

    fn input_type_name(&self) -> String {
        self.type_name(self.method.input_type())
    }

    fn output_type_name(&self) -> String {
        self.type_name(self.method.output_type())
    }

    fn input_message(&self) -> Option<Box<dyn Message + '_>> {
        self.message(self.method.input_type())
    }

    fn output_message(&self) -> Option<Box<dyn Message + '_>> {
        self.message(self.method.output_type())
    }

    fn no_streaming(&self) -> bool {
        self.mode() == StreamingMode::Unary
    }

    fn client_only_streaming(&self) -> bool {
        self.mode() == StreamingMode::ClientStreaming
    }

    fn server_only_streaming(&self) -> bool {
        self.mode() == StreamingMode::ServerStreaming
    }

    fn bidi_streaming(&self) -> bool {
        self.mode() == StreamingMode::Bidi
    }
}

pub(crate) struct ProtoMessage<'a> {
    index: &'a DescriptorIndex<'a>,
    entry: &'a MessageEntry<'a>,
    /// Declared fields, minus map fields.
    fields: Vec<&'a FieldDescriptorProto>,
}

impl<'a> ProtoMessage<'a> {
    pub(crate) fn new(index: &'a DescriptorIndex<'a>, entry: &'a MessageEntry<'a>) -> Self {
        let fields = entry
            .descriptor
            .field
            .iter()
            .filter(|field| {
                !(field.r#type() == Type::Message && index.is_map_entry(field.type_name()))
            })
            .collect();
        ProtoMessage {
            index,
            entry,
            fields,
        }
    }
}

impl Message for ProtoMessage<'_> {
    fn name(&self) -> String {
        self.entry.name.clone()
    }

    fn type_name(&self) -> String {
        self.entry.type_name.clone()
    }

    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field(&self, i: usize) -> Box<dyn Field + '_> {
        Box::new(ProtoField {
            index: self.index,
            field: self.fields[i],
        })
    }
}

struct ProtoField<'a> {
    index: &'a DescriptorIndex<'a>,
    field: &'a FieldDescriptorProto,
}

impl Field for ProtoField<'_> {
    fn name(&self) -> String {
        self.field.name().to_string()
    }

    fn type_name(&self) -> String {
        let pb_ident = self.field.type_name();
        match self.field.r#type() {
            Type::Message | Type::Group => self
                .index
                .message(pb_ident)
                .map_or_else(|| cpp_type_name(pb_ident), |entry| entry.type_name.clone()),
            Type::Enum => self
                .index
                .enumeration(pb_ident)
                .map_or_else(|| cpp_type_name(pb_ident), |entry| entry.type_name.clone()),
            Type::Int32 | Type::Sint32 | Type::Sfixed32 => "int32_t".to_string(),
            Type::Int64 | Type::Sint64 | Type::Sfixed64 => "int64_t".to_string(),
            Type::Uint32 | Type::Fixed32 => "uint32_t".to_string(),
            Type::Uint64 | Type::Fixed64 => "uint64_t".to_string(),
            Type::Double => "double".to_string(),
            Type::Float => "float".to_string(),
            Type::Bool => "bool".to_string(),
            Type::String | Type::Bytes => "std::string".to_string(),
        }
    }

    fn field_type(&self) -> FieldType {
        field_type(self.field.r#type())
    }

    fn is_repeated(&self) -> bool {
        self.field.label() == Label::Repeated
    }

    fn message_type(&self) -> Option<Box<dyn Message + '_>> {
        match self.field.r#type() {
            Type::Message | Type::Group => {
                let entry = self.index.message(self.field.type_name())?;
                Some(Box::new(ProtoMessage::new(self.index, entry)))
            }
            _ => None,
        }
    }

    fn enum_type(&self) -> Option<Box<dyn Enum + '_>> {
        match self.field.r#type() {
            Type::Enum => {
                let entry = self.index.enumeration(self.field.type_name())?;
                Some(Box::new(ProtoEnum { entry }))
            }
            _ => None,
        }
    }
}

struct ProtoEnum<'a> {
    entry: &'a EnumEntry<'a>,
}

impl Enum for ProtoEnum<'_> {
    fn name(&self) -> String {
        self.entry.name.clone()
    }

    fn type_name(&self) -> String {
        self.entry.type_name.clone()
    }

    fn random_value_type(&self) -> String {
        self.entry.type_name.clone()
    }

    fn value_count(&self) -> usize {
        self.entry.descriptor.value.len()
    }

    fn value(&self, i: usize) -> EnumValue {
        let value = &self.entry.descriptor.value[i];
        EnumValue {
            name: value.name().to_string(),
            number: value.number(),
        }
    }
}
