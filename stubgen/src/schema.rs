//! An in-memory schema backend.
//!
//! Definitions are plain owned values, assembled with the builder methods below; the
//! descriptor views borrow them. Message and enum references are resolved by name against
//! the owning [`FileDef`], so recursive messages need no special handling.
//!
//! ```
//! use stubgen::descriptor::{FieldType, File};
//! use stubgen::schema::{FieldDef, FileDef, MessageDef, MethodDef, ServiceDef};
//!
//! let file = FileDef::new("helloworld.proto", "helloworld")
//!     .message(MessageDef::new("HelloRequest"))
//!     .message(MessageDef::new("HelloReply").field(FieldDef::scalar("message", FieldType::String)))
//!     .with_service(ServiceDef::new("Greeter").method(MethodDef::unary(
//!         "SayHello",
//!         "HelloRequest",
//!         "HelloReply",
//!     )));
//!
//! assert_eq!("helloworld", file.filename_without_ext());
//! assert_eq!(1, file.service_count());
//! ```

use crate::descriptor::{
    dotted_to_colons, strip_extension, Enum, EnumValue, Field, FieldType, File, Message, Method,
    Service, StreamingMode,
};
use crate::printer::{Printer, StringPrinter};

#[derive(Clone, Debug, PartialEq)]
pub struct FileDef {
    pub name: String,
    pub package: String,
    pub message_header_ext: String,
    pub service_header_ext: String,
    pub additional_headers: Vec<String>,
    pub messages: Vec<MessageDef>,
    pub enums: Vec<EnumDef>,
    pub services: Vec<ServiceDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub repeated: bool,
    /// Name of the referenced message or enum, for `Message` and `Enum` fields.
    pub type_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceDef {
    pub name: String,
    pub methods: Vec<MethodDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub input: String,
    pub output: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl FileDef {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        FileDef {
            name: name.into(),
            package: package.into(),
            message_header_ext: ".pb.h".to_string(),
            service_header_ext: ".grpc.pb.h".to_string(),
            additional_headers: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn message(mut self, message: MessageDef) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDef) -> Self {
        self.enums.push(enumeration);
        self
    }

    pub fn with_service(mut self, service: ServiceDef) -> Self {
        self.services.push(service);
        self
    }

    pub fn additional_header(mut self, header: impl Into<String>) -> Self {
        self.additional_headers.push(header.into());
        self
    }

    fn qualify(&self, name: &str) -> String {
        let package = dotted_to_colons(&self.package);
        if package.is_empty() {
            format!("::{}", name)
        } else {
            format!("::{}::{}", package, name)
        }
    }

    fn find_message(&self, name: &str) -> Option<&MessageDef> {
        self.messages.iter().find(|message| message.name == name)
    }

    fn find_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|enumeration| enumeration.name == name)
    }

    fn message_view<'a>(&'a self, name: &str) -> Option<Box<dyn Message + 'a>> {
        self.find_message(name)
            .map(|def| Box::new(MessageView { file: self, def }) as Box<dyn Message + 'a>)
    }
}

impl MessageDef {
    pub fn new(name: impl Into<String>) -> Self {
        MessageDef {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

impl FieldDef {
    /// A field of a scalar (non message, non enum) type.
    pub fn scalar(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDef {
            name: name.into(),
            field_type,
            repeated: false,
            type_ref: None,
        }
    }

    pub fn message(name: impl Into<String>, message: impl Into<String>) -> Self {
        FieldDef {
            name: name.into(),
            field_type: FieldType::Message,
            repeated: false,
            type_ref: Some(message.into()),
        }
    }

    pub fn enumeration(name: impl Into<String>, enumeration: impl Into<String>) -> Self {
        FieldDef {
            name: name.into(),
            field_type: FieldType::Enum,
            repeated: false,
            type_ref: Some(enumeration.into()),
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        EnumDef {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            number,
        });
        self
    }
}

impl ServiceDef {
    pub fn new(name: impl Into<String>) -> Self {
        ServiceDef {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }
}

impl MethodDef {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
        client_streaming: bool,
        server_streaming: bool,
    ) -> Self {
        MethodDef {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            client_streaming,
            server_streaming,
        }
    }

    pub fn unary(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        MethodDef::new(name, input, output, false, false)
    }
}

impl File for FileDef {
    fn filename(&self) -> String {
        self.name.clone()
    }

    fn filename_without_ext(&self) -> String {
        strip_extension(&self.name).to_string()
    }

    fn message_header_ext(&self) -> String {
        self.message_header_ext.clone()
    }

    fn service_header_ext(&self) -> String {
        self.service_header_ext.clone()
    }

    fn package(&self) -> String {
        self.package.clone()
    }

    fn package_with_colons(&self) -> String {
        dotted_to_colons(&self.package)
    }

    fn package_parts(&self) -> Vec<String> {
        self.package
            .split('.')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn additional_headers(&self) -> String {
        self.additional_headers.join("\n")
    }

    fn service_count(&self) -> usize {
        self.services.len()
    }

    fn service(&self, i: usize) -> Box<dyn Service + '_> {
        Box::new(ServiceView {
            file: self,
            def: &self.services[i],
        })
    }

    fn create_printer<'b>(&self, buf: &'b mut String) -> Box<dyn Printer + 'b> {
        Box::new(StringPrinter::new(buf))
    }
}

struct ServiceView<'a> {
    file: &'a FileDef,
    def: &'a ServiceDef,
}

impl Service for ServiceView<'_> {
    fn name(&self) -> String {
        self.def.name.clone()
    }

    fn method_count(&self) -> usize {
        self.def.methods.len()
    }

    fn method(&self, i: usize) -> Box<dyn Method + '_> {
        Box::new(MethodView {
            file: self.file,
            def: &self.def.methods[i],
        })
    }
}

struct MethodView<'a> {
    file: &'a FileDef,
    def: &'a MethodDef,
}

impl MethodView<'_> {
    fn mode(&self) -> StreamingMode {
        StreamingMode::new(self.def.client_streaming, self.def.server_streaming)
    }
}

impl Method for MethodView<'_> {
    fn name(&self) -> String {
        self.def.name.clone()
    }

    fn input_type_name(&self) -> String {
        self.file.qualify(&self.def.input)
    }

    fn output_type_name(&self) -> String {
        self.file.qualify(&self.def.output)
    }

    fn input_message(&self) -> Option<Box<dyn Message + '_>> {
        self.file.message_view(&self.def.input)
    }

    fn output_message(&self) -> Option<Box<dyn Message + '_>> {
        self.file.message_view(&self.def.output)
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

struct MessageView<'a> {
    file: &'a FileDef,
    def: &'a MessageDef,
}

impl Message for MessageView<'_> {
    fn name(&self) -> String {
        self.def.name.clone()
    }

    fn type_name(&self) -> String {
        self.file.qualify(&self.def.name)
    }

    fn field_count(&self) -> usize {
        self.def.fields.len()
    }

    fn field(&self, i: usize) -> Box<dyn Field + '_> {
        Box::new(FieldView {
            file: self.file,
            def: &self.def.fields[i],
        })
    }
}

struct FieldView<'a> {
    file: &'a FileDef,
    def: &'a FieldDef,
}

impl Field for FieldView<'_> {
    fn name(&self) -> String {
        self.def.name.clone()
    }

    fn type_name(&self) -> String {
        match self.def.type_ref {
            Some(ref type_ref) => self.file.qualify(type_ref),
            None => format!("{:?}", self.def.field_type).to_lowercase(),
        }
    }

    fn field_type(&self) -> FieldType {
        self.def.field_type
    }

    fn is_repeated(&self) -> bool {
        self.def.repeated
    }

    fn message_type(&self) -> Option<Box<dyn Message + '_>> {
        self.file.message_view(self.def.type_ref.as_deref()?)
    }

    fn enum_type(&self) -> Option<Box<dyn Enum + '_>> {
        let def = self.file.find_enum(self.def.type_ref.as_deref()?)?;
        Some(Box::new(EnumView {
            file: self.file,
            def,
        }))
    }
}

struct EnumView<'a> {
    file: &'a FileDef,
    def: &'a EnumDef,
}

impl Enum for EnumView<'_> {
    fn name(&self) -> String {
        self.def.name.clone()
    }

    fn type_name(&self) -> String {
        self.file.qualify(&self.def.name)
    }

    fn random_value_type(&self) -> String {
        self.type_name()
    }

    fn value_count(&self) -> usize {
        self.def.values.len()
    }

    fn value(&self, i: usize) -> EnumValue {
        self.def.values[i].clone()
    }
}
