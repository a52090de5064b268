//! Read-only descriptor views.
//!
//! These traits are the entire contract a schema backend has to satisfy for the generator
//! to run against it. Views are cheap, short-lived, and never outlive the generation pass
//! that requested them: child views are handed out as boxed trait objects borrowing from
//! their parent.
//!
//! Indexed accessors (`field(i)`, `method(i)`, `service(i)`, `value(i)`) panic when the
//! index is not below the corresponding count.

use std::convert::TryFrom;
use std::fmt;

use itertools::Itertools;

use crate::printer::Printer;
use crate::{Error, Result};

/// The declared type of a message field.
///
/// There is a fixed mapping from the schema's wire types onto these tags, each schema type
/// maps to exactly one tag. `0` is reserved for errors and is not a valid tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum FieldType {
    Int32 = 1,
    Int64 = 2,
    Uint32 = 3,
    Uint64 = 4,
    Double = 5,
    Float = 6,
    Bool = 7,
    Enum = 8,
    String = 9,
    Message = 10,
}

impl TryFrom<i32> for FieldType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            1 => FieldType::Int32,
            2 => FieldType::Int64,
            3 => FieldType::Uint32,
            4 => FieldType::Uint64,
            5 => FieldType::Double,
            6 => FieldType::Float,
            7 => FieldType::Bool,
            8 => FieldType::Enum,
            9 => FieldType::String,
            10 => FieldType::Message,
            _ => return Err(Error::malformed(format!("invalid field type tag {}", value))),
        })
    }
}

/// One declared value of an enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

pub trait Enum {
    fn name(&self) -> String;
    fn type_name(&self) -> String;
    /// The target type a randomly chosen value is converted to in generated exercise code.
    fn random_value_type(&self) -> String;

    fn value_count(&self) -> usize;
    fn value(&self, i: usize) -> EnumValue;
}

pub trait Field {
    fn name(&self) -> String;
    fn type_name(&self) -> String;
    fn field_type(&self) -> FieldType;
    fn is_repeated(&self) -> bool;

    /// Present iff `field_type()` is [`FieldType::Message`].
    fn message_type(&self) -> Option<Box<dyn Message + '_>>;
    /// Present iff `field_type()` is [`FieldType::Enum`].
    fn enum_type(&self) -> Option<Box<dyn Enum + '_>>;

    /// Checks that the type tag agrees with the attached sub-descriptors.
    fn check(&self) -> Result<()> {
        let has_message = self.message_type().is_some();
        let has_enum = self.enum_type().is_some();
        let consistent = match self.field_type() {
            FieldType::Message => has_message && !has_enum,
            FieldType::Enum => has_enum && !has_message,
            _ => !has_message && !has_enum,
        };
        if consistent {
            Ok(())
        } else {
            Err(Error::malformed(format!(
                "field `{}` of type {:?} has message type: {}, enum type: {}",
                self.name(),
                self.field_type(),
                has_message,
                has_enum,
            )))
        }
    }
}

pub trait Message {
    /// The unqualified name, used to name per-message helpers.
    fn name(&self) -> String;
    /// The fully qualified target-language type name.
    fn type_name(&self) -> String;

    fn field_count(&self) -> usize;
    fn field(&self, i: usize) -> Box<dyn Field + '_>;
}

/// The call shape of a method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamingMode {
    Unary,
    ClientStreaming,
    ServerStreaming,
    Bidi,
}

impl StreamingMode {
    pub fn new(client_streaming: bool, server_streaming: bool) -> Self {
        match (client_streaming, server_streaming) {
            (false, false) => StreamingMode::Unary,
            (true, false) => StreamingMode::ClientStreaming,
            (false, true) => StreamingMode::ServerStreaming,
            (true, true) => StreamingMode::Bidi,
        }
    }

    pub fn is_client_streaming(self) -> bool {
        matches!(self, StreamingMode::ClientStreaming | StreamingMode::Bidi)
    }

    pub fn is_server_streaming(self) -> bool {
        matches!(self, StreamingMode::ServerStreaming | StreamingMode::Bidi)
    }
}

impl fmt::Display for StreamingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            StreamingMode::Unary => "unary",
            StreamingMode::ClientStreaming => "client streaming",
            StreamingMode::ServerStreaming => "server streaming",
            StreamingMode::Bidi => "bidirectional streaming",
        })
    }
}

/// An abstract interface representing a method.
pub trait Method {
    fn name(&self) -> String;

    fn input_type_name(&self) -> String;
    fn output_type_name(&self) -> String;

    fn input_message(&self) -> Option<Box<dyn Message + '_>>;
    fn output_message(&self) -> Option<Box<dyn Message + '_>>;

    fn no_streaming(&self) -> bool;
    fn client_only_streaming(&self) -> bool;
    fn server_only_streaming(&self) -> bool;
    fn bidi_streaming(&self) -> bool;

    /// Returns the method's call shape, or `None` unless exactly one streaming flag holds.
    fn streaming_mode(&self) -> Option<StreamingMode> {
        let flags = [
            (self.no_streaming(), StreamingMode::Unary),
            (self.client_only_streaming(), StreamingMode::ClientStreaming),
            (self.server_only_streaming(), StreamingMode::ServerStreaming),
            (self.bidi_streaming(), StreamingMode::Bidi),
        ];
        let mut set = flags.iter().filter(|(flag, _)| *flag).map(|&(_, mode)| mode);
        match (set.next(), set.next()) {
            (Some(mode), None) => Some(mode),
            _ => None,
        }
    }
}

/// An abstract interface representing a service.
pub trait Service {
    fn name(&self) -> String;

    fn method_count(&self) -> usize;
    fn method(&self, i: usize) -> Box<dyn Method + '_>;
}

/// An interface that allows the generated source to be produced from various
/// libraries/IDLs/serializers.
pub trait File {
    fn filename(&self) -> String;
    fn filename_without_ext(&self) -> String;
    fn message_header_ext(&self) -> String;
    fn service_header_ext(&self) -> String;
    fn package(&self) -> String;
    fn package_with_colons(&self) -> String;
    fn package_parts(&self) -> Vec<String>;
    /// Extra headers the schema system needs, one per line. Usually empty.
    fn additional_headers(&self) -> String;

    fn service_count(&self) -> usize;
    fn service(&self, i: usize) -> Box<dyn Service + '_>;

    /// Creates a fresh printer appending to `buf`.
    fn create_printer<'b>(&self, buf: &'b mut String) -> Box<dyn Printer + 'b>;
}

/// Converts the `package.name` form into `package::name`.
pub fn dotted_to_colons(package: &str) -> String {
    package.split('.').filter(|part| !part.is_empty()).join("::")
}

/// Strips the extension from the last component of `filename`.
pub fn strip_extension(filename: &str) -> &str {
    let base_start = filename.rfind('/').map_or(0, |idx| idx + 1);
    match filename[base_start..].rfind('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..base_start + idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flags([bool; 4]);

    impl Method for Flags {
        fn name(&self) -> String {
            "Flags".to_string()
        }
        fn input_type_name(&self) -> String {
            String::new()
        }
        fn output_type_name(&self) -> String {
            String::new()
        }
        fn input_message(&self) -> Option<Box<dyn Message + '_>> {
            None
        }
        fn output_message(&self) -> Option<Box<dyn Message + '_>> {
            None
        }
        fn no_streaming(&self) -> bool {
            self.0[0]
        }
        fn client_only_streaming(&self) -> bool {
            self.0[1]
        }
        fn server_only_streaming(&self) -> bool {
            self.0[2]
        }
        fn bidi_streaming(&self) -> bool {
            self.0[3]
        }
    }

    #[test]
    fn field_type_rejects_reserved_tag() {
        assert!(FieldType::try_from(0).is_err());
        assert!(FieldType::try_from(11).is_err());
        assert_eq!(FieldType::Int32, FieldType::try_from(1).unwrap());
        assert_eq!(FieldType::Message, FieldType::try_from(10).unwrap());
    }

    #[test]
    fn streaming_mode_requires_exactly_one_flag() {
        assert_eq!(
            Some(StreamingMode::Unary),
            Flags([true, false, false, false]).streaming_mode()
        );
        assert_eq!(
            Some(StreamingMode::Bidi),
            Flags([false, false, false, true]).streaming_mode()
        );
        assert_eq!(None, Flags([false; 4]).streaming_mode());
        assert_eq!(None, Flags([true, false, false, true]).streaming_mode());
    }

    #[test]
    fn streaming_mode_from_pair() {
        assert_eq!(StreamingMode::Unary, StreamingMode::new(false, false));
        assert_eq!(StreamingMode::ClientStreaming, StreamingMode::new(true, false));
        assert_eq!(StreamingMode::ServerStreaming, StreamingMode::new(false, true));
        assert_eq!(StreamingMode::Bidi, StreamingMode::new(true, true));
        assert!(StreamingMode::Bidi.is_client_streaming());
        assert!(!StreamingMode::ServerStreaming.is_client_streaming());
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!("helloworld", strip_extension("helloworld.proto"));
        assert_eq!("foo/bar", strip_extension("foo/bar.proto"));
        assert_eq!("foo.d/bar", strip_extension("foo.d/bar"));
        assert_eq!("foo/.hidden", strip_extension("foo/.hidden"));
        assert_eq!("a.b", strip_extension("a.b.proto"));
    }

    #[test]
    fn test_dotted_to_colons() {
        assert_eq!("foo::bar", dotted_to_colons("foo.bar"));
        assert_eq!("", dotted_to_colons(""));
        assert_eq!("foo", dotted_to_colons(".foo"));
    }
}
