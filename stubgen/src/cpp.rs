//! The C++ client backend.
//!
//! Emits a standalone `<base>.grpc.client.pb.cc` which links against the protobuf and gRPC
//! generated code for the same file. The client connects to a server chosen on the command
//! line (gflags), fills every request with sample values, calls every method of every
//! service, and prints what comes back.

use log::trace;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::Rng;

use crate::descriptor::{Field, FieldType, File, Message, Method, Service, StreamingMode};
use crate::generator::{render_phases, ClientGenerator, Context, Phase};
use crate::ident::{cpp_field_name, cpp_string_literal, to_snake};
use crate::params::Parameters;
use crate::printer::Vars;
use crate::{vars, Error, Result};

const BASELINE_HEADERS: &[&str] = &[
    "iostream",
    "memory",
    "string",
    "cstdint",
    "thread",
    "fstream",
    "sstream",
    "vector",
    "gflags/gflags.h",
    "grpc++/grpc++.h",
    "grpc/support/log.h",
    "grpc/support/useful.h",
];

/// Number of requests sent on client streaming calls, and the upper bound of sample values
/// added to repeated scalar fields.
const STREAMED_REQUESTS: usize = 3;

/// Length of sample string values.
const SAMPLE_STRING_LEN: usize = 8;

#[derive(Clone, Copy, Debug, Default)]
pub struct CppClientGenerator;

impl CppClientGenerator {
    pub fn new() -> CppClientGenerator {
        CppClientGenerator
    }

    fn print_populate_field(
        &self,
        cx: &mut Context<'_>,
        owner: &str,
        field: &dyn Field,
    ) -> Result<()> {
        let name = cpp_field_name(&field.name());
        let op = if field.is_repeated() { "add" } else { "set" };

        match field.field_type() {
            FieldType::Message => {
                let sub = field.message_type().ok_or_else(|| missing_type(field))?;
                if cx.message_graph().is_nested(&sub.type_name(), owner) {
                    trace!("{}.{} is recursive, left unset", owner, name);
                    return cx.print_vars(
                        &vars! { "field" => name },
                        "// $field$ is recursive, left unset.\n",
                    );
                }
                let accessor = if field.is_repeated() { "add" } else { "mutable" };
                cx.print_vars(
                    &vars! { "name" => sub.name(), "accessor" => accessor, "field" => name },
                    "Populate$name$(*message.$accessor$_$field$());\n",
                )
            }
            FieldType::Enum => {
                let enum_type = field.enum_type().ok_or_else(|| missing_type(field))?;
                let count = enum_type.value_count();
                if count == 0 {
                    return Ok(());
                }
                let value = enum_type.value(cx.rng().gen_range(0..count));
                cx.print_vars(
                    &vars! {
                        "op" => op,
                        "field" => name,
                        "type" => enum_type.random_value_type(),
                        "value" => value.number,
                    },
                    "message.$op$_$field$(static_cast<$type$>($value$));\n",
                )
            }
            scalar => {
                let repeat = if field.is_repeated() {
                    cx.rng().gen_range(1..=STREAMED_REQUESTS)
                } else {
                    1
                };
                for _ in 0..repeat {
                    let value = sample_value(cx.rng(), scalar);
                    cx.print_vars(
                        &vars! { "op" => op, "field" => &name, "value" => value },
                        "message.$op$_$field$($value$);\n",
                    )?;
                }
                Ok(())
            }
        }
    }

    fn print_print_field(&self, cx: &mut Context<'_>, field: &dyn Field) -> Result<()> {
        let mut vars = vars! { "field" => cpp_field_name(&field.name()) };

        match (field.field_type(), field.is_repeated()) {
            (FieldType::Message, repeated) => {
                let sub = field.message_type().ok_or_else(|| missing_type(field))?;
                vars.insert("name".to_string(), sub.name());
                if repeated {
                    cx.print_vars(
                        &vars,
                        "for (int i = 0; i < message.$field$_size(); i++) {\n\
                         \x20 std::cout << \"$field$[\" << i << \"] {\" << std::endl;\n\
                         \x20 Print$name$(*message.mutable_$field$(i));\n\
                         \x20 std::cout << \"}\" << std::endl;\n\
                         }\n",
                    )
                } else {
                    cx.print_vars(
                        &vars,
                        "if (message.has_$field$()) {\n\
                         \x20 std::cout << \"$field$ {\" << std::endl;\n\
                         \x20 Print$name$(*message.mutable_$field$());\n\
                         \x20 std::cout << \"}\" << std::endl;\n\
                         }\n",
                    )
                }
            }
            (FieldType::Enum, false) => cx.print_vars(
                &vars,
                "std::cout << \"$field$: \" << static_cast<int>(message.$field$()) << std::endl;\n",
            ),
            (FieldType::Enum, true) => cx.print_vars(
                &vars,
                "for (int i = 0; i < message.$field$_size(); i++) {\n\
                 \x20 std::cout << \"$field$[\" << i << \"]: \" << static_cast<int>(message.$field$(i)) << std::endl;\n\
                 }\n",
            ),
            (_, false) => cx.print_vars(
                &vars,
                "std::cout << \"$field$: \" << message.$field$() << std::endl;\n",
            ),
            (_, true) => cx.print_vars(
                &vars,
                "for (int i = 0; i < message.$field$_size(); i++) {\n\
                 \x20 std::cout << \"$field$[\" << i << \"]: \" << message.$field$(i) << std::endl;\n\
                 }\n",
            ),
        }
    }

    fn include(&self, cx: &mut Context<'_>, header: &str) -> Result<()> {
        let template = if cx.params().use_system_headers {
            "#include <$header$>\n"
        } else {
            "#include \"$header$\"\n"
        };
        cx.print_vars(&vars! { "header" => header }, template)
    }
}

impl ClientGenerator for CppClientGenerator {
    fn file_extension(&self) -> &str {
        ".grpc.client.pb.cc"
    }

    fn comment_prefix(&self) -> &str {
        "// "
    }

    fn print_includes(&self, cx: &mut Context<'_>) -> Result<()> {
        for header in BASELINE_HEADERS {
            self.include(cx, header)?;
        }

        let file = cx.file();
        let search_path = cx.params().grpc_search_path.trim_end_matches('/');
        let prefix = if search_path.is_empty() {
            String::new()
        } else {
            format!("{}/", search_path)
        };
        cx.print_vars(
            &vars! {
                "prefix" => prefix,
                "base" => file.filename_without_ext(),
                "ext" => file.service_header_ext(),
            },
            "\n#include \"$prefix$$base$$ext$\"\n",
        )?;
        for header in file.additional_headers().lines().map(str::trim) {
            if !header.is_empty() {
                cx.print_vars(&vars! { "header" => header }, "#include \"$header$\"\n")?;
            }
        }
        cx.print("\n")
    }

    fn print_flags(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.print(
            "// In some distros, gflags is in the namespace google, and in some others,\n\
             // in gflags. This hack is enabling us to find both.\n\
             namespace google {}\n\
             namespace gflags {}\n\
             using namespace google;\n\
             using namespace gflags;\n\n",
        )?;
        cx.print(
            "DEFINE_bool(use_tls, false, \"Connection uses TLS if true, else plain TCP.\");\n\
             DEFINE_string(custom_ca_file, \"\", \"The file containing the CA root cert file.\");\n\
             DEFINE_int32(server_port, 8080, \"Server port.\");\n\
             DEFINE_string(server_host, \"localhost\", \"Server host to connect to\");\n\
             DEFINE_string(server_host_override, \"foo.test.google.fr\",\n\
             \x20             \"The server name used to verify the hostname returned by TLS handshake\");\n\n",
        )
    }

    fn print_message_populating_decl(&self, cx: &mut Context<'_>, vars: &Vars) -> Result<()> {
        cx.print_vars(vars, "void Populate$name$($type$ &message);\n")
    }

    fn print_message_printing_decl(&self, cx: &mut Context<'_>, vars: &Vars) -> Result<()> {
        cx.print_vars(vars, "void Print$name$($type$ &message);\n")
    }

    fn open_namespace(&self, cx: &mut Context<'_>, namespace: &str) -> Result<()> {
        cx.print("\n")?;
        for part in namespace.split("::").filter(|part| !part.is_empty()) {
            cx.print_vars(&vars! { "part" => part }, "namespace $part$ {\n")?;
        }
        Ok(())
    }

    fn close_namespace(&self, cx: &mut Context<'_>, namespace: &str) -> Result<()> {
        cx.print("\n")?;
        for part in namespace.rsplit("::").filter(|part| !part.is_empty()) {
            cx.print_vars(&vars! { "part" => part }, "}  // namespace $part$\n")?;
        }
        Ok(())
    }

    fn start_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()> {
        let vars = vars! {
            "service" => service.name(),
            "stub" => service_type(cx.file(), service),
        };
        cx.print_vars(
            &vars,
            "\nclass $service$Client {\n \
             public:\n",
        )?;
        cx.indent();
        cx.print_vars(
            &vars,
            "explicit $service$Client(std::shared_ptr<::grpc::Channel> channel)\n\
             \x20   : stub_($stub$::NewStub(channel)) {}\n\n",
        )
    }

    fn print_method_decl(
        &self,
        cx: &mut Context<'_>,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()> {
        let vars = method_vars(method);
        let template = match mode {
            StreamingMode::Unary => {
                "::grpc::Status $method$(const $request$ &request, $response$ *response);\n"
            }
            StreamingMode::ClientStreaming => {
                "::grpc::Status $method$(const std::vector<$request$> &requests, $response$ *response);\n"
            }
            StreamingMode::ServerStreaming => {
                "::grpc::Status $method$(const $request$ &request, std::vector<$response$> *responses);\n"
            }
            StreamingMode::Bidi => {
                "::grpc::Status $method$(const std::vector<$request$> &requests, std::vector<$response$> *responses);\n"
            }
        };
        cx.print_vars(&vars, template)
    }

    fn end_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()> {
        let stub = service_type(cx.file(), service);
        cx.outdent();
        cx.print_vars(
            &vars! { "stub" => stub },
            "\n private:\n\
             \x20 std::unique_ptr<$stub$::Stub> stub_;\n\
             };\n",
        )
    }

    fn print_message_definitions(
        &self,
        cx: &mut Context<'_>,
        message: &dyn Message,
    ) -> Result<()> {
        let type_name = message.type_name();
        let vars = vars! { "name" => message.name(), "type" => &type_name };

        cx.print_vars(&vars, "\nvoid Populate$name$($type$ &message) {\n")?;
        cx.indent();
        for i in 0..message.field_count() {
            self.print_populate_field(cx, &type_name, &*message.field(i))?;
        }
        cx.outdent();
        cx.print("}\n")?;

        cx.print_vars(&vars, "\nvoid Print$name$($type$ &message) {\n")?;
        cx.indent();
        for i in 0..message.field_count() {
            self.print_print_field(cx, &*message.field(i))?;
        }
        cx.outdent();
        cx.print("}\n")
    }

    fn print_method_definition(
        &self,
        cx: &mut Context<'_>,
        service: &dyn Service,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()> {
        let mut vars = method_vars(method);
        vars.insert("service".to_string(), service.name());

        let signature = match mode {
            StreamingMode::Unary => {
                "\n::grpc::Status $service$Client::$method$(const $request$ &request, $response$ *response) {\n"
            }
            StreamingMode::ClientStreaming => {
                "\n::grpc::Status $service$Client::$method$(const std::vector<$request$> &requests, $response$ *response) {\n"
            }
            StreamingMode::ServerStreaming => {
                "\n::grpc::Status $service$Client::$method$(const $request$ &request, std::vector<$response$> *responses) {\n"
            }
            StreamingMode::Bidi => {
                "\n::grpc::Status $service$Client::$method$(const std::vector<$request$> &requests, std::vector<$response$> *responses) {\n"
            }
        };
        cx.print_vars(&vars, signature)?;
        cx.indent();
        cx.print("::grpc::ClientContext context;\n")?;

        let body = match mode {
            StreamingMode::Unary => "return stub_->$method$(&context, request, response);\n",
            StreamingMode::ClientStreaming => {
                "std::unique_ptr<::grpc::ClientWriter<$request$>> writer(\n\
                 \x20   stub_->$method$(&context, response));\n\
                 for (const auto &request : requests) {\n\
                 \x20 if (!writer->Write(request)) {\n\
                 \x20   break;\n\
                 \x20 }\n\
                 }\n\
                 writer->WritesDone();\n\
                 return writer->Finish();\n"
            }
            StreamingMode::ServerStreaming => {
                "std::unique_ptr<::grpc::ClientReader<$response$>> reader(\n\
                 \x20   stub_->$method$(&context, request));\n\
                 $response$ response;\n\
                 while (reader->Read(&response)) {\n\
                 \x20 responses->push_back(response);\n\
                 }\n\
                 return reader->Finish();\n"
            }
            StreamingMode::Bidi => {
                "std::shared_ptr<::grpc::ClientReaderWriter<$request$, $response$>> stream(\n\
                 \x20   stub_->$method$(&context));\n\
                 std::thread writer([&]() {\n\
                 \x20 for (const auto &request : requests) {\n\
                 \x20   if (!stream->Write(request)) {\n\
                 \x20     break;\n\
                 \x20   }\n\
                 \x20 }\n\
                 \x20 stream->WritesDone();\n\
                 });\n\
                 $response$ response;\n\
                 while (stream->Read(&response)) {\n\
                 \x20 responses->push_back(response);\n\
                 }\n\
                 writer.join();\n\
                 return stream->Finish();\n"
            }
        };
        cx.print_vars(&vars, body)?;
        cx.outdent();
        cx.print("}\n")
    }

    fn start_main(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.print("\nint main(int argc, char** argv) {\n")?;
        cx.indent();
        cx.print(
            "ParseCommandLineFlags(&argc, &argv, true);\n\
             \n\
             std::shared_ptr<::grpc::ChannelCredentials> creds;\n\
             if (FLAGS_use_tls) {\n\
             \x20 ::grpc::SslCredentialsOptions ssl_opts;\n\
             \x20 if (!FLAGS_custom_ca_file.empty()) {\n\
             \x20   std::ifstream ca_file(FLAGS_custom_ca_file);\n\
             \x20   std::stringstream ca_buf;\n\
             \x20   ca_buf << ca_file.rdbuf();\n\
             \x20   ssl_opts.pem_root_certs = ca_buf.str();\n\
             \x20 }\n\
             \x20 creds = ::grpc::SslCredentials(ssl_opts);\n\
             } else {\n\
             \x20 creds = ::grpc::InsecureChannelCredentials();\n\
             }\n\
             \n\
             ::grpc::ChannelArguments args;\n\
             if (FLAGS_use_tls && !FLAGS_server_host_override.empty()) {\n\
             \x20 args.SetSslTargetNameOverride(FLAGS_server_host_override);\n\
             }\n\
             std::string server_address = FLAGS_server_host + \":\" + std::to_string(FLAGS_server_port);\n\
             std::shared_ptr<::grpc::Channel> channel =\n\
             \x20   ::grpc::CreateCustomChannel(server_address, creds, args);\n",
        )
    }

    fn print_main_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()> {
        let namespace = cx.params().services_namespace.as_str();
        let client_type = if namespace.is_empty() {
            format!("{}Client", service.name())
        } else {
            format!("{}::{}Client", namespace, service.name())
        };
        let client = client_var(cx.file(), service);
        cx.print_vars(
            &vars! { "client_type" => client_type, "client" => client },
            "\n$client_type$ $client$(channel);\n",
        )
    }

    fn print_main_method(
        &self,
        cx: &mut Context<'_>,
        service: &dyn Service,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()> {
        let mut vars = method_vars(method);
        vars.insert("service".to_string(), service.name());
        vars.insert("client".to_string(), client_var(cx.file(), service));
        vars.insert(
            "populate".to_string(),
            message_name(method.input_message(), method.input_type_name())?,
        );
        vars.insert(
            "print".to_string(),
            message_name(method.output_message(), method.output_type_name())?,
        );
        vars.insert("count".to_string(), STREAMED_REQUESTS.to_string());
        vars.insert(
            "requests".to_string(),
            if mode.is_client_streaming() { "requests" } else { "request" }.to_string(),
        );
        vars.insert(
            "responses".to_string(),
            if mode.is_server_streaming() { "&responses" } else { "&response" }.to_string(),
        );

        cx.print("\n{\n")?;
        cx.indent();
        cx.print_vars(
            &vars,
            "std::cout << \"Calling $service$.$method$\" << std::endl;\n",
        )?;
        if mode.is_client_streaming() {
            cx.print_vars(
                &vars,
                "std::vector<$request$> requests($count$);\n\
                 for (auto &request : requests) {\n\
                 \x20 Populate$populate$(request);\n\
                 }\n",
            )?;
        } else {
            cx.print_vars(&vars, "$request$ request;\nPopulate$populate$(request);\n")?;
        }
        if mode.is_server_streaming() {
            cx.print_vars(&vars, "std::vector<$response$> responses;\n")?;
        } else {
            cx.print_vars(&vars, "$response$ response;\n")?;
        }
        cx.print_vars(
            &vars,
            "::grpc::Status status = $client$.$method$($requests$, $responses$);\n\
             if (status.ok()) {\n",
        )?;
        if mode.is_server_streaming() {
            cx.print_vars(
                &vars,
                "  for (auto &response : responses) {\n\
                 \x20   Print$print$(response);\n\
                 \x20 }\n",
            )?;
        } else {
            cx.print_vars(&vars, "  Print$print$(response);\n")?;
        }
        cx.print_vars(
            &vars,
            "} else {\n\
             \x20 std::cout << \"$service$.$method$ failed: \" << status.error_message() << std::endl;\n\
             }\n",
        )?;
        cx.outdent();
        cx.print("}\n")
    }

    fn end_main(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.print("\nreturn 0;\n")?;
        cx.outdent();
        cx.print("}\n")
    }

    fn print_epilogue(&self, cx: &mut Context<'_>) -> Result<()> {
        cx.print_vars(
            &vars! { "prefix" => self.comment_prefix() },
            "\n$prefix$@@protoc_insertion_point(global_scope)\n",
        )
    }
}

/// Returns the prologue of the generated client file.
pub fn client_prologue(file: &dyn File, params: &Parameters) -> Result<String> {
    render_phases(&CppClientGenerator, file, params, &[Phase::Prologue])
}

/// Returns the includes and flag definitions of the generated client file.
pub fn client_includes(file: &dyn File, params: &Parameters) -> Result<String> {
    render_phases(
        &CppClientGenerator,
        file,
        params,
        &[Phase::Package, Phase::Includes, Phase::Flags],
    )
}

/// Returns the message helpers and the service clients of the generated client file.
pub fn client_services(file: &dyn File, params: &Parameters) -> Result<String> {
    render_phases(
        &CppClientGenerator,
        file,
        params,
        &[Phase::MessageDecls, Phase::Services, Phase::Definitions],
    )
}

/// Returns the entry point and the epilogue of the generated client file.
pub fn client_epilogue(file: &dyn File, params: &Parameters) -> Result<String> {
    render_phases(
        &CppClientGenerator,
        file,
        params,
        &[Phase::Main, Phase::Epilogue],
    )
}

fn method_vars(method: &dyn Method) -> Vars {
    vars! {
        "method" => method.name(),
        "request" => method.input_type_name(),
        "response" => method.output_type_name(),
    }
}

/// The fully qualified name of the gRPC generated service class.
fn service_type(file: &dyn File, service: &dyn Service) -> String {
    let package = file.package_with_colons();
    if package.is_empty() {
        format!("::{}", service.name())
    } else {
        format!("::{}::{}", package, service.name())
    }
}

/// Name of the `main` local holding the client of `service`.
///
/// Services whose names agree once snake cased, e.g. `Echo` and `ECHO`, are told apart by
/// their position in the file.
fn client_var(file: &dyn File, service: &dyn Service) -> String {
    let name = service.name();
    let snake = to_snake(&name);
    let names: Vec<String> = (0..file.service_count()).map(|i| file.service(i).name()).collect();
    let colliding = names.iter().filter(|other| to_snake(other) == snake).count() > 1;
    match names.iter().position(|other| *other == name) {
        Some(i) if colliding => format!("{}_client_{}", snake, i),
        _ => format!("{}_client", snake),
    }
}

fn message_name(message: Option<Box<dyn Message + '_>>, type_name: String) -> Result<String> {
    message
        .map(|message| message.name())
        .ok_or_else(|| Error::malformed(format!("message type {} is not resolvable", type_name)))
}

fn missing_type(field: &dyn Field) -> Error {
    Error::malformed(format!(
        "field `{}` of type {:?} has no type descriptor",
        field.name(),
        field.field_type()
    ))
}

/// Returns a C++ literal of a random sample value for a scalar field type.
fn sample_value(rng: &mut StdRng, field_type: FieldType) -> String {
    match field_type {
        FieldType::Int32 => rng.gen_range(-1000..1000i32).to_string(),
        FieldType::Int64 => format!("{}LL", rng.gen_range(-1_000_000..1_000_000i64)),
        FieldType::Uint32 => format!("{}u", rng.gen_range(0..1000u32)),
        FieldType::Uint64 => format!("{}ULL", rng.gen_range(0..1_000_000u64)),
        FieldType::Double => format!("{:.3}", rng.gen_range(-1000.0..1000.0f64)),
        FieldType::Float => format!("{:.3}f", rng.gen_range(-1000.0..1000.0f32)),
        FieldType::Bool => rng.gen::<bool>().to_string(),
        FieldType::String | FieldType::Enum | FieldType::Message => {
            let word: String = (0..SAMPLE_STRING_LEN)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect();
            cpp_string_literal(&word)
        }
    }
}
