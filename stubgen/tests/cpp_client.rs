use pretty_assertions::assert_eq;

use stubgen::cpp::{
    client_epilogue, client_includes, client_prologue, client_services, CppClientGenerator,
};
use stubgen::descriptor::FieldType;
use stubgen::schema::{EnumDef, FieldDef, FileDef, MessageDef, MethodDef, ServiceDef};
use stubgen::{generate_file, output_file_name, render_phases, Error, Parameters, Phase};

fn greeter() -> FileDef {
    FileDef::new("helloworld.proto", "helloworld")
        .message(MessageDef::new("HelloRequest"))
        .message(
            MessageDef::new("HelloReply").field(FieldDef::scalar("message", FieldType::String)),
        )
        .with_service(ServiceDef::new("Greeter").method(MethodDef::unary(
            "SayHello",
            "HelloRequest",
            "HelloReply",
        )))
}

fn route_guide() -> FileDef {
    FileDef::new("route_guide.proto", "routeguide")
        .enumeration(EnumDef::new("Terrain").value("ROAD", 0).value("TRAIL", 3))
        .message(
            MessageDef::new("Point")
                .field(FieldDef::scalar("latitude", FieldType::Int32))
                .field(FieldDef::scalar("longitude", FieldType::Int32)),
        )
        .message(
            MessageDef::new("Feature")
                .field(FieldDef::scalar("name", FieldType::String))
                .field(FieldDef::message("location", "Point"))
                .field(FieldDef::enumeration("terrain", "Terrain"))
                .field(FieldDef::scalar("tags", FieldType::String).repeated())
                .field(FieldDef::enumeration("surfaces", "Terrain").repeated()),
        )
        .message(
            MessageDef::new("RouteNote")
                .field(FieldDef::message("location", "Point"))
                .field(FieldDef::message("replies", "RouteNote").repeated()),
        )
        .message(
            MessageDef::new("RouteSummary")
                .field(FieldDef::scalar("distance", FieldType::Double)),
        )
        .with_service(
            ServiceDef::new("RouteGuide")
                .method(MethodDef::unary("GetFeature", "Point", "Feature"))
                .method(MethodDef::new("ListFeatures", "Point", "Feature", false, true))
                .method(MethodDef::new("RecordRoute", "Point", "RouteSummary", true, false))
                .method(MethodDef::new("RouteChat", "RouteNote", "RouteNote", true, true)),
        )
}

fn generate(file: &FileDef, params: &Parameters) -> String {
    generate_file(&CppClientGenerator::new(), file, params)
        .unwrap()
        .content
}

#[test]
fn greeter_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();

    let generated =
        generate_file(&CppClientGenerator::new(), &greeter(), &Parameters::default()).unwrap();
    assert_eq!("helloworld.grpc.client.pb.cc", generated.name);
    let content = generated.content;

    assert_eq!(1, content.matches("#include \"helloworld.grpc.pb.h\"").count());
    for decl in &[
        "void PopulateHelloRequest(::helloworld::HelloRequest &message);\n",
        "void PrintHelloRequest(::helloworld::HelloRequest &message);\n",
        "void PopulateHelloReply(::helloworld::HelloReply &message);\n",
        "void PrintHelloReply(::helloworld::HelloReply &message);\n",
    ] {
        assert_eq!(1, content.matches(decl).count(), "{}", decl);
    }
    assert_eq!(
        1,
        content
            .matches(
                "::grpc::Status SayHello(const ::helloworld::HelloRequest &request, \
                 ::helloworld::HelloReply *response);\n"
            )
            .count()
    );
    assert!(content.contains(
        "DEFINE_bool(use_tls, false, \"Connection uses TLS if true, else plain TCP.\");\n\
         DEFINE_string(custom_ca_file, \"\", \"The file containing the CA root cert file.\");\n\
         DEFINE_int32(server_port, 8080, \"Server port.\");\n\
         DEFINE_string(server_host, \"localhost\", \"Server host to connect to\");\n\
         DEFINE_string(server_host_override, \"foo.test.google.fr\",\n"
    ));
    assert!(content.contains(
        "void PrintHelloReply(::helloworld::HelloReply &message) {\n  \
         std::cout << \"message: \" << message.message() << std::endl;\n}\n"
    ));
    assert!(content.contains("  message.set_message(\""));
}

#[test]
fn greeter_service_declaration() {
    let services = render_phases(
        &CppClientGenerator::new(),
        &greeter(),
        &Parameters::default(),
        &[Phase::Services],
    )
    .unwrap();
    assert_eq!(
        "
class GreeterClient {
 public:
  explicit GreeterClient(std::shared_ptr<::grpc::Channel> channel)
      : stub_(::helloworld::Greeter::NewStub(channel)) {}

  ::grpc::Status SayHello(const ::helloworld::HelloRequest &request, ::helloworld::HelloReply *response);

 private:
  std::unique_ptr<::helloworld::Greeter::Stub> stub_;
};
",
        services
    );
}

#[test]
fn greeter_main_is_balanced() {
    let main = client_epilogue(&greeter(), &Parameters::default()).unwrap();
    assert_eq!(main.matches('{').count(), main.matches('}').count());
    assert!(main.starts_with("\nint main(int argc, char** argv) {\n  ParseCommandLineFlags(&argc, &argv, true);\n"));
    assert!(main.contains(
        "  GreeterClient greeter_client(channel);

  {
    std::cout << \"Calling Greeter.SayHello\" << std::endl;
    ::helloworld::HelloRequest request;
    PopulateHelloRequest(request);
    ::helloworld::HelloReply response;
    ::grpc::Status status = greeter_client.SayHello(request, &response);
    if (status.ok()) {
      PrintHelloReply(response);
    } else {
      std::cout << \"Greeter.SayHello failed: \" << status.error_message() << std::endl;
    }
  }
"
    ));
    assert!(main.ends_with("\n  return 0;\n}\n\n// @@protoc_insertion_point(global_scope)\n"));
}

#[test]
fn streaming_shapes_are_distinct() {
    let content = generate(&route_guide(), &Parameters::default());
    let shapes = [
        "::grpc::Status GetFeature(const ::routeguide::Point &request, ::routeguide::Feature *response);\n",
        "::grpc::Status ListFeatures(const ::routeguide::Point &request, std::vector<::routeguide::Feature> *responses);\n",
        "::grpc::Status RecordRoute(const std::vector<::routeguide::Point> &requests, ::routeguide::RouteSummary *response);\n",
        "::grpc::Status RouteChat(const std::vector<::routeguide::RouteNote> &requests, std::vector<::routeguide::RouteNote> *responses);\n",
    ];
    for shape in &shapes {
        assert!(content.contains(shape), "missing {}", shape);
    }

    assert!(content.contains("::grpc::ClientWriter<::routeguide::Point>"));
    assert!(content.contains("::grpc::ClientReader<::routeguide::Feature>"));
    assert!(content.contains(
        "::grpc::ClientReaderWriter<::routeguide::RouteNote, ::routeguide::RouteNote>"
    ));
    assert!(content.contains("route_guide_client.RouteChat(requests, &responses);"));
}

#[test]
fn repeated_fields_are_sampled_and_printed() {
    let content = generate(&route_guide(), &Parameters::default());

    let tags = content.matches("  message.add_tags(\"").count();
    assert!((1..=3).contains(&tags), "{} tags", tags);
    let surfaces = content
        .matches("  message.add_surfaces(static_cast<::routeguide::Terrain>(")
        .count();
    assert_eq!(1, surfaces);

    assert!(content.contains(
        "  for (int i = 0; i < message.tags_size(); i++) {\n    \
         std::cout << \"tags[\" << i << \"]: \" << message.tags(i) << std::endl;\n  \
         }\n"
    ));
    assert!(content.contains(
        "  for (int i = 0; i < message.surfaces_size(); i++) {\n    \
         std::cout << \"surfaces[\" << i << \"]: \" << static_cast<int>(message.surfaces(i)) << std::endl;\n  \
         }\n"
    ));
}

#[test]
fn client_streaming_main_sends_a_batch() {
    let main = client_epilogue(&route_guide(), &Parameters::default()).unwrap();
    assert!(main.contains(
        "  {
    std::cout << \"Calling RouteGuide.RecordRoute\" << std::endl;
    std::vector<::routeguide::Point> requests(3);
    for (auto &request : requests) {
      PopulatePoint(request);
    }
    ::routeguide::RouteSummary response;
    ::grpc::Status status = route_guide_client.RecordRoute(requests, &response);
    if (status.ok()) {
      PrintRouteSummary(response);
    } else {
"
    ));
}

#[test]
fn colliding_client_names_are_numbered() {
    let file = FileDef::new("echo.proto", "echo")
        .message(MessageDef::new("Empty"))
        .with_service(ServiceDef::new("Echo").method(MethodDef::unary("Ping", "Empty", "Empty")))
        .with_service(ServiceDef::new("ECHO").method(MethodDef::unary("Ping", "Empty", "Empty")));
    let main = client_epilogue(&file, &Parameters::default()).unwrap();
    assert!(main.contains("  EchoClient echo_client_0(channel);\n"));
    assert!(main.contains("  ECHOClient echo_client_1(channel);\n"));
    assert!(main.contains("echo_client_0.Ping(request, &response);"));
    assert!(main.contains("echo_client_1.Ping(request, &response);"));
    assert!(!main.contains(" echo_client("));
}

#[test]
fn namespace_wrapping() {
    let plain = client_services(&route_guide(), &Parameters::default()).unwrap();
    assert!(!plain.contains("namespace"));

    let params: Parameters = "services_namespace=grpc::testing".parse().unwrap();
    let wrapped = client_services(&route_guide(), &params).unwrap();
    assert_eq!(2, wrapped.matches("namespace grpc {\nnamespace testing {\n").count());
    assert_eq!(2, wrapped.matches("}  // namespace testing\n}  // namespace grpc\n").count());

    let class = wrapped.find("class RouteGuideClient {").unwrap();
    let open = wrapped.find("namespace testing {").unwrap();
    let close = wrapped.find("}  // namespace testing").unwrap();
    assert!(open < class && class < close);

    let main = client_epilogue(&route_guide(), &params).unwrap();
    assert!(main.contains("grpc::testing::RouteGuideClient route_guide_client(channel);"));
}

#[test]
fn recursive_messages_are_left_unset() {
    let content = generate(&route_guide(), &Parameters::default());
    assert!(content.contains(
        "void PopulateRouteNote(::routeguide::RouteNote &message) {\n  \
         PopulatePoint(*message.mutable_location());\n  \
         // replies is recursive, left unset.\n}\n"
    ));
    assert!(content.contains("    PrintRouteNote(*message.mutable_replies(i));\n"));
}

#[test]
fn enum_values_are_declared_values() {
    let content = generate(&route_guide(), &Parameters::default());
    assert!(
        content.contains("message.set_terrain(static_cast<::routeguide::Terrain>(0));")
            || content.contains("message.set_terrain(static_cast<::routeguide::Terrain>(3));")
    );
    assert!(content.contains(
        "std::cout << \"terrain: \" << static_cast<int>(message.terrain()) << std::endl;"
    ));
}

#[test]
fn sections_compose_the_file() {
    let file = route_guide();
    let params: Parameters = "seed=11,services_namespace=routes".parse().unwrap();
    let sections = [
        client_prologue(&file, &params).unwrap(),
        client_includes(&file, &params).unwrap(),
        client_services(&file, &params).unwrap(),
        client_epilogue(&file, &params).unwrap(),
    ];
    assert_eq!(generate(&file, &params), sections.concat());
}

#[test]
fn deterministic_output() {
    let file = route_guide();
    let params: Parameters = "seed=42".parse().unwrap();
    assert_eq!(generate(&file, &params), generate(&file, &params));

    let other: Parameters = "seed=43".parse().unwrap();
    assert_ne!(generate(&file, &params), generate(&file, &other));
}

#[test]
fn idempotent_naming() {
    let generator = CppClientGenerator::new();
    let file = FileDef::new("proto/route_guide.proto", "routeguide");
    let first = output_file_name(&generator, &file);
    assert_eq!("proto/route_guide.grpc.client.pb.cc", first);
    assert_eq!(first, output_file_name(&generator, &file));
}

#[test]
fn malformed_descriptors() {
    let dangling = FileDef::new("bad.proto", "bad")
        .message(MessageDef::new("Req").field(FieldDef::enumeration("kind", "Missing")))
        .with_service(ServiceDef::new("Svc").method(MethodDef::unary("Call", "Req", "Req")));
    assert!(matches!(
        generate_file(&CppClientGenerator::new(), &dangling, &Parameters::default()),
        Err(Error::MalformedDescriptor(_))
    ));

    let unresolved = FileDef::new("bad.proto", "bad")
        .message(MessageDef::new("Req"))
        .with_service(ServiceDef::new("Svc").method(MethodDef::unary("Call", "Req", "Resp")));
    assert!(matches!(
        generate_file(&CppClientGenerator::new(), &unresolved, &Parameters::default()),
        Err(Error::MalformedDescriptor(_))
    ));
}
