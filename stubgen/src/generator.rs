//! The generator framework.
//!
//! A [`ClientGenerator`] describes how one target language spells each piece of a client
//! file. The framework owns everything else: it walks the descriptors, decides what is
//! emitted in which order, and checks that every phase leaves the printer's indentation the
//! way it found it.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::descriptor::{File, Message, Method, Service, StreamingMode};
use crate::message_graph::{visit_messages, MessageGraph};
use crate::params::Parameters;
use crate::printer::{Printer, Vars};
use crate::{vars, Error, Result};

/// The generation phases, in the order they appear in an output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Top-of-file banner.
    Prologue,
    /// Package or module declaration, if the language has one.
    Package,
    /// Supporting headers and the sibling schema header.
    Includes,
    /// Flag declarations used by the client bootstrap code.
    Flags,
    /// Populate and print helper declarations for every reachable message.
    MessageDecls,
    /// Per-service client declarations, optionally namespace wrapped.
    Services,
    /// Helper and client method definitions.
    Definitions,
    /// The entry point exercising every method.
    Main,
    /// End-of-file marker.
    Epilogue,
}

impl Phase {
    /// Every phase, in file order. Generation always walks this list.
    pub const ALL: [Phase; 9] = [
        Phase::Prologue,
        Phase::Package,
        Phase::Includes,
        Phase::Flags,
        Phase::MessageDecls,
        Phase::Services,
        Phase::Definitions,
        Phase::Main,
        Phase::Epilogue,
    ];
}

/// A generated output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

/// Per-pass state handed to every [`ClientGenerator`] hook.
pub struct Context<'a> {
    printer: Box<dyn Printer + 'a>,
    file: &'a dyn File,
    params: &'a Parameters,
    message_graph: &'a MessageGraph,
    rng: StdRng,
}

impl<'a> Context<'a> {
    pub fn file(&self) -> &'a dyn File {
        self.file
    }

    pub fn params(&self) -> &'a Parameters {
        self.params
    }

    pub fn message_graph(&self) -> &'a MessageGraph {
        self.message_graph
    }

    /// The sample value source, seeded from [`Parameters::seed`] at the start of the pass.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn print_vars(&mut self, vars: &Vars, template: &str) -> Result<()> {
        self.printer.print_vars(vars, template)
    }

    pub fn print(&mut self, text: &str) -> Result<()> {
        self.printer.print(text)
    }

    pub fn indent(&mut self) {
        self.printer.indent();
    }

    pub fn outdent(&mut self) {
        self.printer.outdent();
    }

    pub fn indent_level(&self) -> usize {
        self.printer.indent_level()
    }
}

/// A target language backend.
///
/// Hooks print through the [`Context`]; each is called by the framework at a fixed point of
/// the [`Phase`] sequence.
pub trait ClientGenerator {
    /// Appended to the input file's base name to form the output file name.
    fn file_extension(&self) -> &str;

    fn comment_prefix(&self) -> &str;

    fn print_prologue(&self, cx: &mut Context<'_>) -> Result<()> {
        let vars = vars! {
            "prefix" => self.comment_prefix(),
            "filename" => cx.file().filename(),
        };
        cx.print_vars(
            &vars,
            "$prefix$Generated by the gRPC client protobuf plugin.\n\
             $prefix$If you make any local change, they will be lost.\n\
             $prefix$source: $filename$\n\n",
        )
    }

    fn print_package(&self, _cx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    fn print_includes(&self, cx: &mut Context<'_>) -> Result<()>;

    fn print_flags(&self, cx: &mut Context<'_>) -> Result<()>;

    /// `vars` holds the message's `name` and `type`.
    fn print_message_populating_decl(&self, cx: &mut Context<'_>, vars: &Vars) -> Result<()>;

    /// `vars` holds the message's `name` and `type`.
    fn print_message_printing_decl(&self, cx: &mut Context<'_>, vars: &Vars) -> Result<()>;

    fn open_namespace(&self, cx: &mut Context<'_>, namespace: &str) -> Result<()>;

    fn close_namespace(&self, cx: &mut Context<'_>, namespace: &str) -> Result<()>;

    fn start_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()>;

    fn print_method_decl(
        &self,
        cx: &mut Context<'_>,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()>;

    fn end_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()>;

    /// Prints the populate and print helper bodies of one reachable message.
    fn print_message_definitions(&self, cx: &mut Context<'_>, message: &dyn Message)
        -> Result<()>;

    fn print_method_definition(
        &self,
        cx: &mut Context<'_>,
        service: &dyn Service,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()>;

    /// Opens the entry point. Must indent.
    fn start_main(&self, cx: &mut Context<'_>) -> Result<()>;

    fn print_main_service(&self, cx: &mut Context<'_>, service: &dyn Service) -> Result<()>;

    fn print_main_method(
        &self,
        cx: &mut Context<'_>,
        service: &dyn Service,
        method: &dyn Method,
        mode: StreamingMode,
    ) -> Result<()>;

    /// Closes the entry point. Must restore the indentation `start_main` added.
    fn end_main(&self, cx: &mut Context<'_>) -> Result<()>;

    fn print_epilogue(&self, _cx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }
}

/// Returns the name of the file `generator` produces for `file`.
pub fn output_file_name(generator: &dyn ClientGenerator, file: &dyn File) -> String {
    format!("{}{}", file.filename_without_ext(), generator.file_extension())
}

/// Generates the complete client file for `file`.
pub fn generate_file(
    generator: &dyn ClientGenerator,
    file: &dyn File,
    params: &Parameters,
) -> Result<GeneratedFile> {
    let content = render_phases(generator, file, params, &Phase::ALL)?;
    Ok(GeneratedFile {
        name: output_file_name(generator, file),
        content,
    })
}

/// Renders the selected phases of the client file for `file`.
///
/// Phases are always rendered in [`Phase::ALL`] order, whatever the order of `phases`.
pub fn render_phases(
    generator: &dyn ClientGenerator,
    file: &dyn File,
    params: &Parameters,
    phases: &[Phase],
) -> Result<String> {
    debug!(
        "file: {:?}, package: {:?}",
        file.filename(),
        file.package()
    );

    let message_graph = MessageGraph::new(file)?;
    let mut buf = String::new();
    {
        let mut cx = Context {
            printer: file.create_printer(&mut buf),
            file,
            params,
            message_graph: &message_graph,
            rng: StdRng::seed_from_u64(params.seed),
        };

        for phase in Phase::ALL.iter().copied().filter(|phase| phases.contains(phase)) {
            let expected = cx.indent_level();
            run_phase(generator, &mut cx, phase)?;
            let actual = cx.indent_level();
            if actual != expected {
                return Err(Error::UnbalancedIndentation {
                    phase,
                    expected,
                    actual,
                });
            }
        }
    }
    Ok(buf)
}

fn run_phase(generator: &dyn ClientGenerator, cx: &mut Context<'_>, phase: Phase) -> Result<()> {
    debug!("  phase: {:?}", phase);
    let file = cx.file();
    match phase {
        Phase::Prologue => generator.print_prologue(cx),
        Phase::Package => generator.print_package(cx),
        Phase::Includes => generator.print_includes(cx),
        Phase::Flags => generator.print_flags(cx),
        Phase::MessageDecls => visit_messages(file, &mut |message| {
            debug!("  message: {:?}", message.type_name());
            let vars = vars! { "name" => message.name(), "type" => message.type_name() };
            generator.print_message_populating_decl(cx, &vars)?;
            generator.print_message_printing_decl(cx, &vars)
        }),
        Phase::Services => with_namespace(generator, cx, |cx| {
            for i in 0..file.service_count() {
                let service = file.service(i);
                debug!("  service: {:?}", service.name());
                generator.start_service(cx, &*service)?;
                for j in 0..service.method_count() {
                    let method = service.method(j);
                    let mode = streaming_mode(&*service, &*method)?;
                    debug!("  method: {:?} ({})", method.name(), mode);
                    generator.print_method_decl(cx, &*method, mode)?;
                }
                generator.end_service(cx, &*service)?;
            }
            Ok(())
        }),
        Phase::Definitions => {
            visit_messages(file, &mut |message| {
                generator.print_message_definitions(cx, message)
            })?;
            with_namespace(generator, cx, |cx| {
                for i in 0..file.service_count() {
                    let service = file.service(i);
                    for j in 0..service.method_count() {
                        let method = service.method(j);
                        let mode = streaming_mode(&*service, &*method)?;
                        generator.print_method_definition(cx, &*service, &*method, mode)?;
                    }
                }
                Ok(())
            })
        }
        Phase::Main => {
            let outer = cx.indent_level();
            generator.start_main(cx)?;
            if cx.indent_level() <= outer {
                return Err(Error::UnbalancedIndentation {
                    phase,
                    expected: outer + 1,
                    actual: cx.indent_level(),
                });
            }
            for i in 0..file.service_count() {
                let service = file.service(i);
                generator.print_main_service(cx, &*service)?;
                for j in 0..service.method_count() {
                    let method = service.method(j);
                    let mode = streaming_mode(&*service, &*method)?;
                    generator.print_main_method(cx, &*service, &*method, mode)?;
                }
            }
            generator.end_main(cx)
        }
        Phase::Epilogue => generator.print_epilogue(cx),
    }
}

/// Runs `body` inside the configured services namespace, if any.
fn with_namespace<F>(generator: &dyn ClientGenerator, cx: &mut Context<'_>, body: F) -> Result<()>
where
    F: FnOnce(&mut Context<'_>) -> Result<()>,
{
    let namespace = cx.params().services_namespace.as_str();
    if namespace.is_empty() {
        return body(cx);
    }
    generator.open_namespace(cx, namespace)?;
    body(cx)?;
    generator.close_namespace(cx, namespace)
}

fn streaming_mode(service: &dyn Service, method: &dyn Method) -> Result<StreamingMode> {
    method.streaming_mode().ok_or_else(|| {
        Error::malformed(format!(
            "method {}.{} must have exactly one streaming mode",
            service.name(),
            method.name()
        ))
    })
}
