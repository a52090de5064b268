use log::{debug, error};
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

use stubgen::{generate_file, ClientGenerator, Error, GeneratedFile, Parameters, Result};

use crate::index::DescriptorIndex;
use crate::views::ProtoFile;

/// Configuration options for running a [`ClientGenerator`] as a `protoc` plugin.
#[derive(Clone, Debug, Default)]
pub struct Config {
    parameters: Parameters,
}

impl Config {
    /// Creates a new code generator configuration with default options.
    pub fn new() -> Self {
        Config::default()
    }

    /// Sets the parameters the request's own parameter string is applied on top of.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use stubgen::Parameters;
    /// # let mut config = stubgen_prost::Config::new();
    /// config.parameters(Parameters {
    ///     services_namespace: "grpc::testing".to_string(),
    ///     ..Parameters::default()
    /// });
    /// ```
    pub fn parameters(&mut self, parameters: Parameters) -> &mut Self {
        self.parameters = parameters;
        self
    }

    /// Generates one client file per file to generate in `request`.
    ///
    /// The batch is all-or-nothing: any failure is reported through the response's `error`
    /// field, and no files are returned.
    pub fn run_plugin(
        &self,
        generator: &dyn ClientGenerator,
        request: CodeGeneratorRequest,
    ) -> CodeGeneratorResponse {
        match self.generate(generator, &request) {
            Ok(files) => CodeGeneratorResponse {
                file: files
                    .into_iter()
                    .map(|generated| File {
                        name: Some(generated.name),
                        content: Some(generated.content),
                        ..Default::default()
                    })
                    .collect(),
                supported_features: Some(Feature::Proto3Optional as u64),
                ..Default::default()
            },
            Err(err) => {
                error!("{}", err);
                CodeGeneratorResponse {
                    error: Some(err.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    /// Generates the client files for `request`, stopping at the first failure.
    pub fn generate(
        &self,
        generator: &dyn ClientGenerator,
        request: &CodeGeneratorRequest,
    ) -> Result<Vec<GeneratedFile>> {
        let mut parameters = self.parameters.clone();
        parameters.merge_opts(request.parameter())?;
        debug!("parameters: {:?}", parameters);

        let index = DescriptorIndex::new(&request.proto_file);

        request
            .file_to_generate
            .iter()
            .map(|name| -> Result<GeneratedFile> {
                let file = request
                    .proto_file
                    .iter()
                    .find(|file| file.name() == name)
                    .ok_or_else(|| Error::MissingFile(name.clone()))?;
                let generated =
                    generate_file(generator, &ProtoFile::new(&index, file), &parameters)?;
                debug!("generated: {} ({} bytes)", generated.name, generated.content.len());
                Ok(generated)
            })
            .collect()
    }
}
