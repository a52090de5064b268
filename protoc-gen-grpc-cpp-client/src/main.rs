use std::io::{Error, ErrorKind, Read, Result, Write};

use log::debug;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;

use stubgen::cpp::CppClientGenerator;
use stubgen_prost::Config;

fn main() {
    env_logger::init();
    if let Err(e) = faillible_main() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn faillible_main() -> Result<()> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;

    let request = CodeGeneratorRequest::decode(buf.as_slice()).map_err(|error| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("invalid CodeGeneratorRequest: {}", error),
        )
    })?;
    debug!(
        "request: {} files to generate, parameter {:?}",
        request.file_to_generate.len(),
        request.parameter()
    );

    let response = Config::new().run_plugin(&CppClientGenerator::new(), request);

    buf.clear();
    response.encode(&mut buf).map_err(|error| {
        Error::new(
            ErrorKind::Other,
            format!("failed to encode CodeGeneratorResponse: {}", error),
        )
    })?;
    std::io::stdout().write_all(&buf)?;

    Ok(())
}
