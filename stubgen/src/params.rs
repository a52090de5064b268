use std::str::FromStr;

use log::debug;

use crate::{Error, Result};

/// Generation options supplied by the invoking toolchain.
///
/// Fixed for the duration of a generation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameters {
    /// Puts the generated services into this namespace. Empty means no wrapping.
    pub services_namespace: String,
    /// Use system includes (`<>`) or local includes (`""`) for the supporting headers.
    pub use_system_headers: bool,
    /// Prefix for includes of sibling generated headers.
    pub grpc_search_path: String,
    /// Seed for the sample values in generated exercise code.
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            services_namespace: String::new(),
            use_system_headers: true,
            grpc_search_path: String::new(),
            seed: 0,
        }
    }
}

impl Parameters {
    /// Applies a protoc parameter string (`key=value,key=value`) on top of `self`.
    pub fn merge_opts(&mut self, opts: &str) -> Result<()> {
        for opt in opts.split(',').map(str::trim).filter(|opt| !opt.is_empty()) {
            let (key, value) = match opt.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (opt, ""),
            };
            debug!("parameter: {} = {:?}", key, value);

            match key {
                "services_namespace" => self.services_namespace = value.to_string(),
                "use_system_headers" => self.use_system_headers = parse_bool(key, value)?,
                "grpc_search_path" => self.grpc_search_path = value.to_string(),
                "seed" => {
                    self.seed = value.parse().map_err(|error| Error::InvalidParameter {
                        key: key.to_string(),
                        reason: format!("{}: {:?}", error, value),
                    })?
                }
                _ => {
                    return Err(Error::InvalidParameter {
                        key: key.to_string(),
                        reason: "unknown parameter".to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Parameters {
    type Err = Error;

    fn from_str(opts: &str) -> Result<Self> {
        let mut params = Parameters::default();
        params.merge_opts(opts)?;
        Ok(params)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidParameter {
            key: key.to_string(),
            reason: format!("expected `true` or `false`, found {:?}", value),
        }),
    }
}
