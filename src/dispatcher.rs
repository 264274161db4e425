//! Routes input files to the appropriate parser variant.
//!
//! The dispatcher is a factory registry keyed by data-type tag. Lookups are
//! case-insensitive, and new variants can be registered late; the
//! `GeoParser` bound on factories makes contract conformance a compile-time
//! property rather than a runtime check.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::config::EXTENSION_TYPES;
use crate::error::{GeoError, Result};
use crate::parsers::{ElectricalParser, GeoParser, RadarParser, SeismicParser};

/// Constructor for a parser bound to a source file.
pub type ParserFactory = fn(&Path) -> Result<Box<dyn GeoParser>>;

fn make_electrical(path: &Path) -> Result<Box<dyn GeoParser>> {
    Ok(Box::new(ElectricalParser::new(path)?))
}

fn make_seismic(path: &Path) -> Result<Box<dyn GeoParser>> {
    Ok(Box::new(SeismicParser::new(path)?))
}

fn make_radar(path: &Path) -> Result<Box<dyn GeoParser>> {
    Ok(Box::new(RadarParser::new(path)?))
}

/// Parser registry mapping data-type tags to parser factories.
pub struct Dispatcher {
    registry: HashMap<String, ParserFactory>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut registry: HashMap<String, ParserFactory> = HashMap::new();
        registry.insert("electrical".to_string(), make_electrical);
        registry.insert("seismic".to_string(), make_seismic);
        registry.insert("radar".to_string(), make_radar);
        Self { registry }
    }

    /// Construct a parser for the given data type, bound to `path`.
    /// Unknown tags fail listing the available types.
    pub fn get_parser(&self, data_type: &str, path: &Path) -> Result<Box<dyn GeoParser>> {
        let factory = self.factory(data_type)?;
        info!(
            "Creating {} parser for {}",
            data_type.to_lowercase(),
            path.display()
        );
        factory(path)
    }

    /// Look up the factory itself, without constructing a parser.
    pub fn factory(&self, data_type: &str) -> Result<ParserFactory> {
        let tag = data_type.to_lowercase();
        self.registry
            .get(&tag)
            .copied()
            .ok_or_else(|| GeoError::UnknownDataType {
                given: data_type.to_string(),
                available: self.supported_types().join(", "),
            })
    }

    /// Infer the data-type tag from the file extension.
    ///
    /// `.csv`, `.txt`, and `.dat` all map to `electrical`; extension-based
    /// inference cannot distinguish seismic or radar CSV exports from
    /// electrical ones, so callers with such files must pass an explicit
    /// type tag instead.
    pub fn detect_type(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        for (ext, data_type) in EXTENSION_TYPES {
            if *ext == extension {
                debug!(
                    "Detected data type '{}' from extension '.{}'",
                    data_type.tag(),
                    extension
                );
                return Ok(data_type.tag().to_string());
            }
        }

        Err(GeoError::UnknownExtension {
            extension: format!(".{extension}"),
            supported: EXTENSION_TYPES
                .iter()
                .map(|(ext, _)| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Register a parser factory for a data-type tag, overwriting any
    /// existing entry.
    pub fn register_parser(&mut self, data_type: &str, factory: ParserFactory) {
        info!("Registered parser for type '{}'", data_type.to_lowercase());
        self.registry.insert(data_type.to_lowercase(), factory);
    }

    /// Supported data-type tags, sorted.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.registry.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
