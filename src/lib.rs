pub mod error;
pub mod datatypes;
pub mod codec;
pub mod ibm;
pub mod text;
pub mod format;
pub mod header;
pub mod reel;
pub mod catalog;
pub mod reader;
pub mod writer;

pub use error::{Result, SegYError};
pub use datatypes::{Revision, SampleFormat};
pub use codec::Endian;
pub use ibm::IbmFloat32;
pub use text::{TextEncoding, TextPolicy, TextualHeader};
pub use format::{FieldDescriptor, HeaderFormat};
pub use header::{BinaryReelHeader, HeaderValues, TraceHeader};
pub use reel::ReelHeader;
pub use catalog::{CdpCatalog, Dimensionality, Geometry, LineCatalog, LineKeys, TraceCatalogEntry};
pub use reader::{ReaderConfig, SegYReader};
pub use writer::{write_segy, SegYWriter, TraceSource, WriterConfig};
