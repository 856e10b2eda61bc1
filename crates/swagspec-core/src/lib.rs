//! swagspec-core: OpenAPI example metadata, request building and response validation
//!
//! Examples declare a path item, an operation and one expected response.
//! This crate turns them into concrete requests, checks live responses
//! against the declaration, and merges the declarations back into the
//! OpenAPI / Swagger documents they describe.

pub mod assemble;
pub mod config;
pub mod contract;
pub mod document;
pub mod dryrun;
pub mod generator;
pub mod metadata;
pub mod params;
pub mod report;
pub mod request;
pub mod schema_tree;
pub mod validate;
pub mod values;

pub use assemble::DocumentAssembler;
pub use config::{Config, ConfigError};
pub use contract::{ContractError, ContractExample, ContractFile};
pub use document::{Dialect, Document, DocumentStore, StoreError};
pub use dryrun::DryRunPlan;
pub use generator::to_http_file;
pub use metadata::{
    BodyProperty, ExampleMetadata, OperationMetadata, ParamLocation, ParameterDecl,
    ParameterEntry, PathItemMetadata, ResponseExpectation, Verb,
};
pub use report::{ExampleOutcome, Outcome, RunReport, VerdictStatus};
pub use request::{HeaderCasing, Payload, RequestError, RequestFactory, ResolvedRequest};
pub use schema_tree::AttributeError;
pub use validate::{ResponseSnapshot, ResponseValidator, ValidationError};
pub use values::{MissingValue, ValueSource};
