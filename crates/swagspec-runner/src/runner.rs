//! Runs contract examples: build, send, validate, record

use swagspec_core::contract::ContractExample;
use swagspec_core::values::ValueSource;
use swagspec_core::{
    DocumentStore, ExampleMetadata, ExampleOutcome, HeaderCasing, Outcome, RequestError,
    RequestFactory, ResolvedRequest, ResponseSnapshot, ResponseValidator, RunReport,
    ValidationError,
};

use crate::transport::{Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Executes examples against one transport and the documents in a store
pub struct ContractRunner<'a, T> {
    store: &'a DocumentStore,
    transport: T,
    casing: HeaderCasing,
}

impl<'a, T: Transport> ContractRunner<'a, T> {
    #[must_use]
    pub fn new(store: &'a DocumentStore, transport: T) -> Self {
        Self {
            store,
            transport,
            casing: HeaderCasing::default(),
        }
    }

    #[must_use]
    pub fn with_casing(mut self, casing: HeaderCasing) -> Self {
        self.casing = casing;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the example's request and send it.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Request`] if the request cannot be built and
    /// [`RunnerError::Transport`] if it cannot be sent.
    pub fn submit_request<V>(
        &self,
        example: &ExampleMetadata,
        values: &V,
    ) -> Result<(ResolvedRequest, ResponseSnapshot), RunnerError>
    where
        V: ValueSource + ?Sized,
    {
        let request = self.build_request(example, values)?;
        let response = self.transport.send(&request)?;
        Ok((request, response))
    }

    fn build_request<V>(
        &self,
        example: &ExampleMetadata,
        values: &V,
    ) -> Result<ResolvedRequest, RequestError>
    where
        V: ValueSource + ?Sized,
    {
        let request = RequestFactory::new(self.store)
            .with_casing(self.casing)
            .build_request(example, values)?;
        tracing::debug!(
            example = %example.label(),
            verb = %request.verb,
            path = %request.path,
            headers = ?request.headers,
            payload = ?request.payload.as_ref().map(swagspec_core::Payload::to_text),
            "submitting request"
        );
        Ok(request)
    }

    /// # Errors
    ///
    /// See [`ResponseValidator::validate`].
    pub fn assert_response_matches_metadata(
        &self,
        example: &ExampleMetadata,
        response: &ResponseSnapshot,
    ) -> Result<(), ValidationError> {
        ResponseValidator::new(self.store).validate(example, response)
    }

    /// Run one example. Never fails; problems land in the outcome.
    pub fn run_example(&self, example: &ContractExample) -> ExampleOutcome {
        let metadata = &example.metadata;
        let mut record = ExampleOutcome {
            label: metadata.label(),
            code: metadata.response.code.clone(),
            document: metadata.document.clone(),
            request: None,
            response: None,
            outcome: Outcome::Passed,
        };

        let request = match self.build_request(metadata, &example.values) {
            Ok(request) => request,
            Err(e) => {
                record.outcome = Outcome::Errored { message: e.to_string() };
                return finish(record);
            }
        };

        let sent = self.transport.send(&request);
        record.request = Some(request);
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(example = %record.label, error = %e, "transport failed");
                record.outcome = Outcome::Errored { message: e.to_string() };
                return finish(record);
            }
        };

        record.outcome = match self.assert_response_matches_metadata(metadata, &response) {
            Ok(()) => Outcome::Passed,
            Err(e @ (ValidationError::UnexpectedResponse(_) | ValidationError::UnexpectedContent(_))) => {
                Outcome::Failed { message: e.to_string() }
            }
            Err(e) => Outcome::Errored { message: e.to_string() },
        };
        record.response = Some(response);
        finish(record)
    }

    /// Run every example in order.
    pub fn run_all<'e, I>(&self, examples: I) -> RunReport
    where
        I: IntoIterator<Item = &'e ContractExample>,
    {
        let mut report = RunReport::default();
        for example in examples {
            report.push(self.run_example(example));
        }
        report
    }
}

fn finish(record: ExampleOutcome) -> ExampleOutcome {
    match record.outcome.message() {
        None => tracing::debug!(example = %record.label, code = %record.code, "passed"),
        Some(message) => tracing::debug!(example = %record.label, code = %record.code, %message, "not passed"),
    }
    record
}
