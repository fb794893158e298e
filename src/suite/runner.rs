//! Sequential case execution against one service.

use std::collections::BTreeSet;
use std::time::Instant;

use pulse_http::{ApiClient, ApiResponse, ClientError, StatusCode};
use pulse_kernel::record::{self, Record};
use pulse_kernel::settings::{Settings, SuiteSettings};
use pulse_kernel::{Resource, ResourceRegistry};
use serde_json::Value;

use super::case::{self, Case, CaseFilter, CaseKind, FixtureCase, Probe};
use super::error::ConformanceError;
use super::report::{CaseOutcome, Report, Verdict};

/// A record created by a case for its own use
#[derive(Debug, Clone)]
struct Fixture {
    id: u64,
    /// Record as the service returned it, id included
    record: Record,
}

/// Drives cases one at a time, one request in flight
pub struct Runner {
    client: ApiClient,
    suite: SuiteSettings,
}

impl Runner {
    pub fn new(client: ApiClient, suite: SuiteSettings) -> Self {
        Self { client, suite }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let client = ApiClient::new(&settings.target)?;
        Ok(Self::new(client, settings.suite.clone()))
    }

    /// Run every case of `registry` accepted by `filter`
    pub async fn run(&self, registry: &ResourceRegistry, filter: &CaseFilter) -> Report {
        let cases = case::select(registry, filter);
        tracing::info!(
            cases = cases.len(),
            base_url = %self.client.base_url(),
            "conformance run starting"
        );

        let mut report = Report::new();
        for case in &cases {
            report.push(self.run_case(case).await);
        }

        tracing::info!(
            passed = report.passed(),
            total = report.total(),
            "conformance run complete"
        );
        report
    }

    pub async fn run_case(&self, case: &Case) -> CaseOutcome {
        let name = case.name();
        let started = Instant::now();
        let result = self.execute(case).await;
        let elapsed = started.elapsed();

        let verdict = match result {
            Ok(()) => {
                tracing::info!(
                    case = %name,
                    elapsed_ms = elapsed.as_millis(),
                    "case passed"
                );
                Verdict::Passed
            }
            Err(err) => {
                tracing::warn!(case = %name, error = %err, "case failed");
                Verdict::Failed {
                    transport: err.is_transport(),
                    message: err.to_string(),
                }
            }
        };

        CaseOutcome {
            name,
            verdict,
            elapsed,
        }
    }

    async fn execute(&self, case: &Case) -> Result<(), ConformanceError> {
        let resource = case.resource.as_ref();
        match case.kind {
            CaseKind::Probe(probe) => self.probe(resource, probe).await,
            CaseKind::Fixture(step) => {
                let fixture = match self.create_fixture(resource).await {
                    Ok(fixture) => fixture,
                    Err(err) if step == FixtureCase::Create => return Err(err),
                    Err(err) => return Err(ConformanceError::Fixture(Box::new(err))),
                };

                let outcome = self.exercise(resource, step, &fixture).await;
                if !step.consumes_fixture() || outcome.is_err() {
                    self.release(resource, fixture.id).await;
                }
                outcome
            }
        }
    }

    async fn probe(&self, resource: &dyn Resource, probe: Probe) -> Result<(), ConformanceError> {
        match probe {
            Probe::CreateBlankField(field) => {
                self.expect_rejected(resource, &record::blanked(&resource.sample(), field))
                    .await
            }
            Probe::CreateMissingField(field) => {
                self.expect_rejected(resource, &record::without(&resource.sample(), field))
                    .await
            }
            Probe::CreateAllBlank => self.expect_rejected(resource, &resource.blank()).await,
            Probe::CreateEmpty => self.expect_rejected(resource, &Record::new()).await,
            Probe::CreateWrongUrl => {
                let response = self
                    .client
                    .create(resource.misspelled_collection(), &resource.sample())
                    .await?;
                expect_status(&response, StatusCode::NOT_FOUND)
            }
            Probe::ReadUnknownId => {
                let response = self
                    .client
                    .read(resource.collection(), self.suite.missing_id)
                    .await?;
                expect_status(&response, StatusCode::NOT_FOUND)
            }
        }
    }

    async fn exercise(
        &self,
        resource: &dyn Resource,
        step: FixtureCase,
        fixture: &Fixture,
    ) -> Result<(), ConformanceError> {
        let collection = resource.collection();
        match step {
            // Status and body were asserted while creating the fixture.
            FixtureCase::Create => Ok(()),
            FixtureCase::Read => {
                let response = self.client.read(collection, fixture.id).await?;
                expect_record(resource, &response, StatusCode::OK, &fixture.record)
            }
            FixtureCase::ReadRepeat => {
                let first = self.client.read(collection, fixture.id).await?;
                expect_record(resource, &first, StatusCode::OK, &fixture.record)?;
                let second = self.client.read(collection, fixture.id).await?;
                expect_status(&second, StatusCode::OK)?;
                expect_same_body(&second, first.json()?, second.json()?)
            }
            FixtureCase::ReadWrongUrl => {
                let response = self
                    .client
                    .read(resource.misspelled_collection(), fixture.id)
                    .await?;
                expect_status(&response, StatusCode::NOT_FOUND)
            }
            FixtureCase::Update => {
                let patch = resource.partial_update();
                let response = self.client.update(collection, fixture.id, &patch).await?;
                let expected = record::merge_known(&fixture.record, &patch);
                expect_record(resource, &response, StatusCode::OK, &expected)
            }
            FixtureCase::UpdateWrongUrl => {
                let response = self
                    .client
                    .update(
                        resource.misspelled_collection(),
                        fixture.id,
                        &resource.partial_update(),
                    )
                    .await?;
                expect_status(&response, StatusCode::NOT_FOUND)
            }
            FixtureCase::UpdateUnknownId => {
                let response = self
                    .client
                    .update(collection, self.suite.missing_id, &resource.partial_update())
                    .await?;
                expect_status(&response, StatusCode::NOT_FOUND)
            }
            FixtureCase::UpdateUnknownField => {
                let response = self
                    .client
                    .update(collection, fixture.id, &resource.unknown_field_update())
                    .await?;
                expect_record(resource, &response, StatusCode::OK, &fixture.record)
            }
            FixtureCase::UpdateEmpty => {
                let response = self
                    .client
                    .update(collection, fixture.id, &Record::new())
                    .await?;
                expect_record(resource, &response, StatusCode::OK, &fixture.record)
            }
            FixtureCase::Delete => {
                let response = self.client.delete(collection, fixture.id).await?;
                expect_status(&response, StatusCode::NO_CONTENT)?;

                let listed = self.listing(collection).await?;
                if listed.iter().any(|item| record::id_of(item) == Some(fixture.id)) {
                    return Err(ConformanceError::StillListed {
                        resource: resource.name(),
                        id: fixture.id,
                    });
                }
                Ok(())
            }
        }
    }

    /// POST the sample and check it comes back with an id and nothing else changed
    async fn create_fixture(&self, resource: &dyn Resource) -> Result<Fixture, ConformanceError> {
        let sample = resource.sample();
        let response = self.client.create(resource.collection(), &sample).await?;
        expect_status(&response, StatusCode::CREATED)?;

        let body = response.json()?;
        let id = record::id_of(&body).ok_or_else(|| ConformanceError::MissingId {
            url: response.url.to_string(),
        })?;

        let checked = check_shape(resource, &response, &body)
            .and_then(|()| expect_body(&response, &record::with_id(&sample, id), body.clone()));
        if let Err(err) = checked {
            self.release(resource, id).await;
            return Err(err);
        }

        let record = match body {
            Value::Object(record) => record,
            _ => Record::new(),
        };
        tracing::debug!(resource = resource.name(), id, "fixture created");
        Ok(Fixture { id, record })
    }

    /// POST a payload the service must refuse, then make sure nothing was stored
    async fn expect_rejected(
        &self,
        resource: &dyn Resource,
        payload: &Record,
    ) -> Result<(), ConformanceError> {
        let collection = resource.collection();
        let before = self.listed_ids(collection).await?;

        let response = self.client.create(collection, payload).await?;
        if response.status == StatusCode::CREATED {
            if let Some(id) = response.json().ok().as_ref().and_then(record::id_of) {
                self.release(resource, id).await;
            }
        }
        expect_status(&response, StatusCode::BAD_REQUEST)?;

        let after = self.listed_ids(collection).await?;
        let ids: Vec<u64> = after.difference(&before).copied().collect();
        if ids.is_empty() {
            return Ok(());
        }
        for id in &ids {
            self.release(resource, *id).await;
        }
        Err(ConformanceError::PersistedAfterRejection {
            resource: resource.name(),
            ids,
        })
    }

    /// Ids currently in the listing; records without an integer id are skipped
    async fn listed_ids(&self, collection: &str) -> Result<BTreeSet<u64>, ConformanceError> {
        let listed = self.listing(collection).await?;
        Ok(listed.iter().filter_map(record::id_of).collect())
    }

    async fn listing(&self, collection: &str) -> Result<Vec<Value>, ConformanceError> {
        let response = self.client.list(collection).await?;
        expect_status(&response, StatusCode::OK)?;
        match response.json()? {
            Value::Array(items) => Ok(items),
            _ => Err(ConformanceError::NotAList {
                url: response.url.to_string(),
            }),
        }
    }

    /// Best-effort delete of a record this run created
    async fn release(&self, resource: &dyn Resource, id: u64) {
        if !self.suite.cleanup {
            tracing::info!(resource = resource.name(), id, "cleanup disabled, keeping record");
            return;
        }
        match self.client.delete(resource.collection(), id).await {
            Ok(response)
                if response.status == StatusCode::NO_CONTENT
                    || response.status == StatusCode::NOT_FOUND =>
            {
                tracing::debug!(
                    resource = resource.name(),
                    id,
                    status = response.status.as_u16(),
                    "record released"
                );
            }
            Ok(response) => tracing::warn!(
                resource = resource.name(),
                id,
                status = response.status.as_u16(),
                "cleanup delete answered unexpectedly"
            ),
            Err(err) => tracing::warn!(
                resource = resource.name(),
                id,
                error = %err,
                "cleanup delete failed"
            ),
        }
    }
}

fn expect_status(response: &ApiResponse, expected: StatusCode) -> Result<(), ConformanceError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ConformanceError::UnexpectedStatus {
        method: response.method.clone(),
        url: response.url.to_string(),
        expected,
        actual: response.status,
        body: response.excerpt(),
    })
}

fn check_shape(
    resource: &dyn Resource,
    response: &ApiResponse,
    body: &Value,
) -> Result<(), ConformanceError> {
    resource
        .check_shape(body)
        .map_err(|source| ConformanceError::Shape {
            resource: resource.name(),
            url: response.url.to_string(),
            source,
        })
}

fn expect_body(response: &ApiResponse, expected: &Record, actual: Value) -> Result<(), ConformanceError> {
    let expected = Value::Object(expected.clone());
    if actual == expected {
        return Ok(());
    }
    Err(ConformanceError::BodyMismatch {
        method: response.method.clone(),
        url: response.url.to_string(),
        expected,
        actual,
    })
}

fn expect_same_body(response: &ApiResponse, first: Value, second: Value) -> Result<(), ConformanceError> {
    if first == second {
        return Ok(());
    }
    Err(ConformanceError::BodyMismatch {
        method: response.method.clone(),
        url: response.url.to_string(),
        expected: first,
        actual: second,
    })
}

/// Status, record shape and exact body in one go
fn expect_record(
    resource: &dyn Resource,
    response: &ApiResponse,
    status: StatusCode,
    expected: &Record,
) -> Result<(), ConformanceError> {
    expect_status(response, status)?;
    let body = response.json()?;
    check_shape(resource, response, &body)?;
    expect_body(response, expected, body)
}
