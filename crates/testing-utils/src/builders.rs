//! Test data builders for wire payloads
//!
//! Records are built as JSON, the shape the REST backend returns, so tests
//! go through the same ingestion path as production code.

use serde_json::{json, Map, Value};

/// Builder for a single wire record
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    fields: Map<String, Value>,
}

impl RecordBuilder {
    pub fn new(id: i64) -> Self {
        let mut fields = Map::new();
        fields.insert("Id".to_string(), json!(id));
        Self { fields }
    }

    pub fn field<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn queued_job(id: i64, name: &str) -> Self {
        Self::new(id)
            .field("QueueName", "default")
            .field("JobName", name)
            .field("JobType", "Tasks.Echo, Tasks")
            .field("Data", "{\"message\":\"hello\"}")
            .field("QueuedOn", "/Date(1709647620000)/")
            .field("TryNumber", 1)
    }

    pub fn schedule(id: i64, name: &str) -> Self {
        Self::new(id)
            .field("Name", name)
            .field("QueueName", "default")
            .field("StartOn", "2024-03-05T14:07:00Z")
            .field("EndOn", Value::Null)
            .field("RepeatType", "Days")
            .field("RepeatValue", 1)
            .field("Enabled", true)
            .field("JobCount", 0)
    }

    pub fn scheduled_job(id: i64, schedule_id: i64) -> Self {
        Self::new(id)
            .field("ScheduleId", schedule_id)
            .field("JobType", "Tasks.Report, Tasks")
            .field("Data", "{}")
            .field("Number", 1)
    }

    pub fn worker(id: i64, name: &str) -> Self {
        Self::new(id)
            .field("Name", name)
            .field("MachineName", "build-01")
            .field("MachineAddress", "10.0.0.1")
            .field("QueueNames", "*")
            .field("Startup", "Automatic")
            .field("Status", "Working")
            .field("Signal", "None")
            .field("UpdatedOn", "2024-03-05T14:07:00Z")
    }

    pub fn working_job(id: i64, worker_id: i64) -> Self {
        Self::new(id)
            .field("WorkerId", worker_id)
            .field("WorkerName", "builder")
            .field("QueueName", "default")
            .field("JobName", "long running")
            .field("JobType", "Tasks.Sleep, Tasks")
            .field("Data", "{}")
            .field("QueuedOn", "2024-03-05T14:00:00Z")
            .field("StartedOn", "2024-03-05T14:01:00Z")
            .field("TryNumber", 1)
            .field("Signal", "None")
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for a list response
#[derive(Debug, Clone)]
pub struct ListResponseBuilder {
    records: Vec<Value>,
    page_number: i64,
    page_count: i64,
    total_count: Option<i64>,
    counts: Option<Value>,
}

impl Default for ListResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ListResponseBuilder {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            page_number: 1,
            page_count: 1,
            total_count: None,
            counts: None,
        }
    }

    pub fn record(mut self, record: RecordBuilder) -> Self {
        self.records.push(record.build());
        self
    }

    pub fn records<I: IntoIterator<Item = RecordBuilder>>(mut self, records: I) -> Self {
        self.records.extend(records.into_iter().map(RecordBuilder::build));
        self
    }

    pub fn page(mut self, page_number: i64, page_count: i64) -> Self {
        self.page_number = page_number;
        self.page_count = page_count;
        self
    }

    pub fn total(mut self, total_count: i64) -> Self {
        self.total_count = Some(total_count);
        self
    }

    pub fn counts(mut self, queue: i64, history: i64, schedules: i64, workers: i64, working: i64) -> Self {
        self.counts = Some(json!({
            "QueueCount": queue,
            "HistoryCount": history,
            "ScheduleCount": schedules,
            "WorkerCount": workers,
            "WorkingCount": working,
        }));
        self
    }

    pub fn build(self) -> Value {
        let total = self.total_count.unwrap_or(self.records.len() as i64);
        let mut body = json!({
            "Records": self.records,
            "PageNumber": self.page_number,
            "PageCount": self.page_count,
            "TotalCount": total,
        });
        if let Some(counts) = self.counts {
            body["Counts"] = counts;
        }
        body
    }
}
