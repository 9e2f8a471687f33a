//! Example payloads from a JSON-Schema document.
//!
//! Only `required` properties are populated and every array gets the same
//! number of elements, so the output is the smallest payload that still
//! exercises every required path. Leaf values come from the property title.

use chrono::{Days, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::schema::decode_ref_segment;

/// References are followed at most this many times along one path.
const MAX_DEPTH: usize = 128;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Chloe", "Daniel", "Emi", "Farah", "Goro", "Hana", "Ivan", "Jun",
];
const LAST_NAMES: &[&str] = &[
    "Anderson", "Baker", "Chen", "Dubois", "Endo", "Fischer", "Garcia", "Hayashi", "Ito", "Kim",
];
const WORDS: &[&str] = &[
    "amber", "basket", "canyon", "delta", "ember", "forest", "harbor", "island", "meadow",
    "orbit", "pepper", "quartz", "river", "summit", "timber", "velvet",
];
const COMPANIES: &[&str] = &[
    "Northwind Trading",
    "Blue Harbor Logistics",
    "Sakura Foods",
    "Acme Supplies",
    "Lumen Analytics",
];
const JOBS: &[&str] = &[
    "Account Manager",
    "Pharmacist",
    "Logistics Coordinator",
    "Software Engineer",
    "Store Clerk",
];
const CITIES: &[&str] = &["Springfield", "Riverton", "Lakeside", "Fairview", "Kyoto"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("reference path not found: {part} (in {reference})")]
    UnresolvedRef { reference: String, part: String },
    #[error("schema nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,
}

#[derive(Clone, Debug)]
pub struct SampleConfig {
    pub(crate) seed: u64,
    pub(crate) array_len: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            array_len: 2,
        }
    }
}

impl SampleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = value;
        self
    }

    pub fn array_len(mut self, value: usize) -> Self {
        self.array_len = value;
        self
    }
}

/// Generate a payload for `schema` with the default configuration.
pub fn generate_object(schema: &Value) -> Result<Value, SampleError> {
    generate_object_with(schema, &SampleConfig::default())
}

pub fn generate_object_with(schema: &Value, config: &SampleConfig) -> Result<Value, SampleError> {
    SampleGenerator::new(schema, config).generate(schema, 0)
}

struct SampleGenerator<'s> {
    root: &'s Value,
    rng: StdRng,
    array_len: usize,
}

impl<'s> SampleGenerator<'s> {
    fn new(root: &'s Value, config: &SampleConfig) -> Self {
        Self {
            root,
            rng: StdRng::seed_from_u64(config.seed),
            array_len: config.array_len,
        }
    }

    fn generate(&mut self, schema: &'s Value, depth: usize) -> Result<Value, SampleError> {
        if depth > MAX_DEPTH {
            return Err(SampleError::TooDeep);
        }

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            let target = self.resolve(reference)?;
            return self.generate(target, depth + 1);
        }

        if let Some(members) = schema.get("anyOf").and_then(Value::as_array) {
            return match members.first() {
                Some(first) => self.generate(first, depth + 1),
                None => Ok(Value::Null),
            };
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("array") => self.array(schema, depth),
            Some("object") => self.object(schema, depth),
            Some(kind) => {
                let title = schema.get("title").and_then(Value::as_str).unwrap_or("");
                Ok(self.leaf(kind, &title.to_lowercase()))
            }
            None => Ok(Value::Null),
        }
    }

    fn resolve(&self, reference: &str) -> Result<&'s Value, SampleError> {
        let mut current = self.root;
        for raw in reference.split('/').skip(1) {
            let unresolved = || SampleError::UnresolvedRef {
                reference: reference.to_string(),
                part: raw.to_string(),
            };
            let part = decode_ref_segment(raw).ok_or_else(unresolved)?;
            current = current.get(part.as_str()).ok_or_else(unresolved)?;
        }
        Ok(current)
    }

    fn array(&mut self, schema: &'s Value, depth: usize) -> Result<Value, SampleError> {
        if let Some(prefix) = schema.get("prefixItems").and_then(Value::as_array) {
            let items = prefix
                .iter()
                .map(|item| self.generate(item, depth + 1))
                .collect::<Result<_, _>>()?;
            return Ok(Value::Array(items));
        }

        let items = match schema.get("items") {
            Some(items) => items,
            None => return Ok(Value::Array(vec![Value::Null; self.array_len])),
        };
        let values = (0..self.array_len)
            .map(|_| self.generate(items, depth + 1))
            .collect::<Result<_, _>>()?;
        Ok(Value::Array(values))
    }

    fn object(&mut self, schema: &'s Value, depth: usize) -> Result<Value, SampleError> {
        let mut result = Map::new();
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Ok(Value::Object(result));
        };
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        for (name, property) in properties {
            if required.contains(&name.as_str()) {
                result.insert(name.clone(), self.generate(property, depth + 1)?);
            }
        }
        Ok(Value::Object(result))
    }

    fn leaf(&mut self, kind: &str, title: &str) -> Value {
        match kind {
            "string" => Value::String(self.string(title)),
            "boolean" => Value::Bool(self.rng.gen_bool(0.5)),
            "integer" => json!(self.integer(title)),
            "number" => {
                let cents = self.rng.gen_range(0..1_000_000_i64);
                json!(cents as f64 / 100.0)
            }
            _ => Value::Null,
        }
    }

    fn string(&mut self, title: &str) -> String {
        if title.contains("name") {
            let (first, last) = self.person();
            format!("{first} {last}")
        } else if title.contains("email") {
            let (first, last) = self.person();
            format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase())
        } else if title.contains("phone") {
            format!(
                "+81-{:02}-{:04}-{:04}",
                self.rng.gen_range(10..100),
                self.rng.gen_range(0..10_000),
                self.rng.gen_range(0..10_000)
            )
        } else if title.contains("url") {
            format!("https://example.com/{}", self.word())
        } else if title.contains("address") || title.contains("addr") {
            let street = self.word();
            let city = self.pick(CITIES);
            format!("{} {street} street, {city}", self.rng.gen_range(1..2000))
        } else if title.contains("date") {
            self.date()
        } else if title.contains("time") {
            self.time()
        } else if title.contains("company") {
            self.pick(COMPANIES).to_string()
        } else if title.contains("job") {
            self.pick(JOBS).to_string()
        } else if title.contains("code") || title.contains("id") {
            self.uuid()
        } else if title.contains("memo") || title.contains("notice") || title.contains("message") {
            self.sentence()
        } else {
            self.word().to_string()
        }
    }

    fn integer(&mut self, title: &str) -> i64 {
        if title.contains("quantity") {
            self.rng.gen_range(1..=10)
        } else if title.contains("price") {
            self.rng.gen_range(1000..=1_000_000)
        } else {
            self.rng.gen_range(0..=9999)
        }
    }

    fn person(&mut self) -> (&'static str, &'static str) {
        (self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn word(&mut self) -> &'static str {
        self.pick(WORDS)
    }

    fn pick(&mut self, choices: &'static [&'static str]) -> &'static str {
        choices.choose(&mut self.rng).copied().unwrap_or("sample")
    }

    fn sentence(&mut self) -> String {
        let len = self.rng.gen_range(4..9);
        let words: Vec<&str> = (0..len).map(|_| self.word()).collect();
        let mut sentence = words.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }

    fn date(&mut self) -> String {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default();
        let offset = Days::new(self.rng.gen_range(0..2000));
        base.checked_add_days(offset)
            .unwrap_or(base)
            .format("%Y-%m-%d")
            .to_string()
    }

    fn time(&mut self) -> String {
        let seconds = self.rng.gen_range(0..86_400);
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .unwrap_or_default()
            .format("%H:%M:%S")
            .to_string()
    }

    fn uuid(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}
