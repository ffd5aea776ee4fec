//! Behavior statement parser
//!
//! A tiny cursor-based tokenizer: fixed leading words are taken one at a
//! time, the target list is whatever remains of the line.

use crate::domain::entities::{Behavior, BehaviorKind, MasterRecord, RecordType};
use crate::domain::value_objects::ZoneName;
use crate::error::DnsbError;

/// Structured parse failure for one statement
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BehaviorSyntaxError {
    #[error("expected '<zone> <type> <target>[,<target>...]', got '{0}'")]
    Incomplete(String),

    #[error("unknown behavior type '{0}' (expected forward, stub, hint or master)")]
    UnknownKind(String),

    #[error(
        "expected '<zone-file> master <name> <type> [<ttl>] <target>[,<target>...]', got '{0}'"
    )]
    IncompleteMaster(String),

    #[error("the 'hint' behavior takes exactly one target, got {0}")]
    HintTargets(usize),

    #[error("empty target in '{0}'")]
    EmptyTarget(String),

    #[error("unsupported record type '{0}'")]
    UnknownRecordType(String),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<BehaviorSyntaxError>,
    },
}

impl BehaviorSyntaxError {
    fn innermost(&self) -> &BehaviorSyntaxError {
        match self {
            BehaviorSyntaxError::AtLine { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Attach the failing service. Unknown record types are an unsupported
    /// feature rather than a malformed statement.
    pub fn for_service(self, service: &str) -> DnsbError {
        match self.innermost() {
            BehaviorSyntaxError::UnknownRecordType(rtype) => DnsbError::UnsupportedFeature(format!(
                "record type '{}' in behavior of service '{}'",
                rtype, service
            )),
            _ => DnsbError::behavior(service, self.to_string()),
        }
    }
}

/// One parsed line together with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    pub text: String,
    pub behavior: Behavior,
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text.trim() }
    }

    fn word(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let (word, rest) = self.rest.split_at(end);
        self.rest = rest.trim_start();
        Some(word)
    }

    fn peek_word(&self) -> Option<&'a str> {
        self.rest.split_whitespace().next()
    }

    fn has_more_after_peek(&self) -> bool {
        self.rest.split_whitespace().nth(1).is_some()
    }

    fn remainder(self) -> &'a str {
        self.rest
    }
}

fn targets(list: &str, line: &str) -> Result<Vec<String>, BehaviorSyntaxError> {
    let targets: Vec<String> = list.split(',').map(|t| t.trim().to_string()).collect();
    if targets.iter().any(String::is_empty) {
        return Err(BehaviorSyntaxError::EmptyTarget(line.to_string()));
    }
    Ok(targets)
}

/// Parse one statement
pub fn parse_behavior(line: &str) -> Result<Behavior, BehaviorSyntaxError> {
    let line = line.trim();
    let mut cursor = Cursor::new(line);
    let (Some(zone), Some(keyword)) = (cursor.word(), cursor.word()) else {
        return Err(BehaviorSyntaxError::Incomplete(line.to_string()));
    };
    let kind = BehaviorKind::parse(keyword)
        .ok_or_else(|| BehaviorSyntaxError::UnknownKind(keyword.to_string()))?;
    let zone = ZoneName::new(zone);

    if kind == BehaviorKind::Master {
        return parse_master(zone, cursor, line);
    }

    let rest = cursor.remainder();
    if rest.is_empty() {
        return Err(BehaviorSyntaxError::Incomplete(line.to_string()));
    }
    let mut targets = targets(rest, line)?;
    Ok(match kind {
        BehaviorKind::Forward => Behavior::Forward { zone, targets },
        BehaviorKind::Stub => Behavior::Stub { zone, targets },
        _ => {
            if targets.len() != 1 {
                return Err(BehaviorSyntaxError::HintTargets(targets.len()));
            }
            Behavior::Hint {
                zone,
                target: targets.remove(0),
            }
        }
    })
}

fn parse_master(
    zone: ZoneName,
    mut cursor: Cursor<'_>,
    line: &str,
) -> Result<Behavior, BehaviorSyntaxError> {
    let (Some(name), Some(rtype)) = (cursor.word(), cursor.word()) else {
        return Err(BehaviorSyntaxError::IncompleteMaster(line.to_string()));
    };

    let mut ttl = None;
    if let Some(value) = cursor.peek_word().and_then(|w| w.parse::<u32>().ok()) {
        if cursor.has_more_after_peek() {
            cursor.word();
            ttl = Some(value);
        }
    }

    let rest = cursor.remainder();
    if rest.is_empty() {
        return Err(BehaviorSyntaxError::IncompleteMaster(line.to_string()));
    }
    let rtype: RecordType = rtype
        .parse()
        .map_err(BehaviorSyntaxError::UnknownRecordType)?;

    Ok(Behavior::Master {
        zone,
        record: MasterRecord {
            name: name.to_string(),
            rtype,
            ttl,
            targets: targets(rest, line)?,
        },
    })
}

/// Parse a whole behavior script, skipping blank lines and `#` comments
pub fn parse_script(script: &str) -> Result<Vec<Statement>, BehaviorSyntaxError> {
    script
        .lines()
        .enumerate()
        .filter(|(_, text)| {
            let text = text.trim();
            !text.is_empty() && !text.starts_with('#')
        })
        .map(|(idx, text)| {
            let behavior = parse_behavior(text).map_err(|e| BehaviorSyntaxError::AtLine {
                line: idx + 1,
                source: Box::new(e),
            })?;
            Ok(Statement {
                line: idx + 1,
                text: text.trim().to_string(),
                behavior,
            })
        })
        .collect()
}
