//! Field resolution: maps an opaque raw row's variable column identifiers
//! onto canonical semantic names through an ordered alias table.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// One raw row as delivered by the record source: column id -> value.
pub type RawRecord = Map<String, Value>;

/// Canonical semantic fields a raw row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Project,
    ProjectGate,
    PureHours,
    CheckedTasks,
    MarkupHours,
    MarkedTasks,
    MarkupGate,
    AdditionalHours,
    OtherGate,
    OvertimeHours,
    OvertimeGate,
    IdleHours,
}

/// Ordered alias list per canonical field.
///
/// Resolution is two passes: every alias verbatim first, then every alias
/// with whitespace/punctuation runs collapsed to the separator character.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(Field, Vec<&'static str>)>,
    separator: char,
}

impl Default for AliasTable {
    /// Standard deployment mapping: a descriptive name, historic alternates,
    /// and the bare sheet column letter.
    fn default() -> Self {
        Self {
            entries: vec![
                (Field::Date, vec!["Date", "Work_Date", "B"]),
                (Field::Project, vec!["Project", "Project_Name", "H"]),
                (Field::ProjectGate, vec!["Project_Check", "Validation", "C"]),
                (Field::PureHours, vec!["Pure_Hours", "Hours", "K"]),
                (Field::CheckedTasks, vec!["Checked_Tasks", "Tasks_Checked", "J"]),
                (Field::MarkupHours, vec!["Markup_Hours", "Q"]),
                (Field::MarkedTasks, vec!["Marked_Tasks", "P"]),
                (Field::MarkupGate, vec!["Markup_Check", "D"]),
                (
                    Field::AdditionalHours,
                    vec!["Other_Hours", "Additional_Hours", "L"],
                ),
                (Field::OtherGate, vec!["Other_Check", "E"]),
                (Field::OvertimeHours, vec!["Overtime_Hours", "M"]),
                (Field::OvertimeGate, vec!["Overtime_Check", "F"]),
                (Field::IdleHours, vec!["Idle_Hours", "N"]),
            ],
            separator: '_',
        }
    }
}

impl AliasTable {
    pub fn new(entries: Vec<(Field, Vec<&'static str>)>, separator: char) -> Self {
        Self { entries, separator }
    }

    fn aliases(&self, field: Field) -> &[&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a canonical field on a raw record. Pure and deterministic;
    /// `None` when no alias matches in either form.
    pub fn resolve<'a>(&self, record: &'a RawRecord, field: Field) -> Option<&'a Value> {
        let aliases = self.aliases(field);

        for name in aliases {
            if let Some(v) = record.get(*name) {
                return Some(v);
            }
        }

        for name in aliases {
            if let Some(v) = record.get(&sanitize(name, self.separator)) {
                return Some(v);
            }
        }

        None
    }
}

/// Collapse every run of whitespace/punctuation into the separator character.
fn sanitize(name: &str, separator: char) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"[\s\.\-/]+").expect("static pattern"));
    re.replace_all(name, separator.to_string().as_str())
        .into_owned()
}
