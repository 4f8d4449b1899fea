//! Step records and their routing descriptor.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{ProcessId, StepId, StepKey};

/// How often a step is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "Per transaction")]
    PerTransaction,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    #[serde(rename = "Ad hoc / On event")]
    AdHoc,
}

impl Frequency {
    /// Every frequency, in display order.
    pub const ALL: [Frequency; 8] = [
        Frequency::PerTransaction,
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
        Frequency::AdHoc,
    ];

    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PerTransaction => "Per transaction",
            Self::Hourly => "Hourly",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Yearly => "Yearly",
            Self::AdHoc => "Ad hoc / On event",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if matches!(wanted.as_str(), "adhoc" | "ad-hoc" | "ad hoc") {
            return Ok(Self::AdHoc);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown frequency: {}", s))
    }
}

/// Stored as the empty string when unset.
mod optional_frequency {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Frequency>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(frequency) => frequency.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Frequency>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(label) => label.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// What happens after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextType {
    /// The process ends here.
    #[default]
    End,
    /// Control passes to another step of the same process.
    Step,
    /// Control passes to another team or system.
    Handoff,
}

impl fmt::Display for NextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::End => "end",
            Self::Step => "step",
            Self::Handoff => "handoff",
        })
    }
}

/// Target of a step's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextRef {
    /// Another step, by stable key.
    Step(StepKey),
    /// Free-text description of the receiving team or system.
    Handoff(String),
}

/// One step of a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Store identity; `None` until the step is first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StepId>,

    /// Stable identity used for routing.
    pub key: StepKey,

    /// Owning process.
    pub process_id: ProcessId,

    /// Zero-based display position.
    pub index: usize,

    /// Role or owner performing the step.
    #[serde(default)]
    pub who: String,

    /// Short title of what is done.
    #[serde(default)]
    pub action: String,

    /// Tools used, without duplicates.
    #[serde(default)]
    pub tools: Vec<String>,

    /// Detailed instructions.
    #[serde(default)]
    pub details: String,

    /// How often the step runs.
    #[serde(default, with = "optional_frequency")]
    pub frequency: Option<Frequency>,

    /// Current outcome of the step.
    #[serde(default)]
    pub outcome: String,

    /// Typical duration, free text.
    #[serde(default)]
    pub duration: String,

    /// Whether this step ends the process.
    #[serde(default)]
    pub is_end: bool,

    /// Kind of route after this step.
    #[serde(default)]
    pub next_type: NextType,

    /// Route target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_ref: Option<NextRef>,
}

impl Step {
    /// Create a blank, unsaved step at `index`.
    pub fn new(process_id: ProcessId, index: usize) -> Self {
        Self {
            id: None,
            key: StepKey::new(),
            process_id,
            index,
            who: String::new(),
            action: String::new(),
            tools: Vec::new(),
            details: String::new(),
            frequency: None,
            outcome: String::new(),
            duration: String::new(),
            is_end: false,
            next_type: NextType::End,
            next_ref: None,
        }
    }

    /// Mark this step as the end of the process and drop its route.
    pub fn mark_end(&mut self) {
        self.is_end = true;
        self.next_type = NextType::End;
        self.next_ref = None;
    }

    /// Replace the tool list, trimming names and dropping blanks and duplicates.
    pub fn set_tools<I, S>(&mut self, tools: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tool in tools {
            let tool = tool.as_ref().trim();
            if !tool.is_empty() && !unique.iter().any(|t| t == tool) {
                unique.push(tool.to_string());
            }
        }
        self.tools = unique;
    }

    /// The key this step routes to, if it routes to a step.
    pub fn target_key(&self) -> Option<StepKey> {
        match (&self.next_type, &self.next_ref) {
            (NextType::Step, Some(NextRef::Step(key))) => Some(*key),
            _ => None,
        }
    }

    /// Whether this step has a route pointing at `key`.
    pub fn routes_to(&self, key: StepKey) -> bool {
        matches!(&self.next_ref, Some(NextRef::Step(target)) if *target == key)
    }

    /// Whether the step has never been saved.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// Rewrite `index` so it equals array position.
pub fn reindex(steps: &mut [Step]) {
    for (position, step) in steps.iter_mut().enumerate() {
        step.index = position;
    }
}
