//! Partial step updates.

use crate::model::{Frequency, NextRef, NextType, Step, StepKey};

/// Where control goes after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    End,
    Step(StepKey),
    Handoff(String),
}

/// A set of field changes to apply to one step. Unset fields are left alone.
///
/// ```
/// use procgather::editor::StepPatch;
///
/// let patch = StepPatch::new().who("AP clerk").action("Match invoice to PO");
/// assert!(!patch.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    pub who: Option<String>,
    pub action: Option<String>,
    pub tools: Option<Vec<String>>,
    pub details: Option<String>,
    pub frequency: Option<Option<Frequency>>,
    pub outcome: Option<String>,
    pub duration: Option<String>,
    pub is_end: Option<bool>,
    pub route: Option<Route>,
}

impl StepPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the step as the end of the process.
    pub fn end() -> Self {
        Self {
            is_end: Some(true),
            ..Self::default()
        }
    }

    /// Route the step to another step.
    pub fn next_step(key: StepKey) -> Self {
        Self {
            route: Some(Route::Step(key)),
            ..Self::default()
        }
    }

    /// Route the step to another team or system.
    pub fn handoff(target: impl Into<String>) -> Self {
        Self {
            route: Some(Route::Handoff(target.into())),
            ..Self::default()
        }
    }

    pub fn who(mut self, value: impl Into<String>) -> Self {
        self.who = Some(value.into());
        self
    }

    pub fn action(mut self, value: impl Into<String>) -> Self {
        self.action = Some(value.into());
        self
    }

    pub fn details(mut self, value: impl Into<String>) -> Self {
        self.details = Some(value.into());
        self
    }

    pub fn outcome(mut self, value: impl Into<String>) -> Self {
        self.outcome = Some(value.into());
        self
    }

    pub fn duration(mut self, value: impl Into<String>) -> Self {
        self.duration = Some(value.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn frequency(mut self, value: Option<Frequency>) -> Self {
        self.frequency = Some(value);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the field changes to `step`.
    ///
    /// End marking wins over a route in the same patch. Routing a step
    /// anywhere but `End` clears its end flag. Exclusivity across steps is
    /// the editor's job.
    pub(crate) fn apply_to(&self, step: &mut Step) {
        if let Some(who) = &self.who {
            step.who = who.clone();
        }
        if let Some(action) = &self.action {
            step.action = action.clone();
        }
        if let Some(tools) = &self.tools {
            step.set_tools(tools);
        }
        if let Some(details) = &self.details {
            step.details = details.clone();
        }
        if let Some(frequency) = self.frequency {
            step.frequency = frequency;
        }
        if let Some(outcome) = &self.outcome {
            step.outcome = outcome.clone();
        }
        if let Some(duration) = &self.duration {
            step.duration = duration.clone();
        }

        if let Some(route) = &self.route {
            match route {
                Route::End => {
                    step.next_type = NextType::End;
                    step.next_ref = None;
                }
                Route::Step(key) => {
                    step.is_end = false;
                    step.next_type = NextType::Step;
                    step.next_ref = Some(NextRef::Step(*key));
                }
                Route::Handoff(target) => {
                    step.is_end = false;
                    step.next_type = NextType::Handoff;
                    step.next_ref = Some(NextRef::Handoff(target.clone()));
                }
            }
        }

        match self.is_end {
            Some(true) => step.mark_end(),
            Some(false) => step.is_end = false,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessId;

    fn step() -> Step {
        Step::new(ProcessId::new(1), 0)
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut s = step();
        let before = s.clone();
        StepPatch::new().apply_to(&mut s);
        assert_eq!(s, before);
        assert!(StepPatch::new().is_empty());
    }

    #[test]
    fn text_fields_are_replaced() {
        let mut s = step();
        StepPatch::new()
            .who("Treasury")
            .action("Approve payment run")
            .details("Check totals")
            .outcome("Approved run")
            .duration("15m")
            .apply_to(&mut s);
        assert_eq!(s.who, "Treasury");
        assert_eq!(s.action, "Approve payment run");
        assert_eq!(s.details, "Check totals");
        assert_eq!(s.outcome, "Approved run");
        assert_eq!(s.duration, "15m");
    }

    #[test]
    fn tools_are_normalized() {
        let mut s = step();
        StepPatch::new()
            .tools(["SAP", "SAP", "  ", "Excel"])
            .apply_to(&mut s);
        assert_eq!(s.tools, vec!["SAP", "Excel"]);
    }

    #[test]
    fn frequency_can_be_cleared() {
        let mut s = step();
        StepPatch::new().frequency(Some(Frequency::Daily)).apply_to(&mut s);
        assert_eq!(s.frequency, Some(Frequency::Daily));
        StepPatch::new().frequency(None).apply_to(&mut s);
        assert_eq!(s.frequency, None);
    }

    #[test]
    fn end_wins_over_route() {
        let mut s = step();
        StepPatch::end()
            .route(Route::Handoff("Legal".into()))
            .apply_to(&mut s);
        assert!(s.is_end);
        assert_eq!(s.next_type, NextType::End);
        assert!(s.next_ref.is_none());
    }

    #[test]
    fn routing_away_clears_end_flag() {
        let mut s = step();
        s.mark_end();
        StepPatch::handoff("Payroll provider").apply_to(&mut s);
        assert!(!s.is_end);
        assert_eq!(s.next_type, NextType::Handoff);
        assert_eq!(
            s.next_ref,
            Some(NextRef::Handoff("Payroll provider".into()))
        );

        let key = StepKey::new();
        StepPatch::next_step(key).apply_to(&mut s);
        assert_eq!(s.target_key(), Some(key));
    }
}
